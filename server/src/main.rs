use anyhow::Context;
use clap::Parser;
use export::svg::{render_markers_json, render_spectrum_svg};
use generator::profile::{build_dataset, GeneratorConfig};
use generator::template::localization_template;
use gui_bridge::bridge::HttpBridge;
use gui_bridge::model::SceneSummary;
use spectracore::i18n::LANGUAGES;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::ViewerConfig;
use workflow::runner::Runner;

mod export;
mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline driver and HTTP bridge for the spectrum map")]
struct Args {
    /// Load viewer settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Dataset file (overrides the config)
    #[arg(long)]
    data: Option<PathBuf>,
    /// Directory holding <lang>.json localization files
    #[arg(long)]
    i18n_dir: Option<PathBuf>,
    /// Active language code
    #[arg(long)]
    lang: Option<String>,
    /// Build the scene once and write an SVG spectrum plus a marker list
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Write a synthetic dataset with this many devices, plus localization templates
    #[arg(long)]
    generate: Option<usize>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Serve data.json, i18n/<lang>.json and scene summaries until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn write_synthetic(config: &ViewerConfig, devices: usize, seed: u64) -> anyhow::Result<()> {
    let dataset = build_dataset(&GeneratorConfig {
        devices,
        seed,
        ..Default::default()
    })?;
    if let Some(parent) = config.data.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config.data, serde_json::to_string_pretty(&dataset)?)
        .with_context(|| format!("writing {}", config.data.display()))?;

    fs::create_dir_all(&config.i18n_dir)?;
    for language in LANGUAGES {
        let path = config.localization_path(language.code);
        if path.exists() {
            continue;
        }
        fs::write(
            &path,
            serde_json::to_string_pretty(&localization_template(language.code))?,
        )
        .with_context(|| format!("writing {}", path.display()))?;
    }
    log::info!(
        "generated {} devices into {}",
        devices,
        config.data.display()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let base_config = if let Some(path) = args.config {
        ViewerConfig::load(path)?
    } else {
        ViewerConfig::default()
    };
    let config = base_config.with_overrides(args.data, args.i18n_dir, args.lang);

    if let Some(devices) = args.generate {
        write_synthetic(&config, devices, args.seed)?;
    }

    let runner = Runner::new(config.clone());
    let bridge = if args.serve {
        Some(HttpBridge::spawn(Arc::new(runner.clone())))
    } else {
        None
    };

    if args.offline {
        let session = runner.execute(&config.language)?;
        let view = session
            .view()
            .context("session finished loading without a scene")?;
        let scene = view.scene();
        let shifted = scene
            .map
            .markers()
            .iter()
            .filter(|marker| marker.position != marker.original)
            .count();

        println!(
            "Offline run -> devices {}, bands {}, markers {} ({} nudged), language {}",
            scene.dataset().devices.len(),
            scene.spectrum.bands.len(),
            scene.map.len(),
            shifted,
            session.language()
        );

        fs::create_dir_all(&config.output_dir)?;
        let svg_path = config.output_dir.join("spectrum.svg");
        fs::write(&svg_path, render_spectrum_svg(&scene.spectrum))
            .with_context(|| format!("writing {}", svg_path.display()))?;
        let markers_path = config.output_dir.join("markers.json");
        fs::write(&markers_path, render_markers_json(&scene.map)?)
            .with_context(|| format!("writing {}", markers_path.display()))?;

        if let Some(bridge) = &bridge {
            bridge.publish(&SceneSummary::from_session(&session))?;
            bridge.publish_status("Offline scene ready.");
        }
    }

    if let Some(bridge) = &bridge {
        bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
