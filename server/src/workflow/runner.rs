use crate::workflow::config::ViewerConfig;
use anyhow::{bail, Context};
use spectracore::{LoadOutcome, Session};
use std::fs;
use std::path::Path;

#[derive(Clone)]
pub struct Runner {
    config: ViewerConfig,
}

fn read_resource(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

impl Runner {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Loads the localization for `language`, then the dataset, the same way
    /// the viewer does at startup. A missing localization file only costs the
    /// localized labels; a dataset that cannot be loaded is an error here
    /// because there is nothing to render.
    pub fn execute(&self, language: &str) -> anyhow::Result<Session> {
        let mut session = Session::new(self.config.layout.clone(), language);

        self.switch_language(&mut session, language);

        let ticket = session.request_dataset();
        let data = read_resource(&self.config.data);
        if session.complete_dataset(&ticket, data) != LoadOutcome::Applied {
            bail!(
                "no scene could be built from {}",
                self.config.data.display()
            );
        }
        Ok(session)
    }

    /// Switches an existing session to another language from disk.
    pub fn switch_language(&self, session: &mut Session, language: &str) -> LoadOutcome {
        let ticket = session.request_language(language);
        let localization = read_resource(&self.config.localization_path(language));
        session.complete_language(&ticket, localization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_dataset, GeneratorConfig};
    use crate::generator::template::localization_template;
    use std::path::PathBuf;

    fn workspace(devices: usize) -> (tempfile::TempDir, ViewerConfig) {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.json");
        let i18n_dir = dir.path().join("i18n");
        fs::create_dir_all(&i18n_dir).unwrap();

        let dataset = build_dataset(&GeneratorConfig {
            devices,
            ..Default::default()
        })
        .unwrap();
        fs::write(&data, serde_json::to_string(&dataset).unwrap()).unwrap();
        fs::write(
            i18n_dir.join("en.json"),
            localization_template("en").to_string(),
        )
        .unwrap();

        let config = ViewerConfig {
            data,
            i18n_dir,
            ..Default::default()
        };
        (dir, config)
    }

    #[test]
    fn runner_builds_a_scene() {
        let (_dir, config) = workspace(12);
        let runner = Runner::new(config);
        let session = runner.execute("en").unwrap();
        let view = session.view().unwrap();
        assert_eq!(view.scene().map.len(), 12);
        assert!(view.scene().spectrum.bands.len() >= 12);
        assert_eq!(session.language(), "en");
    }

    #[test]
    fn missing_localization_falls_back_to_builtin_text() {
        let (_dir, config) = workspace(3);
        let runner = Runner::new(config);
        let session = runner.execute("ja").unwrap();
        // the requested language stays active; only its labels are missing
        assert_eq!(session.language(), "ja");
        assert_eq!(
            session.view().unwrap().scene().spectrum.top_caption.text,
            "Freely傾向"
        );
        assert_eq!(session.metrics().load_failures, 1);
    }

    #[test]
    fn missing_dataset_is_an_error() {
        let config = ViewerConfig {
            data: PathBuf::from("/nonexistent/data.json"),
            ..Default::default()
        };
        assert!(Runner::new(config).execute("en").is_err());
    }

    #[test]
    fn switching_language_relabels_the_scene() {
        let (_dir, config) = workspace(3);
        let runner = Runner::new(config);
        let mut session = runner.execute("zh-TW").unwrap();
        assert_eq!(runner.switch_language(&mut session, "en"), LoadOutcome::Applied);
        assert_eq!(
            session.view().unwrap().scene().spectrum.top_caption.text,
            "Freely-leaning"
        );
    }
}
