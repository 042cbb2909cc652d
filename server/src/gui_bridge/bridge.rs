use crate::gui_bridge::model::SceneSummary;
use crate::workflow::runner::Runner;
use anyhow::Result;
use log::{error, info, warn};
use serde_json::json;
use spectracore::dataset::DeviceId;
use spectracore::interaction::ViewEvents;
use std::{
    fs,
    path::Path,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{
    http::StatusCode,
    reply::{WithHeader, WithStatus},
    Filter,
};

type Body = WithStatus<WithHeader<String>>;

fn respond(body: String, content_type: &'static str, status: StatusCode) -> Body {
    warp::reply::with_status(
        warp::reply::with_header(body, "content-type", content_type),
        status,
    )
}

fn json_error(message: String, status: StatusCode) -> Body {
    respond(
        json!({ "error": message }).to_string(),
        "application/json; charset=utf-8",
        status,
    )
}

fn json_file(path: &Path) -> Body {
    match fs::read_to_string(path) {
        Ok(body) => respond(body, "application/json; charset=utf-8", StatusCode::OK),
        Err(err) => {
            warn!("cannot serve {}: {}", path.display(), err);
            json_error(format!("{} unavailable", path.display()), StatusCode::NOT_FOUND)
        }
    }
}

/// Accepts `en`, `zh-TW` and the like; rejects anything that could escape
/// the localization directory.
fn language_code(segment: &str) -> Option<&str> {
    let code = segment.strip_suffix(".json").unwrap_or(segment);
    let valid = !code.is_empty()
        && code.len() <= 16
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    valid.then_some(code)
}

/// HTTP bridge that serves the raw resources the viewer fetches, plus scene
/// summaries and popups built on request.
pub struct HttpBridge {
    state: Arc<RwLock<SceneSummary>>,
}

impl HttpBridge {
    pub fn spawn(runner: Arc<Runner>) -> Self {
        let state = Arc::new(RwLock::new(SceneSummary::default()));
        let bind = runner.config().bind;
        let state_for_filter = state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());
        let runner_filter = warp::any().map(move || runner.clone());

        let data_route = warp::path!("data.json")
            .and(warp::get())
            .and(runner_filter.clone())
            .map(|runner: Arc<Runner>| json_file(&runner.config().data));

        let i18n_route = warp::path!("i18n" / String)
            .and(warp::get())
            .and(runner_filter.clone())
            .map(|segment: String, runner: Arc<Runner>| match language_code(&segment) {
                Some(code) => json_file(&runner.config().localization_path(code)),
                None => json_error(format!("bad language {segment}"), StatusCode::BAD_REQUEST),
            });

        let current_route = warp::path!("scene")
            .and(warp::get())
            .and(state_filter)
            .map(|state: Arc<RwLock<SceneSummary>>| {
                let summary = state.read().map(|guard| guard.clone()).unwrap_or_default();
                warp::reply::json(&summary)
            });

        let scene_route = warp::path!("scene" / String)
            .and(warp::get())
            .and(runner_filter.clone())
            .map(|segment: String, runner: Arc<Runner>| {
                let Some(code) = language_code(&segment) else {
                    return json_error(format!("bad language {segment}"), StatusCode::BAD_REQUEST);
                };
                match runner.execute(code) {
                    Ok(session) => respond(
                        json!(SceneSummary::from_session(&session)).to_string(),
                        "application/json; charset=utf-8",
                        StatusCode::OK,
                    ),
                    Err(err) => {
                        error!("scene build error: {err:#}");
                        json_error(err.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
                    }
                }
            });

        let popup_route = warp::path!("popup" / String / String / String)
            .and(warp::get())
            .and(runner_filter)
            .map(
                |segment: String, keychip: String, main: String, runner: Arc<Runner>| {
                    let Some(code) = language_code(&segment) else {
                        return json_error(
                            format!("bad language {segment}"),
                            StatusCode::BAD_REQUEST,
                        );
                    };
                    let id = DeviceId::from_parts(&keychip, &main);
                    let popup = runner.execute(code).ok().and_then(|mut session| {
                        session.view_mut().and_then(|view| view.on_click(&id))
                    });
                    match popup {
                        Some(popup) => respond(
                            popup.content.to_html(),
                            "text/html; charset=utf-8",
                            StatusCode::OK,
                        ),
                        None => json_error(format!("no device {id}"), StatusCode::NOT_FOUND),
                    }
                },
            );

        thread::spawn(move || {
            let routes = data_route
                .or(i18n_route)
                .or(current_route)
                .or(scene_route)
                .or(popup_route);
            match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime.block_on(async move {
                    info!("serving on http://{bind}");
                    warp::serve(routes).run(bind).await;
                }),
                Err(err) => error!("failed to build runtime for the HTTP bridge: {err}"),
            }
        });

        Self { state }
    }

    pub fn publish(&self, summary: &SceneSummary) -> Result<()> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| anyhow::anyhow!("scene summary lock poisoned"))?;
        *guard = summary.clone();
        info!(
            "published scene: {} bands, {} markers ({})",
            guard.bands.len(),
            guard.markers.len(),
            guard.language
        );
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        println!("[bridge] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> SceneSummary {
        self.state.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::ViewerConfig;
    use spectracore::LayoutConfig;
    use spectracore::Session;

    #[test]
    fn language_codes_are_restricted() {
        assert_eq!(language_code("en.json"), Some("en"));
        assert_eq!(language_code("zh-TW"), Some("zh-TW"));
        assert_eq!(language_code("..%2Fsecret"), None);
        assert_eq!(language_code("../x.json"), None);
        assert_eq!(language_code(".json"), None);
    }

    #[test]
    fn bridge_publishes_summaries() {
        let config = ViewerConfig {
            bind: std::net::SocketAddr::from(([127, 0, 0, 1], 0)),
            ..Default::default()
        };
        let bridge = HttpBridge::spawn(Arc::new(Runner::new(config)));
        let session = Session::new(LayoutConfig::default(), "en");
        let summary = SceneSummary::from_session(&session);
        bridge.publish(&summary).unwrap();
        assert_eq!(bridge.snapshot().language, "en");
        assert!(bridge.snapshot().bands.is_empty());
    }
}
