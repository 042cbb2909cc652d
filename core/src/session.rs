//! Owns the resident dataset, catalog and scene, and decides which load
//! completions are allowed to replace them.
//!
//! Every request gets a ticket with a generation number. Only the newest
//! ticket of each resource kind may apply its result, so a slow response to
//! an older language switch can never overwrite a newer one.

use crate::dataset::{Dataset, Metadata};
use crate::i18n::{Catalog, CatalogKey, Locale, DEFAULT_LANGUAGE};
use crate::interaction::{HighlightCoordinator, Popup};
use crate::prelude::{EngineResult, LayoutConfig};
use crate::scene::Scene;
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Localization,
    Dataset,
}

/// Handle for one in-flight load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub kind: ResourceKind,
    pub generation: u64,
    pub language: String,
}

/// What happened to a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Applied and the scene was rebuilt (or no dataset is resident yet).
    Applied,
    /// A newer request of the same kind exists; the result was dropped.
    Stale,
    /// The load or its parsing failed; prior state was kept.
    Failed,
}

pub struct Session {
    layout: LayoutConfig,
    fallback_language: String,
    language: String,
    catalog: Catalog,
    dataset: Option<Dataset>,
    view: Option<HighlightCoordinator>,
    next_generation: u64,
    latest_localization: u64,
    latest_dataset: u64,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl Session {
    pub fn new(layout: LayoutConfig, language: impl Into<String>) -> Self {
        Self {
            layout,
            fallback_language: DEFAULT_LANGUAGE.to_string(),
            language: language.into(),
            catalog: Catalog::empty(),
            dataset: None,
            view: None,
            next_generation: 0,
            latest_localization: 0,
            latest_dataset: 0,
            logger: LogManager::new("session"),
            metrics: MetricsRecorder::new(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn locale(&self) -> Locale {
        Locale::new(self.language.clone(), self.fallback_language.clone())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.dataset.as_ref().map(|dataset| &dataset.metadata)
    }

    pub fn view(&self) -> Option<&HighlightCoordinator> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut HighlightCoordinator> {
        self.view.as_mut()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Rebuilds an open popup against the current scene, so it follows
    /// language switches and data reloads. `None` once the device is gone.
    pub fn refresh_popup(&self, popup: &Popup) -> Option<Popup> {
        self.view.as_ref().and_then(|view| view.popup(&popup.id))
    }

    fn issue(&mut self, kind: ResourceKind, language: String) -> LoadTicket {
        self.next_generation += 1;
        match kind {
            ResourceKind::Localization => self.latest_localization = self.next_generation,
            ResourceKind::Dataset => self.latest_dataset = self.next_generation,
        }
        LoadTicket {
            kind,
            generation: self.next_generation,
            language,
        }
    }

    /// Starts a language switch. The active language only changes once the
    /// matching catalog arrives.
    pub fn request_language(&mut self, language: impl Into<String>) -> LoadTicket {
        self.issue(ResourceKind::Localization, language.into())
    }

    pub fn request_dataset(&mut self) -> LoadTicket {
        let language = self.language.clone();
        self.issue(ResourceKind::Dataset, language)
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        let latest = match ticket.kind {
            ResourceKind::Localization => self.latest_localization,
            ResourceKind::Dataset => self.latest_dataset,
        };
        ticket.generation == latest
    }

    /// Applies a fetched localization resource (raw JSON text).
    pub fn complete_language<E: Display>(
        &mut self,
        ticket: &LoadTicket,
        result: Result<String, E>,
    ) -> LoadOutcome {
        if !self.is_current(ticket) {
            self.metrics.record_stale();
            self.logger.record(&format!(
                "dropping stale localization response for {}",
                ticket.language
            ));
            return LoadOutcome::Stale;
        }

        let catalog = match result
            .map_err(|err| err.to_string())
            .and_then(|body| Catalog::from_json_str(&body).map_err(|err| err.to_string()))
        {
            Ok(catalog) => catalog,
            Err(err) => {
                self.metrics.record_failure();
                self.logger.warn(&format!(
                    "Failed to load language file: {}: {}",
                    ticket.language, err
                ));
                return LoadOutcome::Failed;
            }
        };

        let previous = (
            std::mem::replace(&mut self.catalog, catalog),
            std::mem::replace(&mut self.language, ticket.language.clone()),
        );
        if self.dataset.is_some() {
            if let Err(err) = self.rebuild() {
                self.catalog = previous.0;
                self.language = previous.1;
                self.metrics.record_failure();
                self.logger.warn(&format!("rebuild after language switch failed: {err}"));
                return LoadOutcome::Failed;
            }
        }
        LoadOutcome::Applied
    }

    /// Applies a fetched dataset (raw JSON text).
    pub fn complete_dataset<E: Display>(
        &mut self,
        ticket: &LoadTicket,
        result: Result<String, E>,
    ) -> LoadOutcome {
        if !self.is_current(ticket) {
            self.metrics.record_stale();
            self.logger.record("dropping stale dataset response");
            return LoadOutcome::Stale;
        }

        let dataset = match result
            .map_err(|err| err.to_string())
            .and_then(|body| Dataset::from_json_str(&body).map_err(|err| err.to_string()))
        {
            Ok(dataset) => dataset,
            Err(err) => {
                self.metrics.record_failure();
                self.logger.warn(&format!(
                    "{} ({})",
                    self.catalog.text(CatalogKey::DataLoadError),
                    err
                ));
                return LoadOutcome::Failed;
            }
        };

        let previous = self.dataset.replace(dataset);
        if let Err(err) = self.rebuild() {
            self.dataset = previous;
            self.metrics.record_failure();
            self.logger.warn(&format!("rebuild after data load failed: {err}"));
            return LoadOutcome::Failed;
        }
        LoadOutcome::Applied
    }

    /// Tears down the current scene and builds a new one from scratch. The
    /// resident scene is only replaced once the new one is complete.
    pub fn rebuild(&mut self) -> EngineResult<()> {
        let Some(dataset) = self.dataset.as_ref() else {
            return Ok(());
        };
        let scene = Scene::build(dataset, &self.catalog, &self.locale(), &self.layout)?;
        self.view = Some(HighlightCoordinator::new(scene));
        self.metrics.record_rebuild();
        self.logger.record(&format!(
            "scene rebuilt for {} with {} devices",
            self.language,
            dataset.devices.len()
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DeviceId;
    use crate::interaction::{HighlightState, ViewEvents};

    const DATA: &str = r#"{
        "metadata": { "lastUpdated": "2024-05-01" },
        "range": [ { "from": 0, "to": 20, "label": "DYE", "labelKey": "dye" } ],
        "data": [ { "ids": { "keychip": "K", "main": "M" }, "lat": 23.7, "lng": 121,
                    "type": { "en": "Rumor", "ja": "噂" },
                    "ranges": [ { "min": 40, "max": 60 } ] } ]
    }"#;

    const EN: &str = r#"{ "rangeLabels": { "dye": "Dye-leaning" }, "popup": { "notTested": "Not tested" } }"#;
    const JA: &str = r#"{ "rangeLabels": { "dye": "DYE寄り" } }"#;

    fn loaded_session() -> Session {
        let mut session = Session::new(LayoutConfig::default(), "zh-TW");
        let ticket = session.request_dataset();
        assert_eq!(
            session.complete_dataset(&ticket, Ok::<_, String>(DATA.to_string())),
            LoadOutcome::Applied
        );
        session
    }

    fn range_label(session: &Session) -> String {
        session.view().unwrap().scene().spectrum.range_labels[0]
            .text
            .clone()
    }

    #[test]
    fn dataset_load_builds_a_scene() {
        let session = loaded_session();
        assert_eq!(range_label(&session), "DYE");
        assert_eq!(
            session.metadata().and_then(|m| m.last_updated.as_deref()),
            Some("2024-05-01")
        );
        assert_eq!(session.metrics().rebuilds, 1);
    }

    #[test]
    fn language_switch_rebuilds_with_new_labels() {
        let mut session = loaded_session();
        let ticket = session.request_language("en");
        assert_eq!(session.language(), "zh-TW");
        assert_eq!(
            session.complete_language(&ticket, Ok::<_, String>(EN.to_string())),
            LoadOutcome::Applied
        );
        assert_eq!(session.language(), "en");
        assert_eq!(range_label(&session), "Dye-leaning");

        let view = session.view_mut().unwrap();
        let popup = view.on_click(&DeviceId::from("K/M")).unwrap();
        assert_eq!(popup.content.type_text, "Rumor");
    }

    #[test]
    fn stale_language_responses_are_dropped() {
        let mut session = loaded_session();
        let first = session.request_language("en");
        let second = session.request_language("ja");

        assert_eq!(
            session.complete_language(&second, Ok::<_, String>(JA.to_string())),
            LoadOutcome::Applied
        );
        assert_eq!(
            session.complete_language(&first, Ok::<_, String>(EN.to_string())),
            LoadOutcome::Stale
        );
        assert_eq!(session.language(), "ja");
        assert_eq!(range_label(&session), "DYE寄り");
        assert_eq!(session.metrics().stale_responses, 1);
    }

    #[test]
    fn failed_loads_keep_prior_state() {
        let mut session = loaded_session();
        let ticket = session.request_language("en");
        assert_eq!(
            session.complete_language(&ticket, Err::<String, _>("404")),
            LoadOutcome::Failed
        );
        assert_eq!(session.language(), "zh-TW");

        let ticket = session.request_dataset();
        assert_eq!(
            session.complete_dataset(&ticket, Ok::<_, String>("{ broken".to_string())),
            LoadOutcome::Failed
        );
        assert_eq!(session.view().unwrap().scene().spectrum.bands.len(), 1);
        assert_eq!(session.metrics().load_failures, 2);
    }

    #[test]
    fn catalog_before_dataset_is_applied_without_a_scene() {
        let mut session = Session::new(LayoutConfig::default(), "zh-TW");
        let ticket = session.request_language("ja");
        assert_eq!(
            session.complete_language(&ticket, Ok::<_, String>(JA.to_string())),
            LoadOutcome::Applied
        );
        assert!(session.view().is_none());
        assert_eq!(session.metrics().rebuilds, 0);
    }

    #[test]
    fn rebuild_discards_highlight_state() {
        let mut session = loaded_session();
        session
            .view_mut()
            .unwrap()
            .on_hover(&DeviceId::from("K/M"));
        session.rebuild().unwrap();
        assert_eq!(session.view().unwrap().state(), &HighlightState::Normal);
    }

    #[test]
    fn open_popup_follows_a_language_switch() {
        let mut session = loaded_session();
        let popup = session
            .view_mut()
            .unwrap()
            .on_click(&DeviceId::from("K/M"))
            .unwrap();
        assert_eq!(popup.content.type_text, "未知");

        let ticket = session.request_language("ja");
        assert_eq!(
            session.complete_language(&ticket, Ok::<_, String>(JA.to_string())),
            LoadOutcome::Applied
        );
        let refreshed = session.refresh_popup(&popup).unwrap();
        assert_eq!(refreshed.content.type_text, "噂");
        assert_eq!(refreshed.anchor, popup.anchor);
    }

    #[test]
    fn popup_for_a_removed_device_closes() {
        let mut session = loaded_session();
        let popup = session
            .view_mut()
            .unwrap()
            .on_click(&DeviceId::from("K/M"))
            .unwrap();

        let ticket = session.request_dataset();
        assert_eq!(
            session.complete_dataset(&ticket, Ok::<_, String>(r#"{ "data": [] }"#.to_string())),
            LoadOutcome::Applied
        );
        assert!(session.refresh_popup(&popup).is_none());
    }

    #[test]
    fn layout_is_exposed() {
        let session = Session::new(LayoutConfig::default(), "en");
        assert_eq!(session.layout(), &LayoutConfig::default());
    }
}
