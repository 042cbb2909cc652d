use crate::dataset::{Dataset, Device, DeviceId};
use crate::i18n::{Catalog, Locale};
use crate::layout::{MapRenderer, MapScene, SpectrumRenderer, SpectrumScene};
use crate::prelude::{EngineResult, LayoutConfig, RenderInput, RenderStage};

/// Both views for one dataset, catalog and language. Built in one go and
/// replaced wholesale on the next rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub spectrum: SpectrumScene,
    pub map: MapScene,
    dataset: Dataset,
    catalog: Catalog,
    locale: Locale,
}

impl Scene {
    pub fn build(
        dataset: &Dataset,
        catalog: &Catalog,
        locale: &Locale,
        layout: &LayoutConfig,
    ) -> EngineResult<Self> {
        let input = RenderInput {
            dataset,
            catalog,
            locale,
        };

        let mut spectrum_renderer = SpectrumRenderer::new();
        spectrum_renderer.initialize(layout)?;
        let spectrum = spectrum_renderer.render(&input)?;
        spectrum_renderer.cleanup();

        let mut map_renderer = MapRenderer::new();
        map_renderer.initialize(layout)?;
        let map = map_renderer.render(&input)?;
        map_renderer.cleanup();

        Ok(Self {
            spectrum,
            map,
            dataset: dataset.clone(),
            catalog: catalog.clone(),
            locale: locale.clone(),
        })
    }

    pub fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.dataset.device(id)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }
}
