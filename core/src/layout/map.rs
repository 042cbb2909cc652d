use crate::dataset::DeviceId;
use crate::layout::collision::PositionResolver;
use crate::layout::style::MarkerStyle;
use crate::layout::surface::MapSurface;
use crate::math::{ColorScale, Rgb};
use crate::prelude::{
    EngineError, EngineResult, LatLng, LayoutConfig, Point, RenderInput, RenderStage,
};
use crate::telemetry::LogManager;
use serde::Serialize;
use std::collections::HashMap;

/// One circle marker per device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: DeviceId,
    pub device_index: usize,
    /// Collision-adjusted position.
    pub position: LatLng,
    pub original: LatLng,
    pub fill: Rgb,
    pub style: MarkerStyle,
}

/// The marker layer for one rebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapScene {
    markers: Vec<Marker>,
    #[serde(skip)]
    by_id: HashMap<DeviceId, usize>,
    /// Indices into `markers`, back to front.
    order: Vec<usize>,
}

impl MapScene {
    fn new(markers: Vec<Marker>) -> Self {
        // later records overwrite earlier ones with the same id
        let by_id = markers
            .iter()
            .enumerate()
            .map(|(idx, marker)| (marker.id.clone(), idx))
            .collect();
        let order = (0..markers.len()).collect();
        Self {
            markers,
            by_id,
            order,
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn markers_mut(&mut self) -> &mut [Marker] {
        &mut self.markers
    }

    pub fn marker(&self, id: &DeviceId) -> Option<&Marker> {
        self.by_id.get(id).map(|&idx| &self.markers[idx])
    }

    pub fn marker_mut(&mut self, id: &DeviceId) -> Option<&mut Marker> {
        let idx = *self.by_id.get(id)?;
        self.markers.get_mut(idx)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Markers in paint order, last on top.
    pub fn draw_order(&self) -> impl Iterator<Item = &Marker> + '_ {
        self.order.iter().map(move |&idx| &self.markers[idx])
    }

    /// Moves the marker for `id` to the top of the stack.
    pub fn bring_to_front(&mut self, id: &DeviceId) {
        if let Some(&idx) = self.by_id.get(id) {
            self.order.retain(|&other| other != idx);
            self.order.push(idx);
        }
    }

    /// Topmost marker whose current radius covers `point` on `surface`.
    pub fn marker_at(&self, surface: &dyn MapSurface, point: Point) -> Option<&Marker> {
        self.order
            .iter()
            .rev()
            .map(|&idx| &self.markers[idx])
            .find(|marker| surface.project(marker.position).distance(&point) <= marker.style.radius)
    }
}

/// Places one marker per device, resolving collisions in input order.
pub struct MapRenderer {
    resolver: PositionResolver,
    color: ColorScale,
    initialized: bool,
    logger: LogManager,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            resolver: PositionResolver::new(),
            color: ColorScale::new(),
            initialized: false,
            logger: LogManager::new("map"),
        }
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderStage for MapRenderer {
    type Output = MapScene;

    fn initialize(&mut self, _config: &LayoutConfig) -> EngineResult<()> {
        self.resolver.reset();
        self.initialized = true;
        Ok(())
    }

    fn render(&mut self, input: &RenderInput<'_>) -> EngineResult<MapScene> {
        if !self.initialized {
            return Err(EngineError::Internal("map renderer not initialized".into()));
        }
        self.resolver.reset();

        let markers = input
            .dataset
            .devices
            .iter()
            .map(|device| Marker {
                id: device.id.clone(),
                device_index: device.index,
                position: self.resolver.resolve(device.coordinates),
                original: device.coordinates,
                fill: self.color.apply(device.mean_midpoint()),
                style: MarkerStyle::BASELINE,
            })
            .collect::<Vec<_>>();

        let mut shifted = 0;
        for marker in markers.iter().filter(|marker| marker.position != marker.original) {
            shifted += 1;
            self.logger.detail(&format!(
                "{} nudged to {:.4},{:.4}",
                marker.id, marker.position.lat, marker.position.lng
            ));
        }
        self.logger.record(&format!(
            "{} markers, {} shifted",
            markers.len(),
            shifted
        ));

        Ok(MapScene::new(markers))
    }

    fn cleanup(&mut self) {
        self.resolver.reset();
        self.initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::i18n::{Catalog, Locale};
    use crate::layout::collision::LONGITUDE_OFFSET;
    use crate::layout::surface::WebMercatorView;
    use crate::math::color::UNKNOWN;

    fn render(dataset: &Dataset) -> MapScene {
        let mut renderer = MapRenderer::new();
        renderer.initialize(&LayoutConfig::default()).unwrap();
        let scene = renderer
            .render(&RenderInput {
                dataset,
                catalog: &Catalog::empty(),
                locale: &Locale::default(),
            })
            .unwrap();
        renderer.cleanup();
        scene
    }

    fn dataset() -> Dataset {
        Dataset::from_json_str(
            r#"{ "data": [
                { "ids": { "keychip": "K1", "main": "M1" }, "lat": 23.7, "lng": 121,
                  "ranges": [ { "min": 0, "max": 20 }, { "min": 60, "max": 80 } ] },
                { "ids": { "keychip": "K2", "main": "M2" }, "lat": 23.7, "lng": 121,
                  "ranges": [ { "min": 90, "max": 100 } ] },
                { "ids": { "keychip": "K3", "main": "M3" }, "lat": 25, "lng": 121.5,
                  "ranges": [] }
            ] }"#,
        )
        .unwrap()
    }

    #[test]
    fn one_marker_per_device_keyed_by_id() {
        let scene = render(&dataset());
        assert_eq!(scene.len(), 3);
        assert!(scene.marker(&DeviceId::from("K2/M2")).is_some());
        assert!(scene.marker(&DeviceId::from("nope")).is_none());
    }

    #[test]
    fn fill_uses_the_mean_of_midpoints() {
        let scene = render(&dataset());
        // midpoints 10 and 70
        assert_eq!(scene.markers()[0].fill, ColorScale::new().apply(40.0));
        assert_eq!(scene.markers()[2].fill, UNKNOWN);
    }

    #[test]
    fn co_located_devices_are_spread() {
        let scene = render(&dataset());
        let first = &scene.markers()[0];
        let second = &scene.markers()[1];
        assert_eq!(first.position, first.original);
        assert!((second.position.lng - second.original.lng - LONGITUDE_OFFSET).abs() < 1e-12);
    }

    #[test]
    fn each_render_starts_from_empty_placements() {
        let dataset = dataset();
        let mut renderer = MapRenderer::new();
        renderer.initialize(&LayoutConfig::default()).unwrap();
        let input = RenderInput {
            dataset: &dataset,
            catalog: &Catalog::empty(),
            locale: &Locale::default(),
        };
        let first = renderer.render(&input).unwrap();
        let second = renderer.render(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn bring_to_front_reorders_drawing() {
        let mut scene = render(&dataset());
        scene.bring_to_front(&DeviceId::from("K1/M1"));
        let order = scene
            .draw_order()
            .map(|marker| marker.id.as_str().to_string())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["K2/M2", "K3/M3", "K1/M1"]);
    }

    #[test]
    fn marker_at_hits_within_radius() {
        let scene = render(&dataset());
        let view = WebMercatorView::default();
        let marker = &scene.markers()[2];
        let center = view.project(marker.position);
        let hit = scene.marker_at(&view, Point::new(center.x + 5.0, center.y));
        assert_eq!(hit.map(|m| m.id.as_str()), Some("K3/M3"));
        assert!(scene
            .marker_at(&view, Point::new(center.x + 50.0, center.y))
            .is_none());
    }

    #[test]
    fn duplicate_ids_resolve_to_the_last_record() {
        let dataset = Dataset::from_json_str(
            r#"{ "data": [
                { "ids": { "keychip": "K", "main": "M" }, "lat": 1, "lng": 1, "ranges": [] },
                { "ids": { "keychip": "K", "main": "M" }, "lat": 2, "lng": 2, "ranges": [] }
            ] }"#,
        )
        .unwrap();
        let scene = render(&dataset);
        let marker = scene.marker(&DeviceId::from("K/M")).unwrap();
        assert_eq!(marker.device_index, 1);
    }
}
