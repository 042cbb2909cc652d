use crate::dataset::DeviceId;
use crate::interaction::popup::{Popup, PopupContent};
use crate::layout::{BandStyle, MarkerStyle};
use crate::scene::Scene;

/// Which device, if any, is emphasized across both views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HighlightState {
    #[default]
    Normal,
    Highlighted(DeviceId),
}

/// Pointer events the two views forward, keyed by device id.
pub trait ViewEvents {
    fn on_hover(&mut self, id: &DeviceId);
    fn on_leave(&mut self);
    fn on_click(&mut self, id: &DeviceId) -> Option<Popup>;
}

/// Owns a scene and moves every band and marker between the normal and
/// highlighted styles together.
#[derive(Debug, Clone)]
pub struct HighlightCoordinator {
    scene: Scene,
    state: HighlightState,
}

impl HighlightCoordinator {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            state: HighlightState::Normal,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn state(&self) -> &HighlightState {
        &self.state
    }

    pub fn highlighted(&self) -> Option<&DeviceId> {
        match &self.state {
            HighlightState::Normal => None,
            HighlightState::Highlighted(id) => Some(id),
        }
    }

    /// Emphasizes `id` everywhere and dims every other band.
    pub fn highlight(&mut self, id: &DeviceId) {
        self.state = HighlightState::Highlighted(id.clone());
        apply(&mut self.scene, &self.state);
    }

    /// Returns every element to its own baseline style.
    pub fn reset(&mut self) {
        self.state = HighlightState::Normal;
        apply(&mut self.scene, &self.state);
    }

    /// Popup for `id`, anchored at its marker.
    pub fn popup(&self, id: &DeviceId) -> Option<Popup> {
        let device = self.scene.device(id)?;
        let marker = self.scene.map.marker(id)?;
        Some(Popup {
            id: id.clone(),
            anchor: marker.position,
            content: PopupContent::build(device, self.scene.catalog(), self.scene.locale()),
        })
    }
}

impl ViewEvents for HighlightCoordinator {
    fn on_hover(&mut self, id: &DeviceId) {
        self.highlight(id);
    }

    fn on_leave(&mut self) {
        self.reset();
    }

    fn on_click(&mut self, id: &DeviceId) -> Option<Popup> {
        self.popup(id)
    }
}

/// Restyles every element of `scene` for `state`, from each element's own data.
fn apply(scene: &mut Scene, state: &HighlightState) {
    match state {
        HighlightState::Normal => {
            for band in &mut scene.spectrum.bands {
                band.style = band.baseline();
            }
            for marker in scene.map.markers_mut() {
                marker.style = MarkerStyle::BASELINE;
            }
        }
        HighlightState::Highlighted(id) => {
            for band in &mut scene.spectrum.bands {
                band.style = if &band.id == id {
                    BandStyle::highlighted(band.is_weak)
                } else {
                    BandStyle::dimmed(band.is_weak)
                };
            }
            for marker in scene.map.markers_mut() {
                marker.style = if &marker.id == id {
                    MarkerStyle::HIGHLIGHTED
                } else {
                    MarkerStyle::BASELINE
                };
            }
            scene.map.bring_to_front(id);
        }
    }
}
