use crate::prelude::LatLng;

/// Coordinates closer than this are treated as the same spot.
pub const PROXIMITY_THRESHOLD: f64 = 0.0003;
/// Longitude shift applied per collision, always eastward.
pub const LONGITUDE_OFFSET: f64 = 0.0005;

/// Greedy, order-dependent nudging of co-located coordinates.
///
/// The candidate is compared against every placed coordinate in placement
/// order and shifted east each time it lands within the threshold, so a stack
/// of devices at one point fans out in the same direction. Coordinates placed
/// earlier are never revisited, so dense clusters can still overlap.
#[derive(Debug, Default)]
pub struct PositionResolver {
    placed: Vec<LatLng>,
}

impl PositionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, candidate: LatLng) -> LatLng {
        let mut adjusted = candidate;
        for placed in &self.placed {
            if adjusted.distance(placed) < PROXIMITY_THRESHOLD {
                adjusted.lng += LONGITUDE_OFFSET;
            }
        }
        self.placed.push(adjusted);
        adjusted
    }

    pub fn placed(&self) -> &[LatLng] {
        &self.placed
    }

    /// Forgets every placement; called at the start of each full redraw.
    pub fn reset(&mut self) {
        self.placed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn distinct_points_are_untouched() {
        let mut resolver = PositionResolver::new();
        let a = resolver.resolve(LatLng::new(23.7, 121.0));
        let b = resolver.resolve(LatLng::new(24.0, 121.5));
        assert_eq!(a, LatLng::new(23.7, 121.0));
        assert_eq!(b, LatLng::new(24.0, 121.5));
    }

    #[test]
    fn second_device_shifts_by_one_offset() {
        let mut resolver = PositionResolver::new();
        let origin = LatLng::new(23.7, 121.0);
        let first = resolver.resolve(origin);
        let second = resolver.resolve(origin);
        assert_eq!(first, origin);
        assert!(close(second.lng - origin.lng, LONGITUDE_OFFSET));
        assert_eq!(second.lat, origin.lat);
    }

    #[test]
    fn offsets_accumulate_in_one_direction() {
        let mut resolver = PositionResolver::new();
        let origin = LatLng::new(25.0, 121.5);
        resolver.resolve(origin);
        let second = resolver.resolve(origin);
        let third = resolver.resolve(origin);
        assert!(close(second.lng - origin.lng, LONGITUDE_OFFSET));
        assert!(close(third.lng - origin.lng, 2.0 * LONGITUDE_OFFSET));
    }

    #[test]
    fn near_points_count_as_collisions() {
        let mut resolver = PositionResolver::new();
        resolver.resolve(LatLng::new(25.0, 121.5));
        let near = resolver.resolve(LatLng::new(25.0001, 121.5001));
        assert!(close(near.lng, 121.5001 + LONGITUDE_OFFSET));
        assert!(close(near.lat, 25.0001));
    }

    #[test]
    fn result_depends_on_input_order() {
        let a = LatLng::new(25.0, 121.5);
        let b = LatLng::new(25.0, 121.5 + LONGITUDE_OFFSET);

        let mut forward = PositionResolver::new();
        forward.resolve(a);
        forward.resolve(a);
        let b_after = forward.resolve(b);

        let mut fresh = PositionResolver::new();
        let b_alone = fresh.resolve(b);

        assert_ne!(b_after, b_alone);
    }

    #[test]
    fn reset_clears_placements() {
        let mut resolver = PositionResolver::new();
        let origin = LatLng::new(23.7, 121.0);
        resolver.resolve(origin);
        resolver.reset();
        assert!(resolver.placed().is_empty());
        assert_eq!(resolver.resolve(origin), origin);
    }
}
