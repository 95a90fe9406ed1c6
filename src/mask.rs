// Pushes a visible region onto a native surface through the platform mask primitive.

use crate::platform::{ComponentId, Masking};
use crate::region::Region;

/// Empty region hides the surface; anything else shows it with exactly that area visible.
pub fn apply<M: Masking + ?Sized>(host: &mut M, surface: ComponentId, region: &Region) {
    if region.is_empty() {
        host.set_visible(surface, false);
        return;
    }
    if !host.is_visible(surface) {
        host.set_visible(surface, true);
    }
    host.set_opaque_region(surface, Some(region));
}

/// Drop any mask so the whole surface shows.
pub fn clear<M: Masking + ?Sized>(host: &mut M, surface: ComponentId) {
    host.set_opaque_region(surface, None);
    if !host.is_visible(surface) {
        host.set_visible(surface, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rect;

    #[derive(Default)]
    struct Recorder {
        visible: bool,
        calls: Vec<Option<Region>>,
    }

    impl Masking for Recorder {
        fn supports_masking(&self) -> bool {
            true
        }
        fn set_opaque_region(&mut self, _: ComponentId, region: Option<&Region>) {
            self.calls.push(region.cloned());
        }
        fn set_visible(&mut self, _: ComponentId, visible: bool) {
            self.visible = visible;
        }
        fn is_visible(&self, _: ComponentId) -> bool {
            self.visible
        }
    }

    #[test]
    fn empty_region_hides_without_masking() {
        let mut rec = Recorder { visible: true, ..Default::default() };
        apply(&mut rec, ComponentId(1), &Region::empty());
        assert!(!rec.visible);
        assert!(rec.calls.is_empty());
    }

    #[test]
    fn region_shows_and_masks() {
        let mut rec = Recorder::default();
        let region = Region::from_rects([Rect::new(0, 0, 10, 10)]);
        apply(&mut rec, ComponentId(1), &region);
        assert!(rec.visible);
        assert_eq!(rec.calls, vec![Some(region)]);

        clear(&mut rec, ComponentId(1));
        assert_eq!(rec.calls.last(), Some(&None));
    }
}
