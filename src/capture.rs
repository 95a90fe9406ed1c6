// Capture overlay: a frozen screenshot of whatever should sit above the
// native peer, stacked over it while real masking is suspended.
//
// The snapshot is taken once when capture starts and never refreshed. Only
// geometry changes move the overlay's own mask.

use crate::error::CaptureError;
use crate::mask;
use crate::platform::{AncestorKind, ComponentId, Host};
use crate::region::Region;
use crate::types::{FrameBuffer, Rect};

/// The synthetic drawable that fakes correct stacking while capturing.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOverlay {
    pub id: ComponentId,
    /// Where the overlay was inserted, in the surface parent's coordinates.
    pub bounds: Rect,
    pub snapshot: FrameBuffer,
    /// Overlay mask last applied, in the overlay's own coordinates. Empty while hidden.
    pub area: Region,
}

/// Which rendering strategy currently owns the native peer's shape.
#[derive(Debug, Default)]
pub enum CaptureState {
    /// Real-time masking.
    #[default]
    Idle,
    /// Native mask cleared; occlusion faked by the overlay (if anything needed covering).
    Capturing { overlay: Option<CaptureOverlay> },
}

impl CaptureState {
    pub fn is_capturing(&self) -> bool {
        matches!(self, CaptureState::Capturing { .. })
    }

    pub fn overlay(&self) -> Option<&CaptureOverlay> {
        match self {
            CaptureState::Capturing { overlay } => overlay.as_ref(),
            CaptureState::Idle => None,
        }
    }
}

/// Snapshot the occluded part of `surface` and build the overlay, then clear the native mask.
///
/// Returns `Ok(None)` when nothing is occluded (or the occlusion lies outside the window):
/// capture still proceeds, just without an overlay. On capture failure nothing was changed.
pub fn begin<H: Host>(host: &mut H, surface: ComponentId, visible: &Region) -> Result<Option<CaptureOverlay>, CaptureError> {
    let mut overlay = match host.parent(surface) {
        Some(parent) => snapshot_occlusion(host, surface, parent, visible)?,
        None => None,
    };
    if let Some(overlay) = overlay.as_mut() {
        reposition(host, surface, overlay, visible);
    }
    mask::clear(host, surface);
    Ok(overlay)
}

fn snapshot_occlusion<H: Host>(
    host: &mut H,
    surface: ComponentId,
    parent: ComponentId,
    visible: &Region,
) -> Result<Option<CaptureOverlay>, CaptureError> {
    let full = Region::full(host.bounds(surface).size());
    let Some(image_bounds) = full.subtract(visible).union_bounds() else {
        return Ok(None);
    };
    let origin = host.location_on_screen(surface);
    let on_screen = image_bounds.translate(origin.x, origin.y);
    let Some(window) = host.window_bounds(surface) else {
        return Ok(None);
    };
    let Some(grab) = on_screen.intersection(&window) else {
        return Ok(None);
    };

    let snapshot = host.capture_screen_region(grab)?;
    let bounds = grab.with_origin(host.from_screen(parent, grab.origin()));
    let id = host.insert_overlay(surface, bounds, snapshot.clone());

    let window_id = host
        .ancestors(surface)
        .into_iter()
        .find_map(|(id, kind)| (kind == AncestorKind::Window).then_some(id));
    if let Some(cursor) = window_id.and_then(|w| host.cursor_under_pointer(w)) {
        host.set_cursor(id, cursor);
    }

    tracing::debug!(?grab, ?bounds, "capture overlay created");
    Ok(Some(CaptureOverlay { id, bounds, snapshot, area: Region::empty() }))
}

/// Mask the overlay so it only covers where the native peer would wrongly show.
///
/// The surface may have moved on its own since the overlay was placed, so the
/// visible region is shifted by the current surface/overlay offset first.
/// Returns false when the overlay mask did not change.
pub fn reposition<H: Host>(host: &mut H, surface: ComponentId, overlay: &mut CaptureOverlay, visible: &Region) -> bool {
    let overlay_bounds = host.bounds(overlay.id);
    let offset = host.bounds(surface).origin() - overlay_bounds.origin();
    let native = visible.translate(offset.x, offset.y);
    let area = Region::full(overlay_bounds.size()).subtract(&native);
    if area == overlay.area {
        return false;
    }
    if area.is_empty() {
        host.set_visible(overlay.id, false);
    } else {
        host.set_opaque_region(overlay.id, Some(&area));
        if !host.is_visible(overlay.id) {
            host.set_visible(overlay.id, true);
        }
    }
    overlay.area = area;
    true
}

/// Restore real masking from `visible` and tear the overlay down.
pub fn end<H: Host>(host: &mut H, surface: ComponentId, visible: &Region, overlay: Option<CaptureOverlay>) {
    mask::apply(host, surface, visible);
    if let Some(overlay) = overlay {
        host.remove_component(overlay.id);
        tracing::debug!(id = overlay.id.0, "capture overlay removed");
    }
}
