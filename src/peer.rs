// The embedded native peer: shape tracking, capture mode and focus routing.
//
// An `EmbeddedPeer` owns its host and lives on the UI thread. Everything in
// here assumes it runs there; off-thread callers go through
// `crate::handle::PeerHandle`.

use crate::capture::{self, CaptureOverlay, CaptureState};
use crate::config::EmbedOptions;
use crate::error::Error;
use crate::mask;
use crate::platform::{AncestorKind, ComponentId, Host, Placement, WindowKind};
use crate::region::Region;
use crate::surface::{EmbeddingSurface, PeerListeners};

pub struct EmbeddedPeer<H: Host> {
    host: H,
    proxy: ComponentId,
    native: ComponentId,
    options: EmbedOptions,
    surface: Option<EmbeddingSurface>,
    /// Last applied visible region, in the surface's coordinates.
    visible: Region,
    capture: CaptureState,
}

impl<H: Host> EmbeddedPeer<H> {
    pub fn new(host: H, proxy: ComponentId, native: ComponentId, options: EmbedOptions) -> Self {
        let visible = Region::full(host.bounds(proxy).size());
        Self { host, proxy, native, options, surface: None, visible, capture: CaptureState::Idle }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn proxy(&self) -> ComponentId {
        self.proxy
    }

    pub fn options(&self) -> EmbedOptions {
        self.options
    }

    pub fn surface(&self) -> Option<&EmbeddingSurface> {
        self.surface.as_ref()
    }

    pub fn surface_id(&self) -> Option<ComponentId> {
        self.surface.as_ref().map(EmbeddingSurface::id)
    }

    pub fn visible_region(&self) -> &Region {
        &self.visible
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_capturing()
    }

    pub fn overlay(&self) -> Option<&CaptureOverlay> {
        self.capture.overlay()
    }

    /// Create the embedding surface around the native peer, once.
    pub fn realize(&mut self) -> ComponentId {
        match &self.surface {
            Some(surface) => surface.id(),
            None => {
                let surface = EmbeddingSurface::create(&mut self.host, self.native);
                let id = surface.id();
                self.surface = Some(surface);
                id
            }
        }
    }

    /// Insert the surface into the tree according to the filiation.
    pub fn add_peer(&mut self) -> Result<(), Error> {
        if !self.host.supports_masking() {
            return Err(Error::MaskingUnsupported);
        }
        match self.host.window_kind(self.proxy) {
            Some(WindowKind::RootPane) => {}
            Some(WindowKind::Plain) => {
                return Err(Error::Configuration("the window ancestor must be a root pane container".into()));
            }
            None => return Err(Error::Configuration("the proxy is not inside a window".into())),
        }
        let surface = self.realize();
        let placement = if self.options.is_proxied() { Placement::LayeredPaneBottom } else { Placement::InProxy };
        self.host.place_surface(surface, self.proxy, placement);
        Ok(())
    }

    pub fn connect(&mut self, listeners: PeerListeners) {
        if let Some(surface) = self.surface.as_mut() {
            surface.connect(&mut self.host, self.proxy, listeners);
        }
    }

    pub fn disconnect(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            surface.disconnect(&mut self.host);
        }
    }

    /// Realize, place, wire listeners and bring bounds and shape up to date.
    pub fn attach(&mut self, listeners: PeerListeners) -> Result<(), Error> {
        self.add_peer()?;
        self.connect(listeners);
        self.reconcile();
        Ok(())
    }

    /// Tear down: end any capture, detach listeners, remove the surface. Idempotent.
    ///
    /// The visible region goes back to the unmasked full rectangle, which is
    /// what a freshly realized surface shows.
    pub fn destroy(&mut self) {
        self.stop_capture();
        if let Some(surface) = self.surface.take() {
            surface.destroy(&mut self.host);
            self.visible = Region::full(self.host.bounds(self.proxy).size());
        }
    }

    /// One coalesced geometry update: follow the proxy, then recompute the shape.
    pub fn reconcile(&mut self) {
        self.adjust_peer_bounds();
        self.adjust_peer_shape();
    }

    /// Keep a layered-pane surface on top of its proxy. Direct surfaces are laid out by the proxy.
    pub fn adjust_peer_bounds(&mut self) {
        if !self.options.is_proxied() {
            return;
        }
        let Some(surface) = self.surface_id() else { return };
        let Some(parent) = self.host.parent(surface) else { return };
        let on_screen = self.host.location_on_screen(self.proxy);
        let target = self.host.bounds(self.proxy).with_origin(self.host.from_screen(parent, on_screen));
        if self.host.bounds(surface) != target {
            self.host.set_bounds(surface, target);
        }
    }

    /// Occlusion-aware visible area of the surface, in its own coordinates.
    pub fn compute_peer_shape(&self) -> Region {
        let Some(surface) = self.surface_id() else { return Region::empty() };
        let inputs = self.host.shape_inputs(surface, self.proxy);
        let (dx, dy) = (-inputs.bounds.x, -inputs.bounds.y);
        let mut region = Region::full(inputs.bounds.size());
        for clip in &inputs.ancestor_clips {
            region = region.intersect(&clip.translate(dx, dy));
        }
        let occluders = Region::from_rects(inputs.occluders.iter().map(|r| r.translate(dx, dy)));
        region.subtract(&occluders)
    }

    /// Recompute the shape and push it downstream if it changed. Returns whether anything was applied.
    pub fn adjust_peer_shape(&mut self) -> bool {
        let Some(surface) = self.surface_id() else { return false };
        let region = self.compute_peer_shape();
        if region == self.visible {
            // The surface can still move under a live overlay without its shape changing.
            return match &mut self.capture {
                CaptureState::Capturing { overlay: Some(overlay) } => {
                    capture::reposition(&mut self.host, surface, overlay, &self.visible)
                }
                _ => {
                    tracing::trace!("peer shape unchanged");
                    false
                }
            };
        }
        tracing::debug!(rects = region.len(), capturing = self.capture.is_capturing(), "peer shape changed");
        self.visible = region;
        match &mut self.capture {
            CaptureState::Idle => mask::apply(&mut self.host, surface, &self.visible),
            CaptureState::Capturing { overlay } => {
                if !self.visible.is_empty() && !self.host.is_visible(surface) {
                    self.host.set_visible(surface, true);
                }
                if let Some(overlay) = overlay {
                    capture::reposition(&mut self.host, surface, overlay, &self.visible);
                }
            }
        }
        true
    }

    /// Switch to the screenshot overlay strategy.
    ///
    /// No-op when capture is unsupported, the surface does not exist or capture
    /// is already running. A failed snapshot leaves the peer idle.
    pub fn start_capture(&mut self) -> Result<(), Error> {
        if !self.options.visibility_constrained || self.capture.is_capturing() {
            return Ok(());
        }
        let Some(surface) = self.surface_id() else { return Ok(()) };
        match capture::begin(&mut self.host, surface, &self.visible) {
            Ok(overlay) => {
                tracing::debug!(overlay = overlay.is_some(), "capture started");
                self.capture = CaptureState::Capturing { overlay };
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "screen capture failed, staying idle");
                self.capture = CaptureState::Idle;
                Err(e.into())
            }
        }
    }

    /// Back to real masking with the latest region. No-op when idle.
    pub fn stop_capture(&mut self) {
        let CaptureState::Capturing { overlay } = std::mem::take(&mut self.capture) else { return };
        if let Some(surface) = self.surface_id() {
            capture::end(&mut self.host, surface, &self.visible, overlay);
        } else if let Some(overlay) = overlay {
            self.host.remove_component(overlay.id);
        }
        tracing::debug!("capture stopped");
    }

    /// Toolkit focus on the proxy moves to the native peer.
    pub fn on_focus_gained(&mut self) {
        self.host.request_focus(self.native);
    }

    /// A press on the native peer activates the nearest internal frame without
    /// letting the window steal focus from it.
    pub fn on_primary_press(&mut self) {
        let ancestors = self.host.ancestors(self.proxy);
        let window = ancestors.iter().find(|(_, kind)| *kind == AncestorKind::Window).map(|(id, _)| *id);
        for (id, kind) in ancestors {
            match kind {
                AncestorKind::Window => break,
                AncestorKind::Container => continue,
                AncestorKind::InternalFrame => {
                    if let Some(window) = window {
                        let focusable = self.host.focusable_window_state(window);
                        self.host.set_focusable_window_state(window, false);
                        if self.host.select_internal_frame(id).is_err() {
                            tracing::debug!(frame = id.0, "internal frame selection vetoed");
                        }
                        self.host.set_focusable_window_state(window, focusable);
                    }
                    break;
                }
            }
        }
    }
}
