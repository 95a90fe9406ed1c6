// The lightweight container that directly parents the native peer.
// It never takes part in hit-testing so siblings under or around it stay clickable.

use crate::platform::{ComponentId, FocusListener, Hierarchy, HierarchyListener, ListenerId, PointerListener};
use crate::types::Point;

/// Listeners wired when the surface is connected.
pub struct PeerListeners {
    /// Registered on the proxy: ancestor moves/resizes and the proxy's own resize.
    pub hierarchy: Box<dyn HierarchyListener>,
    /// Registered on the native peer: primary button presses.
    pub pointer: Box<dyn PointerListener>,
    /// Registered on the proxy: focus gained.
    pub focus: Box<dyn FocusListener>,
}

#[derive(Debug)]
pub struct EmbeddingSurface {
    id: ComponentId,
    native: ComponentId,
    listeners: Vec<ListenerId>,
}

impl EmbeddingSurface {
    /// Create the surface with `native` as its sole child.
    pub fn create<H: Hierarchy + ?Sized>(host: &mut H, native: ComponentId) -> Self {
        let id = host.create_embedding_surface(native);
        Self { id, native, listeners: Vec::new() }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Always false: input routes to whatever the toolkit has around it.
    pub fn contains_point(&self, _p: Point) -> bool {
        false
    }

    pub fn connect<H: Hierarchy + ?Sized>(&mut self, host: &mut H, proxy: ComponentId, listeners: PeerListeners) {
        self.disconnect(host);
        let PeerListeners { hierarchy, pointer, focus } = listeners;
        self.listeners.push(host.add_hierarchy_listener(proxy, hierarchy));
        self.listeners.push(host.add_pointer_listener(self.native, pointer));
        self.listeners.push(host.add_focus_listener(proxy, focus));
    }

    pub fn disconnect<H: Hierarchy + ?Sized>(&mut self, host: &mut H) {
        for id in self.listeners.drain(..) {
            host.remove_listener(id);
        }
    }

    /// Detach listeners, leave the parent and make the parent lay out and repaint.
    pub fn destroy<H: Hierarchy + ?Sized>(mut self, host: &mut H) {
        self.disconnect(host);
        if let Some(parent) = host.remove_component(self.id) {
            host.revalidate(parent);
        }
    }
}
