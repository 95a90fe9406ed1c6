// Capabilities the engine consumes from the toolkit and the platform.
//
// The engine never looks at a concrete toolkit. Everything it needs is one of
// these traits, and a host implements all of them (see `Host`).

use crate::error::CaptureError;
use crate::region::Region;
use crate::types::{FrameBuffer, Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Geometry notification for a listened component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyEvent {
    /// Some ancestor moved. `changed_is_window` is set when the ancestor is the top-level window.
    AncestorMoved { changed_is_window: bool },
    AncestorResized,
    /// The listened component itself moved within its parent.
    Moved,
    /// The listened component itself was resized.
    Resized,
}

/// Inputs of the occlusion computation, all in the embedding surface's parent coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShapeInputs {
    pub bounds: Rect,
    /// Visible bounds of every ancestor.
    pub ancestor_clips: Vec<Rect>,
    /// Opaque, visible components layered above the surface.
    pub occluders: Vec<Rect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// Top-level window with a root pane and a layered pane.
    RootPane,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncestorKind {
    Window,
    InternalFrame,
    Container,
}

/// Where an embedding surface is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// As the only child of the proxy, filling it.
    InProxy,
    /// In the window's layered pane, below every other layer.
    LayeredPaneBottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorIcon {
    #[default]
    Default,
    Move,
}

/// A frame selection was refused by one of its listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vetoed;

pub trait HierarchyListener: Send {
    fn on_hierarchy(&self, event: HierarchyEvent);
}

pub trait PointerListener: Send {
    fn on_primary_press(&self);
}

pub trait FocusListener: Send {
    fn on_focus_gained(&self);
}

/// Platform window-mask primitive.
pub trait Masking {
    fn supports_masking(&self) -> bool;

    /// `None` clears the mask (whole surface visible); otherwise exactly `region` stays visible.
    fn set_opaque_region(&mut self, surface: ComponentId, region: Option<&Region>);

    fn set_visible(&mut self, surface: ComponentId, visible: bool);

    fn is_visible(&self, surface: ComponentId) -> bool;
}

/// Platform screen grab.
pub trait ScreenCapture {
    fn capture_screen_region(&mut self, rect: Rect) -> Result<FrameBuffer, CaptureError>;
}

/// The toolkit component tree, as far as the engine needs it.
pub trait Hierarchy {
    /// New embedding surface whose sole child is `native`. Not yet placed anywhere.
    fn create_embedding_surface(&mut self, native: ComponentId) -> ComponentId;

    /// Kind of the top-level window containing `component`, if it is in one.
    fn window_kind(&self, component: ComponentId) -> Option<WindowKind>;

    fn place_surface(&mut self, surface: ComponentId, proxy: ComponentId, placement: Placement);

    /// Detach `component` from its parent, returning the former parent.
    fn remove_component(&mut self, component: ComponentId) -> Option<ComponentId>;

    /// Relayout and repaint `container`.
    fn revalidate(&mut self, container: ComponentId);

    fn parent(&self, component: ComponentId) -> Option<ComponentId>;

    /// Bounds in the parent's coordinates.
    fn bounds(&self, component: ComponentId) -> Rect;

    fn set_bounds(&mut self, component: ComponentId, bounds: Rect);

    /// Convert a point in `container`'s coordinates to screen coordinates.
    fn to_screen(&self, container: ComponentId, p: Point) -> Point;

    fn from_screen(&self, container: ComponentId, p: Point) -> Point;

    /// Screen bounds of the top-level window containing `component`.
    fn window_bounds(&self, component: ComponentId) -> Option<Rect>;

    fn shape_inputs(&self, surface: ComponentId, proxy: ComponentId) -> ShapeInputs;

    /// New non hit-testable drawable showing `image`, stacked right above `above`
    /// in the same parent. Starts hidden.
    fn insert_overlay(&mut self, above: ComponentId, bounds: Rect, image: FrameBuffer) -> ComponentId;

    fn set_cursor(&mut self, component: ComponentId, cursor: CursorIcon);

    fn add_hierarchy_listener(&mut self, component: ComponentId, listener: Box<dyn HierarchyListener>) -> ListenerId;

    fn add_pointer_listener(&mut self, component: ComponentId, listener: Box<dyn PointerListener>) -> ListenerId;

    fn add_focus_listener(&mut self, component: ComponentId, listener: Box<dyn FocusListener>) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId);

    /// Screen position of `component`'s origin.
    fn location_on_screen(&self, component: ComponentId) -> Point {
        let origin = self.bounds(component).origin();
        match self.parent(component) {
            Some(parent) => self.to_screen(parent, origin),
            None => origin,
        }
    }
}

/// Toolkit focus semantics.
pub trait FocusRouting {
    fn request_focus(&mut self, component: ComponentId);

    /// Ancestors of `component`, nearest first, up to and including the top-level window.
    fn ancestors(&self, component: ComponentId) -> Vec<(ComponentId, AncestorKind)>;

    fn focusable_window_state(&self, window: ComponentId) -> bool;

    fn set_focusable_window_state(&mut self, window: ComponentId, focusable: bool);

    fn select_internal_frame(&mut self, frame: ComponentId) -> Result<(), Vetoed>;

    /// Cursor of whatever component sits under the pointer in `window`.
    fn cursor_under_pointer(&self, window: ComponentId) -> Option<CursorIcon>;
}

/// Everything an embedding needs from its host. Hosts live on the UI thread.
pub trait Host: Hierarchy + Masking + ScreenCapture + FocusRouting + Send + 'static {}

impl<T> Host for T where T: Hierarchy + Masking + ScreenCapture + FocusRouting + Send + 'static {}
