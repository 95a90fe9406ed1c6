// In-process reference host: a tiny retained component tree with a software
// compositor. It implements every capability the engine consumes, so the
// engine can run end to end in tests and in the demo window.
//
// Stacking follows the usual heavyweight/lightweight split: lightweight
// components paint in tree order, then heavyweight surfaces (embedding
// surfaces and capture overlays) paint on top of all of them, clipped only by
// their mask and their window. That is exactly the problem masks and capture
// overlays exist to hide.

use crate::draw::put_pixel;
use crate::error::CaptureError;
use crate::platform::{
    AncestorKind, ComponentId, CursorIcon, FocusListener, FocusRouting, Hierarchy, HierarchyEvent,
    HierarchyListener, ListenerId, Masking, Placement, PointerListener, ScreenCapture, ShapeInputs, Vetoed,
    WindowKind,
};
use crate::region::Region;
use crate::types::{FrameBuffer, Point, Rect, Size};
use std::collections::BTreeMap;

const BACKGROUND: u32 = 0x0020_2020;

#[derive(Debug, Clone, PartialEq)]
enum Kind {
    Window { root_pane: bool, focusable: bool },
    LayeredPane,
    Panel,
    InternalFrame { selected: bool, veto: bool },
    Proxy,
    Native,
    Embedding,
    Overlay { image: FrameBuffer },
}

impl Kind {
    fn is_heavyweight(&self) -> bool {
        matches!(self, Kind::Embedding | Kind::Overlay { .. })
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: Kind,
    parent: Option<ComponentId>,
    /// Index 0 is the topmost child.
    children: Vec<ComponentId>,
    bounds: Rect,
    visible: bool,
    opaque: bool,
    color: u32,
    mask: Option<Region>,
    cursor: CursorIcon,
}

impl Node {
    fn new(kind: Kind, bounds: Rect, color: u32, opaque: bool) -> Self {
        Self { kind, parent: None, children: Vec::new(), bounds, visible: true, opaque, color, mask: None, cursor: CursorIcon::Default }
    }
}

enum Listener {
    Hierarchy(Box<dyn HierarchyListener>),
    Pointer(Box<dyn PointerListener>),
    Focus(Box<dyn FocusListener>),
}

struct Registration {
    id: ListenerId,
    component: ComponentId,
    listener: Listener,
}

pub struct Scene {
    nodes: BTreeMap<ComponentId, Node>,
    next_id: u32,
    listeners: Vec<Registration>,
    next_listener: u64,
    screen: Size,
    pointer: Point,
    focused: Option<ComponentId>,
    masking: bool,
    capture_denied: Option<String>,
    phase: u32,
    mask_log: Vec<(ComponentId, Option<Region>)>,
    captures: Vec<Rect>,
    selections: Vec<(ComponentId, bool)>,
    revalidations: usize,
}

impl Scene {
    pub fn new(screen: Size) -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 1,
            listeners: Vec::new(),
            next_listener: 1,
            screen,
            pointer: Point::ORIGIN,
            focused: None,
            masking: true,
            capture_denied: None,
            phase: 0,
            mask_log: Vec::new(),
            captures: Vec::new(),
            selections: Vec::new(),
            revalidations: 0,
        }
    }

    /* ---------- building ---------- */

    fn insert(&mut self, parent: Option<ComponentId>, node: Node) -> ComponentId {
        let id = ComponentId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        if let Some(parent) = parent {
            self.attach_child(parent, id, 0);
        }
        id
    }

    fn attach_child(&mut self, parent: ComponentId, child: ComponentId, index: usize) {
        if let Some(p) = self.nodes.get_mut(&parent) {
            let index = index.min(p.children.len());
            p.children.insert(index, child);
        }
        if let Some(c) = self.nodes.get_mut(&child) {
            c.parent = Some(parent);
        }
    }

    /// Top-level window with a root pane; `bounds` are screen coordinates.
    /// Returns the window and its layered pane (which fills it).
    pub fn add_window(&mut self, bounds: Rect, color: u32) -> (ComponentId, ComponentId) {
        let window = self.insert(None, Node::new(Kind::Window { root_pane: true, focusable: true }, bounds, color, true));
        let layered = self.insert(Some(window), Node::new(Kind::LayeredPane, Rect::from_size(bounds.size()), 0, false));
        (window, layered)
    }

    /// Top-level window without a root pane; embedding into it is a configuration error.
    pub fn add_plain_window(&mut self, bounds: Rect, color: u32) -> ComponentId {
        self.insert(None, Node::new(Kind::Window { root_pane: false, focusable: true }, bounds, color, true))
    }

    /// Opaque lightweight panel, stacked above its existing siblings.
    pub fn add_panel(&mut self, parent: ComponentId, bounds: Rect, color: u32) -> ComponentId {
        self.insert(Some(parent), Node::new(Kind::Panel, bounds, color, true))
    }

    /// Transparent lightweight container.
    pub fn add_container(&mut self, parent: ComponentId, bounds: Rect) -> ComponentId {
        self.insert(Some(parent), Node::new(Kind::Panel, bounds, 0, false))
    }

    pub fn add_internal_frame(&mut self, parent: ComponentId, bounds: Rect, color: u32) -> ComponentId {
        self.insert(Some(parent), Node::new(Kind::InternalFrame { selected: false, veto: false }, bounds, color, true))
    }

    /// Lightweight stand-in for the native peer in the layout. Paints nothing.
    pub fn add_proxy(&mut self, parent: ComponentId, bounds: Rect) -> ComponentId {
        self.insert(Some(parent), Node::new(Kind::Proxy, bounds, 0, false))
    }

    /// Native control, not yet parented. Paints diagonal stripes of `color`.
    pub fn add_native(&mut self, color: u32) -> ComponentId {
        self.insert(None, Node::new(Kind::Native, Rect::default(), color, true))
    }

    /// Move or resize a component and send the matching notifications.
    pub fn move_to(&mut self, component: ComponentId, bounds: Rect) {
        self.set_bounds(component, bounds);
    }

    pub fn move_by(&mut self, component: ComponentId, dx: i32, dy: i32) {
        let b = self.bounds(component);
        self.set_bounds(component, b.translate(dx, dy));
    }

    pub fn set_pointer(&mut self, p: Point) {
        self.pointer = p;
    }

    pub fn set_component_cursor(&mut self, component: ComponentId, cursor: CursorIcon) {
        if let Some(n) = self.nodes.get_mut(&component) {
            n.cursor = cursor;
        }
    }

    pub fn set_masking_supported(&mut self, supported: bool) {
        self.masking = supported;
    }

    /// Make every following screen capture fail with `reason` (`None` to allow again).
    pub fn deny_capture(&mut self, reason: Option<&str>) {
        self.capture_denied = reason.map(str::to_string);
    }

    pub fn set_frame_veto(&mut self, frame: ComponentId, veto: bool) {
        if let Some(Node { kind: Kind::InternalFrame { veto: v, .. }, .. }) = self.nodes.get_mut(&frame) {
            *v = veto;
        }
    }

    /// Advance the native controls' animation.
    pub fn tick(&mut self) {
        self.phase = self.phase.wrapping_add(1);
    }

    /* ---------- input ---------- */

    /// Deliver a primary press at a screen point. Heavyweight natives win over
    /// lightweights where their mask shows them. Returns the component hit.
    pub fn press_primary(&mut self, at: Point) -> Option<ComponentId> {
        self.pointer = at;
        if let Some(native) = self.native_at(at) {
            for r in self.listeners.iter().filter(|r| r.component == native) {
                if let Listener::Pointer(l) = &r.listener {
                    l.on_primary_press();
                }
            }
            return Some(native);
        }
        self.component_at(at)
    }

    /// Give toolkit focus to `component` and notify its focus listeners.
    pub fn focus(&mut self, component: ComponentId) {
        self.focused = Some(component);
        for r in self.listeners.iter().filter(|r| r.component == component) {
            if let Listener::Focus(l) = &r.listener {
                l.on_focus_gained();
            }
        }
    }

    fn native_at(&self, at: Point) -> Option<ComponentId> {
        let mut hit = None;
        for (id, clip) in self.heavyweights() {
            let node = &self.nodes[&id];
            if node.kind != Kind::Embedding || !self.paints_at(id, &clip, at) {
                continue;
            }
            hit = node.children.first().copied();
        }
        hit
    }

    /// Deepest visible lightweight at a screen point. Heavyweights are never hit.
    pub fn component_at(&self, at: Point) -> Option<ComponentId> {
        let roots: Vec<ComponentId> = self.nodes.iter().filter(|(_, n)| n.parent.is_none() && n.kind != Kind::Native).map(|(id, _)| *id).collect();
        roots.into_iter().rev().find_map(|root| self.hit(root, Point::ORIGIN, at))
    }

    fn hit(&self, id: ComponentId, origin: Point, at: Point) -> Option<ComponentId> {
        let node = self.nodes.get(&id)?;
        if !node.visible || node.kind.is_heavyweight() {
            return None;
        }
        let rect = node.bounds.translate(origin.x, origin.y);
        if !rect.contains(at) {
            return None;
        }
        node.children.iter().find_map(|c| self.hit(*c, rect.origin(), at)).or(Some(id))
    }

    /* ---------- inspection ---------- */

    pub fn mask_of(&self, component: ComponentId) -> Option<&Region> {
        self.nodes.get(&component).and_then(|n| n.mask.as_ref())
    }

    pub fn is_shown(&self, component: ComponentId) -> bool {
        self.nodes.get(&component).is_some_and(|n| n.visible)
    }

    pub fn exists(&self, component: ComponentId) -> bool {
        self.nodes.contains_key(&component)
    }

    pub fn children(&self, component: ComponentId) -> Vec<ComponentId> {
        self.nodes.get(&component).map(|n| n.children.clone()).unwrap_or_default()
    }

    pub fn overlays(&self) -> Vec<ComponentId> {
        self.nodes.iter().filter(|(_, n)| matches!(n.kind, Kind::Overlay { .. })).map(|(id, _)| *id).collect()
    }

    pub fn overlay_image(&self, overlay: ComponentId) -> Option<&FrameBuffer> {
        match self.nodes.get(&overlay).map(|n| &n.kind) {
            Some(Kind::Overlay { image }) => Some(image),
            _ => None,
        }
    }

    pub fn cursor_of(&self, component: ComponentId) -> CursorIcon {
        self.nodes.get(&component).map(|n| n.cursor).unwrap_or_default()
    }

    /// Every `set_opaque_region` call so far, in order.
    pub fn mask_log(&self) -> &[(ComponentId, Option<Region>)] {
        &self.mask_log
    }

    pub fn mask_updates(&self, component: ComponentId) -> usize {
        self.mask_log.iter().filter(|(id, _)| *id == component).count()
    }

    /// Screen rectangles captured so far.
    pub fn captures(&self) -> &[Rect] {
        &self.captures
    }

    /// Internal-frame selections with the window's focusable state at that moment.
    pub fn selections(&self) -> &[(ComponentId, bool)] {
        &self.selections
    }

    pub fn is_frame_selected(&self, frame: ComponentId) -> bool {
        matches!(self.nodes.get(&frame).map(|n| &n.kind), Some(Kind::InternalFrame { selected: true, .. }))
    }

    pub fn focused(&self) -> Option<ComponentId> {
        self.focused
    }

    pub fn revalidations(&self) -> usize {
        self.revalidations
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /* ---------- geometry helpers ---------- */

    fn chain(&self, component: ComponentId) -> Vec<ComponentId> {
        let mut out = Vec::new();
        let mut cur = self.nodes.get(&component).and_then(|n| n.parent);
        while let Some(id) = cur {
            out.push(id);
            cur = self.nodes.get(&id).and_then(|n| n.parent);
        }
        out
    }

    fn root(&self, component: ComponentId) -> ComponentId {
        self.chain(component).last().copied().unwrap_or(component)
    }

    fn is_descendant(&self, component: ComponentId, ancestor: ComponentId) -> bool {
        self.chain(component).contains(&ancestor)
    }

    fn screen_rect(&self, component: ComponentId) -> Rect {
        self.bounds(component).with_origin(self.location_on_screen(component))
    }

    fn layered_pane(&self, window: ComponentId) -> Option<ComponentId> {
        let node = self.nodes.get(&window)?;
        node.children.iter().copied().find(|c| self.nodes.get(c).is_some_and(|n| n.kind == Kind::LayeredPane))
    }

    fn notify_bounds(&self, changed: ComponentId, moved: bool, resized: bool) {
        let changed_is_window = matches!(self.nodes.get(&changed).map(|n| &n.kind), Some(Kind::Window { .. }));
        for r in &self.listeners {
            let Listener::Hierarchy(l) = &r.listener else { continue };
            if r.component == changed {
                if moved {
                    l.on_hierarchy(HierarchyEvent::Moved);
                }
                if resized {
                    l.on_hierarchy(HierarchyEvent::Resized);
                }
            } else if self.is_descendant(r.component, changed) {
                if moved {
                    l.on_hierarchy(HierarchyEvent::AncestorMoved { changed_is_window });
                }
                if resized {
                    l.on_hierarchy(HierarchyEvent::AncestorResized);
                }
            }
        }
    }

    /* ---------- compositing ---------- */

    /// Composite the whole screen as the user would see it.
    pub fn render(&self) -> FrameBuffer {
        let mut fb = FrameBuffer::new(self.screen.width.max(0) as usize, self.screen.height.max(0) as usize, BACKGROUND);
        let screen = Rect::from_size(self.screen);
        for (id, node) in &self.nodes {
            if node.parent.is_none() && matches!(node.kind, Kind::Window { .. }) {
                self.paint_lightweight(&mut fb, *id, Point::ORIGIN, screen);
            }
        }
        for (id, clip) in self.heavyweights() {
            self.paint_heavyweight(&mut fb, id, &clip);
        }
        fb
    }

    fn paint_lightweight(&self, fb: &mut FrameBuffer, id: ComponentId, origin: Point, clip: Rect) {
        let node = &self.nodes[&id];
        if !node.visible || node.kind.is_heavyweight() || node.kind == Kind::Native {
            return;
        }
        let rect = node.bounds.translate(origin.x, origin.y);
        let Some(clip) = rect.intersection(&clip) else { return };
        if node.opaque {
            fill_rect(fb, &clip, node.color);
        }
        for child in node.children.iter().rev() {
            self.paint_lightweight(fb, *child, rect.origin(), clip);
        }
    }

    /// Heavyweights bottom to top, each with its window as the only clip.
    fn heavyweights(&self) -> Vec<(ComponentId, Rect)> {
        let mut out = Vec::new();
        for (id, node) in &self.nodes {
            if node.parent.is_none() && matches!(node.kind, Kind::Window { .. }) {
                self.collect_heavyweights(*id, node.bounds, &mut out);
            }
        }
        out
    }

    fn collect_heavyweights(&self, id: ComponentId, window: Rect, out: &mut Vec<(ComponentId, Rect)>) {
        let node = &self.nodes[&id];
        if !node.visible {
            return;
        }
        if node.kind.is_heavyweight() {
            out.push((id, window));
            return;
        }
        for child in node.children.iter().rev() {
            self.collect_heavyweights(*child, window, out);
        }
    }

    fn paints_at(&self, id: ComponentId, clip: &Rect, at: Point) -> bool {
        let rect = self.screen_rect(id);
        if !rect.contains(at) || !clip.contains(at) {
            return false;
        }
        let local = at - rect.origin();
        self.nodes[&id].mask.as_ref().is_none_or(|m| m.contains(local))
    }

    fn paint_heavyweight(&self, fb: &mut FrameBuffer, id: ComponentId, clip: &Rect) {
        let node = &self.nodes[&id];
        let rect = self.screen_rect(id);
        let Some(area) = rect.intersection(clip) else { return };
        let native = node.children.first().and_then(|c| self.nodes.get(c)).map(|n| n.color);
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                let local = Point::new(x, y) - rect.origin();
                if node.mask.as_ref().is_some_and(|m| !m.contains(local)) {
                    continue;
                }
                let color = match (&node.kind, native) {
                    (Kind::Overlay { image }, _) => {
                        let (ix, iy) = (local.x as usize, local.y as usize);
                        if ix >= image.width || iy >= image.height {
                            continue;
                        }
                        image.pixels[iy * image.width + ix]
                    }
                    (_, Some(color)) => stripe(color, x, y, self.phase),
                    (_, None) => continue,
                };
                put_pixel(fb, x, y, color);
            }
        }
    }
}

fn stripe(color: u32, x: i32, y: i32, phase: u32) -> u32 {
    if ((x + y + phase as i32).rem_euclid(16)) < 8 { color } else { (color >> 1) & 0x007F_7F7F }
}

fn fill_rect(fb: &mut FrameBuffer, r: &Rect, color: u32) {
    for y in r.y..r.bottom() {
        for x in r.x..r.right() {
            put_pixel(fb, x, y, color);
        }
    }
}

impl Masking for Scene {
    fn supports_masking(&self) -> bool {
        self.masking
    }

    fn set_opaque_region(&mut self, surface: ComponentId, region: Option<&Region>) {
        let region = region.filter(|r| !r.is_empty()).cloned();
        self.mask_log.push((surface, region.clone()));
        if let Some(n) = self.nodes.get_mut(&surface) {
            n.mask = region;
        }
    }

    fn set_visible(&mut self, surface: ComponentId, visible: bool) {
        if let Some(n) = self.nodes.get_mut(&surface) {
            n.visible = visible;
        }
    }

    fn is_visible(&self, surface: ComponentId) -> bool {
        self.is_shown(surface)
    }
}

impl ScreenCapture for Scene {
    fn capture_screen_region(&mut self, rect: Rect) -> Result<FrameBuffer, CaptureError> {
        if let Some(reason) = &self.capture_denied {
            return Err(CaptureError::Denied(reason.clone()));
        }
        let image = self.render().crop(rect).ok_or(CaptureError::InvalidBounds(rect))?;
        self.captures.push(rect);
        Ok(image)
    }
}

impl Hierarchy for Scene {
    fn create_embedding_surface(&mut self, native: ComponentId) -> ComponentId {
        let surface = self.insert(None, Node::new(Kind::Embedding, Rect::default(), 0, true));
        self.attach_child(surface, native, 0);
        surface
    }

    fn window_kind(&self, component: ComponentId) -> Option<WindowKind> {
        match self.nodes.get(&self.root(component)).map(|n| &n.kind) {
            Some(Kind::Window { root_pane: true, .. }) => Some(WindowKind::RootPane),
            Some(Kind::Window { root_pane: false, .. }) => Some(WindowKind::Plain),
            _ => None,
        }
    }

    fn place_surface(&mut self, surface: ComponentId, proxy: ComponentId, placement: Placement) {
        match placement {
            Placement::InProxy => {
                let size = self.bounds(proxy).size();
                self.attach_child(proxy, surface, 0);
                if let Some(n) = self.nodes.get_mut(&surface) {
                    n.bounds = Rect::from_size(size);
                }
            }
            Placement::LayeredPaneBottom => {
                let Some(layered) = self.layered_pane(self.root(proxy)) else { return };
                let at = self.from_screen(layered, self.location_on_screen(proxy));
                let bounds = self.bounds(proxy).with_origin(at);
                self.attach_child(layered, surface, usize::MAX);
                if let Some(n) = self.nodes.get_mut(&surface) {
                    n.bounds = bounds;
                }
            }
        }
    }

    fn remove_component(&mut self, component: ComponentId) -> Option<ComponentId> {
        let parent = self.nodes.get(&component)?.parent;
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != component);
        }
        match self.nodes.get(&component).map(|n| &n.kind) {
            Some(Kind::Overlay { .. }) => {
                self.nodes.remove(&component);
            }
            Some(Kind::Embedding) => {
                // The native control outlives its surface.
                let children = self.nodes.remove(&component).map(|n| n.children).unwrap_or_default();
                for child in children {
                    if let Some(c) = self.nodes.get_mut(&child) {
                        c.parent = None;
                    }
                }
            }
            _ => {
                if let Some(n) = self.nodes.get_mut(&component) {
                    n.parent = None;
                }
            }
        }
        parent
    }

    fn revalidate(&mut self, _container: ComponentId) {
        self.revalidations += 1;
    }

    fn parent(&self, component: ComponentId) -> Option<ComponentId> {
        self.nodes.get(&component).and_then(|n| n.parent)
    }

    fn bounds(&self, component: ComponentId) -> Rect {
        self.nodes.get(&component).map(|n| n.bounds).unwrap_or_default()
    }

    fn set_bounds(&mut self, component: ComponentId, bounds: Rect) {
        let Some(node) = self.nodes.get_mut(&component) else { return };
        let old = std::mem::replace(&mut node.bounds, bounds);
        let moved = old.origin() != bounds.origin();
        let resized = old.size() != bounds.size();
        // A proxy lays out its embedding surface to fill it.
        if resized && node.kind == Kind::Proxy {
            let fill: Vec<ComponentId> = node.children.clone();
            for child in fill {
                if let Some(c) = self.nodes.get_mut(&child).filter(|c| c.kind == Kind::Embedding) {
                    c.bounds = Rect::from_size(bounds.size());
                }
            }
        }
        if moved || resized {
            self.notify_bounds(component, moved, resized);
        }
    }

    fn to_screen(&self, container: ComponentId, p: Point) -> Point {
        let mut out = p + self.bounds(container).origin();
        for ancestor in self.chain(container) {
            out = out + self.bounds(ancestor).origin();
        }
        out
    }

    fn from_screen(&self, container: ComponentId, p: Point) -> Point {
        p - self.to_screen(container, Point::ORIGIN)
    }

    fn window_bounds(&self, component: ComponentId) -> Option<Rect> {
        self.nodes
            .get(&self.root(component))
            .filter(|n| matches!(n.kind, Kind::Window { .. }))
            .map(|n| n.bounds)
    }

    fn shape_inputs(&self, surface: ComponentId, proxy: ComponentId) -> ShapeInputs {
        let Some(parent) = self.parent(surface) else {
            return ShapeInputs { bounds: self.bounds(surface), ..Default::default() };
        };
        let to_local = |r: Rect| r.with_origin(self.from_screen(parent, r.origin()));

        let mut ancestor_clips = vec![to_local(self.screen_rect(proxy))];
        let mut occluders = Vec::new();
        let mut child = proxy;
        for ancestor in self.chain(proxy) {
            ancestor_clips.push(to_local(self.screen_rect(ancestor)));
            let siblings = &self.nodes[&ancestor].children;
            for sibling in siblings.iter().take_while(|s| **s != child) {
                let n = &self.nodes[sibling];
                if n.visible && n.opaque && !n.kind.is_heavyweight() {
                    occluders.push(to_local(self.screen_rect(*sibling)));
                }
            }
            child = ancestor;
        }
        ShapeInputs { bounds: self.bounds(surface), ancestor_clips, occluders }
    }

    fn insert_overlay(&mut self, above: ComponentId, bounds: Rect, image: FrameBuffer) -> ComponentId {
        let mut node = Node::new(Kind::Overlay { image }, bounds, 0, true);
        node.visible = false;
        let overlay = self.insert(None, node);
        if let Some(parent) = self.parent(above) {
            let index = self.nodes[&parent].children.iter().position(|c| *c == above).unwrap_or(0);
            self.attach_child(parent, overlay, index);
        }
        overlay
    }

    fn set_cursor(&mut self, component: ComponentId, cursor: CursorIcon) {
        self.set_component_cursor(component, cursor);
    }

    fn add_hierarchy_listener(&mut self, component: ComponentId, listener: Box<dyn HierarchyListener>) -> ListenerId {
        self.register(component, Listener::Hierarchy(listener))
    }

    fn add_pointer_listener(&mut self, component: ComponentId, listener: Box<dyn PointerListener>) -> ListenerId {
        self.register(component, Listener::Pointer(listener))
    }

    fn add_focus_listener(&mut self, component: ComponentId, listener: Box<dyn FocusListener>) -> ListenerId {
        self.register(component, Listener::Focus(listener))
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|r| r.id != id);
    }
}

impl Scene {
    fn register(&mut self, component: ComponentId, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push(Registration { id, component, listener });
        id
    }
}

impl FocusRouting for Scene {
    fn request_focus(&mut self, component: ComponentId) {
        self.focused = Some(component);
    }

    fn ancestors(&self, component: ComponentId) -> Vec<(ComponentId, AncestorKind)> {
        self.chain(component)
            .into_iter()
            .map(|id| {
                let kind = match self.nodes[&id].kind {
                    Kind::Window { .. } => AncestorKind::Window,
                    Kind::InternalFrame { .. } => AncestorKind::InternalFrame,
                    _ => AncestorKind::Container,
                };
                (id, kind)
            })
            .collect()
    }

    fn focusable_window_state(&self, window: ComponentId) -> bool {
        matches!(self.nodes.get(&window).map(|n| &n.kind), Some(Kind::Window { focusable: true, .. }))
    }

    fn set_focusable_window_state(&mut self, window: ComponentId, focusable: bool) {
        if let Some(Node { kind: Kind::Window { focusable: f, .. }, .. }) = self.nodes.get_mut(&window) {
            *f = focusable;
        }
    }

    fn select_internal_frame(&mut self, frame: ComponentId) -> Result<(), Vetoed> {
        let window = self.root(frame);
        let focusable = self.focusable_window_state(window);
        self.selections.push((frame, focusable));
        match self.nodes.get_mut(&frame) {
            Some(Node { kind: Kind::InternalFrame { veto: true, .. }, .. }) => Err(Vetoed),
            Some(Node { kind: Kind::InternalFrame { selected, .. }, .. }) => {
                *selected = true;
                Ok(())
            }
            _ => Err(Vetoed),
        }
    }

    fn cursor_under_pointer(&self, window: ComponentId) -> Option<CursorIcon> {
        let hit = self.component_at(self.pointer)?;
        (self.root(hit) == window).then(|| self.cursor_of(hit))
    }
}
