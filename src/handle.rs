// Thread-safe front door to an `EmbeddedPeer` living on the UI thread.

use crate::config::EmbedOptions;
use crate::error::Error;
use crate::peer::EmbeddedPeer;
use crate::platform::{ComponentId, FocusListener, HierarchyEvent, HierarchyListener, Host, PointerListener};
use crate::region::Region;
use crate::surface::PeerListeners;
use crate::ui_thread::{Dispatcher, UiThread};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Queues at most one shape recomputation at a time.
pub struct ShapeScheduler<H: Host> {
    dispatcher: Dispatcher<EmbeddedPeer<H>>,
    pending: Arc<AtomicBool>,
}

impl<H: Host> Clone for ShapeScheduler<H> {
    fn clone(&self) -> Self {
        Self { dispatcher: self.dispatcher.clone(), pending: self.pending.clone() }
    }
}

impl<H: Host> ShapeScheduler<H> {
    /// Request a recomputation. Returns false when one was already pending.
    pub fn schedule(&self) -> bool {
        if self.pending.swap(true, Ordering::AcqRel) {
            return false;
        }
        let pending = self.pending.clone();
        let queued = self.dispatcher.invoke_later(move |peer: &mut EmbeddedPeer<H>| {
            pending.store(false, Ordering::Release);
            peer.reconcile();
        });
        if let Err(e) = queued {
            self.pending.store(false, Ordering::Release);
            tracing::debug!(error = %e, "shape recompute dropped");
            return false;
        }
        true
    }
}

/// Registered on the proxy; turns geometry notifications into coalesced recomputes.
pub struct BoundsListener<H: Host> {
    scheduler: ShapeScheduler<H>,
}

impl<H: Host> HierarchyListener for BoundsListener<H> {
    fn on_hierarchy(&self, event: HierarchyEvent) {
        if let HierarchyEvent::AncestorMoved { changed_is_window: true } = event {
            return;
        }
        self.scheduler.schedule();
    }
}

/// Registered on the native peer; a primary press adjusts internal-frame focus.
pub struct PressListener<H: Host> {
    dispatcher: Dispatcher<EmbeddedPeer<H>>,
}

impl<H: Host> PointerListener for PressListener<H> {
    fn on_primary_press(&self) {
        if let Err(e) = self.dispatcher.invoke_later(|peer: &mut EmbeddedPeer<H>| peer.on_primary_press()) {
            tracing::debug!(error = %e, "primary press dropped");
        }
    }
}

/// Registered on the proxy; forwards toolkit focus to the native peer.
pub struct FocusForwarder<H: Host> {
    dispatcher: Dispatcher<EmbeddedPeer<H>>,
}

impl<H: Host> FocusListener for FocusForwarder<H> {
    fn on_focus_gained(&self) {
        if let Err(e) = self.dispatcher.invoke_later(|peer: &mut EmbeddedPeer<H>| peer.on_focus_gained()) {
            tracing::debug!(error = %e, "focus forward dropped");
        }
    }
}

/// `Send + Clone` handle. Every call that touches peer state hops onto the UI thread.
pub struct PeerHandle<H: Host> {
    dispatcher: Dispatcher<EmbeddedPeer<H>>,
    scheduler: ShapeScheduler<H>,
}

impl<H: Host> Clone for PeerHandle<H> {
    fn clone(&self) -> Self {
        Self { dispatcher: self.dispatcher.clone(), scheduler: self.scheduler.clone() }
    }
}

impl<H: Host> PeerHandle<H> {
    pub fn new(dispatcher: Dispatcher<EmbeddedPeer<H>>) -> Self {
        let scheduler = ShapeScheduler { dispatcher: dispatcher.clone(), pending: Arc::new(AtomicBool::new(false)) };
        Self { dispatcher, scheduler }
    }

    pub fn listeners(&self) -> PeerListeners {
        PeerListeners {
            hierarchy: Box::new(BoundsListener { scheduler: self.scheduler.clone() }),
            pointer: Box::new(PressListener { dispatcher: self.dispatcher.clone() }),
            focus: Box::new(FocusForwarder { dispatcher: self.dispatcher.clone() }),
        }
    }

    /// Realize and place the surface, wire the listeners, apply the first shape.
    pub fn attach(&self) -> Result<(), Error> {
        let listeners = self.listeners();
        self.dispatcher.invoke_and_wait(move |peer| peer.attach(listeners))?
    }

    pub fn destroy(&self) -> Result<(), Error> {
        self.dispatcher.invoke_and_wait(|peer| peer.destroy())
    }

    pub fn notify(&self, event: HierarchyEvent) {
        BoundsListener { scheduler: self.scheduler.clone() }.on_hierarchy(event);
    }

    pub fn schedule_shape_update(&self) -> bool {
        self.scheduler.schedule()
    }

    /// Blocks until the UI thread has entered capture mode (or refused to).
    pub fn start_capture(&self) -> Result<(), Error> {
        self.dispatcher.invoke_and_wait(|peer| peer.start_capture())?
    }

    pub fn stop_capture(&self) -> Result<(), Error> {
        self.dispatcher.invoke_and_wait(|peer| peer.stop_capture())
    }

    pub fn visible_region(&self) -> Result<Region, Error> {
        self.dispatcher.invoke_and_wait(|peer| peer.visible_region().clone())
    }

    pub fn is_capturing(&self) -> Result<bool, Error> {
        self.dispatcher.invoke_and_wait(|peer| peer.is_capturing())
    }

    /// Run `f` against the peer on the UI thread and wait for the result.
    pub fn with<R: Send + 'static>(&self, f: impl FnOnce(&mut EmbeddedPeer<H>) -> R + Send + 'static) -> Result<R, Error> {
        self.dispatcher.invoke_and_wait(f)
    }
}

/// A UI thread running one embedded peer.
pub struct Embedding<H: Host> {
    ui: UiThread<EmbeddedPeer<H>>,
    handle: PeerHandle<H>,
}

impl<H: Host> Embedding<H> {
    pub fn spawn(host: H, proxy: ComponentId, native: ComponentId, options: EmbedOptions) -> Result<Self, Error> {
        let ui = UiThread::spawn(EmbeddedPeer::new(host, proxy, native, options))?;
        let handle = PeerHandle::new(ui.dispatcher());
        Ok(Self { ui, handle })
    }

    pub fn handle(&self) -> PeerHandle<H> {
        self.handle.clone()
    }

    /// Stop the UI thread and get the peer (and its host) back.
    pub fn shutdown(self) -> Result<EmbeddedPeer<H>, Error> {
        self.ui.shutdown()
    }
}
