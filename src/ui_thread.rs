// The single dedicated UI thread.
//
// State of type `S` is moved onto the thread at spawn time and from then on
// is only reachable through tasks run there, which is what keeps it free of
// locks. Other threads talk to it through a `Dispatcher`:
// `Dispatcher::invoke_later` queues a task, `Dispatcher::invoke_and_wait`
// queues one and blocks until it has run.

use crate::error::Error;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle, ThreadId};

type Task<S> = Box<dyn FnOnce(&mut S) + Send>;

enum Message<S> {
    Run(Task<S>),
    Shutdown,
}

pub struct Dispatcher<S> {
    tx: Sender<Message<S>>,
    thread: ThreadId,
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone(), thread: self.thread }
    }
}

impl<S: 'static> Dispatcher<S> {
    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.thread
    }

    /// Queue `f` behind everything already queued. Never blocks.
    pub fn invoke_later(&self, f: impl FnOnce(&mut S) + Send + 'static) -> Result<(), Error> {
        self.tx
            .send(Message::Run(Box::new(f)))
            .map_err(|_| Error::HandOff("UI thread has shut down".into()))
    }

    /// Run `f` on the UI thread and wait for its result.
    ///
    /// A panic inside `f` is caught on the UI thread and returned as [`Error::HandOff`];
    /// the thread keeps serving. Calling this from the UI thread itself is refused.
    pub fn invoke_and_wait<R: Send + 'static>(&self, f: impl FnOnce(&mut S) -> R + Send + 'static) -> Result<R, Error> {
        if self.is_ui_thread() {
            return Err(Error::HandOff("invoke_and_wait called from the UI thread".into()));
        }
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.invoke_later(move |state| {
            let result = panic::catch_unwind(AssertUnwindSafe(|| f(state)));
            // The waiting side only disappears if its thread died; nothing to report to.
            let _ = reply_tx.send(result);
        })?;
        match reply_rx.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(Error::HandOff(format!("UI task panicked: {}", panic_message(&payload)))),
            Err(_) => Err(Error::HandOff("UI thread dropped the task".into())),
        }
    }
}

/// Owner of the UI thread. Dropping it without [`UiThread::shutdown`] detaches the thread
/// once every dispatcher is gone.
pub struct UiThread<S> {
    dispatcher: Dispatcher<S>,
    join: Option<JoinHandle<S>>,
}

impl<S: Send + 'static> UiThread<S> {
    pub fn spawn(state: S) -> Result<Self, Error> {
        let (tx, rx) = mpsc::channel();
        let join = thread::Builder::new()
            .name("ui".into())
            .spawn(move || run(state, rx))
            .map_err(|e| Error::HandOff(format!("spawn UI thread: {e}")))?;
        let thread = join.thread().id();
        Ok(Self { dispatcher: Dispatcher { tx, thread }, join: Some(join) })
    }

    pub fn dispatcher(&self) -> Dispatcher<S> {
        self.dispatcher.clone()
    }

    /// Finish the tasks queued so far, stop the thread and hand the state back.
    pub fn shutdown(mut self) -> Result<S, Error> {
        // A send failure means the loop already ended; join reports how.
        let _ = self.dispatcher.tx.send(Message::Shutdown);
        let join = self.join.take().ok_or_else(|| Error::HandOff("UI thread already joined".into()))?;
        join.join().map_err(|payload| Error::HandOff(format!("UI thread panicked: {}", panic_message(&payload))))
    }
}

fn run<S>(mut state: S, rx: Receiver<Message<S>>) -> S {
    while let Ok(message) = rx.recv() {
        match message {
            Message::Run(task) => task(&mut state),
            Message::Shutdown => break,
        }
    }
    state
}

fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}
