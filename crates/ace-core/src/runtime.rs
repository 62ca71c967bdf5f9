use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use crate::platform::RuntimeScheduler;

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    needs_frame: RefCell<bool>,
    frame_time_nanos: Cell<u64>,
    frames_requested: Cell<u64>,
    owner: ThreadId,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            needs_frame: RefCell::new(false),
            frame_time_nanos: Cell::new(0),
            frames_requested: Cell::new(0),
            owner: thread::current().id(),
        }
    }

    fn schedule(&self) {
        *self.needs_frame.borrow_mut() = true;
        self.frames_requested.set(self.frames_requested.get() + 1);
        self.scheduler.schedule_frame();
    }
}

/// Per-pipeline runtime state shared by everything living on the UI thread.
///
/// The runtime is `!Send`; the owner thread is recorded so tree mutations
/// can assert they never run elsewhere.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle(Rc::downgrade(&self.inner))
    }

    pub fn request_frame(&self) {
        self.inner.schedule();
    }

    pub fn needs_frame(&self) -> bool {
        *self.inner.needs_frame.borrow()
    }

    pub fn set_needs_frame(&self, value: bool) {
        *self.inner.needs_frame.borrow_mut() = value;
    }

    pub fn frames_requested(&self) -> u64 {
        self.inner.frames_requested.get()
    }

    pub fn frame_time_nanos(&self) -> u64 {
        self.inner.frame_time_nanos.get()
    }

    pub fn set_frame_time_nanos(&self, nanos: u64) {
        self.inner.frame_time_nanos.set(nanos);
    }

    pub fn now_millis(&self) -> u64 {
        self.frame_time_nanos() / 1_000_000
    }

    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.inner.owner
    }
}

#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

#[cfg(test)]
#[derive(Default)]
pub struct TestScheduler;

#[cfg(test)]
impl RuntimeScheduler for TestScheduler {
    fn schedule_frame(&self) {}
}

#[derive(Clone)]
pub struct RuntimeHandle(pub(crate) Weak<RuntimeInner>);

impl RuntimeHandle {
    pub fn request_frame(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.schedule();
        }
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// A dropped runtime has no owner, so any thread is accepted.
    pub fn is_owner_thread(&self) -> bool {
        self.0
            .upgrade()
            .map(|inner| inner.owner == thread::current().id())
            .unwrap_or(true)
    }

    pub fn set_needs_frame(&self, value: bool) {
        if let Some(inner) = self.0.upgrade() {
            *inner.needs_frame.borrow_mut() = value;
        }
    }

    pub fn now_millis(&self) -> u64 {
        self.0
            .upgrade()
            .map(|inner| inner.frame_time_nanos.get() / 1_000_000)
            .unwrap_or(0)
    }
}
