//! Platform abstraction traits for the Ace runtime services.
//!
//! These traits let the core delegate frame scheduling, timing, task
//! posting and system property lookups to the host platform.

use std::str::FromStr;

use crate::collections::map::HashMap;
use crate::task_queue::Task;

/// Schedules work for the runtime.
///
/// Implementations are responsible for triggering frame processing on
/// behalf of the UI thread. They must be safe to use from multiple threads.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host schedule a new frame.
    fn schedule_frame(&self);
}

/// Provides timing information for the runtime.
pub trait Clock: Send + Sync {
    /// Instant type produced by this clock implementation.
    type Instant: Copy + Send + Sync;

    /// Returns the current instant.
    fn now(&self) -> Self::Instant;

    /// Returns the number of milliseconds elapsed since `since`.
    fn elapsed_millis(&self, since: Self::Instant) -> u64;
}

/// Execution lane a posted task asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskType {
    /// The UI thread that owns the node tree.
    Ui,
    /// Platform callbacks, also delivered on the UI thread.
    Platform,
    /// Off-thread work. The core has no background lanes and refuses it.
    Background,
}

/// Posts closures that run later against a context of type `C`.
///
/// Posting never runs the task synchronously.
pub trait TaskExecutor<C> {
    /// Returns whether the task was accepted.
    fn post_task(&mut self, task: Task<C>, task_type: TaskType, name: &str) -> bool;

    /// Returns whether the task was accepted.
    fn post_delayed_task(&mut self, task: Task<C>, delay_millis: u64, name: &str) -> bool;
}

/// Opaque label -> value accessor for system properties.
pub trait SystemProperties {
    fn get(&self, key: &str) -> Option<String>;
}

impl dyn SystemProperties + '_ {
    /// Returns the property value or `default` when it is unset.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_owned())
    }

    /// Parses the property, falling back to `default` when unset or malformed.
    pub fn parsed<T: FromStr>(&self, key: &str, default: T) -> T {
        match self.get(key) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("system property {key}={raw:?} is malformed, using default");
                default
            }),
            None => default,
        }
    }
}

/// In-memory [`SystemProperties`].
#[derive(Debug, Default, Clone)]
pub struct MapSystemProperties {
    values: HashMap<String, String>,
}

impl MapSystemProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSystemProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Self::default();
        for (key, value) in iter {
            props.set(key, value);
        }
        props
    }
}

impl SystemProperties for MapSystemProperties {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
