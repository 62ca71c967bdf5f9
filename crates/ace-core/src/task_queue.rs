use std::collections::VecDeque;

use crate::platform::{TaskExecutor, TaskType};

pub type Task<C> = Box<dyn FnOnce(&mut C) + 'static>;

struct NamedTask<C> {
    name: String,
    task: Task<C>,
}

struct DelayedTask<C> {
    due_millis: u64,
    seq: u64,
    inner: NamedTask<C>,
}

/// UI-thread task queue: posted tasks, delayed tasks and after-layout tasks.
///
/// Nothing runs at post time. [`run_ready_tasks`] and [`run_after_layout_tasks`]
/// take a snapshot of what is due and run it against the owning context, so
/// tasks posted while running wait for the next flush.
pub struct TaskQueue<C> {
    now_millis: u64,
    immediate: VecDeque<NamedTask<C>>,
    delayed: Vec<DelayedTask<C>>,
    after_layout: VecDeque<NamedTask<C>>,
    next_seq: u64,
    accepting: bool,
}

impl<C> Default for TaskQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TaskQueue<C> {
    pub fn new() -> Self {
        Self {
            now_millis: 0,
            immediate: VecDeque::new(),
            delayed: Vec::new(),
            after_layout: VecDeque::new(),
            next_seq: 0,
            accepting: true,
        }
    }

    pub fn now_millis(&self) -> u64 {
        self.now_millis
    }

    /// Time never runs backwards.
    pub fn advance_to(&mut self, now_millis: u64) {
        self.now_millis = self.now_millis.max(now_millis);
    }

    pub fn add_after_layout_task(&mut self, name: &str, task: Task<C>) -> bool {
        if !self.accepting {
            return false;
        }
        self.after_layout.push_back(NamedTask {
            name: name.to_owned(),
            task,
        });
        true
    }

    pub fn has_pending(&self) -> bool {
        !self.immediate.is_empty() || !self.delayed.is_empty() || !self.after_layout.is_empty()
    }

    pub fn has_ready(&self) -> bool {
        !self.immediate.is_empty() || self.delayed.iter().any(|t| t.due_millis <= self.now_millis)
    }

    pub fn pending_after_layout(&self) -> usize {
        self.after_layout.len()
    }

    /// Earliest due time among delayed tasks.
    pub fn next_due_millis(&self) -> Option<u64> {
        self.delayed.iter().map(|t| t.due_millis).min()
    }

    /// Drops everything queued and refuses further posts.
    pub fn shutdown(&mut self) {
        self.accepting = false;
        self.immediate.clear();
        self.delayed.clear();
        self.after_layout.clear();
    }

    fn take_ready(&mut self) -> Vec<NamedTask<C>> {
        let mut ready: Vec<NamedTask<C>> = self.immediate.drain(..).collect();
        let now = self.now_millis;
        let (mut due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.delayed)
            .into_iter()
            .partition(|t| t.due_millis <= now);
        self.delayed = waiting;
        due.sort_by_key(|t| (t.due_millis, t.seq));
        ready.extend(due.into_iter().map(|t| t.inner));
        ready
    }

    fn take_after_layout(&mut self) -> Vec<NamedTask<C>> {
        self.after_layout.drain(..).collect()
    }
}

impl<C> TaskExecutor<C> for TaskQueue<C> {
    fn post_task(&mut self, task: Task<C>, task_type: TaskType, name: &str) -> bool {
        if !self.accepting {
            return false;
        }
        if task_type == TaskType::Background {
            log::debug!("task {name} refused: no background executor");
            return false;
        }
        self.immediate.push_back(NamedTask {
            name: name.to_owned(),
            task,
        });
        true
    }

    fn post_delayed_task(&mut self, task: Task<C>, delay_millis: u64, name: &str) -> bool {
        if !self.accepting {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.delayed.push(DelayedTask {
            due_millis: self.now_millis.saturating_add(delay_millis),
            seq,
            inner: NamedTask {
                name: name.to_owned(),
                task,
            },
        });
        true
    }
}

/// Runs every task that is due and returns how many ran.
pub fn run_ready_tasks<C>(ctx: &mut C, queue: fn(&mut C) -> &mut TaskQueue<C>) -> usize {
    let tasks = queue(ctx).take_ready();
    let count = tasks.len();
    for NamedTask { name, task } in tasks {
        log::trace!("running task {name}");
        task(ctx);
    }
    count
}

/// Runs the after-layout tasks queued before this call, in FIFO order.
pub fn run_after_layout_tasks<C>(ctx: &mut C, queue: fn(&mut C) -> &mut TaskQueue<C>) -> usize {
    let tasks = queue(ctx).take_after_layout();
    let count = tasks.len();
    for NamedTask { name, task } in tasks {
        log::trace!("running after-layout task {name}");
        task(ctx);
    }
    count
}

/// Generation stamp captured by deferred work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Epoch(u64);

/// Monotonic generation counter; deferred callbacks compare the epoch they
/// captured against the current one and do nothing when it moved on.
#[derive(Debug, Default)]
pub struct EpochCounter {
    current: u64,
}

impl EpochCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Epoch {
        Epoch(self.current)
    }

    pub fn advance(&mut self) -> Epoch {
        self.current += 1;
        Epoch(self.current)
    }

    pub fn is_current(&self, epoch: Epoch) -> bool {
        epoch.0 == self.current
    }
}
