#![doc = r"Node tree engine and pipeline runtime for the Ace UI framework."]

pub mod collections;
mod error;
pub mod node;
mod pipeline;
pub mod platform;
pub mod runtime;
pub mod task_queue;
mod tree;

pub use error::{NodeError, RejectReason};
pub use node::{
    tags, DisappearingChild, FrameData, LayoutPolicy, LifecycleEvent, NodeKind, NodeStatus,
    RenderState, UiNode, Visibility,
};
pub use pipeline::{DirtyFlag, PipelineContext};
pub use platform::{
    Clock, MapSystemProperties, RuntimeScheduler, SystemProperties, TaskExecutor, TaskType,
};
pub use runtime::{DefaultScheduler, Runtime, RuntimeHandle};
pub use task_queue::{
    run_after_layout_tasks, run_ready_tasks, Epoch, EpochCounter, Task, TaskQueue,
};
pub use tree::{AddChildOptions, NodeTree};

#[cfg(test)]
pub use runtime::TestScheduler;

pub type NodeId = usize;
pub type PipelineId = u32;

pub mod prelude {
    pub use crate::node::{tags, FrameData, NodeKind, NodeStatus, Visibility};
    pub use crate::platform::{TaskExecutor, TaskType};
    pub use crate::tree::{AddChildOptions, NodeTree};
    pub use crate::{NodeId, PipelineContext, PipelineId, RejectReason};
}
