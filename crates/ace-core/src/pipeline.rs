use std::sync::Arc;

use ace_ui_graphics::Rect;
use indexmap::IndexSet;

use crate::node::{tags, LayoutPolicy};
use crate::platform::RuntimeScheduler;
use crate::runtime::Runtime;
use crate::tree::NodeTree;
use crate::{NodeId, PipelineId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirtyFlag {
    Layout,
    Render,
}

/// One pipeline: the node tree rooted at a `root` frame, its runtime, and
/// the dirty bookkeeping consumed once per frame.
pub struct PipelineContext {
    id: PipelineId,
    runtime: Runtime,
    tree: NodeTree,
    root: NodeId,
    dirty_layout: IndexSet<NodeId>,
    layout_passes: u64,
}

impl PipelineContext {
    pub fn new(id: PipelineId, scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        let runtime = Runtime::new(scheduler);
        let mut tree = NodeTree::new();
        tree.bind_runtime(runtime.handle());
        let root = tree.spawn_frame(tags::ROOT);
        tree.attach_to_main_tree(root, true, Some(id));
        Self {
            id,
            runtime,
            tree,
            root,
            dirty_layout: IndexSet::new(),
            layout_passes: 0,
        }
    }

    pub fn id(&self) -> PipelineId {
        self.id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn root_rect(&self) -> Rect {
        self.tree
            .frame(self.root)
            .map(|frame| frame.geometry)
            .unwrap_or_default()
    }

    pub fn on_surface_changed(&mut self, width: f32, height: f32) {
        log::debug!("surface changed to {width}x{height}");
        if let Ok(frame) = self.tree.frame_mut(self.root) {
            frame.geometry = Rect::new(0.0, 0.0, width, height);
        }
        self.mark_dirty(self.root, DirtyFlag::Layout);
    }

    pub fn mark_dirty(&mut self, id: NodeId, flag: DirtyFlag) {
        match flag {
            DirtyFlag::Layout => {
                self.dirty_layout.insert(id);
            }
            DirtyFlag::Render => self.tree.mark_needs_sync_render_tree(id, false),
        }
        self.runtime.request_frame();
    }

    pub fn has_dirty_nodes(&self) -> bool {
        !self.dirty_layout.is_empty() || self.tree.has_pending_render_sync()
    }

    pub fn request_frame(&self) {
        self.runtime.request_frame();
    }

    pub fn begin_frame(&mut self, frame_time_nanos: u64) {
        self.runtime.set_frame_time_nanos(frame_time_nanos);
        self.runtime.set_needs_frame(false);
    }

    pub fn layout_passes(&self) -> u64 {
        self.layout_passes
    }

    /// Resolves `MatchParent` frames against their nearest frame ancestor.
    /// Returns whether a pass ran.
    pub fn flush_layout(&mut self) -> bool {
        if self.dirty_layout.is_empty() {
            return false;
        }
        self.dirty_layout.clear();
        self.layout_passes += 1;
        let root_rect = self.root_rect();
        self.layout_node(self.root, root_rect);
        true
    }

    fn layout_node(&mut self, id: NodeId, available: Rect) {
        let mut inner = available;
        if let Ok(frame) = self.tree.frame_mut(id) {
            if frame.layout_policy == LayoutPolicy::MatchParent {
                frame.geometry = available;
            }
            inner = frame.geometry;
        }
        for child in self.tree.children(id) {
            self.layout_node(child, inner);
        }
    }

    pub fn flush_render_tree(&mut self) -> usize {
        self.tree.flush_render_tree()
    }
}
