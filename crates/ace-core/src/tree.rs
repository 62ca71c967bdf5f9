use indexmap::IndexSet;

use crate::collections::map::{HashMap, HashSet};
use crate::node::{
    tags, BuildFn, CustomData, DisappearingChild, FrameData, LifecycleEvent, NodeKind, NodeStatus,
    UiNode, Visibility,
};
use crate::runtime::RuntimeHandle;
use crate::{NodeError, NodeId, PipelineId, RejectReason};

/// Flags accepted by [`NodeTree::add_child`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AddChildOptions {
    /// Insert without attaching the child to the main tree.
    pub silently: bool,
    /// Let the first frame of the attached subtree run its appear transition.
    pub add_default_transition: bool,
    /// Bypass the modal exclusivity check.
    pub add_modal_exception: bool,
}

impl AddChildOptions {
    pub fn silently() -> Self {
        Self {
            silently: true,
            ..Self::default()
        }
    }

    pub fn with_default_transition() -> Self {
        Self {
            add_default_transition: true,
            ..Self::default()
        }
    }
}

/// Arena owning every [`UiNode`] of one pipeline.
///
/// Parent links are plain ids; the tree answers for the consistency of
/// `children`, `disappearing_children` and the back-pointers between them.
/// A node that leaves the tree immediately and is not retained is destroyed.
pub struct NodeTree {
    nodes: HashMap<NodeId, UiNode>,
    next_id: NodeId,
    next_accessibility_id: u64,
    attached: HashSet<NodeId>,
    pending_remove: Vec<NodeId>,
    needs_sync: IndexSet<NodeId>,
    lifecycle_events: Vec<LifecycleEvent>,
    exit_transitions: Vec<NodeId>,
    runtime: Option<RuntimeHandle>,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::default(),
            next_id: 1,
            next_accessibility_id: 1,
            attached: HashSet::default(),
            pending_remove: Vec::new(),
            needs_sync: IndexSet::new(),
            lifecycle_events: Vec::new(),
            exit_transitions: Vec::new(),
            runtime: None,
        }
    }

    pub fn bind_runtime(&mut self, runtime: RuntimeHandle) {
        self.runtime = Some(runtime);
    }

    fn debug_assert_owner_thread(&self) {
        debug_assert!(
            self.runtime
                .as_ref()
                .map_or(true, RuntimeHandle::is_owner_thread),
            "node tree mutated off its UI thread"
        );
    }

    // ---------------------------------------------------------------------
    // creation and lookup

    pub fn next_node_id(&mut self) -> NodeId {
        while self.nodes.contains_key(&self.next_id) {
            self.next_id += 1;
        }
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn create_node(
        &mut self,
        tag: impl Into<String>,
        id: NodeId,
        kind: NodeKind,
    ) -> Result<NodeId, NodeError> {
        if self.nodes.contains_key(&id) {
            return Err(NodeError::Occupied { id });
        }
        let accessibility_id = self.next_accessibility_id;
        self.next_accessibility_id += 1;
        self.next_id = self.next_id.max(id + 1);
        self.nodes
            .insert(id, UiNode::new(id, accessibility_id, tag.into(), kind));
        Ok(id)
    }

    pub fn spawn(&mut self, tag: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = self.next_node_id();
        let accessibility_id = self.next_accessibility_id;
        self.next_accessibility_id += 1;
        self.nodes
            .insert(id, UiNode::new(id, accessibility_id, tag.into(), kind));
        id
    }

    pub fn spawn_frame(&mut self, tag: impl Into<String>) -> NodeId {
        self.spawn(tag, NodeKind::frame())
    }

    /// Creates a custom node whose children are produced by `build` on the
    /// first [`NodeTree::build`] pass that reaches it.
    pub fn spawn_custom(
        &mut self,
        tag: impl Into<String>,
        build: impl FnOnce(&mut NodeTree, NodeId) + 'static,
    ) -> NodeId {
        let build: BuildFn = Box::new(build);
        self.spawn(
            tag,
            NodeKind::Custom(CustomData {
                build: Some(build),
                built: false,
            }),
        )
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&UiNode> {
        self.nodes.get(&id)
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(UiNode::tag)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn depth(&self, id: NodeId) -> Option<u32> {
        self.nodes.get(&id).map(|node| node.depth)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&id)
            .map(|node| node.children.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.nodes.get(&id).map_or(0, |node| node.children.len())
    }

    pub fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.nodes.get(&parent)?.children.get_index_of(&child)
    }

    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.nodes.get(&parent)?.children.get_index(index).copied()
    }

    pub fn disappearing_children(&self, id: NodeId) -> Vec<DisappearingChild> {
        self.nodes
            .get(&id)
            .map(|node| node.disappearing_children.clone())
            .unwrap_or_default()
    }

    pub fn is_disappearing(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|node| node.is_disappearing)
    }

    pub fn is_on_main_tree(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|node| node.on_main_tree)
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.attached.contains(&id)
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    pub fn frame(&self, id: NodeId) -> Result<&FrameData, NodeError> {
        let node = self.nodes.get(&id).ok_or(NodeError::Missing { id })?;
        node.frame().ok_or(NodeError::KindMismatch {
            id,
            expected: "frame",
        })
    }

    pub fn frame_mut(&mut self, id: NodeId) -> Result<&mut FrameData, NodeError> {
        let node = self.nodes.get_mut(&id).ok_or(NodeError::Missing { id })?;
        node.frame_mut().ok_or(NodeError::KindMismatch {
            id,
            expected: "frame",
        })
    }

    /// Nearest frame strictly above `id`.
    pub fn parent_frame(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.parent(id);
        while let Some(current) = cursor {
            let node = self.nodes.get(&current)?;
            if node.is_frame() {
                return Some(current);
            }
            cursor = node.parent;
        }
        None
    }

    /// Pre-order walk over live children, starting with `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.tag(*id) == Some(tag))
            .collect()
    }

    fn is_self_or_ancestor(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == candidate {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    // ---------------------------------------------------------------------
    // retention

    /// Keeps a node alive while it is out of the tree.
    pub fn retain(&mut self, id: NodeId) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.retain_count += 1;
                true
            }
            None => false,
        }
    }

    pub fn release(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.retain_count = node.retain_count.saturating_sub(1);
        }
        self.release_if_orphan(id);
    }

    pub fn set_observe_lifecycle(&mut self, id: NodeId, observe: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.observe_lifecycle = observe;
        }
    }

    pub fn take_lifecycle_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.lifecycle_events)
    }

    /// Frames whose exit transition started since the last call. The host
    /// animates them and reports the end through
    /// [`NodeTree::transition_out_finished`].
    pub fn take_exit_transitions(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.exit_transitions)
    }

    fn emit(&mut self, id: NodeId, event: LifecycleEvent) {
        if self.nodes.get(&id).is_some_and(|node| node.observe_lifecycle) {
            self.lifecycle_events.push(event);
        }
    }

    fn release_if_orphan(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if node.parent.is_none()
            && node.retain_count == 0
            && !node.on_main_tree
            && !self.pending_remove.contains(&id)
        {
            self.destroy(id);
        }
    }

    /// Drops `id` and every descendant that nothing else keeps alive.
    fn destroy(&mut self, id: NodeId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        self.attached.remove(&id);
        self.needs_sync.shift_remove(&id);
        if node.observe_lifecycle {
            self.lifecycle_events.push(LifecycleEvent::Destroyed(id));
        }
        let owned: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .chain(node.disappearing_children.iter().map(|entry| entry.node))
            .collect();
        for child in owned {
            let Some(child_node) = self.nodes.get_mut(&child) else {
                continue;
            };
            if child_node.parent == Some(id) {
                child_node.parent = None;
                child_node.is_disappearing = false;
                child_node.is_modal_child = false;
            }
            let keep = child_node.retain_count > 0 || self.pending_remove.contains(&child);
            if keep {
                self.set_depth(child, 0);
            } else {
                self.destroy(child);
            }
        }
    }

    // ---------------------------------------------------------------------
    // structural mutation

    fn check_insert(&self, parent: NodeId, child: NodeId, modal_exception: bool) -> Result<(), RejectReason> {
        let parent_node = self
            .nodes
            .get(&parent)
            .ok_or(RejectReason::Missing { id: parent })?;
        if !self.nodes.contains_key(&child) {
            return Err(RejectReason::Missing { id: child });
        }
        if parent_node.modal_children > 0 && !modal_exception {
            log::warn!(
                "{}({parent}) hosts a modal child, rejecting child {child}",
                parent_node.tag
            );
            return Err(RejectReason::ModalExclusive { parent });
        }
        if self.is_self_or_ancestor(child, parent) {
            log::warn!("adding {child} under {parent} would form a cycle");
            return Err(RejectReason::WouldCycle { parent, child });
        }
        Ok(())
    }

    /// Whether [`NodeTree::add_child`] would accept `child` under `parent`.
    pub fn can_add_child(
        &self,
        parent: NodeId,
        child: NodeId,
        modal_exception: bool,
    ) -> Result<(), RejectReason> {
        self.check_insert(parent, child, modal_exception)
    }

    /// Inserts `child` under `parent` at `slot` (appends when `None` or past
    /// the end). Re-adding a present child is a no-op.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        slot: Option<usize>,
        options: AddChildOptions,
    ) -> Result<(), RejectReason> {
        self.check_insert(parent, child, options.add_modal_exception)?;
        if self.child_index(parent, child).is_some() {
            return Ok(());
        }
        self.do_add_child(
            parent,
            child,
            slot,
            options.silently,
            options.add_default_transition,
        );
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), RejectReason> {
        self.add_child(parent, child, None, AddChildOptions::default())
    }

    /// Inserts right after `sibling`, or appends when it is not a child.
    pub fn add_child_after(
        &mut self,
        parent: NodeId,
        child: NodeId,
        sibling: NodeId,
    ) -> Result<(), RejectReason> {
        self.check_insert(parent, child, false)?;
        if self.child_index(parent, child).is_some() {
            return Ok(());
        }
        let slot = self.child_index(parent, sibling).map(|index| index + 1);
        self.do_add_child(parent, child, slot, false, false);
        Ok(())
    }

    /// Inserts right before `sibling`, or appends when it is not a child.
    pub fn add_child_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        sibling: NodeId,
    ) -> Result<(), RejectReason> {
        self.check_insert(parent, child, false)?;
        if self.child_index(parent, child).is_some() {
            return Ok(());
        }
        let slot = self.child_index(parent, sibling);
        self.do_add_child(parent, child, slot, false, false);
        Ok(())
    }

    /// Adds `child` as the parent's modal child. Until it is removed, plain
    /// `add_child` calls on `parent` are rejected.
    pub fn add_modal_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), RejectReason> {
        self.add_child(
            parent,
            child,
            None,
            AddChildOptions {
                add_modal_exception: true,
                ..AddChildOptions::default()
            },
        )?;
        let Some(child_node) = self.nodes.get_mut(&child) else {
            return Err(RejectReason::Missing { id: child });
        };
        if !child_node.is_modal_child {
            child_node.is_modal_child = true;
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.modal_children += 1;
            }
        }
        Ok(())
    }

    pub fn mount_to_parent(
        &mut self,
        child: NodeId,
        parent: NodeId,
        slot: Option<usize>,
        silently: bool,
        add_default_transition: bool,
    ) -> Result<(), RejectReason> {
        self.add_child(
            parent,
            child,
            slot,
            AddChildOptions {
                silently,
                add_default_transition,
                add_modal_exception: false,
            },
        )
    }

    fn do_add_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        slot: Option<usize>,
        silently: bool,
        add_default_transition: bool,
    ) {
        self.debug_assert_owner_thread();
        let previous = self.parent(child);
        if self.is_disappearing(child) {
            if let Some(holder) = previous {
                self.remove_disappearing_child(holder, child);
            }
        } else if let Some(old_parent) = previous.filter(|old| *old != parent) {
            self.unlink_child(old_parent, child);
            self.mark_needs_sync_render_tree(old_parent, true);
        }

        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return;
        };
        let len = parent_node.children.len();
        let index = slot.map_or(len, |slot| slot.min(len));
        parent_node.children.shift_insert(index, child);
        let depth = parent_node.depth + 1;
        let status = parent_node.status;
        let on_main_tree = parent_node.on_main_tree;
        let context = parent_node.context;

        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.parent = Some(parent);
        }
        self.set_depth(child, depth);
        if status.is_builder() {
            self.update_node_status(child, status);
        }
        if !silently && on_main_tree {
            self.attach_to_main_tree(child, !add_default_transition, context);
        }
        self.mark_needs_sync_render_tree(parent, true);
    }

    /// Drops `child` from the live children and settles the modal count.
    fn unlink_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return false;
        };
        if !parent_node.children.shift_remove(&child) {
            return false;
        }
        if let Some(child_node) = self.nodes.get_mut(&child) {
            if child_node.is_modal_child {
                child_node.is_modal_child = false;
                if let Some(parent_node) = self.nodes.get_mut(&parent) {
                    parent_node.modal_children = parent_node.modal_children.saturating_sub(1);
                }
            }
        }
        true
    }

    /// Removes `child` from `parent`, returning the slot it occupied.
    ///
    /// With `allow_transition` a child whose exit transition is still running
    /// is parked in `disappearing_children` at that slot instead of leaving.
    pub fn remove_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        allow_transition: bool,
    ) -> Option<usize> {
        let index = self.child_index(parent, child)?;
        self.unlink_child(parent, child);
        if self.on_remove_from_parent(child, allow_transition) {
            self.reset_parent(child);
            self.mark_needs_sync_render_tree(parent, true);
            self.release_if_orphan(child);
        } else {
            self.add_disappearing_child(parent, child, index);
            self.mark_needs_sync_render_tree(parent, true);
        }
        Some(index)
    }

    pub fn remove_child_at_index(&mut self, parent: NodeId, index: usize) -> Option<NodeId> {
        let child = self.child_at(parent, index)?;
        self.remove_child(parent, child, false);
        Some(child)
    }

    /// Swaps `old` for `new` at the same slot without exit transitions.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        old: NodeId,
        new: NodeId,
    ) -> Result<(), RejectReason> {
        let Some(index) = self.child_index(parent, old) else {
            return Err(RejectReason::Missing { id: old });
        };
        if !self.nodes.contains_key(&new) {
            return Err(RejectReason::Missing { id: new });
        }
        if self.is_self_or_ancestor(new, parent) {
            return Err(RejectReason::WouldCycle { parent, child: new });
        }
        self.remove_child(parent, old, false);
        self.do_add_child(parent, new, Some(index), false, false);
        Ok(())
    }

    /// Moves `id` to `slot` among its siblings; slots past the end move it last.
    pub fn move_position(&mut self, id: NodeId, slot: usize) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return;
        };
        let Some(current) = parent_node.children.get_index_of(&id) else {
            return;
        };
        let target = slot.min(parent_node.children.len() - 1);
        if current == target {
            return;
        }
        parent_node.children.move_index(current, target);
        self.mark_needs_sync_render_tree(parent, true);
    }

    /// Detaches every child of `parent`.
    ///
    /// Children with a running exit transition move to the disappearing list.
    /// Unless `clean_directly`, subtrees holding a geometry transition are
    /// parked on the pending-remove list. An `IfElse` node keeps its
    /// immediately removable children as a detached branch cache.
    pub fn clean(&mut self, parent: NodeId, clean_directly: bool, allow_transition: bool) {
        let Some(parent_node) = self.nodes.get(&parent) else {
            return;
        };
        let keep_children = parent_node.tag == tags::IF_ELSE;
        let children: Vec<NodeId> = parent_node.children.iter().copied().collect();
        let mut released = Vec::new();
        for (index, child) in children.into_iter().enumerate() {
            if !clean_directly && self.mark_removing(child) && !self.pending_remove.contains(&child) {
                self.pending_remove.push(child);
            }
            if self.on_remove_from_parent(child, allow_transition) {
                if !keep_children {
                    self.unlink_child(parent, child);
                    self.reset_parent(child);
                    released.push(child);
                }
            } else {
                self.unlink_child(parent, child);
                self.add_disappearing_child(parent, child, index);
            }
        }
        self.mark_needs_sync_render_tree(parent, true);
        for child in released {
            self.release_if_orphan(child);
        }
    }

    /// Marks the subtree as being removed. Returns whether any node in it
    /// carries a geometry transition and must outlive the removal.
    pub fn mark_removing(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.is_removing = true;
        let mut pending = node
            .frame()
            .is_some_and(|frame| frame.geometry_transition.is_some());
        let children: Vec<NodeId> = node.children.iter().copied().collect();
        for child in children {
            pending |= self.mark_removing(child);
        }
        pending
    }

    pub fn pending_remove_nodes(&self) -> &[NodeId] {
        &self.pending_remove
    }

    /// Releases parked subtrees once their geometry transitions settled.
    pub fn clear_pending_remove_nodes(&mut self) {
        for id in std::mem::take(&mut self.pending_remove) {
            self.release_if_orphan(id);
        }
    }

    fn on_remove_from_parent(&mut self, child: NodeId, allow_transition: bool) -> bool {
        self.detach_from_main_tree(child, !allow_transition);
        !allow_transition || self.remove_immediately(child)
    }

    fn reset_parent(&mut self, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
        self.set_depth(child, 0);
    }

    /// True when neither the node nor anything below it runs an exit transition.
    pub fn remove_immediately(&self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return true;
        };
        if node
            .frame()
            .is_some_and(|frame| frame.render.has_transition_out)
        {
            return false;
        }
        node.children.iter().all(|child| self.remove_immediately(*child))
            && node
                .disappearing_children
                .iter()
                .all(|entry| self.remove_immediately(entry.node))
    }

    pub fn add_disappearing_child(&mut self, parent: NodeId, child: NodeId, index: usize) {
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return;
        };
        parent_node
            .disappearing_children
            .retain(|entry| entry.node != child);
        parent_node
            .disappearing_children
            .push(DisappearingChild { node: child, index });
        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.is_disappearing = true;
        }
    }

    pub fn remove_disappearing_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_disappearing(child) {
            return false;
        }
        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return false;
        };
        let Some(position) = parent_node
            .disappearing_children
            .iter()
            .position(|entry| entry.node == child)
        else {
            return false;
        };
        parent_node.disappearing_children.remove(position);
        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.is_disappearing = false;
        }
        true
    }

    /// Climbs from `id` to the node that was parked as disappearing.
    /// Returns `(parent, child)` of that break point.
    pub fn get_best_break_point(&self, id: NodeId) -> (Option<NodeId>, NodeId) {
        let mut child = id;
        let mut parent = self.parent(child);
        while let Some(current) = parent {
            if self.is_disappearing(child) {
                break;
            }
            child = current;
            parent = self.parent(current);
        }
        (parent, child)
    }

    /// Takes `child` out of `parent` whichever list holds it.
    pub fn remove_from_parent_cleanly(&mut self, parent: NodeId, child: NodeId) {
        if !self.remove_disappearing_child(parent, child) {
            self.unlink_child(parent, child);
        }
        self.reset_parent(child);
    }

    /// Called when the exit transition of frame `id` ends. Returns whether
    /// a parked subtree left the tree.
    pub fn transition_out_finished(&mut self, id: NodeId) -> bool {
        if let Ok(frame) = self.frame_mut(id) {
            frame.render.has_transition_out = false;
        }
        let (parent, child) = self.get_best_break_point(id);
        let Some(parent) = parent else {
            return false;
        };
        if !self.is_disappearing(child) || !self.remove_immediately(child) {
            return false;
        }
        self.on_remove_from_parent(child, false);
        self.remove_from_parent_cleanly(parent, child);
        self.mark_needs_sync_render_tree(parent, true);
        self.release_if_orphan(child);
        true
    }

    // ---------------------------------------------------------------------
    // attachment and status

    fn set_depth(&mut self, id: NodeId, depth: u32) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.depth = depth;
        let below: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .chain(node.disappearing_children.iter().map(|entry| entry.node))
            .collect();
        for child in below {
            self.set_depth(child, depth + 1);
        }
    }

    pub fn set_node_status(&mut self, id: NodeId, status: NodeStatus) {
        self.update_node_status(id, status);
    }

    fn update_node_status(&mut self, id: NodeId, status: NodeStatus) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.status = status;
        let children: Vec<NodeId> = node.children.iter().copied().collect();
        for child in children {
            self.update_node_status(child, status);
        }
    }

    /// Marks the subtree as on the main tree and binds it to `context`.
    ///
    /// Without `recursive`, the first frame reached requests its default
    /// appear transition; every frame passes `recursive` to its children.
    pub fn attach_to_main_tree(&mut self, id: NodeId, recursive: bool, context: Option<PipelineId>) {
        self.debug_assert_owner_thread();
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        if node.on_main_tree {
            return;
        }
        node.on_main_tree = true;
        node.is_removing = false;
        if context.is_some() {
            node.context = context;
        }
        if node.status == NodeStatus::BuilderNodeOffMainTree {
            node.status = NodeStatus::BuilderNodeOnMainTree;
        }
        let is_frame = node.is_frame();
        if let Some(frame) = node.frame_mut() {
            frame.render.has_transition_out = false;
            if !recursive {
                frame.render.appear_transition_pending = true;
            }
        }
        let children: Vec<NodeId> = node.children.iter().copied().collect();
        self.attached.insert(id);
        self.emit(id, LifecycleEvent::Attached(id));
        let recursive = recursive || is_frame;
        for child in children {
            self.attach_to_main_tree(child, recursive, context);
        }
    }

    /// Inverse of [`NodeTree::attach_to_main_tree`]. A frame detached
    /// without `recursive` starts its exit transition if it declares one.
    pub fn detach_from_main_tree(&mut self, id: NodeId, recursive: bool) {
        self.debug_assert_owner_thread();
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        if !node.on_main_tree {
            return;
        }
        node.on_main_tree = false;
        node.is_removing = true;
        node.context = None;
        if node.status == NodeStatus::BuilderNodeOnMainTree {
            node.status = NodeStatus::BuilderNodeOffMainTree;
        }
        let is_frame = node.is_frame();
        let mut exit_started = false;
        if let Some(frame) = node.frame_mut() {
            frame.render.appear_transition_pending = false;
            if !recursive && frame.disappear_transition {
                exit_started = !frame.render.has_transition_out;
                frame.render.has_transition_out = true;
            }
        }
        let children: Vec<NodeId> = node.children.iter().copied().collect();
        if exit_started {
            self.exit_transitions.push(id);
        }
        self.attached.remove(&id);
        self.emit(id, LifecycleEvent::Detached(id));
        let recursive = recursive || is_frame;
        for child in children {
            self.detach_from_main_tree(child, recursive);
        }
    }

    /// Binds `context` to the subtree. Without `recursive` propagation stops
    /// at the first frame.
    pub fn attach_context(&mut self, id: NodeId, context: PipelineId, recursive: bool) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.context = Some(context);
        if !recursive && node.is_frame() {
            return;
        }
        let children: Vec<NodeId> = node.children.iter().copied().collect();
        for child in children {
            self.attach_context(child, context, recursive);
        }
    }

    pub fn detach_context(&mut self, id: NodeId, recursive: bool) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.context = None;
        if !recursive && node.is_frame() {
            return;
        }
        let children: Vec<NodeId> = node.children.iter().copied().collect();
        for child in children {
            self.detach_context(child, recursive);
        }
    }

    /// Runs pending custom build closures in the subtree, parents first.
    pub fn build(&mut self, id: NodeId) {
        let build = match self.nodes.get_mut(&id).map(|node| &mut node.kind) {
            Some(NodeKind::Custom(custom)) if !custom.built => {
                custom.built = true;
                custom.build.take()
            }
            _ => None,
        };
        if let Some(build) = build {
            build(self, id);
        }
        for child in self.children(id) {
            self.build(child);
        }
    }

    // ---------------------------------------------------------------------
    // render tree sync

    /// Flags the nearest frame at or above `id` for a render tree rebuild.
    pub fn mark_needs_sync_render_tree(&mut self, id: NodeId, need_rebuild: bool) {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get_mut(&current) else {
                return;
            };
            if let Some(frame) = node.frame_mut() {
                frame.needs_sync_render_tree = true;
                if need_rebuild {
                    frame.render_children.clear();
                }
                self.needs_sync.insert(current);
                return;
            }
            cursor = node.parent;
        }
    }

    pub fn has_pending_render_sync(&self) -> bool {
        !self.needs_sync.is_empty()
    }

    /// Frames directly visible below `id`, with disappearing children merged
    /// back at their recorded slots.
    pub fn visible_frames_with_transition(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_visible_frames(id, &mut out);
        out
    }

    fn collect_visible_frames(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let mut merged: Vec<NodeId> = node.children.iter().copied().collect();
        for entry in node.disappearing_children.iter().rev() {
            if entry.index >= merged.len() {
                merged.push(entry.node);
            } else {
                merged.insert(entry.index, entry.node);
            }
        }
        for child in merged {
            let Some(child_node) = self.nodes.get(&child) else {
                continue;
            };
            match child_node.frame() {
                Some(frame) => {
                    if frame.visibility != Visibility::Gone || frame.render.has_transition_out {
                        out.push(child);
                    }
                }
                None => self.collect_visible_frames(child, out),
            }
        }
    }

    pub fn rebuild_render_context_tree(&mut self, id: NodeId) {
        if !self.nodes.get(&id).is_some_and(UiNode::is_frame) {
            return;
        }
        let render_children = self.visible_frames_with_transition(id);
        if let Ok(frame) = self.frame_mut(id) {
            frame.render_children = render_children;
            frame.needs_sync_render_tree = false;
        }
        self.needs_sync.shift_remove(&id);
    }

    /// Rebuilds every flagged frame; returns how many were rebuilt.
    pub fn flush_render_tree(&mut self) -> usize {
        let pending: Vec<NodeId> = self.needs_sync.drain(..).collect();
        let mut rebuilt = 0;
        for id in pending {
            if self.contains(id) {
                self.rebuild_render_context_tree(id);
                rebuilt += 1;
            }
        }
        rebuilt
    }
}

#[cfg(test)]
#[path = "tests/tree_tests.rs"]
mod tests;
