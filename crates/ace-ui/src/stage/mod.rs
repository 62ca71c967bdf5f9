//! Page stack: the children of the stage node, last child on top.

mod page;
mod transition;

pub use page::{PageInfo, PagePattern};
pub use transition::{
    PageTransitionEffect, PageTransitionType, PageVisual, RouteType, SlideEffect,
    TransitionDirection,
};

use ace_animation::Lerp;
use ace_core::collections::map::HashMap;
use ace_core::{tags, DirtyFlag, Epoch, EpochCounter, LayoutPolicy, NodeId, NodeTree, Visibility};

use crate::config::PageHideOrder;
use crate::context::UiContext;
use crate::observer::RouterPageState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingTransition {
    page: NodeId,
    transition: PageTransitionType,
}

/// Drives page push and pop with their lifecycle callbacks and transitions.
///
/// At most one transition is in flight. Starting another operation settles
/// the previous one's bookkeeping at once and moves the epoch on, so its
/// animation callbacks become no-ops.
pub struct StageManager {
    stage: NodeId,
    pages: HashMap<NodeId, PagePattern>,
    current_page: Option<NodeId>,
    src_page: Option<NodeId>,
    dest_page: Option<NodeId>,
    transitions: EpochCounter,
    pending: Vec<PendingTransition>,
}

impl StageManager {
    pub fn new(stage: NodeId) -> Self {
        Self {
            stage,
            pages: HashMap::default(),
            current_page: None,
            src_page: None,
            dest_page: None,
            transitions: EpochCounter::new(),
            pending: Vec::new(),
        }
    }

    pub fn stage_node(&self) -> NodeId {
        self.stage
    }

    pub fn page(&self, id: NodeId) -> Option<&PagePattern> {
        self.pages.get(&id)
    }

    pub fn page_mut(&mut self, id: NodeId) -> Option<&mut PagePattern> {
        self.pages.get_mut(&id)
    }

    /// Pages created and not yet destroyed, mounted or not.
    pub fn page_pattern_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page(&self) -> Option<NodeId> {
        self.current_page
    }

    pub fn transition_pages(&self) -> (Option<NodeId>, Option<NodeId>) {
        (self.src_page, self.dest_page)
    }

    pub fn is_stage_in_transition(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn forget_page(&mut self, id: NodeId) {
        if self.pages.remove(&id).is_some() {
            log::debug!("page {id} destroyed");
        }
        if self.current_page == Some(id) {
            self.current_page = None;
        }
    }

    pub(crate) fn notify_page_state(ctx: &mut UiContext, page: NodeId, state: RouterPageState) {
        if let Some(pattern) = ctx.stage.pages.get(&page) {
            pattern.notify_state(&mut ctx.observer, state);
        }
    }

    /// Creates an unmounted page whose content is produced by `build` when
    /// the page is first pushed.
    pub fn create_page(
        ctx: &mut UiContext,
        info: PageInfo,
        build: impl FnOnce(&mut NodeTree, NodeId) + 'static,
    ) -> NodeId {
        let tree = ctx.pipeline.tree_mut();
        let page = tree.spawn_frame(tags::PAGE);
        if let Ok(frame) = tree.frame_mut(page) {
            frame.layout_policy = LayoutPolicy::MatchParent;
        }
        let content = tree.spawn_custom(tags::JS_VIEW, build);
        if let Err(err) = tree.append_child(page, content) {
            log::warn!("page content not mounted: {err}");
        }
        tree.set_observe_lifecycle(page, true);
        log::debug!("page {} created for {}", page, info.url);
        ctx.stage.pages.insert(page, PagePattern::new(page, info));
        page
    }

    pub fn get_last_page(ctx: &UiContext) -> Option<NodeId> {
        ctx.pipeline.tree().children(ctx.stage.stage).last().copied()
    }

    pub fn get_prev_page(ctx: &UiContext) -> Option<NodeId> {
        let children = ctx.pipeline.tree().children(ctx.stage.stage);
        children.len().checked_sub(2).map(|index| children[index])
    }

    pub fn page_count(ctx: &UiContext) -> usize {
        ctx.pipeline.tree().child_count(ctx.stage.stage)
    }

    pub fn push_page(
        ctx: &mut UiContext,
        node: NodeId,
        need_hide_last: bool,
        need_transition: bool,
    ) -> bool {
        if !ctx.stage.pages.contains_key(&node) {
            log::warn!("push_page: node {node} is not a page");
            return false;
        }
        let stage = ctx.stage.stage;
        Self::stop_page_transition(ctx);
        let children = ctx.pipeline.tree().children(stage);
        if children.contains(&node) {
            log::warn!("push_page: page {node} is already on the stage");
            return false;
        }
        if let Err(err) = ctx.pipeline.tree().can_add_child(stage, node, false) {
            log::warn!("push_page: page {node} not mounted: {err}");
            return false;
        }
        let need_transition = need_transition && !children.is_empty();
        if need_transition {
            ctx.pipeline.flush_layout();
        }
        let out_page = children.last().copied();
        let hide_target = out_page.filter(|_| need_hide_last);
        let exit_type = if need_transition {
            PageTransitionType::ExitPush
        } else {
            PageTransitionType::None
        };
        let hide_after_mount = ctx.config.page_hide_order == PageHideOrder::AfterMount;
        if let Some(out) = hide_target.filter(|_| !hide_after_mount) {
            Self::fire_page_hide(ctx, out, exit_type);
        }

        let tree = ctx.pipeline.tree_mut();
        let stage_rect = tree.frame(stage).map(|frame| frame.geometry).unwrap_or_default();
        if let Ok(frame) = tree.frame_mut(node) {
            frame.geometry = stage_rect;
        }
        if let Err(err) = tree.mount_to_parent(node, stage, None, false, false) {
            log::warn!("push_page: page {node} not mounted: {err}");
            return false;
        }
        tree.build(node);
        if let Some(pattern) = ctx.stage.pages.get_mut(&node) {
            pattern.mark_render_done();
        }
        ctx.dispatch_lifecycle_events();

        if let Some(out) = hide_target.filter(|_| hide_after_mount) {
            Self::fire_page_hide(ctx, out, exit_type);
        }
        ctx.pipeline.tree_mut().rebuild_render_context_tree(stage);
        let enter_type = if need_transition {
            PageTransitionType::EnterPush
        } else {
            PageTransitionType::None
        };
        Self::fire_page_show(ctx, node, enter_type);
        ctx.stage.current_page = Some(node);
        log::debug!("page {node} pushed, transition: {need_transition}");

        if need_transition {
            let epoch = Self::prepare_transition(ctx, out_page, Some(node), RouteType::Push);
            ctx.tasks.add_after_layout_task(
                "ArkUIPageTransition",
                Box::new(move |ctx: &mut UiContext| StageManager::start_transition(ctx, epoch)),
            );
        }
        Self::request_stage_frame(ctx);
        true
    }

    pub fn pop_page(ctx: &mut UiContext, need_show_next: bool, need_transition: bool) -> bool {
        Self::stop_page_transition(ctx);
        let children = ctx.pipeline.tree().children(ctx.stage.stage);
        let Some(&out) = children.last() else {
            log::warn!("pop_page: stage has no page");
            return false;
        };
        let need_transition = need_transition && children.len() > 1;
        if need_transition {
            ctx.pipeline.flush_layout();
        }
        let in_page = children.len().checked_sub(2).map(|index| children[index]);
        Self::pop_to(ctx, out, in_page, need_show_next, need_transition);
        log::debug!("page {out} popped, transition: {need_transition}");
        true
    }

    /// Pops every page above `index`.
    pub fn pop_page_to_index(
        ctx: &mut UiContext,
        index: usize,
        need_show_next: bool,
        need_transition: bool,
    ) -> bool {
        Self::stop_page_transition(ctx);
        let stage = ctx.stage.stage;
        let children = ctx.pipeline.tree().children(stage);
        if index >= children.len() {
            log::warn!("pop_page_to_index: {index} out of {} pages", children.len());
            return false;
        }
        let top = children.len() - 1;
        if index == top {
            return true;
        }
        if need_transition {
            ctx.pipeline.flush_layout();
        }
        let tree = ctx.pipeline.tree_mut();
        for &page in &children[index + 1..top] {
            tree.remove_child(stage, page, false);
        }
        Self::pop_to(ctx, children[top], Some(children[index]), need_show_next, need_transition);
        true
    }

    fn pop_to(
        ctx: &mut UiContext,
        out: NodeId,
        in_page: Option<NodeId>,
        need_show_next: bool,
        need_transition: bool,
    ) {
        let (exit_type, enter_type) = if need_transition {
            (PageTransitionType::ExitPop, PageTransitionType::EnterPop)
        } else {
            (PageTransitionType::None, PageTransitionType::None)
        };
        Self::fire_page_hide(ctx, out, exit_type);
        let shown = in_page.filter(|_| need_show_next);
        if let Some(page) = shown {
            Self::fire_page_show(ctx, page, enter_type);
        }
        ctx.stage.current_page = in_page;
        if need_transition {
            let epoch = Self::prepare_transition(ctx, Some(out), shown, RouteType::Pop);
            Self::start_transition(ctx, epoch);
        } else {
            Self::remove_page(ctx, out);
        }
        let stage = ctx.stage.stage;
        ctx.pipeline.tree_mut().rebuild_render_context_tree(stage);
        ctx.dispatch_lifecycle_events();
        Self::request_stage_frame(ctx);
    }

    /// Drops every page below the top one.
    pub fn clean_page_stack(ctx: &mut UiContext) -> bool {
        Self::stop_page_transition(ctx);
        let stage = ctx.stage.stage;
        let children = ctx.pipeline.tree().children(stage);
        if children.len() < 2 {
            return false;
        }
        let tree = ctx.pipeline.tree_mut();
        for &page in &children[..children.len() - 1] {
            tree.remove_child(stage, page, false);
        }
        tree.rebuild_render_context_tree(stage);
        ctx.dispatch_lifecycle_events();
        Self::request_stage_frame(ctx);
        true
    }

    /// Brings the mounted page at `index` to the top.
    pub fn move_page_to_front(
        ctx: &mut UiContext,
        index: usize,
        need_hide_last: bool,
        need_transition: bool,
    ) -> bool {
        Self::stop_page_transition(ctx);
        let stage = ctx.stage.stage;
        let children = ctx.pipeline.tree().children(stage);
        let Some(&page) = children.get(index) else {
            log::warn!("move_page_to_front: {index} out of {} pages", children.len());
            return false;
        };
        let top = children.len() - 1;
        if index == top {
            log::debug!("page {page} is already on top");
            return true;
        }
        if need_transition {
            ctx.pipeline.flush_layout();
        }
        let out = children[top];
        let (exit_type, enter_type) = if need_transition {
            (PageTransitionType::ExitPush, PageTransitionType::EnterPush)
        } else {
            (PageTransitionType::None, PageTransitionType::None)
        };
        if need_hide_last {
            Self::fire_page_hide(ctx, out, exit_type);
        }
        let tree = ctx.pipeline.tree_mut();
        tree.move_position(page, top);
        if let Some(pattern) = ctx.stage.pages.get(&page) {
            pattern.reset_page_transition_effect(tree);
        }
        tree.rebuild_render_context_tree(stage);
        Self::fire_page_show(ctx, page, enter_type);
        ctx.stage.current_page = Some(page);
        if need_transition {
            let epoch = Self::prepare_transition(ctx, Some(out), Some(page), RouteType::Push);
            Self::start_transition(ctx, epoch);
        }
        Self::request_stage_frame(ctx);
        true
    }

    /// Pushes `node` over the current top page, then drops that page.
    pub fn replace_page(ctx: &mut UiContext, node: NodeId) -> bool {
        let previous = Self::get_last_page(ctx);
        if !Self::push_page(ctx, node, false, false) {
            return false;
        }
        if let Some(previous) = previous {
            Self::fire_page_hide(ctx, previous, PageTransitionType::None);
            Self::remove_page(ctx, previous);
            let stage = ctx.stage.stage;
            ctx.pipeline.tree_mut().rebuild_render_context_tree(stage);
            ctx.dispatch_lifecycle_events();
        }
        true
    }

    /// Routes a back press to the top page. Returns whether it was consumed.
    pub fn on_back_pressed(ctx: &mut UiContext) -> bool {
        let Some(page) = Self::get_last_page(ctx) else {
            return false;
        };
        match ctx.stage.pages.get_mut(&page) {
            Some(pattern) => pattern.on_back_pressed(&mut ctx.observer),
            None => false,
        }
    }

    pub fn fire_page_show(ctx: &mut UiContext, page: NodeId, transition: PageTransitionType) {
        if let Some(pattern) = ctx.stage.pages.get_mut(&page) {
            pattern.on_show(&mut ctx.observer);
            if transition == PageTransitionType::None {
                pattern.focus_view_show();
            }
        }
        if let Ok(frame) = ctx.pipeline.tree_mut().frame_mut(page) {
            frame.active = true;
            frame.visibility = Visibility::Visible;
        }
    }

    /// Without a transition the page is hidden at once; otherwise when its
    /// exit transition ends.
    pub fn fire_page_hide(ctx: &mut UiContext, page: NodeId, transition: PageTransitionType) {
        if let Some(pattern) = ctx.stage.pages.get_mut(&page) {
            pattern.on_hide(&mut ctx.observer);
        }
        if transition == PageTransitionType::None {
            Self::process_hide_state(ctx.pipeline.tree_mut(), page);
        }
    }

    fn process_hide_state(tree: &mut NodeTree, page: NodeId) {
        if let Ok(frame) = tree.frame_mut(page) {
            frame.active = false;
            frame.visibility = Visibility::Invisible;
        }
    }

    /// Settles the in-flight transition at once. Its animations keep running
    /// but no longer touch the pages.
    pub fn stop_page_transition(ctx: &mut UiContext) {
        ctx.stage.transitions.advance();
        ctx.stage.src_page = None;
        ctx.stage.dest_page = None;
        let pending = std::mem::take(&mut ctx.stage.pending);
        for entry in pending {
            log::debug!("page {} transition {:?} stopped", entry.page, entry.transition);
            Self::settle_transition(ctx, entry.page, entry.transition);
        }
    }

    fn prepare_transition(
        ctx: &mut UiContext,
        src: Option<NodeId>,
        dest: Option<NodeId>,
        route: RouteType,
    ) -> Epoch {
        let (exit_type, enter_type) = match route {
            RouteType::Pop => (PageTransitionType::ExitPop, PageTransitionType::EnterPop),
            _ => (PageTransitionType::ExitPush, PageTransitionType::EnterPush),
        };
        ctx.stage.src_page = src;
        ctx.stage.dest_page = dest;
        let entries = [(src, exit_type), (dest, enter_type)];
        for (page, transition) in entries {
            let Some(page) = page else {
                continue;
            };
            ctx.stage.pending.push(PendingTransition { page, transition });
            if let Some(pattern) = ctx.stage.pages.get_mut(&page) {
                pattern.set_page_in_transition(true);
            }
            if let Ok(frame) = ctx.pipeline.tree_mut().frame_mut(page) {
                frame.enabled = false;
            }
        }
        ctx.stage.transitions.current()
    }

    fn start_transition(ctx: &mut UiContext, epoch: Epoch) {
        if !ctx.stage.transitions.is_current(epoch) {
            log::debug!("stale page transition skipped");
            return;
        }
        let pending = ctx.stage.pending.clone();
        for entry in pending {
            Self::fire_page_transition(ctx, entry.page, entry.transition, epoch);
        }
    }

    fn fire_page_transition(
        ctx: &mut UiContext,
        page: NodeId,
        transition: PageTransitionType,
        epoch: Epoch,
    ) {
        let duration = ctx.config.page_transition_duration_ms;
        let effect = ctx
            .stage
            .pages
            .get(&page)
            .and_then(|pattern| pattern.page_transition_effect(transition, duration));
        let Some(effect) = effect.filter(PageTransitionEffect::is_animated) else {
            Self::finish_page_transition(ctx, page, transition);
            return;
        };
        let size = ctx
            .pipeline
            .tree()
            .frame(page)
            .map(|frame| frame.geometry.size())
            .unwrap_or_default();
        let (from, to) = effect.endpoints(size);
        apply_visual(ctx.pipeline.tree_mut(), page, from);
        ctx.animations.start(
            "ArkUIPageTransition",
            effect.option,
            Box::new(move |ctx: &mut UiContext, fraction: f32| {
                if ctx.stage.transitions.is_current(epoch) {
                    apply_visual(ctx.pipeline.tree_mut(), page, from.lerp(&to, fraction));
                }
            }),
            Some(Box::new(move |ctx: &mut UiContext| {
                if ctx.stage.transitions.is_current(epoch) {
                    StageManager::finish_page_transition(ctx, page, transition);
                }
            })),
        );
    }

    fn finish_page_transition(ctx: &mut UiContext, page: NodeId, transition: PageTransitionType) {
        let Some(position) = ctx
            .stage
            .pending
            .iter()
            .position(|entry| entry.page == page && entry.transition == transition)
        else {
            return;
        };
        ctx.stage.pending.remove(position);
        Self::settle_transition(ctx, page, transition);
        if ctx.stage.pending.is_empty() {
            ctx.stage.src_page = None;
            ctx.stage.dest_page = None;
        }
    }

    fn settle_transition(ctx: &mut UiContext, page: NodeId, transition: PageTransitionType) {
        if let Some(pattern) = ctx.stage.pages.get_mut(&page) {
            pattern.set_page_in_transition(false);
        }
        match transition {
            PageTransitionType::ExitPop => {
                Self::remove_page(ctx, page);
                let stage = ctx.stage.stage;
                ctx.pipeline.tree_mut().rebuild_render_context_tree(stage);
                ctx.dispatch_lifecycle_events();
                ctx.pipeline.request_frame();
            }
            PageTransitionType::ExitPush => {
                let tree = ctx.pipeline.tree_mut();
                apply_visual(tree, page, PageVisual::IDENTITY);
                if let Ok(frame) = tree.frame_mut(page) {
                    frame.enabled = true;
                }
                Self::process_hide_state(tree, page);
            }
            PageTransitionType::EnterPush | PageTransitionType::EnterPop => {
                let tree = ctx.pipeline.tree_mut();
                apply_visual(tree, page, PageVisual::IDENTITY);
                if let Ok(frame) = tree.frame_mut(page) {
                    frame.enabled = true;
                }
                if let Some(pattern) = ctx.stage.pages.get_mut(&page) {
                    pattern.focus_view_show();
                }
            }
            PageTransitionType::None => {}
        }
    }

    fn remove_page(ctx: &mut UiContext, page: NodeId) {
        let stage = ctx.stage.stage;
        if ctx.pipeline.tree_mut().remove_child(stage, page, false).is_none() {
            log::debug!("page {page} was no longer on the stage");
        }
    }

    fn request_stage_frame(ctx: &mut UiContext) {
        let stage = ctx.stage.stage;
        let has_size = ctx
            .pipeline
            .tree()
            .frame(stage)
            .is_ok_and(|frame| frame.geometry.size().is_positive());
        if has_size {
            ctx.pipeline.mark_dirty(stage, DirtyFlag::Layout);
        } else {
            log::debug!("stage has no size yet, frame not requested");
        }
    }
}

fn apply_visual(tree: &mut NodeTree, page: NodeId, visual: PageVisual) {
    if let Ok(frame) = tree.frame_mut(page) {
        frame.render.translate = visual.translate;
        frame.render.opacity = visual.opacity;
    }
}

#[cfg(test)]
#[path = "../tests/stage_tests.rs"]
mod tests;
