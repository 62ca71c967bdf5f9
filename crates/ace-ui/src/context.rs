use std::sync::Arc;

use ace_animation::{
    finish_all_animations, pump_animations, AnimationDriver, AnimationOption, Curve, Lerp,
};
use ace_core::{
    run_after_layout_tasks, run_ready_tasks, tags, DefaultScheduler, DirtyFlag, LayoutPolicy,
    LifecycleEvent, NodeId, NodeTree, PipelineContext, PipelineId, RuntimeScheduler, TaskQueue,
};
use ace_ui_graphics::Size;

use crate::config::UiConfig;
use crate::observer::{RouterPageState, UiObserver};
use crate::overlay::OverlayManager;
use crate::safe_area::{SafeAreaInsets, SafeAreaManager};
use crate::sheet::SheetPresentationPattern;
use crate::stage::StageManager;
use crate::subwindow::SubwindowManager;
use crate::text_field::TextFieldManager;
use crate::window::{HeadlessWindowFactory, WindowFactory};

/// Everything one UI instance owns. Entry points take it explicitly; there
/// is no ambient "current instance".
pub struct UiContext {
    pub pipeline: PipelineContext,
    pub config: UiConfig,
    pub stage: StageManager,
    pub overlay: OverlayManager,
    pub safe_area: SafeAreaManager,
    pub text_field: TextFieldManager,
    pub observer: UiObserver,
    pub subwindows: SubwindowManager,
    pub animations: AnimationDriver<UiContext>,
    pub tasks: TaskQueue<UiContext>,
}

fn animations_of(ctx: &mut UiContext) -> &mut AnimationDriver<UiContext> {
    &mut ctx.animations
}

fn tasks_of(ctx: &mut UiContext) -> &mut TaskQueue<UiContext> {
    &mut ctx.tasks
}

impl UiContext {
    pub fn new(
        id: PipelineId,
        scheduler: Arc<dyn RuntimeScheduler>,
        config: UiConfig,
        windows: Box<dyn WindowFactory>,
    ) -> Self {
        let mut pipeline = PipelineContext::new(id, scheduler);
        let root = pipeline.root();
        let tree = pipeline.tree_mut();
        let stage = tree.spawn_frame(tags::STAGE);
        if let Ok(frame) = tree.frame_mut(stage) {
            frame.layout_policy = LayoutPolicy::MatchParent;
        }
        if let Err(err) = tree.append_child(root, stage) {
            log::error!("stage not mounted: {err}");
        }
        log::debug!("ui context {id} created, api version {}", config.api_version);
        Self {
            pipeline,
            config,
            stage: StageManager::new(stage),
            overlay: OverlayManager::new(),
            safe_area: SafeAreaManager::new(),
            text_field: TextFieldManager::new(),
            observer: UiObserver::new(),
            subwindows: SubwindowManager::new(windows),
            animations: AnimationDriver::new(),
            tasks: TaskQueue::new(),
        }
    }

    /// A context without a platform: frames are driven by hand and windows
    /// are in-memory.
    pub fn headless(id: PipelineId, config: UiConfig) -> Self {
        Self::new(
            id,
            Arc::new(DefaultScheduler),
            config,
            Box::new(HeadlessWindowFactory::new()),
        )
    }

    pub fn id(&self) -> PipelineId {
        self.pipeline.id()
    }

    pub fn root(&self) -> NodeId {
        self.pipeline.root()
    }

    pub fn stage_node(&self) -> NodeId {
        self.stage.stage_node()
    }

    pub fn tree(&self) -> &NodeTree {
        self.pipeline.tree()
    }

    pub fn tree_mut(&mut self) -> &mut NodeTree {
        self.pipeline.tree_mut()
    }

    pub fn root_size(&self) -> Size {
        self.pipeline.root_rect().size()
    }

    pub fn needs_frame(&self) -> bool {
        self.pipeline.runtime().needs_frame()
    }

    pub fn on_surface_changed(&mut self, width: f32, height: f32) {
        self.pipeline.on_surface_changed(width, height);
        self.pipeline.flush_layout();
        let id = self.id();
        self.subwindows
            .resize(self.pipeline.tree_mut(), id, width, height);
        for sheet in self.overlay.sheet_ids() {
            OverlayManager::init_sheet(self, sheet);
        }
    }

    pub fn update_system_safe_area(&mut self, insets: SafeAreaInsets) -> bool {
        let changed = self.safe_area.update_system_safe_area(insets);
        if changed {
            let root = self.root();
            self.pipeline.mark_dirty(root, DirtyFlag::Layout);
        }
        changed
    }

    /// Records a new keyboard height and lets every sheet re-avoid it.
    pub fn update_keyboard(&mut self, height: f32) -> bool {
        let root_height = self.root_size().height;
        if !self.safe_area.update_keyboard_safe_area(height, root_height) {
            return false;
        }
        log::debug!("keyboard height {height}");
        for sheet in self.overlay.sheet_ids() {
            SheetPresentationPattern::avoid_safe_area(self, sheet);
        }
        true
    }

    /// Runs one frame at `now_millis`: due tasks, layout, after-layout
    /// tasks, animations, exit transitions and parked removals, then the
    /// render tree. Returns whether another
    /// frame was requested meanwhile.
    pub fn flush_frame(&mut self, now_millis: u64) -> bool {
        self.pipeline.begin_frame(now_millis.saturating_mul(1_000_000));
        self.tasks.advance_to(now_millis);
        run_ready_tasks(self, tasks_of);
        self.pipeline.flush_layout();
        run_after_layout_tasks(self, tasks_of);
        pump_animations(self, animations_of, now_millis);
        self.dispatch_lifecycle_events();
        self.start_exit_transitions();
        self.pipeline.tree_mut().clear_pending_remove_nodes();
        self.pipeline.flush_render_tree();
        if self.animations.has_running() || self.tasks.has_pending() {
            self.pipeline.request_frame();
        }
        self.needs_frame()
    }

    /// Fades out every frame that began an exit transition, then lets the
    /// tree drop the parked subtree.
    fn start_exit_transitions(&mut self) {
        let option =
            AnimationOption::new(self.config.exit_transition_duration_ms, Curve::FastOutSlowIn);
        for node in self.pipeline.tree_mut().take_exit_transitions() {
            let Ok(frame) = self.pipeline.tree().frame(node) else {
                continue;
            };
            let from = frame.render.opacity;
            log::debug!("node {node} exit transition");
            self.animations.start(
                "ArkUIDisappear",
                option,
                Box::new(move |ctx: &mut UiContext, fraction: f32| {
                    if let Ok(frame) = ctx.pipeline.tree_mut().frame_mut(node) {
                        frame.render.opacity = if frame.render.has_transition_out {
                            from.lerp(&0.0, fraction)
                        } else {
                            from
                        };
                    }
                }),
                Some(Box::new(move |ctx: &mut UiContext| {
                    if ctx.pipeline.tree_mut().transition_out_finished(node) {
                        ctx.pipeline.request_frame();
                    }
                })),
            );
        }
    }

    /// Jumps every running animation to its end.
    pub fn finish_all_animations(&mut self) {
        finish_all_animations(self, animations_of);
        self.dispatch_lifecycle_events();
    }

    /// Turns node lifecycle events into page notifications.
    pub(crate) fn dispatch_lifecycle_events(&mut self) {
        for event in self.pipeline.tree_mut().take_lifecycle_events() {
            match event {
                LifecycleEvent::Attached(node) => {
                    StageManager::notify_page_state(self, node, RouterPageState::AboutToAppear);
                }
                LifecycleEvent::Detached(node) => {
                    StageManager::notify_page_state(
                        self,
                        node,
                        RouterPageState::AboutToDisappear,
                    );
                }
                LifecycleEvent::Destroyed(node) => self.stage.forget_page(node),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> UiContext {
        let mut ctx = UiContext::headless(1, UiConfig::default());
        ctx.on_surface_changed(400.0, 800.0);
        ctx
    }

    fn run_frames(ctx: &mut UiContext, count: usize) {
        let mut now = ctx.animations.now_millis();
        for _ in 0..count {
            now += 16;
            ctx.flush_frame(now);
        }
    }

    #[test]
    fn exit_transition_fades_then_purges_the_node() {
        let mut ctx = context();
        let stage = ctx.stage_node();
        let item = ctx.tree_mut().spawn_frame(tags::TEXT);
        ctx.tree_mut().frame_mut(item).expect("frame").disappear_transition = true;
        ctx.tree_mut().append_child(stage, item).expect("mounted");
        run_frames(&mut ctx, 1);

        assert_eq!(ctx.tree_mut().remove_child(stage, item, true), Some(0));
        assert_eq!(ctx.tree().disappearing_children(stage).len(), 1);
        run_frames(&mut ctx, 2);
        let opacity = ctx.tree().frame(item).expect("frame").render.opacity;
        assert!(opacity < 1.0 && opacity > 0.0, "opacity {opacity}");

        run_frames(&mut ctx, 20);
        assert!(ctx.tree().disappearing_children(stage).is_empty());
        assert!(!ctx.tree().contains(item));
        assert!(ctx.tree_mut().take_exit_transitions().is_empty());
    }

    #[test]
    fn readded_node_keeps_its_opacity() {
        let mut ctx = context();
        let stage = ctx.stage_node();
        let item = ctx.tree_mut().spawn_frame(tags::TEXT);
        ctx.tree_mut().frame_mut(item).expect("frame").disappear_transition = true;
        ctx.tree_mut().append_child(stage, item).expect("mounted");
        ctx.tree_mut().remove_child(stage, item, true);
        run_frames(&mut ctx, 2);

        ctx.tree_mut().append_child(stage, item).expect("re-added");
        run_frames(&mut ctx, 20);
        assert!(ctx.tree().contains(item));
        assert_eq!(ctx.tree().children(stage), vec![item]);
        assert_eq!(ctx.tree().frame(item).expect("frame").render.opacity, 1.0);
    }

    #[test]
    fn parked_subtrees_are_released_at_frame_end() {
        let mut ctx = context();
        let stage = ctx.stage_node();
        let column = ctx.tree_mut().spawn_frame(tags::COLUMN);
        let hero = ctx.tree_mut().spawn_frame("hero");
        ctx.tree_mut().frame_mut(hero).expect("frame").geometry_transition =
            Some("shared".into());
        ctx.tree_mut().append_child(stage, column).expect("column");
        ctx.tree_mut().append_child(column, hero).expect("hero");

        ctx.tree_mut().clean(column, false, false);
        assert_eq!(ctx.tree().pending_remove_nodes(), &[hero]);
        assert!(ctx.tree().contains(hero));

        run_frames(&mut ctx, 1);
        assert!(ctx.tree().pending_remove_nodes().is_empty());
        assert!(!ctx.tree().contains(hero));
    }
}
