use std::cell::RefCell;
use std::rc::Rc;

use ace_core::{tags, NodeId};
use ace_runtime_std::StdRuntime;
use ace_ui::observer::{RouterPageInfo, RouterPageState};
use ace_ui::window::HeadlessWindowFactory;
use ace_ui::{PageInfo, StageManager, UiConfig, UiContext};

/// Shared, clonable record of whatever a test callback observed.
pub type EventLog<T> = Rc<RefCell<Vec<T>>>;

/// Headless harness for driving a [`UiContext`] in tests.
///
/// The rule owns a virtual clock: every frame advances it by
/// [`UiTestRule::FRAME_MILLIS`], so animations and delayed tasks progress
/// deterministically. Windows are in-memory and can be inspected through
/// [`UiTestRule::windows`].
pub struct UiTestRule {
    ctx: UiContext,
    runtime: StdRuntime,
    windows: HeadlessWindowFactory,
    now_millis: u64,
    next_page_id: i32,
}

impl UiTestRule {
    pub const FRAME_MILLIS: u64 = 16;
    /// Upper bound on frames spent by [`UiTestRule::pump_until_idle`].
    pub const MAX_IDLE_FRAMES: usize = 1_000;

    pub fn new() -> Self {
        Self::with_config(UiConfig::default())
    }

    /// A rule with a 400x800 surface.
    pub fn with_config(config: UiConfig) -> Self {
        let runtime = StdRuntime::new();
        let windows = HeadlessWindowFactory::new();
        let ctx = UiContext::new(
            1,
            runtime.runtime_scheduler(),
            config,
            Box::new(windows.clone()),
        );
        let mut rule = Self {
            ctx,
            runtime,
            windows,
            now_millis: 0,
            next_page_id: 1,
        };
        rule.set_surface(400.0, 800.0);
        rule
    }

    pub fn ctx(&self) -> &UiContext {
        &self.ctx
    }

    pub fn ctx_mut(&mut self) -> &mut UiContext {
        &mut self.ctx
    }

    pub fn windows(&self) -> &HeadlessWindowFactory {
        &self.windows
    }

    pub fn now_millis(&self) -> u64 {
        self.now_millis
    }

    pub fn set_surface(&mut self, width: f32, height: f32) {
        self.ctx.on_surface_changed(width, height);
        self.pump_until_idle();
    }

    /// Runs one frame `delta_millis` after the previous one. Returns whether
    /// another frame was requested.
    pub fn advance_frame(&mut self, delta_millis: u64) -> bool {
        self.now_millis += delta_millis;
        self.ctx.flush_frame(self.now_millis)
    }

    /// Runs frames until nothing asks for another one. Returns the number of
    /// frames run.
    pub fn pump_until_idle(&mut self) -> usize {
        let mut frames = 0;
        loop {
            let requested = self.runtime.take_frame_request();
            if !requested && !self.ctx.needs_frame() {
                return frames;
            }
            if frames == Self::MAX_IDLE_FRAMES {
                log::warn!("ui still busy after {frames} frames");
                return frames;
            }
            self.advance_frame(Self::FRAME_MILLIS);
            frames += 1;
        }
    }

    /// Creates a page for `url` holding a column with one text node.
    pub fn create_page(&mut self, url: &str) -> NodeId {
        let page_id = self.next_page_id;
        self.next_page_id += 1;
        StageManager::create_page(&mut self.ctx, PageInfo::new(page_id, url), |tree, parent| {
            let column = tree.spawn_frame(tags::COLUMN);
            let text = tree.spawn_frame(tags::TEXT);
            if tree.append_child(column, text).is_ok() {
                let _ = tree.append_child(parent, column);
            }
        })
    }

    /// Records `url:state` for every router page notification.
    pub fn record_router_events(&mut self) -> EventLog<String> {
        let log = EventLog::default();
        let sink = Rc::clone(&log);
        self.ctx
            .observer
            .set_router_page_handler(move |info: &RouterPageInfo| {
                sink.borrow_mut().push(format!("{}:{}", info.url, state_name(info.state)));
            });
        log
    }

    /// Records `url:show` and `url:hide` from the page's own callbacks.
    pub fn record_page_visibility(&mut self, page: NodeId, log: &EventLog<String>) {
        let Some(pattern) = self.ctx.stage.page_mut(page) else {
            return;
        };
        let url = pattern.info().url.clone();
        let show = (Rc::clone(log), url.clone());
        pattern.set_on_page_show(move || show.0.borrow_mut().push(format!("{}:show", show.1)));
        let hide = (Rc::clone(log), url);
        pattern.set_on_page_hide(move || hide.0.borrow_mut().push(format!("{}:hide", hide.1)));
    }
}

impl Default for UiTestRule {
    fn default() -> Self {
        Self::new()
    }
}

fn state_name(state: RouterPageState) -> &'static str {
    match state {
        RouterPageState::AboutToAppear => "aboutToAppear",
        RouterPageState::AboutToDisappear => "aboutToDisappear",
        RouterPageState::OnPageShow => "onPageShow",
        RouterPageState::OnPageHide => "onPageHide",
        RouterPageState::OnBackPress => "onBackPress",
    }
}

/// Convenience helper for tests that only need temporary access to a
/// `UiTestRule`.
pub fn run_ui_test<R>(f: impl FnOnce(&mut UiTestRule) -> R) -> R {
    crate::init_logging();
    let mut rule = UiTestRule::new();
    f(&mut rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_rule_runs_no_frames() {
        let mut rule = UiTestRule::new();
        assert_eq!(rule.pump_until_idle(), 0);
        assert_eq!(rule.ctx().root_size().width, 400.0);
    }

    #[test]
    fn pages_get_increasing_ids() {
        let mut rule = UiTestRule::new();
        let first = rule.create_page("pages/a");
        let second = rule.create_page("pages/b");
        let ctx = rule.ctx();
        assert_eq!(ctx.stage.page(first).map(|p| p.info().page_id), Some(1));
        assert_eq!(ctx.stage.page(second).map(|p| p.info().page_id), Some(2));
    }
}
