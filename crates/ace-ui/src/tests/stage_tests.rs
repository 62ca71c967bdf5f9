use std::cell::RefCell;
use std::rc::Rc;

use ace_ui_graphics::Point;

use super::*;
use crate::config::UiConfig;

type Log = Rc<RefCell<Vec<String>>>;

fn context(config: UiConfig) -> UiContext {
    let mut ctx = UiContext::headless(1, config);
    ctx.on_surface_changed(400.0, 800.0);
    ctx
}

fn page(ctx: &mut UiContext, log: &Log, name: &'static str) -> NodeId {
    let node = StageManager::create_page(ctx, PageInfo::new(1, name), |tree, parent| {
        let text = tree.spawn_frame(tags::TEXT);
        tree.append_child(parent, text).expect("content");
    });
    let pattern = ctx.stage.page_mut(node).expect("pattern");
    let show_log = Rc::clone(log);
    pattern.set_on_page_show(move || show_log.borrow_mut().push(format!("{name}:show")));
    let hide_log = Rc::clone(log);
    pattern.set_on_page_hide(move || hide_log.borrow_mut().push(format!("{name}:hide")));
    node
}

fn settle(ctx: &mut UiContext) {
    let mut now = ctx.animations.now_millis();
    for _ in 0..8 {
        now += 1000;
        ctx.flush_frame(now);
    }
}

fn stage_children(ctx: &UiContext) -> Vec<NodeId> {
    ctx.tree().children(ctx.stage_node())
}

fn visibility(ctx: &UiContext, node: NodeId) -> Visibility {
    ctx.tree().frame(node).expect("frame").visibility
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

#[test]
fn push_push_pop_leaves_first_page_shown() {
    let mut ctx = context(UiConfig::default());
    let log = Log::default();
    let a = page(&mut ctx, &log, "A");
    let b = page(&mut ctx, &log, "B");

    assert!(StageManager::push_page(&mut ctx, a, true, true));
    assert!(StageManager::push_page(&mut ctx, b, true, false));
    assert_eq!(stage_children(&ctx), vec![a, b]);
    assert_eq!(visibility(&ctx, a), Visibility::Invisible);

    assert!(StageManager::pop_page(&mut ctx, true, false));
    assert_eq!(stage_children(&ctx), vec![a]);
    assert_eq!(
        entries(&log),
        vec!["A:show", "A:hide", "B:show", "B:hide", "A:show"]
    );
    assert!(!ctx.tree().contains(b));
    assert!(ctx.stage.page(b).is_none());
    assert_eq!(ctx.stage.current_page(), Some(a));
    assert_eq!(visibility(&ctx, a), Visibility::Visible);
}

#[test]
fn animated_push_and_pop_settle_after_frames() {
    let mut ctx = context(UiConfig::default());
    let log = Log::default();
    let a = page(&mut ctx, &log, "A");
    let b = page(&mut ctx, &log, "B");

    assert!(StageManager::push_page(&mut ctx, a, true, true));
    assert!(!ctx.stage.is_stage_in_transition());

    assert!(StageManager::push_page(&mut ctx, b, true, true));
    assert!(ctx.stage.is_stage_in_transition());
    assert_eq!(ctx.stage.transition_pages(), (Some(a), Some(b)));
    assert!(!ctx.tree().frame(a).expect("frame").enabled);
    assert!(ctx.stage.page(b).expect("b").is_page_in_transition());
    assert_eq!(ctx.tasks.pending_after_layout(), 1);

    settle(&mut ctx);
    assert!(!ctx.stage.is_stage_in_transition());
    assert_eq!(visibility(&ctx, a), Visibility::Invisible);
    assert!(ctx.tree().frame(a).expect("frame").enabled);
    assert_eq!(visibility(&ctx, b), Visibility::Visible);
    assert_eq!(ctx.tree().frame(b).expect("frame").render.translate, Point::ZERO);
    assert_eq!(ctx.stage.page(b).expect("b").focus_show_count(), 1);

    assert!(StageManager::pop_page(&mut ctx, true, true));
    assert!(ctx.stage.is_stage_in_transition());
    assert_eq!(stage_children(&ctx), vec![a, b]);
    assert_eq!(visibility(&ctx, a), Visibility::Visible);

    settle(&mut ctx);
    assert_eq!(stage_children(&ctx), vec![a]);
    assert!(!ctx.tree().contains(b));
    assert_eq!(
        entries(&log),
        vec!["A:show", "A:hide", "B:show", "B:hide", "A:show"]
    );
    assert!(!ctx.needs_frame());
}

fn router_log(ctx: &mut UiContext) -> Log {
    let log = Log::default();
    let sink = Rc::clone(&log);
    ctx.observer.set_router_page_handler(move |info| {
        sink.borrow_mut().push(format!("{}:{:?}", info.url, info.state));
    });
    log
}

fn position(log: &[String], entry: &str) -> usize {
    log.iter()
        .position(|line| line == entry)
        .unwrap_or_else(|| panic!("{entry} missing from {log:?}"))
}

#[test]
fn hide_order_follows_api_version() {
    for (api_version, hide_first) in [(12, false), (11, true)] {
        let mut ctx = context(UiConfig::for_api_version(api_version));
        let log = router_log(&mut ctx);
        let pages = Log::default();
        let a = page(&mut ctx, &pages, "A");
        let b = page(&mut ctx, &pages, "B");
        StageManager::push_page(&mut ctx, a, true, false);
        StageManager::push_page(&mut ctx, b, true, false);

        let log = entries(&log);
        let hide = position(&log, "A:OnPageHide");
        let appear = position(&log, "B:AboutToAppear");
        assert_eq!(hide < appear, hide_first, "api {api_version}: {log:?}");
        assert!(position(&log, "B:OnPageShow") > hide);
    }
}

#[test]
fn rejected_push_leaves_the_top_page_shown() {
    let mut ctx = context(UiConfig::for_api_version(11));
    let log = Log::default();
    let a = page(&mut ctx, &log, "A");
    let b = page(&mut ctx, &log, "B");
    assert!(StageManager::push_page(&mut ctx, a, true, false));
    let stage = ctx.stage_node();
    let modal = ctx.tree_mut().spawn_frame(tags::COLUMN);
    ctx.tree_mut().add_modal_child(stage, modal).expect("modal");

    assert!(!StageManager::push_page(&mut ctx, b, true, true));
    assert_eq!(entries(&log), vec!["A:show"]);
    assert!(ctx.stage.page(a).expect("a").is_on_show());
    assert_eq!(visibility(&ctx, a), Visibility::Visible);
    assert_eq!(ctx.stage.current_page(), Some(a));
    assert!(!ctx.tree().children(stage).contains(&b));
}

#[test]
fn zero_sized_stage_does_not_request_a_frame() {
    let mut ctx = UiContext::headless(1, UiConfig::default());
    let log = Log::default();
    let a = page(&mut ctx, &log, "A");
    let before = ctx.pipeline.runtime().frames_requested();
    assert!(StageManager::push_page(&mut ctx, a, true, true));
    assert_eq!(ctx.pipeline.runtime().frames_requested(), before);

    ctx.on_surface_changed(400.0, 800.0);
    let b = page(&mut ctx, &log, "B");
    let before = ctx.pipeline.runtime().frames_requested();
    assert!(StageManager::push_page(&mut ctx, b, true, false));
    assert!(ctx.pipeline.runtime().frames_requested() > before);
}

#[test]
fn new_push_settles_the_running_transition() {
    let mut ctx = context(UiConfig::default());
    let log = Log::default();
    let a = page(&mut ctx, &log, "A");
    let b = page(&mut ctx, &log, "B");
    let c = page(&mut ctx, &log, "C");
    StageManager::push_page(&mut ctx, a, true, false);
    StageManager::push_page(&mut ctx, b, true, true);
    assert!(ctx.stage.is_stage_in_transition());

    StageManager::push_page(&mut ctx, c, true, true);
    assert_eq!(visibility(&ctx, a), Visibility::Invisible);
    assert!(ctx.tree().frame(a).expect("frame").enabled);
    assert_eq!(ctx.stage.page(b).expect("b").focus_show_count(), 1);
    assert_eq!(ctx.stage.transition_pages(), (Some(b), Some(c)));

    settle(&mut ctx);
    assert!(!ctx.stage.is_stage_in_transition());
    assert_eq!(visibility(&ctx, b), Visibility::Invisible);
    assert_eq!(visibility(&ctx, c), Visibility::Visible);
    assert_eq!(stage_children(&ctx), vec![a, b, c]);
}

#[test]
fn push_refuses_unknown_and_stacked_pages() {
    let mut ctx = context(UiConfig::default());
    let log = Log::default();
    let a = page(&mut ctx, &log, "A");
    assert!(StageManager::push_page(&mut ctx, a, true, false));
    assert!(!StageManager::push_page(&mut ctx, a, true, false));

    let stray = ctx.tree_mut().spawn_frame(tags::COLUMN);
    assert!(!StageManager::push_page(&mut ctx, stray, true, false));
    assert_eq!(StageManager::page_count(&ctx), 1);
}

#[test]
fn pop_to_index_drops_everything_above() {
    let mut ctx = context(UiConfig::default());
    let log = Log::default();
    let a = page(&mut ctx, &log, "A");
    let b = page(&mut ctx, &log, "B");
    let c = page(&mut ctx, &log, "C");
    for node in [a, b, c] {
        StageManager::push_page(&mut ctx, node, true, false);
    }
    assert!(!StageManager::pop_page_to_index(&mut ctx, 3, true, false));
    assert!(StageManager::pop_page_to_index(&mut ctx, 2, true, false));
    assert_eq!(stage_children(&ctx), vec![a, b, c]);

    log.borrow_mut().clear();
    assert!(StageManager::pop_page_to_index(&mut ctx, 0, true, false));
    assert_eq!(stage_children(&ctx), vec![a]);
    assert_eq!(entries(&log), vec!["C:hide", "A:show"]);
    assert!(ctx.stage.page(b).is_none());
    assert_eq!(StageManager::get_last_page(&ctx), Some(a));
    assert_eq!(StageManager::get_prev_page(&ctx), None);
}

#[test]
fn clean_keeps_only_the_top_page() {
    let mut ctx = context(UiConfig::default());
    let log = Log::default();
    let a = page(&mut ctx, &log, "A");
    assert!(StageManager::push_page(&mut ctx, a, true, false));
    assert!(!StageManager::clean_page_stack(&mut ctx));

    let b = page(&mut ctx, &log, "B");
    let c = page(&mut ctx, &log, "C");
    StageManager::push_page(&mut ctx, b, true, false);
    StageManager::push_page(&mut ctx, c, true, false);
    assert!(StageManager::clean_page_stack(&mut ctx));
    assert_eq!(stage_children(&ctx), vec![c]);
    assert_eq!(ctx.stage.page_pattern_count(), 1);
}

#[test]
fn move_to_front_reuses_the_mounted_page() {
    let mut ctx = context(UiConfig::default());
    let log = Log::default();
    let a = page(&mut ctx, &log, "A");
    let b = page(&mut ctx, &log, "B");
    let c = page(&mut ctx, &log, "C");
    for node in [a, b, c] {
        StageManager::push_page(&mut ctx, node, true, false);
    }
    assert!(StageManager::move_page_to_front(&mut ctx, 2, true, false));
    assert!(!StageManager::move_page_to_front(&mut ctx, 5, true, false));

    log.borrow_mut().clear();
    assert!(StageManager::move_page_to_front(&mut ctx, 0, true, false));
    assert_eq!(stage_children(&ctx), vec![b, c, a]);
    assert_eq!(entries(&log), vec!["C:hide", "A:show"]);
    assert_eq!(ctx.stage.current_page(), Some(a));
    assert_eq!(visibility(&ctx, a), Visibility::Visible);
}

#[test]
fn replace_swaps_the_top_page() {
    let mut ctx = context(UiConfig::default());
    let log = Log::default();
    let a = page(&mut ctx, &log, "A");
    let b = page(&mut ctx, &log, "B");
    StageManager::push_page(&mut ctx, a, true, false);
    assert!(StageManager::replace_page(&mut ctx, b));
    assert_eq!(stage_children(&ctx), vec![b]);
    assert_eq!(entries(&log), vec!["A:show", "B:show", "A:hide"]);
    assert!(ctx.stage.page(a).is_none());
}

#[test]
fn back_press_is_swallowed_during_transition() {
    let mut ctx = context(UiConfig::default());
    let log = Log::default();
    let a = page(&mut ctx, &log, "A");
    let b = page(&mut ctx, &log, "B");
    let presses = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&presses);
    ctx.stage
        .page_mut(b)
        .expect("b")
        .set_on_back_pressed(move || {
            *counter.borrow_mut() += 1;
            false
        });

    assert!(!StageManager::on_back_pressed(&mut ctx));
    StageManager::push_page(&mut ctx, a, true, false);
    StageManager::push_page(&mut ctx, b, true, true);
    assert!(StageManager::on_back_pressed(&mut ctx));
    assert_eq!(*presses.borrow(), 0);

    settle(&mut ctx);
    assert!(!StageManager::on_back_pressed(&mut ctx));
    assert_eq!(*presses.borrow(), 1);
}

#[test]
fn user_effect_replaces_the_default_slide() {
    let mut ctx = context(UiConfig::default());
    let log = Log::default();
    let a = page(&mut ctx, &log, "A");
    let b = page(&mut ctx, &log, "B");
    ctx.stage
        .page_mut(b)
        .expect("b")
        .add_page_transition(PageTransitionEffect::none(
            TransitionDirection::Enter,
            RouteType::Push,
        ));
    StageManager::push_page(&mut ctx, a, true, false);
    StageManager::push_page(&mut ctx, b, true, true);

    ctx.flush_frame(16);
    let translate = ctx.tree().frame(b).expect("frame").render.translate;
    assert_eq!(translate, Point::ZERO);
    assert!(!ctx.stage.page(b).expect("b").is_page_in_transition());
}
