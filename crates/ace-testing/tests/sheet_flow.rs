use std::cell::RefCell;
use std::rc::Rc;

use ace_core::NodeId;
use ace_testing::prelude::*;
use ace_ui::safe_area::{Inset, SafeAreaInsets};
use ace_ui::sheet::SheetPresentationPattern;

fn with_page(rule: &mut UiTestRule) -> NodeId {
    let page = rule.create_page("pages/index");
    StageManager::push_page(rule.ctx_mut(), page, true, false);
    rule.pump_until_idle();
    page
}

fn translate(rule: &UiTestRule, sheet: NodeId) -> f32 {
    rule.ctx().tree().frame(sheet).expect("frame").render.translate.y
}

fn assert_near(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn sheet_snaps_up_then_dismisses() {
    run_ui_test(|rule| {
        let page = with_page(rule);
        let detents: EventLog<usize> = EventLog::default();
        let closed = Rc::new(RefCell::new(0));
        let detent_log = Rc::clone(&detents);
        let closed_log = Rc::clone(&closed);
        let callbacks = SheetCallbacks {
            on_detents_did_change: Some(Box::new(move |index| detent_log.borrow_mut().push(index))),
            on_disappear: Some(Box::new(move || *closed_log.borrow_mut() += 1)),
            ..SheetCallbacks::default()
        };
        let style = SheetStyle::with_detents([SheetHeight::MEDIUM, SheetHeight::LARGE]);
        let sheet = OverlayManager::open_sheet(rule.ctx_mut(), page, style, callbacks, None)
            .expect("sheet");
        rule.pump_until_idle();
        assert_near(translate(rule, sheet), 320.0);
        check_tree_invariants(rule.ctx().tree(), rule.ctx().root()).expect("opened");

        SheetPresentationPattern::handle_drag_start(rule.ctx_mut(), sheet);
        SheetPresentationPattern::handle_drag_update(rule.ctx_mut(), sheet, -300.0);
        assert_near(translate(rule, sheet), 20.0);
        SheetPresentationPattern::handle_drag_end(rule.ctx_mut(), sheet, -2000.0);
        rule.pump_until_idle();
        assert_near(translate(rule, sheet), 8.0);
        assert_eq!(*detents.borrow(), vec![1]);

        assert!(OverlayManager::dismiss_sheet(rule.ctx_mut(), sheet));
        assert!(!OverlayManager::dismiss_sheet(rule.ctx_mut(), sheet));
        rule.pump_until_idle();
        assert_eq!(*closed.borrow(), 1);
        assert!(rule.ctx().overlay.sheet(sheet).is_none());
        assert!(!rule.ctx().tree().contains(sheet));
        check_tree_invariants(rule.ctx().tree(), rule.ctx().root()).expect("closed");
    });
}

#[test]
fn surface_change_resolves_detents_again() {
    run_ui_test(|rule| {
        let page = with_page(rule);
        let style = SheetStyle::with_detents([SheetHeight::MEDIUM]);
        let sheet = OverlayManager::open_sheet(
            rule.ctx_mut(),
            page,
            style,
            SheetCallbacks::default(),
            None,
        )
        .expect("sheet");
        rule.pump_until_idle();
        assert_near(translate(rule, sheet), 320.0);

        rule.set_surface(400.0, 1000.0);
        let pattern = rule.ctx().overlay.sheet(sheet).expect("pattern");
        assert_near(pattern.height(), 600.0);
        assert_near(translate(rule, sheet), 400.0);
        let geometry = rule.ctx().tree().frame(sheet).expect("frame").geometry;
        assert_eq!(geometry.height, 1000.0);
    });
}

#[test]
fn status_bar_inset_lowers_the_large_detent() {
    run_ui_test(|rule| {
        let page = with_page(rule);
        let insets = SafeAreaInsets {
            top: Inset::new(0.0, 40.0),
            ..SafeAreaInsets::default()
        };
        assert!(rule.ctx_mut().update_system_safe_area(insets));
        rule.pump_until_idle();

        let sheet = OverlayManager::open_sheet(
            rule.ctx_mut(),
            page,
            SheetStyle::default(),
            SheetCallbacks::default(),
            None,
        )
        .expect("sheet");
        rule.pump_until_idle();
        let pattern = rule.ctx().overlay.sheet(sheet).expect("pattern");
        assert_eq!(pattern.sheet_max_height(), 760.0);
        assert_near(pattern.height(), 752.0);
        assert_near(translate(rule, sheet), 48.0);
    });
}

#[test]
fn non_modal_sheet_leaves_the_root_open() {
    run_ui_test(|rule| {
        let page = with_page(rule);
        let style = SheetStyle {
            modal: false,
            ..SheetStyle::with_detents([SheetHeight::px(300.0)])
        };
        OverlayManager::open_sheet(rule.ctx_mut(), page, style, SheetCallbacks::default(), None)
            .expect("sheet");
        let root = rule.ctx().root();
        let tree = rule.ctx_mut().tree_mut();
        let extra = tree.spawn_frame(ace_core::tags::STACK);
        assert!(tree.append_child(root, extra).is_ok());
    });
}
