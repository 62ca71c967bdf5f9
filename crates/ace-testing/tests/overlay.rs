use ace_core::{tags, NodeId};
use ace_testing::prelude::*;
use ace_ui::inspector::dump_tree_json;
use ace_ui_graphics::{Rect, Size};

fn target(rule: &mut UiTestRule, rect: Rect) -> NodeId {
    let page = rule.create_page("pages/index");
    StageManager::push_page(rule.ctx_mut(), page, true, false);
    rule.pump_until_idle();
    let tree = rule.ctx_mut().tree_mut();
    let button = tree.spawn_frame(tags::STACK);
    tree.frame_mut(button).expect("frame").geometry = rect;
    tree.append_child(page, button).expect("mounted");
    button
}

fn param(show_in_subwindow: bool) -> PopupParam {
    PopupParam {
        child_size: Size::new(120.0, 60.0),
        show_in_subwindow,
        ..PopupParam::default()
    }
}

#[test]
fn popup_flips_above_a_target_near_the_bottom() {
    run_ui_test(|rule| {
        let button = target(rule, Rect::new(150.0, 740.0, 100.0, 40.0));
        let popup = OverlayManager::show_popup(rule.ctx_mut(), button, param(false))
            .expect("popup");
        rule.pump_until_idle();

        let info = rule.ctx().overlay.popup(button).expect("info");
        assert_eq!(info.popup, popup);
        assert_eq!(info.layout.placement, Placement::Top);
        assert!(info.rect.y + info.rect.height <= 740.0);

        let json = dump_tree_json(rule.ctx().tree(), rule.ctx().root());
        let tags_under_root: Vec<&str> = json["children"]
            .as_array()
            .expect("children")
            .iter()
            .filter_map(|child| child["tag"].as_str())
            .collect();
        assert_eq!(tags_under_root, vec![tags::STAGE, tags::POPUP]);
        check_tree_invariants(rule.ctx().tree(), rule.ctx().root()).expect("tree");

        assert!(OverlayManager::hide_popup(rule.ctx_mut(), button));
        rule.pump_until_idle();
        assert!(!rule.ctx().tree().contains(popup));
    });
}

#[test]
fn subwindow_popup_updates_the_window() {
    run_ui_test(|rule| {
        let button = target(rule, Rect::new(150.0, 300.0, 100.0, 40.0));
        let popup = OverlayManager::show_popup(rule.ctx_mut(), button, param(true))
            .expect("popup");
        rule.pump_until_idle();

        let ctx = rule.ctx();
        let id = ctx.id();
        assert!(ctx.subwindows.contains_popup(id, popup));
        let name = ctx.subwindows.window_name(id).expect("window").to_owned();
        let rect = ctx.overlay.popup(button).expect("info").rect;
        let window = rule.windows().window(&name).expect("headless window");
        assert!(window.visible);
        assert_eq!(window.hot_areas, vec![rect]);

        let sub_root = rule.ctx().subwindows.subwindow_root(id).expect("root");
        check_tree_invariants(rule.ctx().tree(), sub_root).expect("subwindow tree");

        assert!(OverlayManager::hide_popup(rule.ctx_mut(), button));
        let window = rule.windows().window(&name).expect("headless window");
        assert!(!window.visible);
        assert!(window.hot_areas.is_empty());
    });
}
