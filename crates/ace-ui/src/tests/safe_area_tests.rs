use super::*;

fn status_bar(height: f32) -> SafeAreaInsets {
    SafeAreaInsets {
        top: Inset::new(0.0, height),
        ..SafeAreaInsets::default()
    }
}

#[test]
fn system_update_reports_changes_only() {
    let mut manager = SafeAreaManager::new();
    let insets = SafeAreaInsets::new(
        Inset::default(),
        Inset::new(0.0, 40.0),
        Inset::default(),
        Inset::new(780.0, 800.0),
    );
    assert!(manager.update_system_safe_area(insets));
    assert_eq!(manager.system_safe_area(), insets);
    assert!(!manager.update_system_safe_area(insets));
}

#[test]
fn inset_combine_keeps_the_union() {
    let a = Inset::new(0.0, 20.0);
    let b = Inset::new(10.0, 40.0);
    assert_eq!(a.combine(&b), Inset::new(0.0, 40.0));
    assert_eq!(a.combine(&Inset::default()), a);
    assert_eq!(Inset::default().combine(&b), b);
    assert_eq!(Inset::new(5.0, 5.0).length(), 0.0);
}

#[test]
fn cutout_extends_to_the_screen_edge() {
    let mut manager = SafeAreaManager::new();
    let cutout = SafeAreaInsets {
        top: Inset::new(10.0, 50.0),
        right: Inset::new(380.0, 390.0),
        ..SafeAreaInsets::default()
    };
    assert!(manager.update_cutout_safe_area(cutout, Size::new(400.0, 800.0)));
    let stored = manager.cutout_safe_area();
    assert_eq!(stored.top, Inset::new(0.0, 50.0));
    assert_eq!(stored.right, Inset::new(380.0, 400.0));
    assert!(!stored.left.is_valid());
    assert!(!manager.update_cutout_safe_area(cutout, Size::new(400.0, 800.0)));
}

#[test]
fn keyboard_inset_rises_from_the_bottom() {
    let mut manager = SafeAreaManager::new();
    assert!(manager.update_keyboard_safe_area(300.0, 800.0));
    assert_eq!(manager.keyboard_inset(), Inset::new(500.0, 800.0));
    assert_eq!(manager.keyboard_height(), 300.0);
    assert!(!manager.update_keyboard_safe_area(300.0, 800.0));
    assert!(manager.update_keyboard_safe_area(0.0, 800.0));
    assert_eq!(manager.keyboard_height(), 0.0);
}

#[test]
fn combined_area_respects_types_edges_and_flags() {
    let mut manager = SafeAreaManager::new();
    manager.update_system_safe_area(status_bar(40.0));
    manager.update_nav_area(SafeAreaInsets {
        bottom: Inset::new(770.0, 800.0),
        ..SafeAreaInsets::default()
    });
    manager.update_keyboard_safe_area(300.0, 800.0);

    let all = SafeAreaExpandOpts {
        types: SafeAreaType::ALL,
        edges: SafeAreaEdge::ALL,
    };
    let combined = manager.get_combined_safe_area(all);
    assert_eq!(combined.top, Inset::new(0.0, 40.0));
    assert_eq!(combined.bottom, Inset::new(770.0, 800.0));

    assert!(manager.set_keyboard_safe_area_enabled(true));
    assert!(!manager.set_keyboard_safe_area_enabled(true));
    let combined = manager.get_combined_safe_area(all);
    assert_eq!(combined.bottom, Inset::new(500.0, 800.0));

    let top_only = SafeAreaExpandOpts {
        types: SafeAreaType::ALL,
        edges: SafeAreaEdge::TOP,
    };
    assert!(!manager.get_combined_safe_area(top_only).bottom.is_valid());

    let cutout_only = SafeAreaExpandOpts {
        types: SafeAreaType::CUTOUT,
        edges: SafeAreaEdge::ALL,
    };
    assert!(!manager.get_combined_safe_area(cutout_only).is_valid());

    manager.set_ignore_safe_area(true);
    assert_eq!(manager.get_combined_safe_area(all), SafeAreaInsets::default());
    assert_eq!(manager.safe_area(), SafeAreaInsets::default());
}

#[test]
fn floating_window_only_avoids_when_asked() {
    let mut manager = SafeAreaManager::new();
    manager.update_system_safe_area(status_bar(40.0));
    assert!(manager.set_is_full_screen(false));
    assert!(!manager.safe_area().is_valid());
    manager.set_is_need_avoid_window(true);
    assert_eq!(manager.safe_area().top, Inset::new(0.0, 40.0));
}
