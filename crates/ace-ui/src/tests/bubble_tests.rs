use super::*;

fn input(target: Rect, placement: Placement) -> BubbleLayoutInput {
    BubbleLayoutInput {
        target,
        child_size: Size::new(120.0, 60.0),
        placement,
        enable_arrow: true,
        position_offset: Point::ZERO,
        screen: Size::new(400.0, 800.0),
        top_safe: 0.0,
        bottom_safe: 0.0,
    }
}

fn algorithm() -> BubbleLayoutAlgorithm {
    BubbleLayoutAlgorithm::new(&UiConfig::default())
}

#[test]
fn preferred_placement_is_kept_when_it_fits() {
    let result = algorithm().layout(&input(Rect::new(150.0, 400.0, 100.0, 40.0), Placement::Top));
    assert_eq!(result.placement, Placement::Top);
    assert_eq!(result.offset, Point::new(140.0, 324.0));
    assert_eq!(result.arrow_placement, Some(ArrowEdge::Bottom));
    assert_eq!(result.arrow_offset, 60.0);
}

#[test]
fn top_overflow_falls_back_to_bottom() {
    let result = algorithm().layout(&input(Rect::new(150.0, 20.0, 100.0, 40.0), Placement::Top));
    assert_eq!(result.placement, Placement::Bottom);
    assert_eq!(result.offset, Point::new(140.0, 76.0));
    assert_eq!(result.arrow_placement, Some(ArrowEdge::Top));
}

#[test]
fn original_placement_is_the_last_resort() {
    let target = Rect::new(150.0, 20.0, 100.0, 760.0);
    let result = algorithm().layout(&input(target, Placement::Top));
    assert_eq!(result.placement, Placement::Top);
    assert_eq!(result.offset, Point::new(140.0, -56.0));
}

#[test]
fn horizontal_overflow_is_clamped_without_changing_placement() {
    let result = algorithm().layout(&input(Rect::new(0.0, 400.0, 40.0, 40.0), Placement::Bottom));
    assert_eq!(result.placement, Placement::Bottom);
    assert_eq!(result.offset, Point::new(6.0, 456.0));
    // The arrow cannot reach the target center past the rounded corner.
    assert_eq!(result.arrow_offset, 28.0);
}

#[test]
fn side_placement_overflow_is_not_clamped() {
    let result = algorithm().layout(&input(Rect::new(10.0, 400.0, 40.0, 40.0), Placement::Left));
    assert_eq!(result.placement, Placement::Bottom);
    assert_eq!(result.offset, Point::new(6.0, 456.0));
}

#[test]
fn safe_area_rows_are_avoided() {
    let mut request = input(Rect::new(150.0, 100.0, 100.0, 40.0), Placement::Top);
    assert_eq!(algorithm().layout(&request).placement, Placement::Top);
    request.top_safe = 40.0;
    assert_eq!(algorithm().layout(&request).placement, Placement::Bottom);
}

#[test]
fn every_placement_fits_around_a_centered_target() {
    let algorithm = algorithm();
    for placement in Placement::ALL {
        let mut request = input(Rect::new(150.0, 350.0, 100.0, 100.0), placement);
        request.child_size = Size::new(60.0, 60.0);
        let result = algorithm.layout(&request);
        assert_eq!(result.placement, placement, "{placement:?}");
        assert_eq!(result.arrow_placement, Some(placement.arrow_edge()));
    }
}

#[test]
fn position_offset_and_arrow_options() {
    let target = Rect::new(150.0, 400.0, 100.0, 40.0);
    let mut request = input(target, Placement::Top);
    request.position_offset = Point::new(5.0, -5.0);
    assert_eq!(algorithm().layout(&request).offset, Point::new(145.0, 319.0));

    let mut request = input(target, Placement::Top);
    request.enable_arrow = false;
    let result = algorithm().layout(&request);
    assert_eq!(result.offset, Point::new(140.0, 332.0));
    assert_eq!(result.arrow_placement, None);

    let mut request = input(target, Placement::Top);
    request.child_size = Size::new(40.0, 60.0);
    assert_eq!(algorithm().layout(&request).arrow_placement, None);
}
