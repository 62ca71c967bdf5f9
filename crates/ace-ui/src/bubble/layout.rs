use ace_ui_graphics::{great_not_equal, less_not_equal, Point, Rect, Size};

use super::placement::{ArrowEdge, Placement};
use crate::config::UiConfig;

/// Everything the solver needs about one popup.
#[derive(Clone, Debug, PartialEq)]
pub struct BubbleLayoutInput {
    pub target: Rect,
    pub child_size: Size,
    pub placement: Placement,
    pub enable_arrow: bool,
    /// Added to the solved offset.
    pub position_offset: Point,
    pub screen: Size,
    /// Rows at the top and bottom of the screen the popup must not cover.
    pub top_safe: f32,
    pub bottom_safe: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BubbleLayoutResult {
    /// Top-left corner of the popup.
    pub offset: Point,
    pub placement: Placement,
    /// `None` when the arrow is disabled or does not fit.
    pub arrow_placement: Option<ArrowEdge>,
    /// Arrow center along its edge, from the edge start.
    pub arrow_offset: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fit {
    Fits,
    /// Only the horizontal bound is crossed and clamping x repairs it.
    HorizontalOnly,
    Fails,
}

/// Picks a popup placement that keeps the bubble on screen.
///
/// The preferred placement is tried first, then `Bottom`, then `Top`. Above
/// or below a target a horizontal overflow is repaired by clamping x. When
/// nothing fits the preferred placement is used as computed.
#[derive(Clone, Debug, PartialEq)]
pub struct BubbleLayoutAlgorithm {
    horizontal_margin: f32,
    target_space: f32,
    arrow_height: f32,
    arrow_width: f32,
    border_radius: f32,
}

impl BubbleLayoutAlgorithm {
    pub fn new(config: &UiConfig) -> Self {
        let theme = &config.bubble;
        Self {
            horizontal_margin: config.to_px(theme.horizontal_margin),
            target_space: config.to_px(theme.target_space),
            arrow_height: config.to_px(theme.arrow_height),
            arrow_width: config.to_px(theme.arrow_width),
            border_radius: config.to_px(theme.border_radius),
        }
    }

    pub fn layout(&self, input: &BubbleLayoutInput) -> BubbleLayoutResult {
        let (placement, offset) = self.solve(input);
        let offset = offset + input.position_offset;
        let (arrow_placement, arrow_offset) = self.arrow(input, placement, offset);
        BubbleLayoutResult {
            offset,
            placement,
            arrow_placement,
            arrow_offset,
        }
    }

    fn solve(&self, input: &BubbleLayoutInput) -> (Placement, Point) {
        let candidates = [input.placement, Placement::Bottom, Placement::Top];
        for placement in candidates {
            let position = self.position(input, placement);
            match self.check(input, placement, position) {
                Fit::Fits => return (placement, position),
                Fit::HorizontalOnly => return (placement, self.fit_to_screen(input, position)),
                Fit::Fails => {
                    log::trace!("popup placement {placement:?} does not fit");
                }
            }
        }
        (input.placement, self.position(input, input.placement))
    }

    fn spacing(&self, input: &BubbleLayoutInput) -> f32 {
        if input.enable_arrow {
            self.target_space + self.arrow_height
        } else {
            self.target_space
        }
    }

    fn position(&self, input: &BubbleLayoutInput, placement: Placement) -> Point {
        let target = input.target;
        let child = input.child_size;
        let space = self.spacing(input);
        let center = target.center();
        let above = target.top() - space - child.height;
        let below = target.bottom() + space;
        let before = target.left() - space - child.width;
        let after = target.right() + space;
        let centered_x = center.x - child.width / 2.0;
        let centered_y = center.y - child.height / 2.0;
        match placement {
            Placement::Top => Point::new(centered_x, above),
            Placement::TopLeft => Point::new(target.left(), above),
            Placement::TopRight => Point::new(target.right() - child.width, above),
            Placement::Bottom => Point::new(centered_x, below),
            Placement::BottomLeft => Point::new(target.left(), below),
            Placement::BottomRight => Point::new(target.right() - child.width, below),
            Placement::Left => Point::new(before, centered_y),
            Placement::LeftTop => Point::new(before, target.top()),
            Placement::LeftBottom => Point::new(before, target.bottom() - child.height),
            Placement::Right => Point::new(after, centered_y),
            Placement::RightTop => Point::new(after, target.top()),
            Placement::RightBottom => Point::new(after, target.bottom() - child.height),
        }
    }

    fn check(&self, input: &BubbleLayoutInput, placement: Placement, position: Point) -> Fit {
        let child = input.child_size;
        let min_x = self.horizontal_margin;
        let max_x = input.screen.width - self.horizontal_margin;
        let min_y = input.top_safe;
        let max_y = input.screen.height - input.bottom_safe;
        let horizontal_ok = !less_not_equal(position.x, min_x)
            && !great_not_equal(position.x + child.width, max_x);
        let vertical_ok = !less_not_equal(position.y, min_y)
            && !great_not_equal(position.y + child.height, max_y);
        match (horizontal_ok, vertical_ok) {
            (true, true) => Fit::Fits,
            (false, true) if placement.is_vertical() && child.width <= max_x - min_x => {
                Fit::HorizontalOnly
            }
            _ => Fit::Fails,
        }
    }

    fn fit_to_screen(&self, input: &BubbleLayoutInput, position: Point) -> Point {
        let min_x = self.horizontal_margin;
        let max_x = input.screen.width - self.horizontal_margin - input.child_size.width;
        Point::new(position.x.clamp(min_x, max_x.max(min_x)), position.y)
    }

    fn arrow(
        &self,
        input: &BubbleLayoutInput,
        placement: Placement,
        offset: Point,
    ) -> (Option<ArrowEdge>, f32) {
        if !input.enable_arrow {
            return (None, 0.0);
        }
        let edge = placement.arrow_edge();
        let inset = self.border_radius + self.arrow_width / 2.0;
        let (length, target_center) = match edge {
            ArrowEdge::Top | ArrowEdge::Bottom => {
                (input.child_size.width, input.target.center().x - offset.x)
            }
            ArrowEdge::Left | ArrowEdge::Right => {
                (input.child_size.height, input.target.center().y - offset.y)
            }
        };
        if length < inset * 2.0 {
            return (None, 0.0);
        }
        (Some(edge), target_center.clamp(inset, length - inset))
    }
}

#[cfg(test)]
#[path = "../tests/bubble_tests.rs"]
mod tests;
