use ace_animation::{AnimationHandle, AnimationOption, Lerp};
use ace_core::{NodeId, NodeTree, TaskExecutor, TaskType};
use ace_ui_graphics::{
    great_not_equal, less_not_equal, less_or_equal, near_equal, near_zero,
};

use super::style::{DismissReason, ScrollSizeMode, SheetCallbacks, SheetHeight, SheetMode, SheetStyle, SheetType};
use crate::config::UiConfig;
use crate::context::UiContext;
use crate::observer::{ScrollEventInfo, ScrollEventType};
use crate::overlay::OverlayManager;

/// Where a released drag settles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SnapTarget {
    Detent(f32),
    Dismiss,
}

/// Drag, snap and keyboard-avoidance state of one bottom sheet.
///
/// Offsets are the sheet's vertical translate inside the page: a sheet of
/// height `h` rests at `page_height - h - sheet_height_up`.
pub struct SheetPresentationPattern {
    node: NodeId,
    target: NodeId,
    style: SheetStyle,
    pub(crate) callbacks: SheetCallbacks,
    page_height: f32,
    sheet_max_height: f32,
    sheet_detent_heights: Vec<f32>,
    unsorted_detent_heights: Vec<f32>,
    height: f32,
    reported_height: f32,
    current_offset: f32,
    sheet_height_up: f32,
    scroll_height: f32,
    is_scrolling: bool,
    detents_index: usize,
    is_dragging: bool,
    animation: Option<AnimationHandle>,
    content_height: f32,
    viewport_height: f32,
    is_shown: bool,
    is_dismissing: bool,
}

impl SheetPresentationPattern {
    pub fn new(node: NodeId, target: NodeId, style: SheetStyle, callbacks: SheetCallbacks) -> Self {
        Self {
            node,
            target,
            style,
            callbacks,
            page_height: 0.0,
            sheet_max_height: 0.0,
            sheet_detent_heights: Vec::new(),
            unsorted_detent_heights: Vec::new(),
            height: 0.0,
            reported_height: 0.0,
            current_offset: 0.0,
            sheet_height_up: 0.0,
            scroll_height: 0.0,
            is_scrolling: false,
            detents_index: 0,
            is_dragging: false,
            animation: None,
            content_height: 0.0,
            viewport_height: 0.0,
            is_shown: false,
            is_dismissing: false,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn style(&self) -> &SheetStyle {
        &self.style
    }

    pub(crate) fn set_style(&mut self, style: SheetStyle) {
        self.style = style;
    }

    pub fn page_height(&self) -> f32 {
        self.page_height
    }

    pub fn sheet_max_height(&self) -> f32 {
        self.sheet_max_height
    }

    /// Detent heights in px, ascending and without duplicates.
    pub fn sheet_detent_heights(&self) -> &[f32] {
        &self.sheet_detent_heights
    }

    /// Detent heights in px, in declaration order.
    pub fn unsorted_detent_heights(&self) -> &[f32] {
        &self.unsorted_detent_heights
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn current_offset(&self) -> f32 {
        self.current_offset
    }

    pub fn sheet_height_up(&self) -> f32 {
        self.sheet_height_up
    }

    pub fn scroll_height(&self) -> f32 {
        self.scroll_height
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn detents_index(&self) -> usize {
        self.detents_index
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn is_shown(&self) -> bool {
        self.is_shown
    }

    pub fn is_dismissing(&self) -> bool {
        self.is_dismissing
    }

    pub fn set_content_height(&mut self, height: f32) {
        self.content_height = height;
    }

    fn max_detent(&self) -> f32 {
        self.sheet_detent_heights.last().copied().unwrap_or(0.0)
    }

    /// Translate of the sheet when it is not being dragged.
    pub fn resting_offset(&self) -> f32 {
        self.page_height - self.height - self.sheet_height_up
    }

    /// Resolves the declared detents against a page of `page_height` whose
    /// top `top_inset` px are covered by system UI.
    pub fn init_sheet_detents(&mut self, config: &UiConfig, page_height: f32, top_inset: f32) {
        self.page_height = page_height;
        self.sheet_max_height = (page_height - top_inset).max(0.0);
        self.sheet_detent_heights.clear();
        self.unsorted_detent_heights.clear();

        if self.style.sheet_type == SheetType::Center {
            let declared = self
                .style
                .height
                .map(|height| self.resolve_height(config, height))
                .unwrap_or_else(|| config.to_px(config.sheet.center_height));
            let center_height = declared.min(self.sheet_max_height);
            let height = (page_height + center_height) / 2.0;
            self.sheet_detent_heights.push(height);
            self.unsorted_detent_heights.push(height);
        } else {
            let declared = if self.style.detents.is_empty() {
                vec![self.style.height.unwrap_or(SheetHeight::LARGE)]
            } else {
                self.style.detents.clone()
            };
            for detent in declared {
                let height = self.resolve_height(config, detent);
                self.unsorted_detent_heights.push(height);
                self.sheet_detent_heights.push(height);
            }
            self.sheet_detent_heights.sort_by(f32::total_cmp);
            self.sheet_detent_heights.dedup();
        }

        self.detents_index = self
            .detents_index
            .min(self.unsorted_detent_heights.len().saturating_sub(1));
        self.height = self
            .unsorted_detent_heights
            .get(self.detents_index)
            .copied()
            .unwrap_or_default();
        self.viewport_height = self.height;
        log::debug!(
            "sheet {} detents {:?}, height {}",
            self.node,
            self.sheet_detent_heights,
            self.height
        );
    }

    fn resolve_height(&self, config: &UiConfig, height: SheetHeight) -> f32 {
        let large = (self.sheet_max_height - config.to_px(config.sheet.blank_inset)).max(0.0);
        match height {
            SheetHeight::Mode(SheetMode::Large) => large,
            SheetHeight::Mode(SheetMode::Medium) => {
                (self.page_height * config.sheet_medium_fraction()).min(large)
            }
            SheetHeight::Mode(SheetMode::Auto) => {
                if less_or_equal(self.content_height, 0.0) {
                    large
                } else {
                    self.content_height.min(large)
                }
            }
            SheetHeight::Length(length) => {
                let px = length.to_px(config.density, self.sheet_max_height);
                if less_or_equal(px, 0.0) || great_not_equal(px, large) {
                    large
                } else {
                    px
                }
            }
        }
    }

    /// Moves the sheet by `delta` px (positive is downward) and returns the
    /// new translate. Popup sheets do not drag.
    pub fn drag_update(&mut self, delta: f32, friction_ratio: f32) -> Option<f32> {
        if self.style.sheet_type == SheetType::Popup || self.sheet_detent_heights.is_empty() {
            return None;
        }
        let mut delta = delta;
        let extension = self.height + self.sheet_height_up - self.current_offset;
        let max_detent = self.max_detent();
        if great_not_equal(extension, max_detent) && less_not_equal(delta, 0.0) {
            delta *= friction(extension - max_detent, self.sheet_max_height, friction_ratio);
        }
        self.current_offset += delta;

        let resting = self.resting_offset();
        let floor = self.page_height - self.sheet_max_height;
        let mut offset = resting + self.current_offset;
        if offset < floor {
            offset = floor;
            self.current_offset = floor - resting;
        }
        if self.style.scroll_size_mode == ScrollSizeMode::Continuous {
            self.viewport_height = self.page_height - offset;
        }
        Some(offset)
    }

    /// Picks the detent a drag released at `velocity` px/s (positive is
    /// downward) settles on.
    pub fn snap_target(&self, velocity: f32, velocity_threshold: f32) -> SnapTarget {
        let detents = &self.sheet_detent_heights;
        let Some(&last) = detents.last() else {
            return SnapTarget::Dismiss;
        };
        let height = (self.height + self.sheet_height_up - self.current_offset)
            .min(self.sheet_max_height);
        let lower_pos = detents.partition_point(|&detent| detent < height);
        let upper_pos = detents.partition_point(|&detent| detent <= height);

        let (up, down) = if lower_pos == detents.len() {
            (last, last)
        } else if lower_pos == upper_pos {
            if lower_pos == 0 {
                (detents[0], 0.0)
            } else {
                (detents[lower_pos], detents[lower_pos - 1])
            }
        } else {
            (detents[lower_pos], detents[lower_pos])
        };

        let to_up = (up - height).abs();
        let to_down = (height - down).abs();
        let chosen = if velocity.abs() < velocity_threshold && !near_equal(to_up, to_down) {
            if to_up < to_down {
                up
            } else {
                down
            }
        } else if velocity > 0.0 {
            down
        } else {
            up
        };
        if near_zero(chosen) {
            SnapTarget::Dismiss
        } else {
            SnapTarget::Detent(chosen)
        }
    }

    /// Settles on `height` and reports a detent change by declared index.
    fn settle_on(&mut self, height: f32) {
        let index = self
            .unsorted_detent_heights
            .iter()
            .position(|&detent| near_equal(detent, height))
            .unwrap_or(self.detents_index);
        if index != self.detents_index {
            self.detents_index = index;
            if let Some(callback) = self.callbacks.on_detents_did_change.as_mut() {
                callback(index);
            }
        }
        let lift = self.sheet_height_up + self.scroll_height;
        self.height = height;
        self.current_offset = 0.0;
        self.is_dragging = false;
        self.viewport_height = height;
        self.update_height_up(lift);
    }

    fn report_height(&mut self) {
        if near_equal(self.reported_height, self.height) {
            return;
        }
        self.reported_height = self.height;
        if let Some(callback) = self.callbacks.on_height_did_change.as_mut() {
            callback(self.height);
        }
    }

    /// Splits the lift needed to clear the keyboard between moving the sheet
    /// up to its tallest detent and scrolling its content.
    pub fn update_height_up(&mut self, lift: f32) {
        if less_or_equal(lift, 0.0) {
            self.reset_keyboard_avoidance();
            return;
        }
        let max_lift = (self.max_detent() - self.height).max(0.0);
        if great_not_equal(lift, max_lift) {
            self.sheet_height_up = max_lift;
            self.scroll_height = lift - max_lift;
            self.is_scrolling = true;
        } else {
            self.sheet_height_up = lift;
            self.scroll_height = 0.0;
            self.is_scrolling = false;
        }
    }

    fn reset_keyboard_avoidance(&mut self) {
        self.sheet_height_up = 0.0;
        self.scroll_height = 0.0;
        self.is_scrolling = false;
    }

    // ---------------------------------------------------------------------
    // context driven operations

    pub fn handle_drag_start(ctx: &mut UiContext, sheet: NodeId) {
        let displayed = translate_y(ctx.pipeline.tree(), sheet);
        let Some(pattern) = ctx.overlay.sheet_mut(sheet) else {
            return;
        };
        if let Some(handle) = pattern.animation.take() {
            ctx.animations.stop(handle);
        }
        pattern.current_offset = displayed - pattern.resting_offset();
        pattern.is_dragging = true;
    }

    pub fn handle_drag_update(ctx: &mut UiContext, sheet: NodeId, delta: f32) {
        let friction_ratio = ctx.config.sheet.friction_ratio;
        let Some(pattern) = ctx.overlay.sheet_mut(sheet) else {
            return;
        };
        if let Some(offset) = pattern.drag_update(delta, friction_ratio) {
            set_translate_y(ctx.pipeline.tree_mut(), sheet, offset);
        }
    }

    pub fn handle_drag_end(ctx: &mut UiContext, sheet: NodeId, velocity: f32) {
        let threshold = ctx.config.sheet.velocity_threshold;
        let Some(pattern) = ctx.overlay.sheet_mut(sheet) else {
            return;
        };
        if pattern.style.sheet_type == SheetType::Popup {
            return;
        }
        pattern.is_dragging = false;
        match pattern.snap_target(velocity, threshold) {
            SnapTarget::Dismiss => {
                log::debug!("sheet {sheet} released below its lowest detent");
                Self::sheet_interactive_dismiss(ctx, sheet, DismissReason::SlideDown);
            }
            SnapTarget::Detent(height) => {
                pattern.settle_on(height);
                Self::animate_to_rest(ctx, sheet);
            }
        }
    }

    pub fn handle_drag_cancel(ctx: &mut UiContext, sheet: NodeId) {
        Self::handle_drag_end(ctx, sheet, 0.0);
    }

    /// Dismisses through the host hooks when any is set, after springing the
    /// sheet back to rest; otherwise dismisses at once.
    pub fn sheet_interactive_dismiss(ctx: &mut UiContext, sheet: NodeId, reason: DismissReason) {
        let Some(pattern) = ctx.overlay.sheet_mut(sheet) else {
            return;
        };
        if !pattern.callbacks.has_dismiss_hooks() {
            OverlayManager::dismiss_sheet(ctx, sheet);
            return;
        }
        pattern.current_offset = 0.0;
        pattern.is_dragging = false;
        if let Some(spring_back) = pattern.callbacks.spring_back.as_mut() {
            spring_back();
        } else {
            Self::animate_to_rest(ctx, sheet);
        }
        let posted = ctx.tasks.post_task(
            Box::new(move |ctx: &mut UiContext| {
                let allowed = ctx
                    .overlay
                    .sheet_mut(sheet)
                    .is_some_and(|pattern| pattern.callbacks.allows_dismiss(reason));
                if allowed {
                    OverlayManager::dismiss_sheet(ctx, sheet);
                } else {
                    log::debug!("sheet {sheet} dismiss vetoed");
                }
            }),
            TaskType::Ui,
            "ArkUISheetShouldDismiss",
        );
        if !posted {
            log::warn!("sheet {sheet}: dismiss query not posted");
        }
        ctx.pipeline.request_frame();
    }

    /// Lifts the sheet so the focused caret inside it clears the keyboard.
    pub fn avoid_safe_area(ctx: &mut UiContext, sheet: NodeId) {
        let keyboard_height = ctx.safe_area.keyboard_height();
        let root_height = ctx.root_size().height;
        let system_bottom = ctx.safe_area.system_safe_area().bottom.length();
        let padding = ctx.config.to_px(ctx.config.sheet.caret_padding);
        let focused = ctx
            .text_field
            .focused()
            .filter(|input| is_descendant(ctx.pipeline.tree(), input.node, sheet));
        let Some(pattern) = ctx.overlay.sheet_mut(sheet) else {
            return;
        };
        let was_scrolling = pattern.is_scrolling;

        if near_zero(keyboard_height) {
            pattern.reset_keyboard_avoidance();
        } else {
            let Some(input) = focused else {
                return;
            };
            let input_height = root_height - (input.caret_top + input.caret_height + padding);
            let lift = keyboard_height + system_bottom - input_height;
            pattern.update_height_up(lift);
        }

        let offset = pattern.resting_offset();
        let is_scrolling = pattern.is_scrolling;
        let scroll_height = pattern.scroll_height;
        set_translate_y(ctx.pipeline.tree_mut(), sheet, offset);
        if is_scrolling != was_scrolling {
            let event_type = if is_scrolling {
                ScrollEventType::ScrollStart
            } else {
                ScrollEventType::ScrollStop
            };
            ctx.observer.notify_scroll_event(&ScrollEventInfo {
                node: sheet,
                event_type,
                offset: scroll_height,
            });
        }
        ctx.pipeline.request_frame();
    }

    /// Slides the sheet up from below the page.
    pub(crate) fn play_enter_transition(ctx: &mut UiContext, sheet: NodeId) {
        let Some(pattern) = ctx.overlay.sheet_mut(sheet) else {
            return;
        };
        let from = pattern.page_height;
        set_translate_y(ctx.pipeline.tree_mut(), sheet, from);
        Self::animate_translate(
            ctx,
            sheet,
            "ArkUISheetEnter",
            Box::new(move |ctx: &mut UiContext| {
                if let Some(pattern) = ctx.overlay.sheet_mut(sheet) {
                    pattern.animation = None;
                    pattern.is_shown = true;
                    if let Some(callback) = pattern.callbacks.on_appear.as_mut() {
                        callback();
                    }
                    pattern.report_height();
                }
            }),
            None,
        );
    }

    /// Slides the sheet out of the page, then closes it.
    pub(crate) fn play_exit_transition(ctx: &mut UiContext, sheet: NodeId) {
        let Some(pattern) = ctx.overlay.sheet_mut(sheet) else {
            return;
        };
        let to = pattern.page_height;
        Self::animate_translate(
            ctx,
            sheet,
            "ArkUISheetExit",
            Box::new(move |ctx: &mut UiContext| {
                OverlayManager::close_sheet(ctx, sheet);
            }),
            Some(to),
        );
    }

    fn animate_to_rest(ctx: &mut UiContext, sheet: NodeId) {
        Self::animate_translate(
            ctx,
            sheet,
            "ArkUISheetSnap",
            Box::new(move |ctx: &mut UiContext| {
                if let Some(pattern) = ctx.overlay.sheet_mut(sheet) {
                    pattern.animation = None;
                    pattern.report_height();
                }
            }),
            None,
        );
    }

    /// Springs the translate from where it is shown now to `to`, or to the
    /// resting offset.
    fn animate_translate(
        ctx: &mut UiContext,
        sheet: NodeId,
        name: &str,
        on_finish: Box<dyn FnOnce(&mut UiContext)>,
        to: Option<f32>,
    ) {
        let option = AnimationOption::spring(ctx.config.sheet.snap_curve);
        let from = translate_y(ctx.pipeline.tree(), sheet);
        let Some(pattern) = ctx.overlay.sheet_mut(sheet) else {
            return;
        };
        let to = to.unwrap_or_else(|| pattern.resting_offset());
        if let Some(handle) = pattern.animation.take() {
            ctx.animations.stop(handle);
        }
        let handle = ctx.animations.start(
            name,
            option,
            Box::new(move |ctx: &mut UiContext, fraction: f32| {
                set_translate_y(ctx.pipeline.tree_mut(), sheet, from.lerp(&to, fraction));
            }),
            Some(on_finish),
        );
        if let Some(pattern) = ctx.overlay.sheet_mut(sheet) {
            pattern.animation = Some(handle);
        }
        ctx.pipeline.request_frame();
    }

    pub(crate) fn mark_dismissing(&mut self) -> bool {
        if self.is_dismissing {
            return false;
        }
        self.is_dismissing = true;
        true
    }

    pub(crate) fn take_animation(&mut self) -> Option<AnimationHandle> {
        self.animation.take()
    }

    pub(crate) fn fire_disappear(&mut self) {
        self.is_shown = false;
        if let Some(callback) = self.callbacks.on_disappear.as_mut() {
            callback();
        }
    }
}

impl std::fmt::Debug for SheetPresentationPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetPresentationPattern")
            .field("node", &self.node)
            .field("height", &self.height)
            .field("detents", &self.sheet_detent_heights)
            .field("current_offset", &self.current_offset)
            .field("sheet_height_up", &self.sheet_height_up)
            .finish_non_exhaustive()
    }
}

/// Damping applied to upward drags past the tallest detent: 1 at the detent,
/// shrinking as the overshoot grows toward the max sheet height.
fn friction(overshoot: f32, sheet_max_height: f32, ratio: f32) -> f32 {
    if sheet_max_height <= 0.0 {
        return 1.0;
    }
    let gamma = (overshoot / sheet_max_height).clamp(0.0, 1.0);
    (-ratio * gamma).exp()
}

fn translate_y(tree: &NodeTree, node: NodeId) -> f32 {
    tree.frame(node)
        .map(|frame| frame.render.translate.y)
        .unwrap_or_default()
}

fn set_translate_y(tree: &mut NodeTree, node: NodeId, y: f32) {
    if let Ok(frame) = tree.frame_mut(node) {
        frame.render.translate.y = y;
    }
}

fn is_descendant(tree: &NodeTree, node: NodeId, ancestor: NodeId) -> bool {
    let mut current = tree.parent(node);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        current = tree.parent(id);
    }
    false
}

#[cfg(test)]
#[path = "../tests/sheet_tests.rs"]
mod tests;
