//! Sheets and popups mounted above the page stack.

use ace_core::collections::map::HashMap;
use ace_core::{tags, AddChildOptions, DirtyFlag, LayoutPolicy, NodeId};
use ace_ui_graphics::{Point, Rect, Size};
use indexmap::IndexMap;

use crate::bubble::{BubbleLayoutAlgorithm, BubbleLayoutInput, BubbleLayoutResult, Placement};
use crate::context::UiContext;
use crate::sheet::{SheetCallbacks, SheetPresentationPattern, SheetStyle};

/// How a popup is laid out next to its target.
#[derive(Clone, Debug, PartialEq)]
pub struct PopupParam {
    pub child_size: Size,
    pub placement: Placement,
    pub enable_arrow: bool,
    pub position_offset: Point,
    pub show_in_subwindow: bool,
    /// Mounted inside the popup frame.
    pub content: Option<NodeId>,
}

impl Default for PopupParam {
    fn default() -> Self {
        Self {
            child_size: Size::ZERO,
            placement: Placement::Bottom,
            enable_arrow: true,
            position_offset: Point::ZERO,
            show_in_subwindow: false,
            content: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PopupInfo {
    pub popup: NodeId,
    pub target: NodeId,
    /// Whether the popup ended up in the subwindow.
    pub in_subwindow: bool,
    pub rect: Rect,
    pub layout: BubbleLayoutResult,
}

#[derive(Debug, Default)]
pub struct OverlayManager {
    sheets: IndexMap<NodeId, SheetPresentationPattern>,
    sheet_by_target: HashMap<NodeId, NodeId>,
    popups: IndexMap<NodeId, PopupInfo>,
}

impl OverlayManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(&self, sheet: NodeId) -> Option<&SheetPresentationPattern> {
        self.sheets.get(&sheet)
    }

    pub fn sheet_mut(&mut self, sheet: NodeId) -> Option<&mut SheetPresentationPattern> {
        self.sheets.get_mut(&sheet)
    }

    pub fn sheet_for_target(&self, target: NodeId) -> Option<NodeId> {
        self.sheet_by_target.get(&target).copied()
    }

    /// Open sheets, oldest first.
    pub fn sheet_ids(&self) -> Vec<NodeId> {
        self.sheets.keys().copied().collect()
    }

    pub fn popup(&self, target: NodeId) -> Option<&PopupInfo> {
        self.popups.get(&target)
    }

    pub fn popup_count(&self) -> usize {
        self.popups.len()
    }

    pub fn is_popup_showing(&self, target: NodeId) -> bool {
        self.popups.contains_key(&target)
    }

    /// Opens a sheet bound to `target`, or restyles the one already open for
    /// it. Returns the sheet node.
    pub fn open_sheet(
        ctx: &mut UiContext,
        target: NodeId,
        style: SheetStyle,
        callbacks: SheetCallbacks,
        content: Option<NodeId>,
    ) -> Option<NodeId> {
        if let Some(sheet) = ctx.overlay.sheet_for_target(target) {
            if let Some(pattern) = ctx.overlay.sheets.get_mut(&sheet) {
                pattern.set_style(style);
                pattern.callbacks = callbacks;
            }
            Self::init_sheet(ctx, sheet);
            log::debug!("sheet {sheet} for {target} updated");
            return Some(sheet);
        }

        let root = ctx.root();
        let root_rect = ctx.pipeline.root_rect();
        let modal = style.modal;
        let tree = ctx.pipeline.tree_mut();
        let sheet = tree.spawn_frame(tags::SHEET_PAGE);
        if let Ok(frame) = tree.frame_mut(sheet) {
            frame.geometry = root_rect;
            frame.layout_policy = LayoutPolicy::MatchParent;
        }
        let mut content_height = 0.0;
        if let Some(content) = content {
            content_height = tree
                .frame(content)
                .map(|frame| frame.geometry.height)
                .unwrap_or_default();
            if let Err(err) = tree.append_child(sheet, content) {
                log::warn!("sheet content {content} not mounted: {err}");
            }
        }
        let mounted = if modal {
            tree.add_modal_child(root, sheet)
        } else {
            tree.add_child(
                root,
                sheet,
                None,
                AddChildOptions {
                    add_modal_exception: true,
                    ..AddChildOptions::default()
                },
            )
        };
        if let Err(err) = mounted {
            log::warn!("sheet for {target} not mounted: {err}");
            return None;
        }
        tree.build(sheet);

        let mut pattern = SheetPresentationPattern::new(sheet, target, style, callbacks);
        pattern.set_content_height(content_height);
        ctx.overlay.sheets.insert(sheet, pattern);
        ctx.overlay.sheet_by_target.insert(target, sheet);
        Self::init_sheet(ctx, sheet);
        SheetPresentationPattern::play_enter_transition(ctx, sheet);
        log::debug!("sheet {sheet} opened for {target}");
        Some(sheet)
    }

    /// Recomputes the detents against the current page size.
    pub(crate) fn init_sheet(ctx: &mut UiContext, sheet: NodeId) {
        let page_height = ctx.root_size().height;
        let top_inset = ctx.safe_area.safe_area().top.length();
        let Some(pattern) = ctx.overlay.sheets.get_mut(&sheet) else {
            return;
        };
        pattern.init_sheet_detents(&ctx.config, page_height, top_inset);
        if !pattern.is_dragging() {
            let offset = pattern.resting_offset();
            if let Ok(frame) = ctx.pipeline.tree_mut().frame_mut(sheet) {
                frame.render.translate.y = offset;
            }
        }
        ctx.pipeline.mark_dirty(sheet, DirtyFlag::Layout);
    }

    /// Plays the exit transition, then closes the sheet.
    pub fn dismiss_sheet(ctx: &mut UiContext, sheet: NodeId) -> bool {
        let Some(pattern) = ctx.overlay.sheets.get_mut(&sheet) else {
            return false;
        };
        if !pattern.mark_dismissing() {
            return false;
        }
        log::debug!("sheet {sheet} dismissing");
        SheetPresentationPattern::play_exit_transition(ctx, sheet);
        true
    }

    /// Unmounts the sheet at once.
    pub fn close_sheet(ctx: &mut UiContext, sheet: NodeId) -> bool {
        let Some(mut pattern) = ctx.overlay.sheets.shift_remove(&sheet) else {
            return false;
        };
        ctx.overlay.sheet_by_target.remove(&pattern.target());
        if let Some(handle) = pattern.take_animation() {
            ctx.animations.stop(handle);
        }
        let root = ctx.root();
        ctx.pipeline.tree_mut().remove_child(root, sheet, false);
        pattern.fire_disappear();
        ctx.pipeline.mark_dirty(root, DirtyFlag::Render);
        log::debug!("sheet {sheet} closed");
        true
    }

    /// Shows a popup next to `target`. Returns the popup node.
    pub fn show_popup(ctx: &mut UiContext, target: NodeId, param: PopupParam) -> Option<NodeId> {
        if ctx.overlay.popups.contains_key(&target) {
            log::debug!("popup for {target} already showing");
            return ctx.overlay.popups.get(&target).map(|info| info.popup);
        }
        let target_rect = match ctx.pipeline.tree().frame(target) {
            Ok(frame) => frame.geometry,
            Err(err) => {
                log::warn!("popup target: {err}");
                return None;
            }
        };
        let screen = ctx.pipeline.root_rect();
        let safe_area = ctx.safe_area.safe_area();
        let input = BubbleLayoutInput {
            target: target_rect,
            child_size: param.child_size,
            placement: param.placement,
            enable_arrow: param.enable_arrow,
            position_offset: param.position_offset,
            screen: screen.size(),
            top_safe: safe_area.top.length(),
            bottom_safe: safe_area.bottom.length(),
        };
        let layout = BubbleLayoutAlgorithm::new(&ctx.config).layout(&input);
        let rect = Rect::from_origin_size(layout.offset, param.child_size);

        let tree = ctx.pipeline.tree_mut();
        let popup = tree.spawn_frame(tags::POPUP);
        if let Ok(frame) = tree.frame_mut(popup) {
            frame.geometry = rect;
        }
        if let Some(content) = param.content {
            if let Err(err) = tree.append_child(popup, content) {
                log::warn!("popup content {content} not mounted: {err}");
            }
        }

        let parent = ctx.pipeline.id();
        let in_subwindow = param.show_in_subwindow
            && ctx
                .subwindows
                .show_popup(ctx.pipeline.tree_mut(), parent, popup, rect, screen);
        if !in_subwindow {
            if param.show_in_subwindow {
                log::warn!("popup for {target} falls back to the main window");
            }
            let root = ctx.root();
            if let Err(err) = ctx.pipeline.tree_mut().add_child(
                root,
                popup,
                None,
                AddChildOptions {
                    add_default_transition: true,
                    add_modal_exception: true,
                    ..AddChildOptions::default()
                },
            ) {
                log::warn!("popup for {target} not mounted: {err}");
                return None;
            }
        }
        ctx.pipeline.tree_mut().build(popup);
        ctx.overlay.popups.insert(
            target,
            PopupInfo {
                popup,
                target,
                in_subwindow,
                rect,
                layout,
            },
        );
        ctx.pipeline.request_frame();
        log::debug!("popup {popup} shown for {target} at {:?}", layout.placement);
        Some(popup)
    }

    pub fn hide_popup(ctx: &mut UiContext, target: NodeId) -> bool {
        let Some(info) = ctx.overlay.popups.shift_remove(&target) else {
            return false;
        };
        if info.in_subwindow {
            let parent = ctx.pipeline.id();
            ctx.subwindows
                .hide_popup(ctx.pipeline.tree_mut(), parent, info.popup);
        } else {
            let root = ctx.root();
            ctx.pipeline.tree_mut().remove_child(root, info.popup, false);
        }
        ctx.pipeline.request_frame();
        log::debug!("popup {} hidden", info.popup);
        true
    }
}

#[cfg(test)]
#[path = "tests/overlay_tests.rs"]
mod tests;
