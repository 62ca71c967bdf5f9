//! Popups that float above the main window live in a lazily created
//! subwindow per instance. Its root node sits in the instance's arena under
//! a context id of its own.

use ace_core::collections::map::HashMap;
use ace_core::{tags, AddChildOptions, NodeId, NodeTree, PipelineId};
use ace_ui_graphics::Rect;
use indexmap::IndexMap;

use crate::window::{WindowError, WindowFactory, WindowOptions, WindowSurface};

pub const SUBWINDOW_CONTEXT_OFFSET: PipelineId = 1_000_000;

pub fn subwindow_context_id(parent: PipelineId) -> PipelineId {
    parent.saturating_add(SUBWINDOW_CONTEXT_OFFSET)
}

struct Subwindow {
    window: Box<dyn WindowSurface>,
    root: NodeId,
    popups: IndexMap<NodeId, Rect>,
    showing: bool,
}

impl Subwindow {
    fn sync_hot_areas(&mut self) {
        let rects: Vec<Rect> = self.popups.values().copied().collect();
        log_failure(self.window.set_touch_hot_areas(&rects));
    }
}

fn log_failure(result: Result<(), WindowError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            log::warn!("subwindow: {err}");
            false
        }
    }
}

pub struct SubwindowManager {
    factory: Box<dyn WindowFactory>,
    subwindows: HashMap<PipelineId, Subwindow>,
}

impl SubwindowManager {
    pub fn new(factory: Box<dyn WindowFactory>) -> Self {
        Self {
            factory,
            subwindows: HashMap::default(),
        }
    }

    fn ensure_subwindow(
        &mut self,
        tree: &mut NodeTree,
        parent: PipelineId,
        screen: Rect,
    ) -> Option<&mut Subwindow> {
        if !self.subwindows.contains_key(&parent) {
            let name = format!("ARK_APP_SUBWINDOW_{parent}");
            let options = WindowOptions {
                rect: screen,
                focusable: false,
                touchable: true,
                parent_id: Some(parent),
            };
            let window = match self.factory.create(&name, &options) {
                Ok(window) => window,
                Err(err) => {
                    log::warn!("subwindow {name} not created: {err}");
                    return None;
                }
            };
            let root = tree.spawn_frame(tags::ROOT);
            if let Ok(frame) = tree.frame_mut(root) {
                frame.geometry = screen;
            }
            tree.attach_to_main_tree(root, true, Some(subwindow_context_id(parent)));
            log::debug!("subwindow {name} created with root {root}");
            self.subwindows.insert(
                parent,
                Subwindow {
                    window,
                    root,
                    popups: IndexMap::new(),
                    showing: false,
                },
            );
        }
        self.subwindows.get_mut(&parent)
    }

    /// Mounts `popup` in the subwindow of `parent`, creating it if needed.
    /// Returns false when no subwindow could be created.
    pub fn show_popup(
        &mut self,
        tree: &mut NodeTree,
        parent: PipelineId,
        popup: NodeId,
        rect: Rect,
        screen: Rect,
    ) -> bool {
        let Some(subwindow) = self.ensure_subwindow(tree, parent, screen) else {
            return false;
        };
        if let Err(err) = tree.add_child(
            subwindow.root,
            popup,
            None,
            AddChildOptions::with_default_transition(),
        ) {
            log::warn!("popup {popup} not mounted in subwindow: {err}");
            return false;
        }
        subwindow.popups.insert(popup, rect);
        if !subwindow.showing {
            subwindow.showing = log_failure(subwindow.window.show());
        }
        subwindow.sync_hot_areas();
        true
    }

    /// Unmounts `popup`; the subwindow hides with its last popup.
    pub fn hide_popup(&mut self, tree: &mut NodeTree, parent: PipelineId, popup: NodeId) -> bool {
        let Some(subwindow) = self.subwindows.get_mut(&parent) else {
            return false;
        };
        if subwindow.popups.shift_remove(&popup).is_none() {
            return false;
        }
        tree.remove_child(subwindow.root, popup, false);
        subwindow.sync_hot_areas();
        if subwindow.popups.is_empty() && subwindow.showing {
            log_failure(subwindow.window.hide());
            subwindow.showing = false;
        }
        true
    }

    pub fn request_focus(&mut self, parent: PipelineId) -> bool {
        self.subwindows
            .get_mut(&parent)
            .is_some_and(|subwindow| log_failure(subwindow.window.request_focus()))
    }

    /// Follows a surface change of the parent window.
    pub fn resize(&mut self, tree: &mut NodeTree, parent: PipelineId, width: f32, height: f32) {
        let Some(subwindow) = self.subwindows.get_mut(&parent) else {
            return;
        };
        log_failure(subwindow.window.resize(width, height));
        if let Ok(frame) = tree.frame_mut(subwindow.root) {
            frame.geometry.width = width;
            frame.geometry.height = height;
        }
    }

    /// Drops the subwindow and every popup still mounted in it.
    pub fn close(&mut self, tree: &mut NodeTree, parent: PipelineId) {
        let Some(mut subwindow) = self.subwindows.remove(&parent) else {
            return;
        };
        if subwindow.showing {
            log_failure(subwindow.window.hide());
        }
        tree.clean(subwindow.root, true, false);
        tree.detach_from_main_tree(subwindow.root, true);
        tree.release(subwindow.root);
    }

    pub fn has_subwindow(&self, parent: PipelineId) -> bool {
        self.subwindows.contains_key(&parent)
    }

    pub fn is_showing(&self, parent: PipelineId) -> bool {
        self.subwindows
            .get(&parent)
            .is_some_and(|subwindow| subwindow.showing)
    }

    pub fn popup_count(&self, parent: PipelineId) -> usize {
        self.subwindows
            .get(&parent)
            .map_or(0, |subwindow| subwindow.popups.len())
    }

    pub fn contains_popup(&self, parent: PipelineId, popup: NodeId) -> bool {
        self.subwindows
            .get(&parent)
            .is_some_and(|subwindow| subwindow.popups.contains_key(&popup))
    }

    pub fn subwindow_root(&self, parent: PipelineId) -> Option<NodeId> {
        self.subwindows.get(&parent).map(|subwindow| subwindow.root)
    }

    pub fn window_name(&self, parent: PipelineId) -> Option<&str> {
        self.subwindows
            .get(&parent)
            .map(|subwindow| subwindow.window.name())
    }
}

#[cfg(test)]
#[path = "tests/subwindow_tests.rs"]
mod tests;
