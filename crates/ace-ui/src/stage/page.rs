use ace_core::{NodeId, NodeTree};
use ace_ui_graphics::Point;

use super::transition::{PageTransitionEffect, PageTransitionType};
use crate::observer::{RouterPageInfo, RouterPageState, UiObserver};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub page_id: i32,
    pub url: String,
    pub full_path: String,
}

impl PageInfo {
    pub fn new(page_id: i32, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            page_id,
            full_path: url.clone(),
            url,
        }
    }
}

type Callback = Box<dyn FnMut() + 'static>;

/// Lifecycle state of one page on the stage.
pub struct PagePattern {
    node: NodeId,
    info: PageInfo,
    is_on_show: bool,
    is_render_done: bool,
    in_transition: bool,
    focus_show_count: u32,
    effects: Vec<PageTransitionEffect>,
    on_page_show: Option<Callback>,
    on_page_hide: Option<Callback>,
    on_back_pressed: Option<Box<dyn FnMut() -> bool + 'static>>,
    on_hidden_change: Vec<Box<dyn FnMut(bool) + 'static>>,
    on_focus_show: Option<Callback>,
}

impl PagePattern {
    pub fn new(node: NodeId, info: PageInfo) -> Self {
        Self {
            node,
            info,
            is_on_show: false,
            is_render_done: false,
            in_transition: false,
            focus_show_count: 0,
            effects: Vec::new(),
            on_page_show: None,
            on_page_hide: None,
            on_back_pressed: None,
            on_hidden_change: Vec::new(),
            on_focus_show: None,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn info(&self) -> &PageInfo {
        &self.info
    }

    pub fn is_on_show(&self) -> bool {
        self.is_on_show
    }

    pub fn is_render_done(&self) -> bool {
        self.is_render_done
    }

    pub fn mark_render_done(&mut self) {
        self.is_render_done = true;
    }

    pub fn is_page_in_transition(&self) -> bool {
        self.in_transition
    }

    pub(crate) fn set_page_in_transition(&mut self, value: bool) {
        self.in_transition = value;
    }

    pub fn focus_show_count(&self) -> u32 {
        self.focus_show_count
    }

    pub fn set_on_page_show(&mut self, callback: impl FnMut() + 'static) {
        self.on_page_show = Some(Box::new(callback));
    }

    pub fn set_on_page_hide(&mut self, callback: impl FnMut() + 'static) {
        self.on_page_hide = Some(Box::new(callback));
    }

    /// The callback returns whether it consumed the back press.
    pub fn set_on_back_pressed(&mut self, callback: impl FnMut() -> bool + 'static) {
        self.on_back_pressed = Some(Box::new(callback));
    }

    pub fn add_on_hidden_change(&mut self, callback: impl FnMut(bool) + 'static) {
        self.on_hidden_change.push(Box::new(callback));
    }

    pub fn set_on_focus_show(&mut self, callback: impl FnMut() + 'static) {
        self.on_focus_show = Some(Box::new(callback));
    }

    pub(crate) fn notify_state(&self, observer: &mut UiObserver, state: RouterPageState) {
        observer.notify_router_page_state_change(&RouterPageInfo {
            node: self.node,
            page_id: self.info.page_id,
            url: self.info.url.clone(),
            full_path: self.info.full_path.clone(),
            state,
        });
    }

    /// Fires the show callbacks. Ignored before the first render and while
    /// already shown. Returns whether anything fired.
    pub fn on_show(&mut self, observer: &mut UiObserver) -> bool {
        if !self.is_render_done || self.is_on_show {
            return false;
        }
        self.is_on_show = true;
        self.notify_state(observer, RouterPageState::OnPageShow);
        if let Some(callback) = self.on_page_show.as_mut() {
            callback();
        }
        self.fire_on_hidden_change(true);
        true
    }

    pub fn on_hide(&mut self, observer: &mut UiObserver) -> bool {
        if !self.is_on_show {
            return false;
        }
        self.is_on_show = false;
        self.notify_state(observer, RouterPageState::OnPageHide);
        if let Some(callback) = self.on_page_hide.as_mut() {
            callback();
        }
        self.fire_on_hidden_change(false);
        true
    }

    /// Returns whether the press was consumed. A page in transition swallows it.
    pub fn on_back_pressed(&mut self, observer: &mut UiObserver) -> bool {
        if self.in_transition {
            return true;
        }
        self.notify_state(observer, RouterPageState::OnBackPress);
        self.on_back_pressed
            .as_mut()
            .is_some_and(|callback| callback())
    }

    fn fire_on_hidden_change(&mut self, visible: bool) {
        for callback in self.on_hidden_change.iter_mut() {
            callback(visible);
        }
    }

    pub(crate) fn focus_view_show(&mut self) {
        self.focus_show_count += 1;
        if let Some(callback) = self.on_focus_show.as_mut() {
            callback();
        }
    }

    pub fn add_page_transition(&mut self, effect: PageTransitionEffect) {
        self.effects.push(effect);
    }

    pub fn clear_page_transitions(&mut self) {
        self.effects.clear();
    }

    /// Most recently added effect matching `transition`, else the built-in one.
    pub fn page_transition_effect(
        &self,
        transition: PageTransitionType,
        default_duration_millis: u64,
    ) -> Option<PageTransitionEffect> {
        self.effects
            .iter()
            .rev()
            .find(|effect| effect.matches(transition))
            .cloned()
            .or_else(|| PageTransitionEffect::default_for(transition, default_duration_millis))
    }

    /// Puts the page back at rest after an interrupted transition.
    pub fn reset_page_transition_effect(&self, tree: &mut NodeTree) {
        if let Ok(frame) = tree.frame_mut(self.node) {
            frame.render.translate = Point::ZERO;
            frame.render.opacity = 1.0;
        }
    }
}

impl std::fmt::Debug for PagePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagePattern")
            .field("node", &self.node)
            .field("url", &self.info.url)
            .field("is_on_show", &self.is_on_show)
            .field("in_transition", &self.in_transition)
            .finish()
    }
}
