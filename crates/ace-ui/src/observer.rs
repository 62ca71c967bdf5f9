//! Notification sinks for router pages, navigation destinations and scroll
//! events. An unset handler is skipped.

use ace_core::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouterPageState {
    AboutToAppear,
    AboutToDisappear,
    OnPageShow,
    OnPageHide,
    OnBackPress,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouterPageInfo {
    pub node: NodeId,
    pub page_id: i32,
    pub url: String,
    pub full_path: String,
    pub state: RouterPageState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavDestinationState {
    OnShown,
    OnHidden,
    OnAppear,
    OnDisappear,
    OnBackPress,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NavDestinationInfo {
    pub navigation_id: String,
    pub name: String,
    pub state: NavDestinationState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollEventType {
    ScrollStart,
    ScrollStop,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollEventInfo {
    pub node: NodeId,
    pub event_type: ScrollEventType,
    pub offset: f32,
}

type Handler<T> = Box<dyn FnMut(&T) + 'static>;

#[derive(Default)]
pub struct UiObserver {
    router_page: Option<Handler<RouterPageInfo>>,
    navigation: Option<Handler<NavDestinationInfo>>,
    scroll: Option<Handler<ScrollEventInfo>>,
}

impl UiObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_router_page_handler(&mut self, handler: impl FnMut(&RouterPageInfo) + 'static) {
        self.router_page = Some(Box::new(handler));
    }

    pub fn set_navigation_handler(&mut self, handler: impl FnMut(&NavDestinationInfo) + 'static) {
        self.navigation = Some(Box::new(handler));
    }

    pub fn set_scroll_handler(&mut self, handler: impl FnMut(&ScrollEventInfo) + 'static) {
        self.scroll = Some(Box::new(handler));
    }

    pub fn clear(&mut self) {
        self.router_page = None;
        self.navigation = None;
        self.scroll = None;
    }

    pub fn has_router_page_handler(&self) -> bool {
        self.router_page.is_some()
    }

    pub fn notify_router_page_state_change(&mut self, info: &RouterPageInfo) {
        log::debug!("router page {} -> {:?}", info.url, info.state);
        if let Some(handler) = self.router_page.as_mut() {
            handler(info);
        }
    }

    pub fn notify_navigation_state_change(&mut self, info: &NavDestinationInfo) {
        if let Some(handler) = self.navigation.as_mut() {
            handler(info);
        }
    }

    pub fn notify_scroll_event(&mut self, info: &ScrollEventInfo) {
        if let Some(handler) = self.scroll.as_mut() {
            handler(info);
        }
    }
}

impl std::fmt::Debug for UiObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiObserver")
            .field("router_page", &self.router_page.is_some())
            .field("navigation", &self.navigation.is_some())
            .field("scroll", &self.scroll.is_some())
            .finish()
    }
}
