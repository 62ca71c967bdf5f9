//! Platform window surfaces as seen by the UI core.
//!
//! Every operation reports an error code on failure; callers log it and
//! carry on.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ace_ui_graphics::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WindowOp {
    Create,
    Show,
    Hide,
    Resize,
    SetTouchHotAreas,
    RequestFocus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowError {
    pub code: i32,
    pub op: WindowOp,
}

impl WindowError {
    pub fn new(op: WindowOp, code: i32) -> Self {
        Self { code, op }
    }
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window {:?} failed with code {}", self.op, self.code)
    }
}

impl std::error::Error for WindowError {}

#[derive(Clone, Debug, PartialEq)]
pub struct WindowOptions {
    pub rect: Rect,
    pub focusable: bool,
    pub touchable: bool,
    /// Instance that owns the new window.
    pub parent_id: Option<u32>,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            rect: Rect::default(),
            focusable: false,
            touchable: true,
            parent_id: None,
        }
    }
}

pub trait WindowSurface {
    fn name(&self) -> &str;
    fn show(&mut self) -> Result<(), WindowError>;
    fn hide(&mut self) -> Result<(), WindowError>;
    fn resize(&mut self, width: f32, height: f32) -> Result<(), WindowError>;
    fn set_touch_hot_areas(&mut self, rects: &[Rect]) -> Result<(), WindowError>;
    fn request_focus(&mut self) -> Result<(), WindowError>;
    fn rect(&self) -> Rect;
}

pub trait WindowFactory {
    fn create(
        &mut self,
        name: &str,
        options: &WindowOptions,
    ) -> Result<Box<dyn WindowSurface>, WindowError>;
}

/// Observable state of a [`HeadlessWindow`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeadlessWindowState {
    pub name: String,
    pub rect: Rect,
    pub visible: bool,
    pub hot_areas: Vec<Rect>,
    pub focus_requests: u32,
    pub calls: Vec<WindowOp>,
}

#[derive(Default)]
struct HeadlessRegistry {
    windows: Vec<Rc<RefCell<HeadlessWindowState>>>,
    failures: Vec<(WindowOp, i32)>,
}

impl HeadlessRegistry {
    fn failure(&self, op: WindowOp) -> Option<WindowError> {
        self.failures
            .iter()
            .find(|(failing, _)| *failing == op)
            .map(|(op, code)| WindowError::new(*op, *code))
    }
}

/// In-memory window that records every call.
pub struct HeadlessWindow {
    state: Rc<RefCell<HeadlessWindowState>>,
    registry: Rc<RefCell<HeadlessRegistry>>,
    name: String,
}

impl HeadlessWindow {
    fn apply(
        &mut self,
        op: WindowOp,
        update: impl FnOnce(&mut HeadlessWindowState),
    ) -> Result<(), WindowError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(op);
        if let Some(err) = self.registry.borrow().failure(op) {
            return Err(err);
        }
        update(&mut state);
        Ok(())
    }
}

impl WindowSurface for HeadlessWindow {
    fn name(&self) -> &str {
        &self.name
    }

    fn show(&mut self) -> Result<(), WindowError> {
        self.apply(WindowOp::Show, |state| state.visible = true)
    }

    fn hide(&mut self) -> Result<(), WindowError> {
        self.apply(WindowOp::Hide, |state| state.visible = false)
    }

    fn resize(&mut self, width: f32, height: f32) -> Result<(), WindowError> {
        self.apply(WindowOp::Resize, |state| {
            state.rect.width = width;
            state.rect.height = height;
        })
    }

    fn set_touch_hot_areas(&mut self, rects: &[Rect]) -> Result<(), WindowError> {
        self.apply(WindowOp::SetTouchHotAreas, |state| {
            state.hot_areas = rects.to_vec()
        })
    }

    fn request_focus(&mut self) -> Result<(), WindowError> {
        self.apply(WindowOp::RequestFocus, |state| state.focus_requests += 1)
    }

    fn rect(&self) -> Rect {
        self.state.borrow().rect
    }
}

/// Creates [`HeadlessWindow`]s. Clones share the same registry, so a test can
/// keep one to inspect windows created through another.
#[derive(Clone, Default)]
pub struct HeadlessWindowFactory {
    registry: Rc<RefCell<HeadlessRegistry>>,
}

impl HeadlessWindowFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `op` fail with `code`.
    pub fn fail_on(&self, op: WindowOp, code: i32) {
        self.registry.borrow_mut().failures.push((op, code));
    }

    pub fn clear_failures(&self) {
        self.registry.borrow_mut().failures.clear();
    }

    pub fn window_count(&self) -> usize {
        self.registry.borrow().windows.len()
    }

    pub fn window(&self, name: &str) -> Option<HeadlessWindowState> {
        let registry = self.registry.borrow();
        let found = registry
            .windows
            .iter()
            .find(|state| state.borrow().name == name)?;
        let state = found.borrow().clone();
        Some(state)
    }
}

impl WindowFactory for HeadlessWindowFactory {
    fn create(
        &mut self,
        name: &str,
        options: &WindowOptions,
    ) -> Result<Box<dyn WindowSurface>, WindowError> {
        if let Some(err) = self.registry.borrow().failure(WindowOp::Create) {
            return Err(err);
        }
        let state = Rc::new(RefCell::new(HeadlessWindowState {
            name: name.to_owned(),
            rect: options.rect,
            calls: vec![WindowOp::Create],
            ..HeadlessWindowState::default()
        }));
        self.registry.borrow_mut().windows.push(Rc::clone(&state));
        Ok(Box::new(HeadlessWindow {
            state,
            registry: Rc::clone(&self.registry),
            name: name.to_owned(),
        }))
    }
}
