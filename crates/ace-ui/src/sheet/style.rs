use ace_ui_graphics::Dimension;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SheetMode {
    Medium,
    Large,
    /// Fits the measured content, capped at `Large`.
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SheetHeight {
    Mode(SheetMode),
    Length(Dimension),
}

impl SheetHeight {
    pub const MEDIUM: SheetHeight = SheetHeight::Mode(SheetMode::Medium);
    pub const LARGE: SheetHeight = SheetHeight::Mode(SheetMode::Large);
    pub const AUTO: SheetHeight = SheetHeight::Mode(SheetMode::Auto);

    pub fn px(value: f32) -> Self {
        SheetHeight::Length(Dimension::px(value))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SheetType {
    #[default]
    Bottom,
    Center,
    /// Anchored to its target like a popup; not draggable.
    Popup,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollSizeMode {
    /// The content viewport only resizes when the sheet settles on a detent.
    #[default]
    FollowDetent,
    /// The content viewport tracks the sheet while it is dragged.
    Continuous,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SheetStyle {
    pub detents: Vec<SheetHeight>,
    /// Used when no detents are declared.
    pub height: Option<SheetHeight>,
    pub sheet_type: SheetType,
    pub scroll_size_mode: ScrollSizeMode,
    pub show_drag_bar: bool,
    /// A modal sheet blocks every other child of the root until it closes.
    pub modal: bool,
}

impl Default for SheetStyle {
    fn default() -> Self {
        Self {
            detents: Vec::new(),
            height: None,
            sheet_type: SheetType::Bottom,
            scroll_size_mode: ScrollSizeMode::FollowDetent,
            show_drag_bar: true,
            modal: true,
        }
    }
}

impl SheetStyle {
    pub fn with_detents(detents: impl IntoIterator<Item = SheetHeight>) -> Self {
        Self {
            detents: detents.into_iter().collect(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DismissReason {
    BackPressed,
    TouchOutside,
    CloseButton,
    SlideDown,
}

/// Host callbacks of one sheet. All are optional.
#[derive(Default)]
pub struct SheetCallbacks {
    pub on_appear: Option<Box<dyn FnMut()>>,
    pub on_disappear: Option<Box<dyn FnMut()>>,
    /// Resting height in px after a snap settles.
    pub on_height_did_change: Option<Box<dyn FnMut(f32)>>,
    /// Index of the new detent in declaration order.
    pub on_detents_did_change: Option<Box<dyn FnMut(usize)>>,
    /// Returns whether the sheet may close. Takes precedence over
    /// `on_will_dismiss`.
    pub should_dismiss: Option<Box<dyn FnMut() -> bool>>,
    pub on_will_dismiss: Option<Box<dyn FnMut(DismissReason) -> bool>>,
    /// Replaces the built-in spring-back animation of a vetoable dismiss.
    pub spring_back: Option<Box<dyn FnMut()>>,
}

impl SheetCallbacks {
    pub fn has_dismiss_hooks(&self) -> bool {
        self.should_dismiss.is_some() || self.on_will_dismiss.is_some()
    }

    pub(crate) fn allows_dismiss(&mut self, reason: DismissReason) -> bool {
        if let Some(should_dismiss) = self.should_dismiss.as_mut() {
            return should_dismiss();
        }
        match self.on_will_dismiss.as_mut() {
            Some(on_will_dismiss) => on_will_dismiss(reason),
            None => true,
        }
    }
}

impl std::fmt::Debug for SheetCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetCallbacks")
            .field("on_appear", &self.on_appear.is_some())
            .field("on_disappear", &self.on_disappear.is_some())
            .field("should_dismiss", &self.should_dismiss.is_some())
            .field("on_will_dismiss", &self.on_will_dismiss.is_some())
            .finish_non_exhaustive()
    }
}
