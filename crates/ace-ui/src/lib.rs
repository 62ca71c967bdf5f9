#![doc = r"Stage, sheet, popup and safe-area services of the Ace UI runtime."]

pub mod bubble;
pub mod config;
mod context;
pub mod inspector;
pub mod observer;
mod overlay;
pub mod safe_area;
pub mod sheet;
pub mod stage;
mod subwindow;
mod text_field;
pub mod window;

pub use bubble::{
    ArrowEdge, BubbleLayoutAlgorithm, BubbleLayoutInput, BubbleLayoutResult, Placement,
};
pub use config::{BubbleTheme, PageHideOrder, SheetTheme, UiConfig};
pub use context::UiContext;
pub use observer::UiObserver;
pub use overlay::{OverlayManager, PopupInfo, PopupParam};
pub use safe_area::{SafeAreaInsets, SafeAreaManager};
pub use sheet::{SheetCallbacks, SheetPresentationPattern, SheetStyle};
pub use stage::{PageInfo, PagePattern, StageManager};
pub use subwindow::{subwindow_context_id, SubwindowManager, SUBWINDOW_CONTEXT_OFFSET};
pub use text_field::{FocusedInput, TextFieldManager};
pub use window::{HeadlessWindowFactory, WindowError, WindowFactory, WindowSurface};

pub mod prelude {
    pub use crate::bubble::Placement;
    pub use crate::config::UiConfig;
    pub use crate::context::UiContext;
    pub use crate::overlay::{OverlayManager, PopupParam};
    pub use crate::sheet::{SheetCallbacks, SheetHeight, SheetStyle};
    pub use crate::stage::{PageInfo, StageManager};
}
