//! Draggable sheets with detents.

mod pattern;
mod style;

pub use pattern::{SheetPresentationPattern, SnapTarget};
pub use style::{
    DismissReason, ScrollSizeMode, SheetCallbacks, SheetHeight, SheetMode, SheetStyle, SheetType,
};
