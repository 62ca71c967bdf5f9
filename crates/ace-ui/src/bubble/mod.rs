//! Popup bubble placement.

mod layout;
mod placement;

pub use layout::{BubbleLayoutAlgorithm, BubbleLayoutInput, BubbleLayoutResult};
pub use placement::{ArrowEdge, Placement};
