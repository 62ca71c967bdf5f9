//! Pure math/data for geometry & units in the Ace UI runtime
//!
//! This crate contains geometry primitives, dimension units and the
//! tolerant float comparisons used by layout and gesture code.

mod geometry;
mod math;
mod unit;

pub use geometry::*;
pub use math::*;
pub use unit::*;

pub mod prelude {
    pub use crate::geometry::{EdgeInsets, Point, Rect, Size};
    pub use crate::math::{near_equal, near_zero};
    pub use crate::unit::{Dimension, DimensionUnit};
}
