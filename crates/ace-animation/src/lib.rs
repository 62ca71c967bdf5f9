//! Animation system for the Ace UI runtime
//!
//! Provides time-based animations with easing curves and spring physics,
//! driven once per frame against the UI context that owns them.

mod curve;
mod driver;

pub use curve::*;
pub use driver::*;

pub mod prelude {
    pub use crate::curve::{AnimationOption, Curve, Lerp};
    pub use crate::driver::{pump_animations, AnimationDriver, AnimationHandle};
}
