//! Tolerant float comparisons.
//!
//! Layout and gesture code compares positions produced by different
//! arithmetic paths, so equality is always checked against [`EPSILON`].

/// Tolerance used by every comparison in this module.
pub const EPSILON: f32 = 0.001;

pub fn near_equal(left: f32, right: f32) -> bool {
    (left - right).abs() <= EPSILON
}

pub fn near_zero(value: f32) -> bool {
    value.abs() <= EPSILON
}

pub fn less_not_equal(left: f32, right: f32) -> bool {
    left - right < -EPSILON
}

pub fn great_not_equal(left: f32, right: f32) -> bool {
    left - right > EPSILON
}

pub fn less_or_equal(left: f32, right: f32) -> bool {
    left - right <= EPSILON
}

pub fn great_or_equal(left: f32, right: f32) -> bool {
    left - right >= -EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparisons_respect_epsilon() {
        assert!(near_equal(1.0, 1.0005));
        assert!(!near_equal(1.0, 1.01));
        assert!(great_or_equal(1.0, 1.0005));
        assert!(!great_not_equal(1.0005, 1.0));
        assert!(less_not_equal(0.5, 1.0));
        assert!(less_or_equal(1.0, 1.0));
    }
}
