use ace_ui_graphics::Point;

/// Trait for types that can be linearly interpolated.
pub trait Lerp {
    fn lerp(&self, target: &Self, fraction: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction
    }
}

impl Lerp for Point {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        Point::new(self.x.lerp(&target.x, fraction), self.y.lerp(&target.y, fraction))
    }
}

/// Easing curves used by page, sheet and popup transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    FastOutSlowIn,
    LinearOutSlowIn,
    FastOutLinearIn,
    Sharp,
    Friction,
    /// Spring released from rest (or with `velocity`) towards the target.
    InterpolatingSpring {
        velocity: f32,
        mass: f32,
        stiffness: f32,
        damping: f32,
    },
}

impl Curve {
    /// Spring used when a sheet snaps to a detent.
    pub const SHEET_SPRING: Curve = Curve::InterpolatingSpring {
        velocity: 0.0,
        mass: 1.0,
        stiffness: 328.0,
        damping: 36.0,
    };

    /// Apply the curve to a linear fraction [0, 1].
    pub fn transform(&self, fraction: f32) -> f32 {
        let t = fraction.clamp(0.0, 1.0);
        match *self {
            Curve::Linear => t,
            Curve::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Curve::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Curve::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Curve::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Curve::FastOutSlowIn => cubic_bezier(0.4, 0.0, 0.2, 1.0, t),
            Curve::LinearOutSlowIn => cubic_bezier(0.0, 0.0, 0.2, 1.0, t),
            Curve::FastOutLinearIn => cubic_bezier(0.4, 0.0, 1.0, 1.0, t),
            Curve::Sharp => cubic_bezier(0.33, 0.0, 0.67, 1.0, t),
            Curve::Friction => cubic_bezier(0.2, 0.0, 0.2, 1.0, t),
            Curve::InterpolatingSpring { .. } => {
                if t >= 1.0 {
                    return 1.0;
                }
                let seconds = t * self.settle_seconds();
                self.spring_position(seconds)
            }
        }
    }

    /// Natural duration of the curve; `None` for curves that take their
    /// duration from the animation option.
    pub fn natural_duration_millis(&self) -> Option<u64> {
        match self {
            Curve::InterpolatingSpring { .. } => Some((self.settle_seconds() * 1000.0).ceil() as u64),
            _ => None,
        }
    }

    fn spring_params(&self) -> (f32, f32, f32) {
        match *self {
            Curve::InterpolatingSpring {
                velocity,
                mass,
                stiffness,
                damping,
            } => {
                let mass = mass.max(f32::EPSILON);
                let stiffness = stiffness.max(f32::EPSILON);
                let omega = (stiffness / mass).sqrt();
                let zeta = damping.max(0.0) / (2.0 * (stiffness * mass).sqrt());
                (omega, zeta, velocity)
            }
            _ => (1.0, 1.0, 0.0),
        }
    }

    fn settle_seconds(&self) -> f32 {
        let (omega, zeta, _) = self.spring_params();
        // time until the envelope decays below 0.1%
        let decay = if zeta < 1.0 {
            zeta * omega
        } else {
            omega * (zeta - (zeta * zeta - 1.0).sqrt())
        };
        (6.9 / decay.max(0.01)).min(10.0)
    }

    fn spring_position(&self, t: f32) -> f32 {
        let (omega, zeta, v0) = self.spring_params();
        if zeta < 1.0 {
            let omega_d = omega * (1.0 - zeta * zeta).sqrt();
            let envelope = (-zeta * omega * t).exp();
            let b = (zeta * omega - v0) / omega_d;
            1.0 - envelope * ((omega_d * t).cos() + b * (omega_d * t).sin())
        } else if (zeta - 1.0).abs() < 1e-4 {
            1.0 - (-omega * t).exp() * (1.0 + (omega - v0) * t)
        } else {
            let root = (zeta * zeta - 1.0).sqrt();
            let r1 = -omega * (zeta - root);
            let r2 = -omega * (zeta + root);
            let c1 = (-v0 - r2) / (r1 - r2);
            let c2 = 1.0 - c1;
            1.0 - (c1 * (r1 * t).exp() + c2 * (r2 * t).exp())
        }
    }
}

/// Cubic bezier easing through (0,0), (x1,y1), (x2,y2), (1,1).
///
/// Solves the curve parameter for `x` with Newton iterations, falling back
/// to bisection when the slope flattens.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    fn sample(a1: f32, a2: f32, t: f32) -> f32 {
        let mt = 1.0 - t;
        3.0 * mt * mt * t * a1 + 3.0 * mt * t * t * a2 + t * t * t
    }
    fn slope(a1: f32, a2: f32, t: f32) -> f32 {
        let mt = 1.0 - t;
        3.0 * mt * mt * a1 + 6.0 * mt * t * (a2 - a1) + 3.0 * t * t * (1.0 - a2)
    }

    let mut t = x;
    for _ in 0..8 {
        let error = sample(x1, x2, t) - x;
        if error.abs() < 1e-5 {
            return sample(y1, y2, t);
        }
        let d = slope(x1, x2, t);
        if d.abs() < 1e-6 {
            break;
        }
        t -= error / d;
    }
    let (mut low, mut high) = (0.0f32, 1.0f32);
    t = x;
    for _ in 0..32 {
        let value = sample(x1, x2, t);
        if (value - x).abs() < 1e-5 {
            break;
        }
        if value < x {
            low = t;
        } else {
            high = t;
        }
        t = (low + high) * 0.5;
    }
    sample(y1, y2, t)
}

/// Duration, delay and curve of one animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationOption {
    /// Duration in milliseconds.
    pub duration_millis: u64,
    /// Delay before starting animation in milliseconds.
    pub delay_millis: u64,
    pub curve: Curve,
}

impl AnimationOption {
    pub fn new(duration_millis: u64, curve: Curve) -> Self {
        Self {
            duration_millis,
            delay_millis: 0,
            curve,
        }
    }

    /// Option whose duration is the spring's settle time.
    pub fn spring(curve: Curve) -> Self {
        let duration = curve.natural_duration_millis().unwrap_or(300);
        Self::new(duration, curve)
    }

    pub fn linear(duration_millis: u64) -> Self {
        Self::new(duration_millis, Curve::Linear)
    }

    pub fn with_delay(mut self, delay_millis: u64) -> Self {
        self.delay_millis = delay_millis;
        self
    }
}

impl Default for AnimationOption {
    fn default() -> Self {
        Self::new(300, Curve::FastOutSlowIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curves_start_at_zero_and_end_at_one() {
        let curves = [
            Curve::Linear,
            Curve::Ease,
            Curve::EaseIn,
            Curve::EaseOut,
            Curve::EaseInOut,
            Curve::FastOutSlowIn,
            Curve::LinearOutSlowIn,
            Curve::FastOutLinearIn,
            Curve::Sharp,
            Curve::Friction,
            Curve::SHEET_SPRING,
        ];
        for curve in curves {
            assert!(curve.transform(0.0).abs() < 0.01, "start of {curve:?}");
            assert!((curve.transform(1.0) - 1.0).abs() < 0.01, "end of {curve:?}");
        }
    }

    #[test]
    fn ease_out_leads_linear() {
        assert!(Curve::EaseOut.transform(0.3) > 0.3);
        assert!(Curve::EaseIn.transform(0.3) < 0.3);
        assert_eq!(Curve::Linear.transform(0.25), 0.25);
    }

    #[test]
    fn sheet_spring_settles_in_under_a_second() {
        let duration = Curve::SHEET_SPRING.natural_duration_millis().unwrap();
        assert!(duration > 100 && duration < 1000, "{duration}");
        assert_eq!(AnimationOption::spring(Curve::SHEET_SPRING).duration_millis, duration);
        assert!(Curve::SHEET_SPRING.transform(0.5) > 0.8);
    }

    #[test]
    fn lerp_interpolates_points() {
        let from = Point::new(0.0, 100.0);
        let to = Point::new(50.0, 0.0);
        assert_eq!(from.lerp(&to, 0.5), Point::new(25.0, 50.0));
    }
}
