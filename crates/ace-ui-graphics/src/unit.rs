//! Dimension units.

/// Unit attached to a [`Dimension`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DimensionUnit {
    /// Physical pixels.
    #[default]
    Px,
    /// Virtual pixels, scaled by the screen density.
    Vp,
    /// Fraction of a reference length, where `1.0` is the whole length.
    Percent,
}

/// A length with a unit, resolved to pixels on demand.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Dimension {
    pub value: f32,
    pub unit: DimensionUnit,
}

impl Dimension {
    pub const fn new(value: f32, unit: DimensionUnit) -> Self {
        Self { value, unit }
    }

    pub const fn px(value: f32) -> Self {
        Self::new(value, DimensionUnit::Px)
    }

    pub const fn vp(value: f32) -> Self {
        Self::new(value, DimensionUnit::Vp)
    }

    pub const fn percent(value: f32) -> Self {
        Self::new(value, DimensionUnit::Percent)
    }

    pub fn is_percent(&self) -> bool {
        self.unit == DimensionUnit::Percent
    }

    /// Resolves this dimension to pixels.
    ///
    /// `density` converts vp to px; `reference` is the length a percentage
    /// refers to.
    pub fn to_px(&self, density: f32, reference: f32) -> f32 {
        match self.unit {
            DimensionUnit::Px => self.value,
            DimensionUnit::Vp => self.value * density,
            DimensionUnit::Percent => self.value * reference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_each_unit() {
        assert_eq!(Dimension::px(12.0).to_px(2.0, 100.0), 12.0);
        assert_eq!(Dimension::vp(12.0).to_px(2.0, 100.0), 24.0);
        assert_eq!(Dimension::percent(0.25).to_px(2.0, 100.0), 25.0);
    }
}
