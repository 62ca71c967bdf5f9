use ace_animation::Curve;
use ace_core::SystemProperties;
use ace_ui_graphics::Dimension;

pub const API_VERSION_KEY: &str = "const.ace.api_version";
pub const DENSITY_KEY: &str = "persist.ace.density";
pub const PAGE_TRANSITION_KEY: &str = "persist.ace.page_transition_ms";

/// When the outgoing page receives `OnHide` during a push.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageHideOrder {
    /// After the incoming page is mounted and built (API 12 and later).
    AfterMount,
    /// Before the incoming page is mounted.
    BeforeMount,
}

impl PageHideOrder {
    pub fn for_api_version(api_version: u32) -> Self {
        if api_version >= 12 {
            PageHideOrder::AfterMount
        } else {
            PageHideOrder::BeforeMount
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SheetTheme {
    /// Gap kept between the large detent and the top of the sheet area.
    pub blank_inset: Dimension,
    pub medium_fraction: f32,
    pub legacy_medium_fraction: f32,
    /// Release speed (px/s) above which a drag snaps in its direction.
    pub velocity_threshold: f32,
    /// Clearance kept between the caret and the keyboard.
    pub caret_padding: Dimension,
    pub friction_ratio: f32,
    pub center_height: Dimension,
    pub snap_curve: Curve,
}

impl Default for SheetTheme {
    fn default() -> Self {
        Self {
            blank_inset: Dimension::vp(8.0),
            medium_fraction: 0.6,
            legacy_medium_fraction: 0.5,
            velocity_threshold: 1000.0,
            caret_padding: Dimension::vp(24.0),
            friction_ratio: 1.848,
            center_height: Dimension::vp(560.0),
            snap_curve: Curve::SHEET_SPRING,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BubbleTheme {
    /// Horizontal margin a popup keeps from the screen edges.
    pub horizontal_margin: Dimension,
    pub target_space: Dimension,
    pub arrow_height: Dimension,
    pub arrow_width: Dimension,
    pub border_radius: Dimension,
}

impl Default for BubbleTheme {
    fn default() -> Self {
        Self {
            horizontal_margin: Dimension::vp(6.0),
            target_space: Dimension::vp(8.0),
            arrow_height: Dimension::vp(8.0),
            arrow_width: Dimension::vp(16.0),
            border_radius: Dimension::vp(20.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UiConfig {
    pub api_version: u32,
    pub page_hide_order: PageHideOrder,
    pub page_transition_duration_ms: u64,
    /// Fade-out of frames removed with an exit transition.
    pub exit_transition_duration_ms: u64,
    /// Pixels per vp.
    pub density: f32,
    pub sheet: SheetTheme,
    pub bubble: BubbleTheme,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self::for_api_version(12)
    }
}

impl UiConfig {
    pub fn for_api_version(api_version: u32) -> Self {
        Self {
            api_version,
            page_hide_order: PageHideOrder::for_api_version(api_version),
            page_transition_duration_ms: 300,
            exit_transition_duration_ms: 200,
            density: 1.0,
            sheet: SheetTheme::default(),
            bubble: BubbleTheme::default(),
        }
    }

    pub fn from_properties(props: &dyn SystemProperties) -> Self {
        let api_version = props.parsed(API_VERSION_KEY, 12u32);
        let mut config = Self::for_api_version(api_version);
        config.density = props.parsed(DENSITY_KEY, 1.0f32);
        if config.density <= 0.0 {
            log::warn!("density {} is not positive, using 1.0", config.density);
            config.density = 1.0;
        }
        config.page_transition_duration_ms = props.parsed(PAGE_TRANSITION_KEY, 300u64);
        config
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Resolves a non-percent dimension to px.
    pub fn to_px(&self, dimension: Dimension) -> f32 {
        dimension.to_px(self.density, 0.0)
    }

    pub fn sheet_medium_fraction(&self) -> f32 {
        if self.api_version >= 12 {
            self.sheet.medium_fraction
        } else {
            self.sheet.legacy_medium_fraction
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ace_core::MapSystemProperties;

    #[test]
    fn hide_order_follows_api_version() {
        assert_eq!(UiConfig::default().page_hide_order, PageHideOrder::AfterMount);
        assert_eq!(
            UiConfig::for_api_version(11).page_hide_order,
            PageHideOrder::BeforeMount
        );
        assert_eq!(UiConfig::for_api_version(11).sheet_medium_fraction(), 0.5);
        assert_eq!(UiConfig::for_api_version(12).sheet_medium_fraction(), 0.6);
    }

    #[test]
    fn properties_override_defaults() {
        let props: MapSystemProperties = [
            (API_VERSION_KEY, "10"),
            (DENSITY_KEY, "2.0"),
            (PAGE_TRANSITION_KEY, "450"),
        ]
        .into_iter()
        .collect();
        let config = UiConfig::from_properties(&props);
        assert_eq!(config.api_version, 10);
        assert_eq!(config.page_hide_order, PageHideOrder::BeforeMount);
        assert_eq!(config.density, 2.0);
        assert_eq!(config.page_transition_duration_ms, 450);
        assert_eq!(config.to_px(Dimension::vp(8.0)), 16.0);
    }
}
