//! Safe-area bookkeeping: system bars, display cutouts, navigation indicator
//! and keyboard insets, and the rules for combining them.

use std::ops::BitOr;

use ace_ui_graphics::Size;

/// Occupied span along one edge, `start..end` in screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Inset {
    pub start: f32,
    pub end: f32,
}

impl Inset {
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    pub fn length(&self) -> f32 {
        if self.is_valid() {
            self.end - self.start
        } else {
            0.0
        }
    }

    /// Union of two spans; an invalid span contributes nothing.
    pub fn combine(&self, other: &Inset) -> Inset {
        match (self.is_valid(), other.is_valid()) {
            (true, true) => Inset::new(self.start.min(other.start), self.end.max(other.end)),
            (true, false) => *self,
            _ => *other,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SafeAreaInsets {
    pub left: Inset,
    pub top: Inset,
    pub right: Inset,
    pub bottom: Inset,
}

impl SafeAreaInsets {
    pub const fn new(left: Inset, top: Inset, right: Inset, bottom: Inset) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.left.is_valid() || self.top.is_valid() || self.right.is_valid() || self.bottom.is_valid()
    }

    pub fn combine(&self, other: &SafeAreaInsets) -> SafeAreaInsets {
        SafeAreaInsets {
            left: self.left.combine(&other.left),
            top: self.top.combine(&other.top),
            right: self.right.combine(&other.right),
            bottom: self.bottom.combine(&other.bottom),
        }
    }
}

/// Bit set of inset sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SafeAreaType(u8);

impl SafeAreaType {
    pub const NONE: SafeAreaType = SafeAreaType(0);
    pub const SYSTEM: SafeAreaType = SafeAreaType(1);
    pub const CUTOUT: SafeAreaType = SafeAreaType(1 << 1);
    pub const KEYBOARD: SafeAreaType = SafeAreaType(1 << 2);
    pub const ALL: SafeAreaType = SafeAreaType(0b111);

    pub fn contains(self, other: SafeAreaType) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }
}

impl BitOr for SafeAreaType {
    type Output = SafeAreaType;

    fn bitor(self, rhs: Self) -> Self::Output {
        SafeAreaType(self.0 | rhs.0)
    }
}

/// Bit set of screen edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SafeAreaEdge(u8);

impl SafeAreaEdge {
    pub const TOP: SafeAreaEdge = SafeAreaEdge(1);
    pub const BOTTOM: SafeAreaEdge = SafeAreaEdge(1 << 1);
    pub const START: SafeAreaEdge = SafeAreaEdge(1 << 2);
    pub const END: SafeAreaEdge = SafeAreaEdge(1 << 3);
    pub const ALL: SafeAreaEdge = SafeAreaEdge(0b1111);

    pub fn contains(self, other: SafeAreaEdge) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }
}

impl BitOr for SafeAreaEdge {
    type Output = SafeAreaEdge;

    fn bitor(self, rhs: Self) -> Self::Output {
        SafeAreaEdge(self.0 | rhs.0)
    }
}

/// Which insets a node wants to extend into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SafeAreaExpandOpts {
    pub types: SafeAreaType,
    pub edges: SafeAreaEdge,
}

impl Default for SafeAreaExpandOpts {
    fn default() -> Self {
        Self {
            types: SafeAreaType::SYSTEM | SafeAreaType::CUTOUT,
            edges: SafeAreaEdge::ALL,
        }
    }
}

#[derive(Debug)]
pub struct SafeAreaManager {
    system: SafeAreaInsets,
    cutout: SafeAreaInsets,
    nav: SafeAreaInsets,
    keyboard: Inset,
    keyboard_offset: f32,
    ignore_safe_area: bool,
    is_full_screen: bool,
    is_need_avoid_window: bool,
    keyboard_safe_area_enabled: bool,
}

impl Default for SafeAreaManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SafeAreaManager {
    pub fn new() -> Self {
        Self {
            system: SafeAreaInsets::default(),
            cutout: SafeAreaInsets::default(),
            nav: SafeAreaInsets::default(),
            keyboard: Inset::default(),
            keyboard_offset: 0.0,
            ignore_safe_area: false,
            is_full_screen: true,
            is_need_avoid_window: false,
            keyboard_safe_area_enabled: false,
        }
    }

    pub fn update_system_safe_area(&mut self, insets: SafeAreaInsets) -> bool {
        if self.system == insets {
            return false;
        }
        self.system = insets;
        true
    }

    /// Cutouts are extended to the screen edge they touch.
    pub fn update_cutout_safe_area(&mut self, insets: SafeAreaInsets, root: Size) -> bool {
        let mut cutout = insets;
        if cutout.top.is_valid() {
            cutout.top.start = 0.0;
        }
        if cutout.bottom.is_valid() {
            cutout.bottom.end = root.height;
        }
        if cutout.left.is_valid() {
            cutout.left.start = 0.0;
        }
        if cutout.right.is_valid() {
            cutout.right.end = root.width;
        }
        if self.cutout == cutout {
            return false;
        }
        self.cutout = cutout;
        true
    }

    pub fn update_nav_area(&mut self, insets: SafeAreaInsets) -> bool {
        if self.nav == insets {
            return false;
        }
        self.nav = insets;
        true
    }

    /// A keyboard of `height` px rising from the bottom of a root that is
    /// `root_height` tall. A non-positive height means the keyboard closed.
    pub fn update_keyboard_safe_area(&mut self, height: f32, root_height: f32) -> bool {
        let inset = if height > 0.0 {
            Inset::new((root_height - height).max(0.0), root_height)
        } else {
            Inset::default()
        };
        if self.keyboard == inset {
            return false;
        }
        log::debug!("keyboard inset {:?} -> {:?}", self.keyboard, inset);
        self.keyboard = inset;
        true
    }

    pub fn system_safe_area(&self) -> SafeAreaInsets {
        self.system
    }

    pub fn cutout_safe_area(&self) -> SafeAreaInsets {
        self.cutout
    }

    pub fn nav_safe_area(&self) -> SafeAreaInsets {
        self.nav
    }

    pub fn keyboard_inset(&self) -> Inset {
        self.keyboard
    }

    pub fn keyboard_height(&self) -> f32 {
        self.keyboard.length()
    }

    /// System bars, cutouts and the navigation indicator; never the keyboard.
    pub fn safe_area(&self) -> SafeAreaInsets {
        if !self.avoids_insets() {
            return SafeAreaInsets::default();
        }
        self.system.combine(&self.cutout).combine(&self.nav)
    }

    pub fn get_combined_safe_area(&self, opts: SafeAreaExpandOpts) -> SafeAreaInsets {
        let mut res = SafeAreaInsets::default();
        if !self.avoids_insets() {
            return res;
        }
        if opts.types.contains(SafeAreaType::CUTOUT) {
            res = res.combine(&self.cutout);
        }
        if opts.types.contains(SafeAreaType::SYSTEM) {
            res = res.combine(&self.system).combine(&self.nav);
        }
        if self.keyboard_safe_area_enabled && opts.types.contains(SafeAreaType::KEYBOARD) {
            res.bottom = res.bottom.combine(&self.keyboard);
        }
        if !opts.edges.contains(SafeAreaEdge::TOP) {
            res.top = Inset::default();
        }
        if !opts.edges.contains(SafeAreaEdge::BOTTOM) {
            res.bottom = Inset::default();
        }
        if !opts.edges.contains(SafeAreaEdge::START) {
            res.left = Inset::default();
        }
        if !opts.edges.contains(SafeAreaEdge::END) {
            res.right = Inset::default();
        }
        res
    }

    fn avoids_insets(&self) -> bool {
        !self.ignore_safe_area && (self.is_full_screen || self.is_need_avoid_window)
    }

    pub fn set_ignore_safe_area(&mut self, value: bool) -> bool {
        std::mem::replace(&mut self.ignore_safe_area, value) != value
    }

    pub fn set_is_full_screen(&mut self, value: bool) -> bool {
        std::mem::replace(&mut self.is_full_screen, value) != value
    }

    pub fn set_is_need_avoid_window(&mut self, value: bool) -> bool {
        std::mem::replace(&mut self.is_need_avoid_window, value) != value
    }

    pub fn set_keyboard_safe_area_enabled(&mut self, value: bool) -> bool {
        std::mem::replace(&mut self.keyboard_safe_area_enabled, value) != value
    }

    pub fn keyboard_safe_area_enabled(&self) -> bool {
        self.keyboard_safe_area_enabled
    }

    pub fn keyboard_offset(&self) -> f32 {
        self.keyboard_offset
    }

    pub fn update_keyboard_offset(&mut self, offset: f32) {
        self.keyboard_offset = offset;
    }
}

#[cfg(test)]
#[path = "tests/safe_area_tests.rs"]
mod tests;
