/// Where a popup sits relative to its target.
///
/// The first word names the side of the target, the second how the popup
/// aligns along that side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Placement {
    Top,
    TopLeft,
    TopRight,
    #[default]
    Bottom,
    BottomLeft,
    BottomRight,
    Left,
    LeftTop,
    LeftBottom,
    Right,
    RightTop,
    RightBottom,
}

impl Placement {
    pub const ALL: [Placement; 12] = [
        Placement::Top,
        Placement::TopLeft,
        Placement::TopRight,
        Placement::Bottom,
        Placement::BottomLeft,
        Placement::BottomRight,
        Placement::Left,
        Placement::LeftTop,
        Placement::LeftBottom,
        Placement::Right,
        Placement::RightTop,
        Placement::RightBottom,
    ];

    pub fn is_top(self) -> bool {
        matches!(self, Placement::Top | Placement::TopLeft | Placement::TopRight)
    }

    pub fn is_bottom(self) -> bool {
        matches!(
            self,
            Placement::Bottom | Placement::BottomLeft | Placement::BottomRight
        )
    }

    pub fn is_left(self) -> bool {
        matches!(self, Placement::Left | Placement::LeftTop | Placement::LeftBottom)
    }

    pub fn is_right(self) -> bool {
        matches!(
            self,
            Placement::Right | Placement::RightTop | Placement::RightBottom
        )
    }

    /// Above or below the target.
    pub fn is_vertical(self) -> bool {
        self.is_top() || self.is_bottom()
    }

    /// Edge of the popup that faces the target and carries the arrow.
    pub fn arrow_edge(self) -> ArrowEdge {
        if self.is_top() {
            ArrowEdge::Bottom
        } else if self.is_bottom() {
            ArrowEdge::Top
        } else if self.is_left() {
            ArrowEdge::Right
        } else {
            ArrowEdge::Left
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrowEdge {
    Top,
    Bottom,
    Left,
    Right,
}
