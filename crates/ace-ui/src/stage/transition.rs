use ace_animation::{AnimationOption, Curve, Lerp};
use ace_ui_graphics::{Point, Size};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageTransitionType {
    #[default]
    None,
    EnterPush,
    EnterPop,
    ExitPush,
    ExitPop,
}

impl PageTransitionType {
    pub fn is_enter(self) -> bool {
        matches!(self, PageTransitionType::EnterPush | PageTransitionType::EnterPop)
    }

    pub fn is_exit(self) -> bool {
        matches!(self, PageTransitionType::ExitPush | PageTransitionType::ExitPop)
    }

    pub fn route_type(self) -> RouteType {
        match self {
            PageTransitionType::None => RouteType::None,
            PageTransitionType::EnterPush | PageTransitionType::ExitPush => RouteType::Push,
            PageTransitionType::EnterPop | PageTransitionType::ExitPop => RouteType::Pop,
        }
    }
}

/// Route an effect applies to; `None` matches both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RouteType {
    #[default]
    None,
    Push,
    Pop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionDirection {
    Enter,
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlideEffect {
    Left,
    Right,
    Top,
    Bottom,
}

impl SlideEffect {
    fn offset(self, size: Size) -> Point {
        match self {
            SlideEffect::Left => Point::new(-size.width, 0.0),
            SlideEffect::Right => Point::new(size.width, 0.0),
            SlideEffect::Top => Point::new(0.0, -size.height),
            SlideEffect::Bottom => Point::new(0.0, size.height),
        }
    }
}

/// Translate and opacity of a page at one end of a transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageVisual {
    pub translate: Point,
    pub opacity: f32,
}

impl PageVisual {
    pub const IDENTITY: PageVisual = PageVisual {
        translate: Point::ZERO,
        opacity: 1.0,
    };
}

impl Lerp for PageVisual {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        PageVisual {
            translate: self.translate.lerp(&target.translate, fraction),
            opacity: self.opacity.lerp(&target.opacity, fraction),
        }
    }
}

/// How a page enters or leaves the stage. An effect whose duration is zero
/// disables the animation.
#[derive(Clone, Debug, PartialEq)]
pub struct PageTransitionEffect {
    pub direction: TransitionDirection,
    pub route_type: RouteType,
    pub option: AnimationOption,
    pub slide: Option<SlideEffect>,
    pub translate: Option<Point>,
    pub opacity: Option<f32>,
}

impl PageTransitionEffect {
    pub fn enter(route_type: RouteType, option: AnimationOption) -> Self {
        Self::with_direction(TransitionDirection::Enter, route_type, option)
    }

    pub fn exit(route_type: RouteType, option: AnimationOption) -> Self {
        Self::with_direction(TransitionDirection::Exit, route_type, option)
    }

    pub fn none(direction: TransitionDirection, route_type: RouteType) -> Self {
        Self::with_direction(direction, route_type, AnimationOption::linear(0))
    }

    fn with_direction(
        direction: TransitionDirection,
        route_type: RouteType,
        option: AnimationOption,
    ) -> Self {
        Self {
            direction,
            route_type,
            option,
            slide: None,
            translate: None,
            opacity: None,
        }
    }

    pub fn with_slide(mut self, slide: SlideEffect) -> Self {
        self.slide = Some(slide);
        self
    }

    pub fn with_translate(mut self, translate: Point) -> Self {
        self.translate = Some(translate);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn is_animated(&self) -> bool {
        self.option.duration_millis > 0
    }

    pub fn matches(&self, transition: PageTransitionType) -> bool {
        let direction = if transition.is_enter() {
            TransitionDirection::Enter
        } else if transition.is_exit() {
            TransitionDirection::Exit
        } else {
            return false;
        };
        self.direction == direction
            && (self.route_type == RouteType::None || self.route_type == transition.route_type())
    }

    /// Built-in slide for `transition`: pushed pages come in from the right
    /// and push the previous page out to the left, pops mirror that.
    pub fn default_for(transition: PageTransitionType, duration_millis: u64) -> Option<Self> {
        let option = AnimationOption::new(duration_millis, Curve::Friction);
        let effect = match transition {
            PageTransitionType::None => return None,
            PageTransitionType::EnterPush => {
                Self::enter(RouteType::Push, option).with_slide(SlideEffect::Right)
            }
            PageTransitionType::ExitPush => {
                Self::exit(RouteType::Push, option).with_slide(SlideEffect::Left)
            }
            PageTransitionType::EnterPop => {
                Self::enter(RouteType::Pop, option).with_slide(SlideEffect::Left)
            }
            PageTransitionType::ExitPop => {
                Self::exit(RouteType::Pop, option).with_slide(SlideEffect::Right)
            }
        };
        Some(effect)
    }

    /// Start and end visuals for a page of `size`.
    pub fn endpoints(&self, size: Size) -> (PageVisual, PageVisual) {
        let mut translate = self.slide.map_or(Point::ZERO, |slide| slide.offset(size));
        if let Some(extra) = self.translate {
            translate += extra;
        }
        let shifted = PageVisual {
            translate,
            opacity: self.opacity.unwrap_or(1.0),
        };
        match self.direction {
            TransitionDirection::Enter => (shifted, PageVisual::IDENTITY),
            TransitionDirection::Exit => (PageVisual::IDENTITY, shifted),
        }
    }
}
