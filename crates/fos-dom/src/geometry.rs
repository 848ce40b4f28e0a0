//! Geometry primitives
//!
//! Rectangles and axes shared by style (anchor positioning) and layout.

/// Axis-aligned rectangle in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create with position and dimensions
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Start coordinate along a physical axis
    pub fn start(&self, axis: PhysicalAxis) -> f32 {
        match axis {
            PhysicalAxis::Horizontal => self.x,
            PhysicalAxis::Vertical => self.y,
        }
    }

    /// Extent along a physical axis
    pub fn extent(&self, axis: PhysicalAxis) -> f32 {
        match axis {
            PhysicalAxis::Horizontal => self.width,
            PhysicalAxis::Vertical => self.height,
        }
    }

    /// End coordinate along a physical axis
    pub fn end(&self, axis: PhysicalAxis) -> f32 {
        self.start(axis) + self.extent(axis)
    }

    /// Replace the range covered along `axis`
    pub fn with_range(mut self, axis: PhysicalAxis, start: f32, extent: f32) -> Self {
        match axis {
            PhysicalAxis::Horizontal => {
                self.x = start;
                self.width = extent;
            }
            PhysicalAxis::Vertical => {
                self.y = start;
                self.height = extent;
            }
        }
        self
    }

    /// Whether `other` lies completely inside this rect (with a small epsilon)
    pub fn contains_rect(&self, other: &Rect) -> bool {
        const EPSILON: f32 = 0.01;
        other.x >= self.x - EPSILON
            && other.y >= self.y - EPSILON
            && other.right() <= self.right() + EPSILON
            && other.bottom() <= self.bottom() + EPSILON
    }
}

/// Width/height pair
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn extent(&self, axis: PhysicalAxis) -> f32 {
        match axis {
            PhysicalAxis::Horizontal => self.width,
            PhysicalAxis::Vertical => self.height,
        }
    }
}

/// Logical axis relative to a writing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalAxis {
    Inline,
    Block,
}

/// Physical screen axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalAxis {
    Horizontal,
    Vertical,
}

impl PhysicalAxis {
    pub fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Physical box side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxSide {
    Top,
    Right,
    Bottom,
    Left,
}

impl BoxSide {
    /// Axis the side's coordinate is measured along
    pub fn axis(self) -> PhysicalAxis {
        match self {
            Self::Top | Self::Bottom => PhysicalAxis::Vertical,
            Self::Left | Self::Right => PhysicalAxis::Horizontal,
        }
    }

    /// Side on the other end of the same axis
    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Whether the side is the start (top/left) of its axis
    pub fn is_start(self) -> bool {
        matches!(self, Self::Top | Self::Left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_ranges() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.end(PhysicalAxis::Horizontal), 110.0);
        assert_eq!(r.end(PhysicalAxis::Vertical), 70.0);
        let narrowed = r.with_range(PhysicalAxis::Vertical, 30.0, 10.0);
        assert_eq!(narrowed.bottom(), 40.0);
        assert!(r.contains_rect(&narrowed));
        assert!(!narrowed.contains_rect(&r));
    }

    #[test]
    fn test_side_helpers() {
        assert_eq!(BoxSide::Top.opposite(), BoxSide::Bottom);
        assert_eq!(BoxSide::Left.axis(), PhysicalAxis::Horizontal);
        assert!(BoxSide::Left.is_start());
        assert!(!BoxSide::Bottom.is_start());
    }
}
