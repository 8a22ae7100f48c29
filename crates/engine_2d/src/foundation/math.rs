//! 2D math primitives used by the physics and spatial modules.

/// 2D vector type used throughout the engine
pub type Vec2 = nalgebra::Vector2<f32>;

/// Axis-aligned rectangle with its origin at the bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of the bottom-left corner
    pub x: f32,
    /// Y coordinate of the bottom-left corner
    pub y: f32,
    /// Width (non-negative)
    pub width: f32,
    /// Height (non-negative)
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from its bottom-left corner and size
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle of the given size centered on a point
    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    /// X coordinate of the right edge
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    /// Y coordinate of the top edge
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    /// Center point of the rectangle
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Move the rectangle so its center lands on the given point
    pub fn set_center(&mut self, center: Vec2) {
        self.x = center.x - self.width / 2.0;
        self.y = center.y - self.height / 2.0;
    }

    /// Translate the rectangle by the given amounts
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Check whether this rectangle overlaps another (touching edges do not count)
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x < other.max_x()
            && self.max_x() > other.x
            && self.y < other.max_y()
            && self.max_y() > other.y
    }

    /// Compute the overlap rectangle with another, if any
    ///
    /// The result is the intersection area; its width and height are the
    /// penetration depths along each axis, which drive minimum-translation
    /// collision resolution.
    pub fn overlap(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let max_x = self.max_x().min(other.max_x());
        let max_y = self.max_y().min(other.max_y());
        Some(Self::new(x, y, max_x - x, max_y - y))
    }

    /// Check whether a point lies inside the rectangle
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.max_x() && point.y >= self.y && point.y <= self.max_y()
    }
}
