use std::{
    fmt,
    ops::{Add, Mul, Sub},
};

pub type Scalar = f32;
pub const EPSILON: Scalar = f32::EPSILON;
pub const PI: Scalar = std::f32::consts::PI;

/// Value representing a 2D point or vector.
#[derive(Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point(pub [Scalar; 2]);

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Point([x, y]) = self;
        write!(f, "{},{}", x, y)
    }
}

impl Point {
    #[inline]
    pub const fn new(x: Scalar, y: Scalar) -> Self {
        Self([x, y])
    }

    /// Get `x` component of the point
    #[inline]
    pub fn x(self) -> Scalar {
        self.0[0]
    }

    /// Get `y` compenent of the point
    #[inline]
    pub fn y(self) -> Scalar {
        self.0[1]
    }

    /// Get length of the vector (distance from the origin)
    pub fn length(self) -> Scalar {
        let Self([x, y]) = self;
        x.hypot(y)
    }

    /// Distance between two points
    pub fn dist(self, other: Self) -> Scalar {
        (self - other).length()
    }

    /// Get vector normal (not a unit sized)
    pub fn normal(self) -> Point {
        let Self([x, y]) = self;
        Self([y, -x])
    }

    /// Convert vector to a unit size vector, if length is not zero
    pub fn normalize(self) -> Option<Point> {
        let Self([x, y]) = self;
        let length = self.length();
        if length < EPSILON {
            None
        } else {
            Some(Self([x / length, y / length]))
        }
    }
}

impl From<(Scalar, Scalar)> for Point {
    #[inline]
    fn from(xy: (Scalar, Scalar)) -> Self {
        Self([xy.0, xy.1])
    }
}

impl Mul<Point> for Scalar {
    type Output = Point;

    #[inline]
    fn mul(self, other: Point) -> Self::Output {
        let Point([x, y]) = other;
        Point([self * x, self * y])
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 + x1, y0 + y1])
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, other: Point) -> Self::Output {
        let Point([x0, y0]) = self;
        let Point([x1, y1]) = other;
        Point([x0 - x1, y0 - y1])
    }
}

/// Integer pixel rectangle, `x1` and `y1` are exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

/// Bounding box in whole pixels, as accumulated by the outline
///
/// Minimum is the floor and maximum the ceiling of the touched fixed point
/// coordinates, so `max_x`/`max_y` are exclusive for pixel aligned shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl BBox {
    /// Box that contains nothing, any added point replaces its bounds
    pub const EMPTY: BBox = BBox {
        min_x: i32::MAX,
        min_y: i32::MAX,
        max_x: -i32::MAX,
        max_y: -i32::MAX,
    };

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Extend horizontal extent to include pixels `[min, max)`
    #[inline]
    pub fn add_x(&mut self, min: i32, max: i32) {
        self.min_x = self.min_x.min(min);
        self.max_x = self.max_x.max(max);
    }

    /// Extend vertical extent to include rows `[min, max)`
    #[inline]
    pub fn add_y(&mut self, min: i32, max: i32) {
        self.min_y = self.min_y.min(min);
        self.max_y = self.max_y.max(max);
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }
}

impl Default for BBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    #[test]
    fn test_point_ops() {
        let p0 = Point::new(3.0, 4.0);
        assert_approx_eq!(p0.length(), 5.0);
        let n = p0.normalize().unwrap();
        assert_approx_eq!(n.x(), 0.6, 1e-6);
        assert_approx_eq!(n.y(), 0.8, 1e-6);
        assert!(Point::new(0.0, 0.0).normalize().is_none());
        assert_eq!(p0.normal(), Point::new(4.0, -3.0));
        assert_eq!(p0 - Point::new(1.0, 1.0), Point::new(2.0, 3.0));
        assert_eq!(2.0 * p0, Point::new(6.0, 8.0));
        assert_approx_eq!(p0.dist(Point::new(0.0, 0.0)), 5.0);
    }

    #[test]
    fn test_bbox() {
        let mut bbox = BBox::default();
        assert!(bbox.is_empty());
        bbox.add_x(3, 4);
        bbox.add_x(-2, -1);
        bbox.add_y(7, 8);
        assert_eq!(
            bbox,
            BBox {
                min_x: -2,
                min_y: 7,
                max_x: 4,
                max_y: 8
            }
        );
        assert_eq!(bbox.width(), 6);
        assert_eq!(bbox.height(), 1);
    }
}
