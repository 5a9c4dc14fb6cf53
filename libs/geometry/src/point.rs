//! 2-D and layer-aware points.

use serde::{Deserialize, Serialize};

/// A point in two-dimensional space.
#[derive(
    Debug, Copy, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Point {
    /// The x-coordinate of the point.
    pub x: i64,
    /// The y-coordinate of the point.
    pub y: i64,
}

impl Point {
    /// Creates a new [`Point`] from (x,y) coordinates.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Returns the origin, `(0, 0)`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Point::zero(), Point::new(0, 0));
    /// ```
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// The Manhattan distance between this point and `other`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Point::new(0, 0).manhattan(Point::new(3, -4)), 7);
    /// ```
    pub fn manhattan(&self, other: Point) -> i64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl std::ops::Add<Point> for Point {
    type Output = Self;
    fn add(self, rhs: Point) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign<Point> for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub<Point> for Point {
    type Output = Self;
    fn sub(self, rhs: Point) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Neg for Point {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

impl From<(i64, i64)> for Point {
    fn from(value: (i64, i64)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// A point on a particular layer of a layer stack.
///
/// The layer is stored as a raw index; its meaning is
/// defined by whichever database owns the layer stack.
#[derive(
    Debug, Copy, Clone, Default, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Point3 {
    /// The x-coordinate of the point.
    pub x: i64,
    /// The y-coordinate of the point.
    pub y: i64,
    /// The index of the layer containing the point.
    pub layer: usize,
}

impl Point3 {
    /// Creates a new [`Point3`].
    pub const fn new(x: i64, y: i64, layer: usize) -> Self {
        Self { x, y, layer }
    }

    /// The planar projection of this point.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Point3::new(5, 7, 2).xy(), Point::new(5, 7));
    /// ```
    #[inline]
    pub const fn xy(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns `true` if this point and `other` lie on the same layer.
    #[inline]
    pub const fn same_layer(&self, other: &Point3) -> bool {
        self.layer == other.layer
    }

    /// Returns `true` if this point and `other` have the same planar coordinates.
    #[inline]
    pub const fn same_xy(&self, other: &Point3) -> bool {
        self.x == other.x && self.y == other.y
    }
}
