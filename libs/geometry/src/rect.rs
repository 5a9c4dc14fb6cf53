//! Axis-aligned rectangles.

use serde::{Deserialize, Serialize};

use crate::intersect::Intersect;
use crate::point::Point;

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
///
/// Rectangles are closed: a rectangle contains its boundary, so two rectangles
/// sharing only an edge overlap in a zero-area rectangle.
#[derive(
    Debug, Default, Copy, Clone, Hash, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Rect {
    /// The lower-left corner.
    p0: Point,
    /// The upper-right corner.
    p1: Point,
}

impl Rect {
    /// Creates a new rectangle from the given opposite corner points.
    ///
    /// The corners are sorted, so any pair of opposite corners may be given.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::new(Point::new(30, 20), Point::new(15, 40));
    /// assert_eq!(rect, Rect::from_sides(15, 20, 30, 40));
    /// ```
    #[inline]
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            p0: Point::new(a.x.min(b.x), a.y.min(b.y)),
            p1: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Creates a rectangle from all 4 sides (left, bottom, right, top).
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(15, 20, 30, 40);
    /// assert_eq!(rect.left(), 15);
    /// assert_eq!(rect.bot(), 20);
    /// assert_eq!(rect.right(), 30);
    /// assert_eq!(rect.top(), 40);
    /// ```
    ///
    /// # Panics
    ///
    /// This method panics if `left > right` or if `bot > top`.
    /// For a non-panicking alternative, see [`Rect::from_sides_option`].
    #[inline]
    pub fn from_sides(left: i64, bot: i64, right: i64, top: i64) -> Self {
        assert!(
            left <= right,
            "Rect::from_sides requires that left ({}) <= right ({})",
            left,
            right
        );
        assert!(
            bot <= top,
            "Rect::from_sides requires that bot ({}) <= top ({})",
            bot,
            top
        );
        Self {
            p0: Point::new(left, bot),
            p1: Point::new(right, top),
        }
    }

    /// Creates a rectangle from all 4 sides (left, bottom, right, top),
    /// returning `None` if `left > right` or `bot > top`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// assert_eq!(Rect::from_sides_option(0, 0, 10, 10), Some(Rect::from_sides(0, 0, 10, 10)));
    /// assert_eq!(Rect::from_sides_option(10, 0, 0, 10), None);
    /// ```
    #[inline]
    pub fn from_sides_option(left: i64, bot: i64, right: i64, top: i64) -> Option<Self> {
        if left > right || bot > top {
            None
        } else {
            Some(Self::from_sides(left, bot, right, top))
        }
    }

    /// Creates a zero-area rectangle containing the given point.
    #[inline]
    pub const fn from_point(p: Point) -> Self {
        Self { p0: p, p1: p }
    }

    /// Returns the bottom y-coordinate of the rectangle.
    #[inline]
    pub const fn bot(&self) -> i64 {
        self.p0.y
    }

    /// Returns the top y-coordinate of the rectangle.
    #[inline]
    pub const fn top(&self) -> i64 {
        self.p1.y
    }

    /// Returns the left x-coordinate of the rectangle.
    #[inline]
    pub const fn left(&self) -> i64 {
        self.p0.x
    }

    /// Returns the right x-coordinate of the rectangle.
    #[inline]
    pub const fn right(&self) -> i64 {
        self.p1.x
    }

    /// The lower-left corner.
    #[inline]
    pub const fn lower_left(&self) -> Point {
        self.p0
    }

    /// The upper-right corner.
    #[inline]
    pub const fn upper_right(&self) -> Point {
        self.p1
    }

    /// Returns the horizontal width of the rectangle.
    #[inline]
    pub const fn width(&self) -> i64 {
        self.p1.x - self.p0.x
    }

    /// Returns the vertical height of the rectangle.
    #[inline]
    pub const fn height(&self) -> i64 {
        self.p1.y - self.p0.y
    }

    /// Returns the area of the rectangle.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(10, 20, 30, 50);
    /// assert_eq!(rect.area(), 600);
    /// ```
    #[inline]
    pub const fn area(&self) -> i64 {
        self.width() * self.height()
    }

    /// Returns the center point of the rectangle, rounded down.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(0, 0, 55, 45);
    /// assert_eq!(rect.center(), Point::new(27, 22));
    /// ```
    pub const fn center(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2, (self.p0.y + self.p1.y) / 2)
    }

    /// Returns `true` if the rectangle contains `p`, boundary included.
    #[inline]
    pub const fn contains_point(&self, p: Point) -> bool {
        self.p0.x <= p.x && p.x <= self.p1.x && self.p0.y <= p.y && p.y <= self.p1.y
    }

    /// Returns `true` if this rectangle and `other` share at least one point.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let r = Rect::from_sides(0, 0, 10, 10);
    /// assert!(r.intersects(&Rect::from_sides(10, 0, 20, 10)));
    /// assert!(!r.intersects(&Rect::from_sides(11, 0, 20, 10)));
    /// ```
    #[inline]
    pub const fn intersects(&self, other: &Rect) -> bool {
        self.p0.x <= other.p1.x
            && other.p0.x <= self.p1.x
            && self.p0.y <= other.p1.y
            && other.p0.y <= self.p1.y
    }

    /// Computes the rectangular intersection of this `Rect` with another `Rect`.
    ///
    /// Returns `None` if the intersection is empty.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let r1 = Rect::from_sides(0, 0, 100, 200);
    /// let r2 = Rect::from_sides(-50, 20, 120, 160);
    /// assert_eq!(r1.intersection(r2), Some(Rect::from_sides(0, 20, 100, 160)));
    /// assert_eq!(r1.intersection(Rect::from_sides(120, -60, 240, 800)), None);
    /// ```
    pub fn intersection(self, other: Self) -> Option<Self> {
        let left = self.p0.x.max(other.p0.x);
        let bot = self.p0.y.max(other.p0.y);
        let right = self.p1.x.min(other.p1.x);
        let top = self.p1.y.min(other.p1.y);
        Self::from_sides_option(left, bot, right, top)
    }

    /// The area shared by this rectangle and `other`.
    ///
    /// Rectangles touching only along an edge share zero area.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let r1 = Rect::from_sides(0, 0, 10, 10);
    /// assert_eq!(r1.overlap_area(Rect::from_sides(5, 5, 20, 20)), 25);
    /// assert_eq!(r1.overlap_area(Rect::from_sides(10, 0, 20, 10)), 0);
    /// assert_eq!(r1.overlap_area(Rect::from_sides(30, 30, 40, 40)), 0);
    /// ```
    pub fn overlap_area(self, other: Self) -> i64 {
        self.intersection(other).map(|r| r.area()).unwrap_or(0)
    }

    /// Computes the rectangular union (bounding box) of this rectangle and `other`.
    pub fn union(self, other: Self) -> Self {
        Self {
            p0: Point::new(self.p0.x.min(other.p0.x), self.p0.y.min(other.p0.y)),
            p1: Point::new(self.p1.x.max(other.p1.x), self.p1.y.max(other.p1.y)),
        }
    }

    /// Calculates the rectangular union of all `Option<Rect>`s provided.
    ///
    /// All `None` elements in the iterator are ignored.
    /// If the iterator has no `Some(_)` elements, this function returns [`None`].
    pub fn union_all_option<T>(rects: impl Iterator<Item = T>) -> Option<Self>
    where
        T: Into<Option<Self>>,
    {
        rects
            .filter_map(|r| r.into())
            .fold(None, |acc: Option<Rect>, r| match acc {
                Some(acc) => Some(acc.union(r)),
                None => Some(r),
            })
    }

    /// Expands the rectangle by `amount` on all sides.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(0, 0, 100, 200);
    /// assert_eq!(rect.expand_all(20), Rect::from_sides(-20, -20, 120, 220));
    /// ```
    #[inline]
    pub fn expand_all(&self, amount: i64) -> Self {
        Self::new(
            Point::new(self.p0.x - amount, self.p0.y - amount),
            Point::new(self.p1.x + amount, self.p1.y + amount),
        )
    }

    /// Returns this rectangle shifted by `offset`.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let rect = Rect::from_sides(0, 0, 10, 20);
    /// assert_eq!(rect.translate(Point::new(5, -5)), Rect::from_sides(5, -5, 15, 15));
    /// ```
    #[inline]
    pub fn translate(self, offset: Point) -> Self {
        Self {
            p0: self.p0 + offset,
            p1: self.p1 + offset,
        }
    }
}

impl Intersect<Rect> for Rect {
    type Output = Rect;

    fn intersect(&self, other: &Rect) -> Option<Self::Output> {
        self.intersection(*other)
    }
}

impl From<Point> for Rect {
    fn from(value: Point) -> Self {
        Self::from_point(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rects_intersect_with_zero_area() {
        let a = Rect::from_sides(0, 0, 10, 10);
        let b = Rect::from_sides(10, 2, 20, 8);
        assert!(a.intersects(&b));
        assert_eq!(a.intersect(&b), Some(Rect::from_sides(10, 2, 10, 8)));
        assert_eq!(a.overlap_area(b), 0);
    }

    #[test]
    fn corners_are_sorted() {
        let r = Rect::new(Point::new(10, -3), Point::new(-2, 7));
        assert_eq!(r.lower_left(), Point::new(-2, -3));
        assert_eq!(r.upper_right(), Point::new(10, 7));
        assert_eq!(r.width(), 12);
        assert_eq!(r.height(), 10);
    }

    #[test]
    #[should_panic]
    fn from_sides_rejects_inverted_sides() {
        Rect::from_sides(10, 0, 0, 10);
    }
}
