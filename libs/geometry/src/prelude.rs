//! An import prelude that re-exports commonly used items.

pub use crate::bbox::Bbox;
pub use crate::intersect::Intersect;
pub use crate::point::{Point, Point3};
pub use crate::rect::Rect;
