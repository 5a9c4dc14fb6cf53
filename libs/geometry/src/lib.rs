//! 2-D geometric primitives for integrated circuit layout databases.
//!
//! All coordinates are integer database units.
//!
//! # Examples
//!
//! Create a [rectangle](crate::rect::Rect):
//!
//! ```
//! # use geometry::prelude::*;
//! let rect = Rect::from_sides(10, 20, 30, 40);
//! assert_eq!(rect.area(), 400);
//! ```
#![warn(missing_docs)]

extern crate self as geometry;

pub mod bbox;
pub mod intersect;
pub mod point;
pub mod prelude;
pub mod rect;
