//! R-tree backed 2-D range indexes.

use geometry::prelude::*;
use rstar::{RTree, RTreeObject, AABB};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry<T> {
    rect: Rect,
    data: T,
}

impl<T> RTreeObject for Entry<T> {
    type Envelope = AABB<[i64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        envelope(self.rect)
    }
}

#[inline]
fn envelope(rect: Rect) -> AABB<[i64; 2]> {
    AABB::from_corners([rect.left(), rect.bot()], [rect.right(), rect.top()])
}

/// A set of rectangles, each tagged with the entity that owns it.
///
/// Rectangles are closed, so shapes that touch along an edge or at a
/// corner overlap.
#[derive(Debug, Clone)]
pub struct SpatialIndex<T> {
    tree: RTree<Entry<T>>,
}

impl<T> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self { tree: RTree::new() }
    }
}

impl<T> SpatialIndex<T> {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index over all `(rect, owner)` pairs at once.
    ///
    /// Produces a better balanced tree than repeated insertion.
    pub fn bulk_load(items: impl IntoIterator<Item = (Rect, T)>) -> Self {
        let entries = items
            .into_iter()
            .map(|(rect, data)| Entry { rect, data })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Inserts `rect` owned by `data`.
    pub fn insert(&mut self, rect: Rect, data: T) {
        self.tree.insert(Entry { rect, data });
    }

    /// The number of rectangles in the index.
    #[inline]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Returns `true` if the index holds no rectangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Iterates over all rectangles overlapping `rect`, with their owners.
    pub fn overlapping(&self, rect: Rect) -> impl Iterator<Item = (Rect, &T)> + '_ {
        self.tree
            .locate_in_envelope_intersecting(&envelope(rect))
            .map(|e| (e.rect, &e.data))
    }

    /// Returns `true` if any rectangle overlaps `rect`.
    ///
    /// Stops at the first hit.
    pub fn exists(&self, rect: Rect) -> bool {
        self.overlapping(rect).next().is_some()
    }

    /// Sums the area shared between `rect` and every indexed rectangle.
    ///
    /// Overlaps among the indexed rectangles themselves are counted once per rectangle.
    pub fn overlap_area(&self, rect: Rect) -> i64 {
        self.overlapping(rect)
            .map(|(shape, _)| shape.overlap_area(rect))
            .sum()
    }

    /// Iterates over all `(rect, owner)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Rect, &T)> + '_ {
        self.tree.iter().map(|e| (e.rect, &e.data))
    }
}

impl<T: Clone> SpatialIndex<T> {
    /// Collects the owners of all rectangles overlapping `rect` into `out`.
    ///
    /// `out` is cleared first. Returns `true` if anything was found.
    pub fn query(&self, rect: Rect, out: &mut Vec<T>) -> bool {
        out.clear();
        out.extend(self.overlapping(rect).map(|(_, data)| data.clone()));
        !out.is_empty()
    }

    /// Collects all rectangles overlapping `rect` and their owners.
    ///
    /// `owners` and `shapes` are cleared first and stay index-aligned.
    /// Returns `true` if anything was found.
    pub fn query_with_shapes(
        &self,
        rect: Rect,
        owners: &mut Vec<T>,
        shapes: &mut Vec<Rect>,
    ) -> bool {
        owners.clear();
        shapes.clear();
        for (shape, data) in self.overlapping(rect) {
            owners.push(data.clone());
            shapes.push(shape);
        }
        !owners.is_empty()
    }
}

impl<T: PartialEq> SpatialIndex<T> {
    /// Removes one copy of `rect` owned by `data`.
    ///
    /// Returns `false` if no such entry exists.
    pub fn remove(&mut self, rect: Rect, data: T) -> bool {
        self.tree.remove(&Entry { rect, data }).is_some()
    }

    /// Returns `true` if a rectangle owned by `data` overlaps `rect`.
    pub fn exists_owned_by(&self, rect: Rect, data: &T) -> bool {
        self.overlapping(rect).any(|(_, owner)| owner == data)
    }
}
