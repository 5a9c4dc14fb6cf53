//! Per-layer buckets that grow on demand.

use crate::layer::LayerId;

/// A collection of items grouped by layer.
///
/// Buckets are created the first time an item is pushed onto a layer;
/// reading a layer that has never been written yields an empty slice.
#[derive(Debug, Clone)]
pub struct LayerBuckets<T> {
    buckets: Vec<Vec<T>>,
}

impl<T> Default for LayerBuckets<T> {
    fn default() -> Self {
        Self {
            buckets: Vec::new(),
        }
    }
}

impl<T> LayerBuckets<T> {
    /// Creates an empty set of buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures buckets exist for the first `num_layers` layers.
    ///
    /// Never shrinks.
    pub fn reserve_layers(&mut self, num_layers: usize) {
        if num_layers > self.buckets.len() {
            self.buckets.resize_with(num_layers, Vec::new);
        }
    }

    /// Appends `item` to the bucket for `layer`.
    pub fn push(&mut self, layer: LayerId, item: T) {
        self.reserve_layers(layer.index() + 1);
        self.buckets[layer.index()].push(item);
    }

    /// The items on `layer`.
    pub fn get(&self, layer: LayerId) -> &[T] {
        self.buckets
            .get(layer.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterates over `(layer index, items)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[T])> {
        self.buckets
            .iter()
            .enumerate()
            .map(|(i, bucket)| (i, bucket.as_slice()))
    }
}
