//! Pins.

use arcstr::ArcStr;
use geometry::prelude::*;

use crate::blk::BlkId;
use crate::buckets::LayerBuckets;
use crate::id::Id;
use crate::layer::LayerId;
use crate::net::NetId;

/// A pin id.
pub type PinId = Id<Pin>;

/// A named terminal of a net, made of one or more shapes on one or more layers.
#[derive(Debug, Clone)]
pub struct Pin {
    name: ArcStr,
    net: Option<NetId>,
    shapes: LayerBuckets<Rect>,
    blks: Vec<BlkId>,
}

impl Pin {
    /// Creates a pin with no shapes.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            net: None,
            shapes: LayerBuckets::new(),
            blks: Vec::new(),
        }
    }

    /// Adds a shape on `layer`.
    pub fn with_shape(mut self, layer: LayerId, rect: Rect) -> Self {
        self.add_shape(layer, rect);
        self
    }

    /// Adds a shape on `layer`.
    pub fn add_shape(&mut self, layer: LayerId, rect: Rect) {
        self.shapes.push(layer, rect);
    }

    /// The name of the pin.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The net that owns this pin.
    ///
    /// Set when the owning net is added to the database.
    #[inline]
    pub fn net(&self) -> Option<NetId> {
        self.net
    }

    pub(crate) fn set_net(&mut self, net: NetId) {
        self.net = Some(net);
    }

    /// The shapes of this pin on `layer`.
    #[inline]
    pub fn shapes_on(&self, layer: LayerId) -> &[Rect] {
        self.shapes.get(layer)
    }

    /// Iterates over all `(layer, shape)` pairs, bottom layer first.
    pub fn shapes(&self) -> impl Iterator<Item = (LayerId, Rect)> + '_ {
        self.shapes
            .iter()
            .flat_map(|(layer, rects)| {
                rects.iter().map(move |&r| (Id::new(layer), r))
            })
    }

    /// Iterates over the layers this pin has shapes on, bottom first.
    pub fn layers(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.shapes
            .iter()
            .filter(|(_, rects)| !rects.is_empty())
            .map(|(layer, _)| Id::new(layer))
    }

    /// The lowest layer this pin has a shape on.
    pub fn min_layer(&self) -> Option<LayerId> {
        self.layers().next()
    }

    /// The total number of shapes.
    pub fn num_shapes(&self) -> usize {
        self.shapes.iter().map(|(_, rects)| rects.len()).sum()
    }

    /// The blockages marked as connected to this pin.
    #[inline]
    pub fn connected_blks(&self) -> &[BlkId] {
        &self.blks
    }

    pub(crate) fn add_connected_blk(&mut self, blk: BlkId) {
        self.blks.push(blk);
    }
}

impl Bbox for Pin {
    fn bbox(&self) -> Option<Rect> {
        Rect::union_all_option(self.shapes().map(|(_, rect)| Some(rect)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_spans_all_layers() {
        let pin = Pin::new("a")
            .with_shape(Id::new(1), Rect::from_sides(0, 0, 10, 10))
            .with_shape(Id::new(3), Rect::from_sides(-5, 20, 5, 30))
            .with_shape(Id::new(1), Rect::from_sides(40, 0, 50, 10));
        assert_eq!(pin.bbox(), Some(Rect::from_sides(-5, 0, 50, 30)));
        assert_eq!(pin.num_shapes(), 3);
        assert_eq!(
            pin.layers().map(|l| l.index()).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(Pin::new("b").bbox(), None);
    }
}
