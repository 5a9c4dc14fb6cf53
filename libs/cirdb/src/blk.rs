//! Blockages.

use geometry::prelude::*;

use crate::id::Id;
use crate::layer::LayerId;
use crate::pin::PinId;

/// A blockage id.
pub type BlkId = Id<Blk>;

/// A placed obstruction on a single layer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Blk {
    layer: Option<LayerId>,
    rect: Rect,
    pin: Option<PinId>,
}

impl Blk {
    /// Creates a blockage covering `rect`.
    ///
    /// The layer is assigned when the blockage is added to a database.
    pub fn new(rect: Rect) -> Self {
        Self {
            layer: None,
            rect,
            pin: None,
        }
    }

    /// The layer of this blockage, once placed in a database.
    #[inline]
    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }

    pub(crate) fn set_layer(&mut self, layer: LayerId) {
        self.layer = Some(layer);
    }

    /// The blocked region.
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The pin this blockage is connected to, if any.
    #[inline]
    pub fn pin(&self) -> Option<PinId> {
        self.pin
    }

    /// Returns `true` if this blockage has been marked as connected to a pin.
    #[inline]
    pub fn is_connected_to_pin(&self) -> bool {
        self.pin.is_some()
    }

    pub(crate) fn set_pin(&mut self, pin: PinId) {
        self.pin = Some(pin);
    }
}
