//! The construction-phase interface used by readers.

use arcstr::ArcStr;
use geometry::prelude::*;

use crate::blk::{Blk, BlkId};
use crate::db::CirDb;
use crate::error::Result;
use crate::guide::RouteGuide;
use crate::layer::{LayerId, LayerRegistry};
use crate::net::{Net, NetId};
use crate::pin::{Pin, PinId};

/// The mutations available to readers while a database is being populated.
///
/// Readers are written against this trait rather than [`CirDb`] so that they
/// only see what they need to fill in.
pub trait CirBuilder {
    /// Sets the design name.
    fn set_name(&mut self, name: ArcStr);
    /// Sets the die boundary.
    fn set_boundary(&mut self, boundary: Rect);
    /// Sets the placement grid step and offsets.
    fn set_grid_geometry(&mut self, step: i64, offset_x: i64, offset_y: i64);
    /// Sets the x coordinate of the vertical symmetry axis.
    fn set_sym_axis_x(&mut self, x: i64);
    /// The layer registry, for registering layers, vias and sites.
    fn layers_mut(&mut self) -> &mut LayerRegistry;
    /// Pre-allocates per-layer pin buckets.
    fn reserve_pin_layers(&mut self, num_layers: usize);
    /// Pre-allocates per-layer blockage buckets.
    fn reserve_blk_layers(&mut self, num_layers: usize);
    /// Adds a pin.
    fn add_pin(&mut self, pin: Pin) -> Result<PinId>;
    /// Adds a net and claims its pins.
    fn add_net(&mut self, net: Net) -> Result<NetId>;
    /// Adds a blockage on `layer`.
    fn add_blk(&mut self, layer: LayerId, blk: Blk) -> Result<BlkId>;
    /// Registers a diffusion region.
    fn add_spatial_od(&mut self, rect: Rect);
    /// Looks up a net by name.
    fn find_net(&self, name: &str) -> Option<NetId>;
    /// The number of nets added so far.
    fn num_nets(&self) -> usize;
    /// The routing guide.
    fn route_guide_mut(&mut self) -> &mut RouteGuide;
    /// Computes the routing guide's average probability grid.
    fn finalize_route_guide(&mut self) -> Result<()>;
}

impl CirBuilder for CirDb {
    fn set_name(&mut self, name: ArcStr) {
        CirDb::set_name(self, name);
    }

    fn set_boundary(&mut self, boundary: Rect) {
        CirDb::set_boundary(self, boundary);
    }

    fn set_grid_geometry(&mut self, step: i64, offset_x: i64, offset_y: i64) {
        CirDb::set_grid_geometry(self, step, offset_x, offset_y);
    }

    fn set_sym_axis_x(&mut self, x: i64) {
        CirDb::set_sym_axis_x(self, x);
    }

    fn layers_mut(&mut self) -> &mut LayerRegistry {
        CirDb::layers_mut(self)
    }

    fn reserve_pin_layers(&mut self, num_layers: usize) {
        CirDb::reserve_pin_layers(self, num_layers);
    }

    fn reserve_blk_layers(&mut self, num_layers: usize) {
        CirDb::reserve_blk_layers(self, num_layers);
    }

    fn add_pin(&mut self, pin: Pin) -> Result<PinId> {
        CirDb::add_pin(self, pin)
    }

    fn add_net(&mut self, net: Net) -> Result<NetId> {
        CirDb::add_net(self, net)
    }

    fn add_blk(&mut self, layer: LayerId, blk: Blk) -> Result<BlkId> {
        CirDb::add_blk(self, layer, blk)
    }

    fn add_spatial_od(&mut self, rect: Rect) {
        CirDb::add_spatial_od(self, rect);
    }

    fn find_net(&self, name: &str) -> Option<NetId> {
        self.nets().id_named(name)
    }

    fn num_nets(&self) -> usize {
        CirDb::num_nets(self)
    }

    fn route_guide_mut(&mut self) -> &mut RouteGuide {
        CirDb::route_guide_mut(self)
    }

    fn finalize_route_guide(&mut self) -> Result<()> {
        CirDb::finalize_route_guide(self)
    }
}
