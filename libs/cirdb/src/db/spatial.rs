//! Spatial indexes over pins, blockages, routed geometry, net guides and
//! diffusion regions.
//!
//! Routed geometry is only ever mutated through the `add_spatial_routed_*`
//! and `remove_spatial_routed_*` methods, which update the owning net and the
//! per-layer index together.

use geometry::prelude::*;

use crate::blk::{Blk, BlkId};
use crate::error::{Error, Result};
use crate::layer::{LayerId, ViaId};
use crate::net::{Net, NetId, ViaPlacement};
use crate::pin::{Pin, PinId};
use crate::spatial::SpatialIndex;

use super::CirDb;

/// The per-layer indexes created by [`CirDb::build_spatial`].
#[derive(Debug, Clone, Default)]
pub(crate) struct SpatialIndexes {
    pins: Vec<SpatialIndex<PinId>>,
    blks: Vec<SpatialIndex<BlkId>>,
    routed: Vec<SpatialIndex<NetId>>,
    /// Indexed by net, then by layer.
    net_guides: Vec<Vec<SpatialIndex<()>>>,
}

impl SpatialIndexes {
    pub(crate) fn insert_pin(&mut self, id: PinId, pin: &Pin) {
        for (layer, rect) in pin.shapes() {
            layer_index_mut(&mut self.pins, layer).insert(rect, id);
        }
    }

    pub(crate) fn insert_blk(&mut self, id: BlkId, blk: &Blk) {
        if let Some(layer) = blk.layer() {
            layer_index_mut(&mut self.blks, layer).insert(blk.rect(), id);
        }
    }

    pub(crate) fn lowest_pin_overlapping(&self, layer: LayerId, rect: Rect) -> Option<PinId> {
        layer_index(&self.pins, layer)?
            .overlapping(rect)
            .map(|(_, &pin)| pin)
            .min()
    }

    pub(crate) fn push_net_guides(&mut self, num_layers: usize, net: &Net) {
        self.net_guides.push(net_guide_index(num_layers, net));
    }
}

fn layer_index<T>(indexes: &[SpatialIndex<T>], layer: LayerId) -> Option<&SpatialIndex<T>> {
    indexes.get(layer.index())
}

fn layer_index_mut<T>(indexes: &mut Vec<SpatialIndex<T>>, layer: LayerId) -> &mut SpatialIndex<T> {
    if layer.index() >= indexes.len() {
        indexes.resize_with(layer.index() + 1, SpatialIndex::new);
    }
    &mut indexes[layer.index()]
}

fn bulk_load_layers<T>(
    num_layers: usize,
    items: impl IntoIterator<Item = (LayerId, Rect, T)>,
) -> Vec<SpatialIndex<T>> {
    let mut per_layer: Vec<Vec<(Rect, T)>> = Vec::new();
    per_layer.resize_with(num_layers, Vec::new);
    for (layer, rect, data) in items {
        if layer.index() >= per_layer.len() {
            per_layer.resize_with(layer.index() + 1, Vec::new);
        }
        per_layer[layer.index()].push((rect, data));
    }
    per_layer
        .into_iter()
        .map(|items| SpatialIndex::bulk_load(items))
        .collect()
}

fn net_guide_index(num_layers: usize, net: &Net) -> Vec<SpatialIndex<()>> {
    bulk_load_layers(
        num_layers,
        net.guides().iter().map(|&(layer, rect)| (layer, rect, ())),
    )
}

impl CirDb {
    /// Builds every spatial index from the current database contents.
    ///
    /// Indexes pin shapes, blockages and net guide shapes per layer, then
    /// allocates the routed-geometry indexes. Rebuilding re-indexes any routed
    /// wires and vias already recorded on nets.
    pub fn build_spatial(&mut self) {
        let num_layers = self.layers.num_layers();
        let pins = self.build_spatial_pins(num_layers);
        let blks = self.build_spatial_blks(num_layers);
        let net_guides = self.build_spatial_net_guides(num_layers);
        let routed = self.init_spatial_routed_wires(num_layers);
        self.spatial = Some(SpatialIndexes {
            pins,
            blks,
            routed,
            net_guides,
        });
    }

    fn build_spatial_pins(&self, num_layers: usize) -> Vec<SpatialIndex<PinId>> {
        let mut shapes = Vec::new();
        for (id, pin) in self.pins.iter() {
            shapes.extend(pin.shapes().map(|(layer, rect)| (layer, rect, id)));
        }
        let indexes = bulk_load_layers(num_layers, shapes);
        tracing::debug!(
            num_pins = self.pins.len(),
            num_shapes = indexes.iter().map(SpatialIndex::len).sum::<usize>(),
            "built pin spatial index"
        );
        indexes
    }

    fn build_spatial_blks(&self, num_layers: usize) -> Vec<SpatialIndex<BlkId>> {
        let indexes = bulk_load_layers(
            num_layers,
            self.blks
                .iter()
                .filter_map(|(id, blk)| Some((blk.layer()?, blk.rect(), id))),
        );
        tracing::debug!(num_blks = self.blks.len(), "built blockage spatial index");
        indexes
    }

    fn build_spatial_net_guides(&self, num_layers: usize) -> Vec<Vec<SpatialIndex<()>>> {
        let indexes: Vec<_> = self
            .nets
            .iter()
            .map(|(_, net)| net_guide_index(num_layers, net))
            .collect();
        tracing::debug!(num_nets = indexes.len(), "built net guide spatial indexes");
        indexes
    }

    fn init_spatial_routed_wires(&self, num_layers: usize) -> Vec<SpatialIndex<NetId>> {
        let wires = self.nets.iter().flat_map(|(id, net)| {
            net.wires()
                .iter()
                .map(move |&(layer, rect)| (layer, rect, id))
        });
        let vias = self.nets.iter().flat_map(|(id, net)| {
            net.vias().iter().flat_map(move |v| {
                self.layers
                    .via(v.via)
                    .placed_shapes(v.origin)
                    .map(move |(layer, rect)| (layer, rect, id))
            })
        });
        bulk_load_layers(num_layers, wires.chain(vias))
    }

    /// Returns `true` once [`CirDb::build_spatial`] has been called.
    #[inline]
    pub fn is_spatial_built(&self) -> bool {
        self.spatial.is_some()
    }

    fn spatial(&self) -> Result<&SpatialIndexes> {
        self.spatial.as_ref().ok_or(Error::SpatialNotBuilt)
    }

    fn check_via(&self, via: ViaId) -> Result<()> {
        if via.index() >= self.layers.num_vias() {
            return Err(Error::IdOutOfRange {
                kind: "via",
                index: via.index(),
                len: self.layers.num_vias(),
            });
        }
        Ok(())
    }

    /// Registers a diffusion region.
    ///
    /// Diffusion regions are not tied to a layer and may be added at any time.
    pub fn add_spatial_od(&mut self, rect: Rect) {
        self.od.insert(rect, ());
    }

    /// Sums the area shared between `rect` and every registered diffusion
    /// region.
    ///
    /// Overlapping diffusion regions are not merged, so their common area is
    /// counted once per region.
    pub fn overlap_area_with_od(&self, rect: Rect) -> i64 {
        self.od.overlap_area(rect)
    }

    /// Records a routed wire of `net` on `layer` and indexes it.
    pub fn add_spatial_routed_wire(
        &mut self,
        net: NetId,
        layer: LayerId,
        rect: Rect,
    ) -> Result<()> {
        self.check_layer(layer)?;
        self.nets.try_get(net)?;
        let spatial = self.spatial.as_mut().ok_or(Error::SpatialNotBuilt)?;
        layer_index_mut(&mut spatial.routed, layer).insert(rect, net);
        self.nets[net].push_wire(layer, rect);
        Ok(())
    }

    /// Records a routed wire of `net` spanning two points on the same layer.
    pub fn add_spatial_routed_wire_between(
        &mut self,
        net: NetId,
        a: Point3,
        b: Point3,
    ) -> Result<()> {
        let (layer, rect) = self.wire_between(a, b)?;
        self.add_spatial_routed_wire(net, layer, rect)
    }

    /// Removes a routed wire previously added with identical arguments.
    ///
    /// Returns `false`, leaving the net untouched, if no such wire was added.
    pub fn remove_spatial_routed_wire(
        &mut self,
        net: NetId,
        layer: LayerId,
        rect: Rect,
    ) -> Result<bool> {
        self.check_layer(layer)?;
        self.nets.try_get(net)?;
        let spatial = self.spatial.as_mut().ok_or(Error::SpatialNotBuilt)?;
        let removed = spatial
            .routed
            .get_mut(layer.index())
            .is_some_and(|index| index.remove(rect, net));
        if !removed {
            tracing::warn!(
                net = %self.nets[net].name(),
                layer = %self.layers.layer(layer).name(),
                ?rect,
                "attempted to remove a routed wire that was never added"
            );
            return Ok(false);
        }
        self.nets[net].remove_wire(layer, rect);
        Ok(true)
    }

    /// Removes a routed wire spanning two points on the same layer.
    pub fn remove_spatial_routed_wire_between(
        &mut self,
        net: NetId,
        a: Point3,
        b: Point3,
    ) -> Result<bool> {
        let (layer, rect) = self.wire_between(a, b)?;
        self.remove_spatial_routed_wire(net, layer, rect)
    }

    fn wire_between(&self, a: Point3, b: Point3) -> Result<(LayerId, Rect)> {
        if !a.same_layer(&b) {
            return Err(Error::InvalidArgument(format!(
                "wire endpoints {a:?} and {b:?} are on different layers"
            )));
        }
        Ok((self.layers.layer_id(a.layer)?, Rect::new(a.xy(), b.xy())))
    }

    /// Records a via of `net` placed at `origin` and indexes each of its
    /// shapes on its own layer.
    pub fn add_spatial_routed_via(&mut self, net: NetId, via: ViaId, origin: Point) -> Result<()> {
        self.check_via(via)?;
        self.nets.try_get(net)?;
        let spatial = self.spatial.as_mut().ok_or(Error::SpatialNotBuilt)?;
        for (layer, rect) in self.layers.via(via).placed_shapes(origin) {
            layer_index_mut(&mut spatial.routed, layer).insert(rect, net);
        }
        self.nets[net].push_via(ViaPlacement { via, origin });
        Ok(())
    }

    /// Records a via of `net` connecting two points stacked on different layers.
    ///
    /// Both layers must carry a shape of `via`.
    pub fn add_spatial_routed_via_between(
        &mut self,
        net: NetId,
        via: ViaId,
        a: Point3,
        b: Point3,
    ) -> Result<()> {
        let origin = self.via_between(via, a, b)?;
        self.add_spatial_routed_via(net, via, origin)
    }

    /// Removes a via previously added with identical arguments.
    ///
    /// Returns `false`, leaving the net untouched, if no such via was added.
    pub fn remove_spatial_routed_via(
        &mut self,
        net: NetId,
        via: ViaId,
        origin: Point,
    ) -> Result<bool> {
        self.check_via(via)?;
        self.nets.try_get(net)?;
        let spatial = self.spatial.as_mut().ok_or(Error::SpatialNotBuilt)?;
        let placement = ViaPlacement { via, origin };
        if !self.nets[net].vias().contains(&placement) {
            tracing::warn!(
                net = %self.nets[net].name(),
                via = %self.layers.via(via).name,
                ?origin,
                "attempted to remove a routed via that was never added"
            );
            return Ok(false);
        }
        for (layer, rect) in self.layers.via(via).placed_shapes(origin) {
            if let Some(index) = spatial.routed.get_mut(layer.index()) {
                index.remove(rect, net);
            }
        }
        self.nets[net].remove_via(placement);
        Ok(true)
    }

    /// Removes a via connecting two points stacked on different layers.
    pub fn remove_spatial_routed_via_between(
        &mut self,
        net: NetId,
        via: ViaId,
        a: Point3,
        b: Point3,
    ) -> Result<bool> {
        let origin = self.via_between(via, a, b)?;
        self.remove_spatial_routed_via(net, via, origin)
    }

    fn via_between(&self, via: ViaId, a: Point3, b: Point3) -> Result<Point> {
        self.check_via(via)?;
        if !a.same_xy(&b) {
            return Err(Error::InvalidArgument(format!(
                "via endpoints {a:?} and {b:?} are not stacked"
            )));
        }
        let def = self.layers.via(via);
        for p in [a, b] {
            if !def.shapes.iter().any(|(layer, _)| layer.index() == p.layer) {
                return Err(Error::InvalidArgument(format!(
                    "via `{}` has no shape on layer {}",
                    def.name, p.layer
                )));
            }
        }
        Ok(a.xy())
    }

    /// Collects the pins with a shape on `layer` overlapping `rect`.
    ///
    /// `out` is cleared first, then filled in ascending id order without duplicates.
    pub fn query_spatial_pin(
        &self,
        layer: LayerId,
        rect: Rect,
        out: &mut Vec<PinId>,
    ) -> Result<bool> {
        out.clear();
        self.check_layer(layer)?;
        if let Some(index) = layer_index(&self.spatial()?.pins, layer) {
            index.query(rect, out);
            out.sort_unstable();
            out.dedup();
        }
        Ok(!out.is_empty())
    }

    /// Returns `true` if any pin shape on `layer` overlaps `rect`.
    pub fn exist_spatial_pin(&self, layer: LayerId, rect: Rect) -> Result<bool> {
        self.check_layer(layer)?;
        let index = layer_index(&self.spatial()?.pins, layer);
        Ok(index.is_some_and(|index| index.exists(rect)))
    }

    /// Collects the blockages on `layer` overlapping `rect`.
    ///
    /// `out` is cleared first, then filled in ascending id order.
    pub fn query_spatial_blk(
        &self,
        layer: LayerId,
        rect: Rect,
        out: &mut Vec<BlkId>,
    ) -> Result<bool> {
        out.clear();
        self.check_layer(layer)?;
        if let Some(index) = layer_index(&self.spatial()?.blks, layer) {
            index.query(rect, out);
            out.sort_unstable();
            out.dedup();
        }
        Ok(!out.is_empty())
    }

    /// Returns `true` if any blockage on `layer` overlaps `rect`.
    pub fn exist_spatial_blk(&self, layer: LayerId, rect: Rect) -> Result<bool> {
        self.check_layer(layer)?;
        let index = layer_index(&self.spatial()?.blks, layer);
        Ok(index.is_some_and(|index| index.exists(rect)))
    }

    /// Collects the routed shapes on `layer` overlapping `rect`, with their nets.
    ///
    /// `out` is cleared first, then filled sorted by net and shape.
    pub fn query_spatial_routed_wire(
        &self,
        layer: LayerId,
        rect: Rect,
        out: &mut Vec<(NetId, Rect)>,
    ) -> Result<bool> {
        out.clear();
        self.check_layer(layer)?;
        if let Some(index) = layer_index(&self.spatial()?.routed, layer) {
            out.extend(index.overlapping(rect).map(|(shape, &net)| (net, shape)));
            out.sort_unstable();
        }
        Ok(!out.is_empty())
    }

    /// Returns `true` if any routed shape on `layer` overlaps `rect`.
    pub fn exist_spatial_routed_wire(&self, layer: LayerId, rect: Rect) -> Result<bool> {
        self.check_layer(layer)?;
        let index = layer_index(&self.spatial()?.routed, layer);
        Ok(index.is_some_and(|index| index.exists(rect)))
    }

    /// Returns `true` if a routed shape of `net` on `layer` overlaps `rect`.
    pub fn exist_spatial_routed_wire_net(
        &self,
        layer: LayerId,
        rect: Rect,
        net: NetId,
    ) -> Result<bool> {
        self.check_layer(layer)?;
        let index = layer_index(&self.spatial()?.routed, layer);
        Ok(index.is_some_and(|index| index.exists_owned_by(rect, &net)))
    }

    /// Returns `true` if a guide shape of `net` on `layer` overlaps `rect`.
    pub fn exist_spatial_net_guide(&self, net: NetId, layer: LayerId, rect: Rect) -> Result<bool> {
        self.check_layer(layer)?;
        self.nets.try_get(net)?;
        let index = layer_index(&self.spatial()?.net_guides[net.index()], layer);
        Ok(index.is_some_and(|index| index.exists(rect)))
    }

    /// Collects the guide shapes of `net` on `layer` overlapping `rect`.
    ///
    /// `out` is cleared first, then filled in ascending order.
    pub fn query_spatial_net_guide(
        &self,
        net: NetId,
        layer: LayerId,
        rect: Rect,
        out: &mut Vec<Rect>,
    ) -> Result<bool> {
        out.clear();
        self.check_layer(layer)?;
        self.nets.try_get(net)?;
        if let Some(index) = self.spatial()?.net_guides[net.index()].get(layer.index()) {
            out.extend(index.overlapping(rect).map(|(shape, _)| shape));
            out.sort_unstable();
        }
        Ok(!out.is_empty())
    }
}
