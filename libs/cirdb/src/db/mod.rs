//! The circuit database.

use arcstr::ArcStr;
use geometry::prelude::*;

use crate::blk::{Blk, BlkId};
use crate::buckets::LayerBuckets;
use crate::config::CirDbConfig;
use crate::error::{Error, Result};
use crate::guide::RouteGuide;
use crate::layer::{LayerId, LayerRegistry};
use crate::net::{Net, NetId, NetStats, PerfGuide};
use crate::pin::{Pin, PinId};
use crate::spatial::SpatialIndex;
use crate::table::Table;

mod spatial;

#[cfg(test)]
mod tests;

pub(crate) use spatial::SpatialIndexes;

/// The in-memory state of a chip: layers, pins, nets, blockages,
/// spatial indexes and routing guides.
///
/// Readers populate the database through [`CirBuilder`](crate::builder::CirBuilder)
/// or the inherent mutators. Once population is complete,
/// [`CirDb::build_spatial`] builds the spatial indexes; routed geometry is then
/// added and removed incrementally.
#[derive(Debug, Clone)]
pub struct CirDb {
    name: ArcStr,
    boundary: Rect,
    grid_step: i64,
    grid_offset_x: i64,
    grid_offset_y: i64,
    sym_axis_x: i64,

    layers: LayerRegistry,
    pins: Table<Pin>,
    nets: Table<Net>,
    blks: Table<Blk>,
    layer_pins: LayerBuckets<PinId>,
    layer_blks: LayerBuckets<BlkId>,

    spatial: Option<SpatialIndexes>,
    od: SpatialIndex<()>,

    route_guide: RouteGuide,

    mask_wires: LayerBuckets<Rect>,
    patch_wires: LayerBuckets<Rect>,
}

impl Default for CirDb {
    fn default() -> Self {
        Self {
            name: ArcStr::default(),
            boundary: Rect::default(),
            grid_step: 0,
            grid_offset_x: 0,
            grid_offset_y: 0,
            sym_axis_x: 0,
            layers: LayerRegistry::new(),
            pins: Table::new("pin"),
            nets: Table::new("net"),
            blks: Table::new("blockage"),
            layer_pins: LayerBuckets::new(),
            layer_blks: LayerBuckets::new(),
            spatial: None,
            od: SpatialIndex::new(),
            route_guide: RouteGuide::default(),
            mask_wires: LayerBuckets::new(),
            patch_wires: LayerBuckets::new(),
        }
    }
}

impl CirDb {
    /// Creates an empty database.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Creates an empty database configured by `config`.
    pub fn with_config(name: impl Into<ArcStr>, config: &CirDbConfig) -> Self {
        let mut db = Self::new(name);
        db.route_guide.set_enable(config.route_guide.enable);
        db
    }

    /// The design name.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Sets the design name.
    pub fn set_name(&mut self, name: impl Into<ArcStr>) {
        self.name = name.into();
    }

    /// The die boundary.
    #[inline]
    pub fn boundary(&self) -> Rect {
        self.boundary
    }

    /// Sets the die boundary.
    pub fn set_boundary(&mut self, boundary: Rect) {
        self.boundary = boundary;
    }

    /// Sets the left edge of the die boundary.
    pub fn set_xl(&mut self, xl: i64) {
        let b = self.boundary;
        self.boundary = Rect::new(Point::new(xl, b.bot()), Point::new(b.right(), b.top()));
    }

    /// Sets the right edge of the die boundary.
    pub fn set_xh(&mut self, xh: i64) {
        let b = self.boundary;
        self.boundary = Rect::new(Point::new(b.left(), b.bot()), Point::new(xh, b.top()));
    }

    /// Sets the bottom edge of the die boundary.
    pub fn set_yl(&mut self, yl: i64) {
        let b = self.boundary;
        self.boundary = Rect::new(Point::new(b.left(), yl), Point::new(b.right(), b.top()));
    }

    /// Sets the top edge of the die boundary.
    pub fn set_yh(&mut self, yh: i64) {
        let b = self.boundary;
        self.boundary = Rect::new(Point::new(b.left(), b.bot()), Point::new(b.right(), yh));
    }

    /// Sets the placement grid step and offsets.
    pub fn set_grid_geometry(&mut self, step: i64, offset_x: i64, offset_y: i64) {
        self.grid_step = step;
        self.grid_offset_x = offset_x;
        self.grid_offset_y = offset_y;
    }

    /// Sets the placement grid step.
    pub fn set_grid_step(&mut self, step: i64) {
        self.grid_step = step;
    }

    /// Sets the placement grid x offset.
    pub fn set_grid_offset_x(&mut self, offset: i64) {
        self.grid_offset_x = offset;
    }

    /// Sets the placement grid y offset.
    pub fn set_grid_offset_y(&mut self, offset: i64) {
        self.grid_offset_y = offset;
    }

    /// The placement grid step.
    #[inline]
    pub fn grid_step(&self) -> i64 {
        self.grid_step
    }

    /// The absolute x coordinate of the center of grid column `idx`.
    #[inline]
    pub fn grid_center_x(&self, idx: i64) -> i64 {
        self.grid_step * idx + self.grid_offset_x
    }

    /// The absolute y coordinate of the center of grid row `idx`.
    #[inline]
    pub fn grid_center_y(&self, idx: i64) -> i64 {
        self.grid_step * idx + self.grid_offset_y
    }

    /// The x coordinate of the vertical symmetry axis.
    #[inline]
    pub fn sym_axis_x(&self) -> i64 {
        self.sym_axis_x
    }

    /// Sets the x coordinate of the vertical symmetry axis.
    pub fn set_sym_axis_x(&mut self, x: i64) {
        self.sym_axis_x = x;
    }

    /// The layer registry.
    #[inline]
    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    /// The layer registry, for registering layers, vias and sites.
    #[inline]
    pub fn layers_mut(&mut self) -> &mut LayerRegistry {
        &mut self.layers
    }

    fn check_layer(&self, layer: LayerId) -> Result<()> {
        if layer.index() >= self.layers.num_layers() {
            return Err(Error::LayerOutOfRange {
                layer: layer.index(),
                num_layers: self.layers.num_layers(),
            });
        }
        Ok(())
    }

    /// Pre-allocates per-layer pin buckets for the first `num_layers` layers.
    ///
    /// Buckets also grow on demand; this only avoids reallocation.
    pub fn reserve_pin_layers(&mut self, num_layers: usize) {
        self.layer_pins.reserve_layers(num_layers);
    }

    /// Pre-allocates per-layer blockage buckets for the first `num_layers` layers.
    pub fn reserve_blk_layers(&mut self, num_layers: usize) {
        self.layer_blks.reserve_layers(num_layers);
    }

    /// Adds a pin, bucketing it on every layer it has shapes on.
    ///
    /// Pin names are unique. The pin's net is set when a net claiming it is added.
    pub fn add_pin(&mut self, pin: Pin) -> Result<PinId> {
        for layer in pin.layers() {
            self.check_layer(layer)?;
        }
        let layers: Vec<LayerId> = pin.layers().collect();
        let id = self.pins.push_named(pin.name().clone(), pin)?;
        for layer in layers {
            self.layer_pins.push(layer, id);
        }
        if let Some(spatial) = self.spatial.as_mut() {
            spatial.insert_pin(id, &self.pins[id]);
        }
        Ok(id)
    }

    /// Adds a net and claims its pins.
    ///
    /// Fails without modifying the database if the name is taken, if a pin
    /// does not exist or already belongs to another net, or if a guide shape
    /// lies on an unregistered layer.
    pub fn add_net(&mut self, net: Net) -> Result<NetId> {
        for pin in net.pins() {
            if let Some(owner) = self.pins.try_get(pin)?.net() {
                return Err(Error::PinAlreadyOwned { pin, owner });
            }
        }
        for &(layer, _) in net.guides() {
            self.check_layer(layer)?;
        }
        let pins: Vec<PinId> = net.pins().collect();
        let id = self.nets.push_named(net.name().clone(), net)?;
        for pin in pins {
            self.pins[pin].set_net(id);
        }
        self.route_guide.grow_nets(self.nets.len());
        if let Some(spatial) = self.spatial.as_mut() {
            spatial.push_net_guides(self.layers.num_layers(), &self.nets[id]);
        }
        Ok(id)
    }

    /// Adds a blockage on `layer`.
    pub fn add_blk(&mut self, layer: LayerId, mut blk: Blk) -> Result<BlkId> {
        self.check_layer(layer)?;
        blk.set_layer(layer);
        let id = self.blks.push(blk);
        self.layer_blks.push(layer, id);
        if let Some(spatial) = self.spatial.as_mut() {
            spatial.insert_blk(id, &self.blks[id]);
        }
        Ok(id)
    }

    /// The pin table.
    #[inline]
    pub fn pins(&self) -> &Table<Pin> {
        &self.pins
    }

    /// The net table.
    #[inline]
    pub fn nets(&self) -> &Table<Net> {
        &self.nets
    }

    /// The blockage table.
    #[inline]
    pub fn blks(&self) -> &Table<Blk> {
        &self.blks
    }

    /// Gets a pin.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not from this database.
    #[inline]
    pub fn pin(&self, id: PinId) -> &Pin {
        &self.pins[id]
    }

    /// Gets a net.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not from this database.
    #[inline]
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id]
    }

    /// Gets a blockage.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not from this database.
    #[inline]
    pub fn blk(&self, id: BlkId) -> &Blk {
        &self.blks[id]
    }

    /// The number of pins.
    #[inline]
    pub fn num_pins(&self) -> usize {
        self.pins.len()
    }

    /// The number of nets.
    #[inline]
    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }

    /// The number of blockages.
    #[inline]
    pub fn num_blks(&self) -> usize {
        self.blks.len()
    }

    /// Returns `true` if a pin named `name` exists.
    #[inline]
    pub fn has_pin(&self, name: &str) -> bool {
        self.pins.contains_name(name)
    }

    /// Returns `true` if a net named `name` exists.
    #[inline]
    pub fn has_net(&self, name: &str) -> bool {
        self.nets.contains_name(name)
    }

    /// Looks up a pin by name.
    pub fn pin_id(&self, name: &str) -> Result<PinId> {
        self.pins.try_id_named(name)
    }

    /// Looks up a net by name.
    pub fn net_id(&self, name: &str) -> Result<NetId> {
        self.nets.try_id_named(name)
    }

    /// The pins with at least one shape on `layer`, in insertion order.
    #[inline]
    pub fn pins_on(&self, layer: LayerId) -> &[PinId] {
        self.layer_pins.get(layer)
    }

    /// The blockages on `layer`, in insertion order.
    #[inline]
    pub fn blks_on(&self, layer: LayerId) -> &[BlkId] {
        self.layer_blks.get(layer)
    }

    /// The routing guide.
    #[inline]
    pub fn route_guide(&self) -> &RouteGuide {
        &self.route_guide
    }

    /// The routing guide, for ingesting guide data.
    #[inline]
    pub fn route_guide_mut(&mut self) -> &mut RouteGuide {
        &mut self.route_guide
    }

    /// Computes the routing guide's average probability grid from the nets'
    /// minimum widths.
    pub fn finalize_route_guide(&mut self) -> Result<()> {
        self.route_guide.init_average_prob(&self.nets)
    }

    /// The routing guide cost of routing `net` through grid cell `(x, y)`.
    pub fn route_guide_cost(&self, net: NetId, x: usize, y: usize) -> Result<i64> {
        self.route_guide.cost(net, x, y)
    }

    /// Sets the performance-driven guide weights of every net.
    ///
    /// Each slice is indexed by net and must have one entry per net.
    pub fn set_pa_guide(&mut self, hor: &[i64], ver: &[i64], via: &[i64]) -> Result<()> {
        let n = self.nets.len();
        if hor.len() != n || ver.len() != n || via.len() != n {
            return Err(Error::InvalidArgument(format!(
                "expected {n} guide weights per direction, got {}/{}/{}",
                hor.len(),
                ver.len(),
                via.len()
            )));
        }
        for (i, (_, net)) in self.nets.iter_mut().enumerate() {
            net.set_perf_guide(PerfGuide {
                hor: hor[i],
                ver: ver[i],
                via: via[i],
            });
        }
        Ok(())
    }

    /// Marks nets as timing critical.
    ///
    /// Indexed by net; must have one entry per net.
    pub fn set_pa_critical(&mut self, critical: &[bool]) -> Result<()> {
        if critical.len() != self.nets.len() {
            return Err(Error::InvalidArgument(format!(
                "expected {} critical flags, got {}",
                self.nets.len(),
                critical.len()
            )));
        }
        for ((_, net), &c) in self.nets.iter_mut().zip(critical) {
            net.set_critical(c);
        }
        Ok(())
    }

    /// The horizontal performance guide weight of `net`.
    pub fn hor_guide(&self, net: NetId) -> Result<i64> {
        Ok(self.nets.try_get(net)?.perf_guide().hor)
    }

    /// The vertical performance guide weight of `net`.
    pub fn ver_guide(&self, net: NetId) -> Result<i64> {
        Ok(self.nets.try_get(net)?.perf_guide().ver)
    }

    /// The via performance guide weight of `net`.
    pub fn via_guide(&self, net: NetId) -> Result<i64> {
        Ok(self.nets.try_get(net)?.perf_guide().via)
    }

    /// Returns `true` if `net` is marked timing critical.
    pub fn is_critical(&self, net: NetId) -> Result<bool> {
        Ok(self.nets.try_get(net)?.is_critical())
    }

    /// Records routing statistics for `net`.
    pub fn set_net_stats(&mut self, net: NetId, stats: NetStats) -> Result<()> {
        self.nets.try_get_mut(net)?.set_stats(stats);
        Ok(())
    }

    /// Marks every unconnected blockage that overlaps a pin shape on its layer
    /// as connected to that pin.
    ///
    /// When several pins overlap a blockage, the pin with the lowest id wins.
    /// Uses the pin indexes if [`CirDb::build_spatial`] has run. Returns the
    /// number of newly connected blockages.
    pub fn connect_blks_to_pins(&mut self) -> usize {
        let mut connected = 0;
        for idx in 0..self.blks.len() {
            let id = BlkId::new(idx);
            let blk = &self.blks[id];
            let Some(layer) = blk.layer() else {
                continue;
            };
            if blk.is_connected_to_pin() {
                continue;
            }
            let rect = blk.rect();
            let pin = match self.spatial.as_ref() {
                Some(spatial) => spatial.lowest_pin_overlapping(layer, rect),
                None => self.first_pin_overlapping(layer, rect),
            };
            if let Some(pin) = pin {
                self.blks[id].set_pin(pin);
                self.pins[pin].add_connected_blk(id);
                connected += 1;
            }
        }
        tracing::debug!(connected, "connected blockages to pins");
        connected
    }

    fn first_pin_overlapping(&self, layer: LayerId, rect: Rect) -> Option<PinId> {
        let overlaps = |pin: &PinId| {
            self.pins[*pin]
                .shapes_on(layer)
                .iter()
                .any(|s| s.intersects(&rect))
        };
        self.layer_pins.get(layer).iter().copied().find(overlaps)
    }

    /// Records a wire to be removed in post-processing.
    pub fn add_mask_wire(&mut self, layer: LayerId, rect: Rect) -> Result<()> {
        self.check_layer(layer)?;
        self.mask_wires.push(layer, rect);
        Ok(())
    }

    /// Records a wire to be added in post-processing.
    pub fn add_patch_wire(&mut self, layer: LayerId, rect: Rect) -> Result<()> {
        self.check_layer(layer)?;
        self.patch_wires.push(layer, rect);
        Ok(())
    }

    /// The mask wires on `layer`.
    #[inline]
    pub fn mask_wires(&self, layer: LayerId) -> &[Rect] {
        self.mask_wires.get(layer)
    }

    /// The patch wires on `layer`.
    #[inline]
    pub fn patch_wires(&self, layer: LayerId) -> &[Rect] {
        self.patch_wires.get(layer)
    }
}
