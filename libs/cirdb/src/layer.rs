//! The layer registry: physical layers, vias and placement sites.
//!
//! Every layer receives a dense global index (its [`LayerId`]) in
//! declaration order, plus a dense index within its kind
//! (e.g. a [`RoutingLayerId`]). The two are mutually convertible.

use arcstr::ArcStr;
use geometry::prelude::*;

use crate::error::{Error, Result};
use crate::id::Id;
use crate::spacing::SpacingTable;
use crate::table::Table;

/// The kinds of physical layers.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum LayerKind {
    /// An implant layer.
    Implant,
    /// A masterslice (e.g. poly or diffusion) layer.
    Masterslice,
    /// A cut (via) layer.
    Cut,
    /// A routing (metal) layer.
    Routing,
    /// An overlap layer.
    Overlap,
}

/// An entry in the global layer order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Layer {
    name: ArcStr,
    kind: LayerKind,
    kind_index: usize,
}

/// The global index of a layer.
pub type LayerId = Id<Layer>;
/// The index of an implant layer among implant layers.
pub type ImplantLayerId = Id<ImplantLayer>;
/// The index of a masterslice layer among masterslice layers.
pub type MastersliceLayerId = Id<MastersliceLayer>;
/// The index of a cut layer among cut layers.
pub type CutLayerId = Id<CutLayer>;
/// The index of a routing layer among routing layers.
pub type RoutingLayerId = Id<RoutingLayer>;
/// The index of an overlap layer among overlap layers.
pub type OverlapLayerId = Id<OverlapLayer>;
/// A via definition.
pub type ViaId = Id<Via>;
/// A placement site.
pub type SiteId = Id<Site>;

impl Layer {
    /// The layer name.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The kind of the layer.
    #[inline]
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    /// The index of the layer among layers of the same kind.
    #[inline]
    pub fn kind_index(&self) -> usize {
        self.kind_index
    }
}

/// An implant layer.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ImplantLayer {
    /// The layer name.
    pub name: ArcStr,
    /// The minimum width.
    pub width: i64,
    /// The minimum spacing.
    pub spacing: i64,
}

/// A masterslice layer.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct MastersliceLayer {
    /// The layer name.
    pub name: ArcStr,
}

/// A cut layer.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CutLayer {
    /// The layer name.
    pub name: ArcStr,
    /// The cut width.
    pub width: i64,
    /// The minimum cut-to-cut spacing.
    pub spacing: i64,
}

/// An overlap layer.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct OverlapLayer {
    /// The layer name.
    pub name: ArcStr,
}

/// Preferred routing directions.
#[derive(Debug, Copy, Clone, Default, Hash, Eq, PartialEq)]
pub enum RoutingDir {
    /// Horizontal wires.
    Horiz,
    /// Vertical wires.
    Vert,
    /// No preference.
    #[default]
    Any,
}

/// A routing layer.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RoutingLayer {
    /// The layer name.
    pub name: ArcStr,
    /// The preferred routing direction.
    pub dir: RoutingDir,
    /// The minimum wire width.
    pub min_width: i64,
    /// The default wire width.
    pub width: i64,
    /// The track pitch.
    pub pitch: i64,
    /// The offset of the first track.
    pub offset: i64,
    /// Scalar minimum spacings, indexed by width rule.
    ///
    /// The first entry is the default spacing of the layer.
    pub spacings: Vec<i64>,
    /// The parallel-run-length spacing table, if any.
    pub spacing_table: Option<SpacingTable>,
}

impl RoutingLayer {
    /// The spacing between two wires of the given width that run in
    /// parallel for `prl`.
    ///
    /// Uses the spacing table if there is one and falls back to the
    /// layer's default scalar spacing otherwise. Returns 0 if the layer
    /// declares no spacing data at all, or if the query lies below the
    /// table's smallest width or run length.
    pub fn prl_spacing(&self, width: i64, prl: i64) -> i64 {
        match &self.spacing_table {
            Some(table) if !table.is_empty() => table.lookup(width, prl).unwrap_or(0),
            _ => self.spacings.first().copied().unwrap_or(0),
        }
    }

    /// Returns `true` if the layer declares any spacing data.
    pub fn has_spacing(&self) -> bool {
        let has_table = self.spacing_table.as_ref().is_some_and(|t| !t.is_empty());
        !self.spacings.is_empty() || has_table
    }
}

/// A via definition.
///
/// Shapes are relative to the via origin.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Via {
    /// The via name.
    pub name: ArcStr,
    /// The cut layer the via belongs to.
    pub cut_layer: CutLayerId,
    /// The shapes of the via on each layer it touches.
    pub shapes: Vec<(LayerId, Rect)>,
}

impl Via {
    /// Creates a via with no shapes.
    pub fn new(name: impl Into<ArcStr>, cut_layer: CutLayerId) -> Self {
        Self {
            name: name.into(),
            cut_layer,
            shapes: Vec::new(),
        }
    }

    /// Adds a shape on `layer`, relative to the via origin.
    pub fn with_shape(mut self, layer: LayerId, rect: Rect) -> Self {
        self.shapes.push((layer, rect));
        self
    }

    /// The shapes of the via placed at `origin`.
    pub fn placed_shapes(&self, origin: Point) -> impl Iterator<Item = (LayerId, Rect)> + '_ {
        self.shapes
            .iter()
            .map(move |&(layer, rect)| (layer, rect.translate(origin)))
    }
}

/// A placement site.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Site {
    /// The site name.
    pub name: ArcStr,
    /// The site class (e.g. `CORE`).
    pub class: ArcStr,
    /// The site width.
    pub width: i64,
    /// The site height.
    pub height: i64,
}

#[derive(Debug, Clone)]
struct KindTable<T> {
    layers: Table<T>,
    global: Vec<LayerId>,
}

impl<T> KindTable<T> {
    fn new(kind: &'static str) -> Self {
        Self {
            layers: Table::new(kind),
            global: Vec::new(),
        }
    }

    fn global(&self, id: Id<T>) -> LayerId {
        self.global[id.index()]
    }
}

/// The registry of all layers, vias and sites.
#[derive(Debug, Clone)]
pub struct LayerRegistry {
    layers: Table<Layer>,
    implant: KindTable<ImplantLayer>,
    masterslice: KindTable<MastersliceLayer>,
    cut: KindTable<CutLayer>,
    routing: KindTable<RoutingLayer>,
    overlap: KindTable<OverlapLayer>,
    vias: Table<Via>,
    vias_by_cut: Vec<Vec<ViaId>>,
    sites: Table<Site>,
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self {
            layers: Table::new("layer"),
            implant: KindTable::new("implant layer"),
            masterslice: KindTable::new("masterslice layer"),
            cut: KindTable::new("cut layer"),
            routing: KindTable::new("routing layer"),
            overlap: KindTable::new("overlap layer"),
            vias: Table::new("via"),
            vias_by_cut: Vec::new(),
            sites: Table::new("site"),
        }
    }
}

macro_rules! kind_accessors {
    (
        $add:ident,
        $get:ident,
        $as_kind:ident,
        $to_global:ident,
        $count:ident,
        $field:ident,
        $ty:ty,
        $kind:expr
    ) => {
        /// Appends a layer of this kind to the end of the global layer order.
        ///
        /// Fails if a layer with the same name is already registered.
        pub fn $add(&mut self, layer: $ty) -> Result<LayerId> {
            let kind_index = self.$field.layers.len();
            let global = self.layers.push_named(
                layer.name.clone(),
                Layer {
                    name: layer.name.clone(),
                    kind: $kind,
                    kind_index,
                },
            )?;
            self.$field.layers.push(layer);
            self.$field.global.push(global);
            Ok(global)
        }

        /// Gets a layer of this kind by its per-kind id.
        #[inline]
        pub fn $get(&self, id: Id<$ty>) -> &$ty {
            &self.$field.layers[id]
        }

        /// Converts a global layer id to a per-kind id, if the layer is of this kind.
        pub fn $as_kind(&self, layer: LayerId) -> Option<Id<$ty>> {
            let entry = self.layers.get(layer)?;
            (entry.kind == $kind).then(|| Id::new(entry.kind_index))
        }

        /// Converts a per-kind id to its global layer id.
        #[inline]
        pub fn $to_global(&self, id: Id<$ty>) -> LayerId {
            self.$field.global(id)
        }

        /// The number of layers of this kind.
        #[inline]
        pub fn $count(&self) -> usize {
            self.$field.layers.len()
        }
    };
}

impl LayerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    kind_accessors!(
        add_implant_layer,
        implant_layer,
        as_implant,
        implant_to_global,
        num_implant_layers,
        implant,
        ImplantLayer,
        LayerKind::Implant
    );
    kind_accessors!(
        add_masterslice_layer,
        masterslice_layer,
        as_masterslice,
        masterslice_to_global,
        num_masterslice_layers,
        masterslice,
        MastersliceLayer,
        LayerKind::Masterslice
    );
    kind_accessors!(
        add_cut_layer,
        cut_layer,
        as_cut,
        cut_to_global,
        num_cut_layers,
        cut,
        CutLayer,
        LayerKind::Cut
    );
    kind_accessors!(
        add_routing_layer,
        routing_layer,
        as_routing,
        routing_to_global,
        num_routing_layers,
        routing,
        RoutingLayer,
        LayerKind::Routing
    );
    kind_accessors!(
        add_overlap_layer,
        overlap_layer,
        as_overlap,
        overlap_to_global,
        num_overlap_layers,
        overlap,
        OverlapLayer,
        LayerKind::Overlap
    );

    /// The total number of layers.
    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Converts a raw global layer index into a [`LayerId`].
    pub fn layer_id(&self, index: usize) -> Result<LayerId> {
        if index < self.layers.len() {
            Ok(Id::new(index))
        } else {
            Err(Error::LayerOutOfRange {
                layer: index,
                num_layers: self.layers.len(),
            })
        }
    }

    /// Gets the global layer entry for `id`.
    #[inline]
    pub fn layer(&self, id: LayerId) -> &Layer {
        &self.layers[id]
    }

    /// Looks up a layer by name.
    #[inline]
    pub fn layer_id_named(&self, name: &str) -> Option<LayerId> {
        self.layers.id_named(name)
    }

    /// Iterates over all layers in global order.
    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layers.iter()
    }

    /// Iterates over all routing layers, bottom to top.
    pub fn routing_layers(&self) -> impl Iterator<Item = (RoutingLayerId, &RoutingLayer)> {
        self.routing.layers.iter()
    }

    /// The kind of the given layer.
    #[inline]
    pub fn kind(&self, id: LayerId) -> LayerKind {
        self.layers[id].kind
    }

    /// Returns `true` if `id` is a routing layer.
    pub fn is_routing(&self, id: LayerId) -> bool {
        self.as_routing(id).is_some()
    }

    /// Returns `true` if `id` is a cut layer.
    pub fn is_cut(&self, id: LayerId) -> bool {
        self.as_cut(id).is_some()
    }

    /// Gets the routing layer with global id `id`, failing if it is not a routing layer.
    pub fn try_routing_layer(&self, id: LayerId) -> Result<&RoutingLayer> {
        let entry = self.layers.try_get(id)?;
        match self.as_routing(id) {
            Some(routing) => Ok(self.routing_layer(routing)),
            None => Err(Error::WrongLayerKind {
                layer: id,
                expected: LayerKind::Routing,
                found: entry.kind,
            }),
        }
    }

    /// The minimum spacing on routing layer `layer` between wires of the given
    /// width and parallel run length.
    ///
    /// See [`RoutingLayer::prl_spacing`]. A returned 0 means the layer has no
    /// applicable spacing data; check [`RoutingLayer::has_spacing`] before
    /// treating it as a physical rule.
    pub fn prl_spacing(&self, layer: LayerId, width: i64, prl: i64) -> Result<i64> {
        Ok(self.try_routing_layer(layer)?.prl_spacing(width, prl))
    }

    /// The nearest routing layers below and above the cut layer `cut`
    /// in global order.
    pub fn adjacent_routing_layers(
        &self,
        cut: LayerId,
    ) -> Result<(Option<LayerId>, Option<LayerId>)> {
        let entry = self.layers.try_get(cut)?;
        if entry.kind != LayerKind::Cut {
            return Err(Error::WrongLayerKind {
                layer: cut,
                expected: LayerKind::Cut,
                found: entry.kind,
            });
        }
        let below = (0..cut.index())
            .rev()
            .map(LayerId::new)
            .find(|&l| self.is_routing(l));
        let above = (cut.index() + 1..self.layers.len())
            .map(LayerId::new)
            .find(|&l| self.is_routing(l));
        Ok((below, above))
    }

    /// Registers a via definition.
    ///
    /// Fails if the via name is taken, if its cut layer does not exist,
    /// or if any of its shapes lies on an unregistered layer.
    pub fn add_via(&mut self, via: Via) -> Result<ViaId> {
        self.cut.layers.try_get(via.cut_layer)?;
        for &(layer, _) in via.shapes.iter() {
            self.layers.try_get(layer)?;
        }
        let cut = via.cut_layer.index();
        let id = self.vias.push_named(via.name.clone(), via)?;
        if cut >= self.vias_by_cut.len() {
            self.vias_by_cut.resize_with(cut + 1, Vec::new);
        }
        self.vias_by_cut[cut].push(id);
        Ok(id)
    }

    /// Gets a via definition.
    #[inline]
    pub fn via(&self, id: ViaId) -> &Via {
        &self.vias[id]
    }

    /// Looks up a via by name.
    #[inline]
    pub fn via_id_named(&self, name: &str) -> Option<ViaId> {
        self.vias.id_named(name)
    }

    /// The number of via definitions.
    #[inline]
    pub fn num_vias(&self) -> usize {
        self.vias.len()
    }

    /// The vias defined on the given cut layer.
    pub fn vias_on_cut(&self, cut: CutLayerId) -> &[ViaId] {
        self.vias_by_cut
            .get(cut.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Registers a placement site.
    pub fn add_site(&mut self, site: Site) -> Result<SiteId> {
        self.sites.push_named(site.name.clone(), site)
    }

    /// Gets a site.
    #[inline]
    pub fn site(&self, id: SiteId) -> &Site {
        &self.sites[id]
    }

    /// Looks up a site by name.
    #[inline]
    pub fn site_id_named(&self, name: &str) -> Option<SiteId> {
        self.sites.id_named(name)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A five-layer stack: poly, metal1, via1, metal2, overlap.
    pub(crate) fn stack() -> LayerRegistry {
        let mut reg = LayerRegistry::new();
        reg.add_masterslice_layer(MastersliceLayer {
            name: "poly".into(),
        })
        .unwrap();
        reg.add_routing_layer(RoutingLayer {
            name: "metal1".into(),
            dir: RoutingDir::Horiz,
            width: 100,
            min_width: 100,
            pitch: 200,
            spacings: vec![100],
            spacing_table: Some(
                SpacingTable::new(
                    vec![0, 100],
                    vec![
                        (0, vec![100, 110]),
                        (200, vec![120, 130]),
                        (400, vec![140, 150]),
                    ],
                )
                .unwrap(),
            ),
            ..Default::default()
        })
        .unwrap();
        reg.add_cut_layer(CutLayer {
            name: "via1".into(),
            width: 50,
            spacing: 70,
        })
        .unwrap();
        reg.add_routing_layer(RoutingLayer {
            name: "metal2".into(),
            dir: RoutingDir::Vert,
            width: 100,
            min_width: 100,
            pitch: 200,
            spacings: vec![90, 150],
            ..Default::default()
        })
        .unwrap();
        reg.add_overlap_layer(OverlapLayer {
            name: "overlap".into(),
        })
        .unwrap();
        reg
    }

    #[test]
    fn global_and_kind_indices_are_inverse() {
        let reg = stack();
        assert_eq!(reg.num_layers(), 5);
        assert_eq!(reg.num_routing_layers(), 2);
        for (id, layer) in reg.layers() {
            match layer.kind() {
                LayerKind::Routing => {
                    let r = reg.as_routing(id).unwrap();
                    assert_eq!(r.index(), layer.kind_index());
                    assert_eq!(reg.routing_to_global(r), id);
                }
                LayerKind::Cut => {
                    let c = reg.as_cut(id).unwrap();
                    assert_eq!(reg.cut_to_global(c), id);
                }
                _ => assert!(reg.as_routing(id).is_none()),
            }
        }
        let m2 = reg.layer_id_named("metal2").unwrap();
        assert_eq!(m2.index(), 3);
        assert_eq!(reg.layer(m2).kind_index(), 1);
    }

    #[test]
    fn duplicate_layer_names_are_rejected() {
        let mut reg = stack();
        let err = reg
            .add_cut_layer(CutLayer {
                name: "metal1".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateName { .. }));
        assert_eq!(reg.num_layers(), 5);
        assert_eq!(reg.num_cut_layers(), 1);
    }

    #[test]
    fn prl_spacing_lookup() {
        let reg = stack();
        let m1 = reg.layer_id(1).unwrap();
        let m2 = reg.layer_id(3).unwrap();
        assert_eq!(reg.prl_spacing(m1, 250, 50).unwrap(), 120);
        assert_eq!(reg.prl_spacing(m1, 450, 150).unwrap(), 150);
        // no table: default scalar spacing
        assert_eq!(reg.prl_spacing(m2, 1000, 1000).unwrap(), 90);

        let cut = reg.layer_id(2).unwrap();
        assert!(matches!(
            reg.prl_spacing(cut, 100, 100),
            Err(Error::WrongLayerKind {
                expected: LayerKind::Routing,
                found: LayerKind::Cut,
                ..
            })
        ));
    }

    #[test]
    fn prl_spacing_without_data_is_zero() {
        let mut reg = LayerRegistry::new();
        let m = reg
            .add_routing_layer(RoutingLayer {
                name: "m".into(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(reg.prl_spacing(m, 100, 100).unwrap(), 0);
        assert!(!reg.try_routing_layer(m).unwrap().has_spacing());
    }

    #[test]
    fn vias_grouped_by_cut_layer() {
        let mut reg = stack();
        let m1 = reg.layer_id(1).unwrap();
        let v1 = reg.layer_id(2).unwrap();
        let m2 = reg.layer_id(3).unwrap();
        let cut = reg.as_cut(v1).unwrap();
        let via = reg
            .add_via(
                Via::new("via1_default", cut)
                    .with_shape(m1, Rect::from_sides(-50, -50, 50, 50))
                    .with_shape(v1, Rect::from_sides(-25, -25, 25, 25))
                    .with_shape(m2, Rect::from_sides(-50, -50, 50, 50)),
            )
            .unwrap();
        assert_eq!(reg.vias_on_cut(cut), &[via]);
        assert_eq!(reg.via_id_named("via1_default"), Some(via));
        assert_eq!(
            reg.adjacent_routing_layers(v1).unwrap(),
            (Some(m1), Some(m2))
        );
        assert!(reg.adjacent_routing_layers(m1).is_err());

        let placed: Vec<_> = reg.via(via).placed_shapes(Point::new(1000, 0)).collect();
        assert_eq!(placed[1], (v1, Rect::from_sides(975, -25, 1025, 25)));
    }
}
