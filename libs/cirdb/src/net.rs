//! Nets.

use arcstr::ArcStr;
use geometry::prelude::*;
use indexmap::IndexSet;

use crate::id::Id;
use crate::layer::{LayerId, ViaId};
use crate::pin::PinId;

/// A net id.
pub type NetId = Id<Net>;

/// A routed via instance.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub struct ViaPlacement {
    /// The via definition.
    pub via: ViaId,
    /// The location of the via origin.
    pub origin: Point,
}

/// Quality statistics of a routed net.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct NetStats {
    /// Total routed wire length.
    pub wire_length: i64,
    /// Number of routed vias.
    pub via_count: usize,
    /// Degree of symmetry in `[0, 1]`.
    pub deg_sym: f64,
}

/// Performance-driven routing weights of a net.
#[derive(Debug, Copy, Clone, Default, Hash, Eq, PartialEq)]
pub struct PerfGuide {
    /// Weight on horizontal wiring.
    pub hor: i64,
    /// Weight on vertical wiring.
    pub ver: i64,
    /// Weight on vias.
    pub via: i64,
}

/// An electrical net.
#[derive(Debug, Clone)]
pub struct Net {
    name: ArcStr,
    pins: IndexSet<PinId>,
    min_width: i64,
    io_port: bool,
    guides: Vec<(LayerId, Rect)>,
    wires: Vec<(LayerId, Rect)>,
    vias: Vec<ViaPlacement>,
    stats: NetStats,
    perf: PerfGuide,
    critical: bool,
}

impl Net {
    /// Creates a net with no pins.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            pins: IndexSet::new(),
            min_width: 0,
            io_port: false,
            guides: Vec::new(),
            wires: Vec::new(),
            vias: Vec::new(),
            stats: NetStats::default(),
            perf: PerfGuide::default(),
            critical: false,
        }
    }

    /// Adds a pin to the net.
    ///
    /// Adding a pin twice has no effect.
    pub fn with_pin(mut self, pin: PinId) -> Self {
        self.pins.insert(pin);
        self
    }

    /// Sets the minimum wire width.
    pub fn with_min_width(mut self, min_width: i64) -> Self {
        self.min_width = min_width;
        self
    }

    /// Marks the net as a single-pin I/O net.
    pub fn with_io_port(mut self, io_port: bool) -> Self {
        self.io_port = io_port;
        self
    }

    /// Adds a routing guide shape on `layer`.
    pub fn with_guide(mut self, layer: LayerId, rect: Rect) -> Self {
        self.guides.push((layer, rect));
        self
    }

    /// The name of the net.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The pins of the net, in insertion order.
    pub fn pins(&self) -> impl Iterator<Item = PinId> + '_ {
        self.pins.iter().copied()
    }

    /// The `i`-th pin of the net.
    #[inline]
    pub fn pin(&self, i: usize) -> Option<PinId> {
        self.pins.get_index(i).copied()
    }

    /// The number of pins.
    #[inline]
    pub fn num_pins(&self) -> usize {
        self.pins.len()
    }

    /// Returns `true` if `pin` belongs to this net.
    #[inline]
    pub fn has_pin(&self, pin: PinId) -> bool {
        self.pins.contains(&pin)
    }

    /// The minimum wire width.
    #[inline]
    pub fn min_width(&self) -> i64 {
        self.min_width
    }

    /// Returns `true` if this is a single-pin I/O net.
    #[inline]
    pub fn is_io_port(&self) -> bool {
        self.io_port
    }

    /// The routing guide shapes declared for this net.
    #[inline]
    pub fn guides(&self) -> &[(LayerId, Rect)] {
        &self.guides
    }

    /// The routed wire segments.
    #[inline]
    pub fn wires(&self) -> &[(LayerId, Rect)] {
        &self.wires
    }

    pub(crate) fn push_wire(&mut self, layer: LayerId, rect: Rect) {
        self.wires.push((layer, rect));
    }

    pub(crate) fn remove_wire(&mut self, layer: LayerId, rect: Rect) -> bool {
        match self.wires.iter().position(|w| *w == (layer, rect)) {
            Some(pos) => {
                self.wires.remove(pos);
                true
            }
            None => false,
        }
    }

    /// The routed vias.
    #[inline]
    pub fn vias(&self) -> &[ViaPlacement] {
        &self.vias
    }

    pub(crate) fn push_via(&mut self, via: ViaPlacement) {
        self.vias.push(via);
    }

    pub(crate) fn remove_via(&mut self, via: ViaPlacement) -> bool {
        match self.vias.iter().position(|v| *v == via) {
            Some(pos) => {
                self.vias.remove(pos);
                true
            }
            None => false,
        }
    }

    /// The statistics recorded for this net.
    #[inline]
    pub fn stats(&self) -> &NetStats {
        &self.stats
    }

    pub(crate) fn set_stats(&mut self, stats: NetStats) {
        self.stats = stats;
    }

    /// The performance-driven routing weights.
    #[inline]
    pub fn perf_guide(&self) -> PerfGuide {
        self.perf
    }

    pub(crate) fn set_perf_guide(&mut self, perf: PerfGuide) {
        self.perf = perf;
    }

    /// Returns `true` if the net is marked timing critical.
    #[inline]
    pub fn is_critical(&self) -> bool {
        self.critical
    }

    pub(crate) fn set_critical(&mut self, critical: bool) {
        self.critical = critical;
    }
}
