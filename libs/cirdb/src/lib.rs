//! Circuit database (CirDB).
//!
//! An in-memory physical design database holding the geometric and
//! electrical state of a chip: layers, vias, pins, nets and blockages.
//!
//! Entities live in append-only tables and are addressed by typed ids.
//! After population, per-layer spatial indexes answer existence, range and
//! overlap queries against pins, blockages, routed geometry, net guide shapes
//! and diffusion regions. A [`RouteGuide`] turns per-net probability grids
//! into routing costs.
//!
//! Databases are populated by readers through the [`CirBuilder`] trait:
//!
//! ```
//! use cirdb::prelude::*;
//!
//! let mut db = CirDb::new("top");
//! let m1 = db
//!     .layers_mut()
//!     .add_routing_layer(RoutingLayer {
//!         name: "metal1".into(),
//!         spacings: vec![100],
//!         ..Default::default()
//!     })
//!     .unwrap();
//! let a = db
//!     .add_pin(Pin::new("a").with_shape(m1, Rect::from_sides(0, 0, 100, 100)))
//!     .unwrap();
//! db.add_net(Net::new("n").with_pin(a)).unwrap();
//! db.build_spatial();
//!
//! let mut pins = Vec::new();
//! assert!(db.query_spatial_pin(m1, Rect::from_sides(50, 50, 200, 200), &mut pins).unwrap());
//! assert_eq!(pins, vec![a]);
//! ```
#![warn(missing_docs)]

pub mod blk;
pub mod buckets;
pub mod builder;
pub mod config;
pub mod db;
pub mod error;
pub mod guide;
pub mod id;
pub mod layer;
pub mod net;
pub mod pin;
pub mod reader;
pub mod spacing;
pub mod spatial;
pub mod table;


pub use builder::CirBuilder;
pub use db::CirDb;
pub use error::{Error, Result};
pub use guide::{GuideState, RouteGuide};

/// Commonly used items.
pub mod prelude {
    pub use geometry::prelude::*;

    pub use crate::blk::{Blk, BlkId};
    pub use crate::builder::CirBuilder;
    pub use crate::db::CirDb;
    pub use crate::error::{Error, Result};
    pub use crate::guide::{GuideState, RouteGuide};
    pub use crate::layer::{
        CutLayer, ImplantLayer, LayerId, LayerKind, LayerRegistry, MastersliceLayer,
        OverlapLayer, RoutingDir, RoutingLayer, Site, Via, ViaId,
    };
    pub use crate::net::{Net, NetId, NetStats, PerfGuide, ViaPlacement};
    pub use crate::pin::{Pin, PinId};
    pub use crate::spacing::SpacingTable;
}
