use geometry::prelude::*;
use test_log::test;

use crate::blk::Blk;
use crate::error::Error;
use crate::layer::tests::stack;
use crate::layer::{LayerId, Via, ViaId};
use crate::net::{Net, NetStats};
use crate::pin::Pin;

use super::CirDb;

struct Fixture {
    db: CirDb,
    m1: LayerId,
    v1: LayerId,
    m2: LayerId,
    via: ViaId,
}

fn fixture() -> Fixture {
    let mut db = CirDb::new("top");
    *db.layers_mut() = stack();
    let m1 = db.layers().layer_id(1).unwrap();
    let v1 = db.layers().layer_id(2).unwrap();
    let m2 = db.layers().layer_id(3).unwrap();
    let cut = db.layers().as_cut(v1).unwrap();
    let via = db
        .layers_mut()
        .add_via(
            Via::new("via12", cut)
                .with_shape(m1, Rect::from_sides(-30, -30, 30, 30))
                .with_shape(v1, Rect::from_sides(-25, -25, 25, 25))
                .with_shape(m2, Rect::from_sides(-30, -30, 30, 30)),
        )
        .unwrap();
    Fixture {
        db,
        m1,
        v1,
        m2,
        via,
    }
}

#[test]
fn boundary_and_grid_geometry() {
    let mut db = CirDb::new("top");
    db.set_xl(-10);
    db.set_yl(-20);
    db.set_xh(100);
    db.set_yh(200);
    assert_eq!(db.boundary(), Rect::from_sides(-10, -20, 100, 200));
    db.set_grid_geometry(40, 20, 25);
    assert_eq!(db.grid_center_x(0), 20);
    assert_eq!(db.grid_center_x(3), 140);
    assert_eq!(db.grid_center_y(2), 105);
    db.set_sym_axis_x(55);
    assert_eq!(db.sym_axis_x(), 55);
}

#[test]
fn pins_are_bucketed_per_layer() {
    let Fixture { mut db, m1, m2, .. } = fixture();
    let a = db
        .add_pin(
            Pin::new("a")
                .with_shape(m1, Rect::from_sides(0, 0, 10, 10))
                .with_shape(m1, Rect::from_sides(20, 0, 30, 10))
                .with_shape(m2, Rect::from_sides(0, 0, 10, 10)),
        )
        .unwrap();
    let far = Rect::from_sides(50, 50, 60, 60);
    let b = db.add_pin(Pin::new("b").with_shape(m2, far)).unwrap();
    assert_eq!(db.pins_on(m1), &[a]);
    assert_eq!(db.pins_on(m2), &[a, b]);
    assert_eq!(db.pin(a).min_layer(), Some(m1));
    assert!(db.has_pin("a"));
    assert_eq!(db.pin_id("b").unwrap(), b);
    assert!(matches!(
        db.pin_id("c"),
        Err(Error::NotFound { kind: "pin", .. })
    ));

    assert!(matches!(
        db.add_pin(Pin::new("a")),
        Err(Error::DuplicateName { kind: "pin", .. })
    ));

    let stray = Pin::new("c").with_shape(LayerId::new(5), Rect::from_sides(0, 0, 1, 1));
    assert_eq!(
        db.add_pin(stray).unwrap_err(),
        Error::LayerOutOfRange {
            layer: 5,
            num_layers: 5
        }
    );
    assert_eq!(db.num_pins(), 2);
}

#[test]
fn nets_claim_their_pins() {
    let Fixture { mut db, m1, .. } = fixture();
    let left = Rect::from_sides(0, 0, 10, 10);
    let right = Rect::from_sides(90, 0, 100, 10);
    let a = db.add_pin(Pin::new("a").with_shape(m1, left)).unwrap();
    let b = db.add_pin(Pin::new("b").with_shape(m1, right)).unwrap();
    let n = db
        .add_net(Net::new("n").with_pin(a).with_pin(b).with_min_width(100))
        .unwrap();
    assert_eq!(db.pin(a).net(), Some(n));
    assert_eq!(db.pin(b).net(), Some(n));
    assert_eq!(db.net(n).pins().collect::<Vec<_>>(), vec![a, b]);
    assert_eq!(db.net_id("n").unwrap(), n);

    let c = db.add_pin(Pin::new("c")).unwrap();
    let m = Net::new("m").with_pin(c).with_pin(a);
    assert_eq!(
        db.add_net(m).unwrap_err(),
        Error::PinAlreadyOwned { pin: a, owner: n }
    );
    // the failed net did not claim `c`
    assert_eq!(db.pin(c).net(), None);
    assert!(!db.has_net("m"));

    assert!(matches!(
        db.add_net(Net::new("n").with_pin(c)),
        Err(Error::DuplicateName { kind: "net", .. })
    ));
    assert_eq!(db.pin(c).net(), None);
    assert_eq!(db.num_nets(), 1);
}

#[test]
fn blockages_take_their_layer() {
    let Fixture { mut db, m1, m2, .. } = fixture();
    db.reserve_blk_layers(2);
    let blk = Blk::new(Rect::from_sides(0, 0, 5, 5));
    let k = db.add_blk(m2, blk).unwrap();
    assert_eq!(db.blk(k).layer(), Some(m2));
    assert_eq!(db.blks_on(m2), &[k]);
    assert!(db.blks_on(m1).is_empty());
}

#[test]
fn queries_require_built_indexes() {
    let Fixture { db, m1, .. } = fixture();
    let r = Rect::from_sides(0, 0, 10, 10);
    assert_eq!(db.exist_spatial_pin(m1, r), Err(Error::SpatialNotBuilt));
    let mut out = Vec::new();
    assert_eq!(
        db.query_spatial_blk(m1, r, &mut out),
        Err(Error::SpatialNotBuilt)
    );
    assert!(out.is_empty());
}

#[test]
fn pin_and_blk_queries() {
    let Fixture { mut db, m1, m2, .. } = fixture();
    let a = db
        .add_pin(
            Pin::new("a")
                .with_shape(m1, Rect::from_sides(0, 0, 10, 10))
                .with_shape(m1, Rect::from_sides(5, 5, 15, 15)),
        )
        .unwrap();
    let k = db
        .add_blk(m1, Blk::new(Rect::from_sides(100, 100, 200, 200)))
        .unwrap();
    db.build_spatial();
    assert!(db.is_spatial_built());

    let corner = Rect::from_sides(10, 10, 12, 12);
    let empty = Rect::from_sides(50, 50, 60, 60);
    assert!(db.exist_spatial_pin(m1, corner).unwrap());
    assert!(!db.exist_spatial_pin(m2, corner).unwrap());
    assert!(!db.exist_spatial_pin(m1, empty).unwrap());

    let mut pins = vec![];
    let window = Rect::from_sides(0, 0, 20, 20);
    assert!(db.query_spatial_pin(m1, window, &mut pins).unwrap());
    assert_eq!(pins, vec![a]);
    assert!(!db.query_spatial_pin(m1, empty, &mut pins).unwrap());
    assert!(pins.is_empty());

    let mut blks = vec![];
    let window = Rect::from_sides(150, 150, 300, 300);
    assert!(db.query_spatial_blk(m1, window, &mut blks).unwrap());
    assert_eq!(blks, vec![k]);
    let edge = Rect::from_sides(200, 200, 300, 300);
    assert!(db.exist_spatial_blk(m1, edge).unwrap());

    // additions after the build are indexed too
    let dot = Rect::from_sides(0, 0, 1, 1);
    let b = db
        .add_pin(Pin::new("b").with_shape(m2, Rect::from_sides(0, 0, 10, 10)))
        .unwrap();
    assert!(db.query_spatial_pin(m2, dot, &mut pins).unwrap());
    assert_eq!(pins, vec![b]);
    let j = db.add_blk(m2, Blk::new(dot)).unwrap();
    assert!(db.query_spatial_blk(m2, dot, &mut blks).unwrap());
    assert_eq!(blks, vec![j]);
}

#[test]
fn routed_wire_insert_remove_symmetry() {
    let Fixture { mut db, m1, m2, .. } = fixture();
    let n = db.add_net(Net::new("n")).unwrap();
    let m = db.add_net(Net::new("m")).unwrap();
    db.build_spatial();

    let wire = Rect::from_sides(0, 0, 1000, 100);
    let cross = Rect::from_sides(500, 0, 600, 1000);
    db.add_spatial_routed_wire(n, m1, wire).unwrap();
    db.add_spatial_routed_wire(m, m1, cross).unwrap();
    assert_eq!(db.net(n).wires(), &[(m1, wire)]);

    let inside = Rect::from_sides(10, 10, 20, 20);
    assert!(db.exist_spatial_routed_wire(m1, inside).unwrap());
    assert!(!db.exist_spatial_routed_wire(m2, wire).unwrap());
    assert!(db.exist_spatial_routed_wire_net(m1, inside, n).unwrap());
    assert!(!db.exist_spatial_routed_wire_net(m1, inside, m).unwrap());

    let mut out = vec![];
    let both = Rect::from_sides(550, 50, 560, 60);
    assert!(db.query_spatial_routed_wire(m1, both, &mut out).unwrap());
    assert_eq!(out, vec![(n, wire), (m, cross)]);

    assert!(db.remove_spatial_routed_wire(n, m1, wire).unwrap());
    assert!(!db.exist_spatial_routed_wire_net(m1, wire, n).unwrap());
    assert!(db.net(n).wires().is_empty());
    // never inserted
    assert!(!db.remove_spatial_routed_wire(n, m1, wire).unwrap());
    assert!(!db.remove_spatial_routed_wire(m, m1, wire).unwrap());
    assert_eq!(db.net(m).wires().len(), 1);
}

#[test]
fn routed_wire_between_points() {
    let Fixture { mut db, m1, .. } = fixture();
    let n = db.add_net(Net::new("n")).unwrap();
    db.build_spatial();

    let a = Point3::new(100, 0, m1.index());
    let b = Point3::new(0, 50, m1.index());
    db.add_spatial_routed_wire_between(n, a, b).unwrap();
    assert_eq!(db.net(n).wires(), &[(m1, Rect::from_sides(0, 0, 100, 50))]);
    assert!(matches!(
        db.add_spatial_routed_wire_between(n, a, Point3::new(0, 0, 3)),
        Err(Error::InvalidArgument(_))
    ));
    assert!(db.remove_spatial_routed_wire_between(n, b, a).unwrap());
    assert!(db.net(n).wires().is_empty());
}

#[test]
fn routed_vias_span_their_layers() {
    let Fixture {
        mut db,
        m1,
        v1,
        m2,
        via,
    } = fixture();
    let n = db.add_net(Net::new("n")).unwrap();
    db.build_spatial();

    let origin = Point::new(1000, 1000);
    db.add_spatial_routed_via(n, via, origin).unwrap();
    let center = Rect::from_sides(1020, 1020, 1020, 1020);
    for layer in [m1, v1, m2] {
        assert!(db.exist_spatial_routed_wire_net(layer, center, n).unwrap());
    }
    // outside the cut, inside the metal enclosures
    let ring = Rect::from_sides(1028, 1028, 1030, 1030);
    assert!(!db.exist_spatial_routed_wire(v1, ring).unwrap());
    assert!(db.exist_spatial_routed_wire(m1, ring).unwrap());
    assert_eq!(db.net(n).vias().len(), 1);

    let elsewhere = Point::new(0, 0);
    assert!(!db.remove_spatial_routed_via(n, via, elsewhere).unwrap());
    let bottom = Point3::new(1000, 1000, m1.index());
    let top = Point3::new(1000, 1000, m2.index());
    let removed = db.remove_spatial_routed_via_between(n, via, bottom, top);
    assert!(removed.unwrap());
    for layer in [m1, v1, m2] {
        assert!(!db.exist_spatial_routed_wire(layer, center).unwrap());
    }
    assert!(db.net(n).vias().is_empty());

    let offset = Point3::new(0, 10, m2.index());
    assert!(matches!(
        db.add_spatial_routed_via_between(n, via, Point3::new(0, 0, m1.index()), offset),
        Err(Error::InvalidArgument(_))
    ));
    // poly carries no shape of this via
    let poly = Point3::new(0, 0, 0);
    let metal2 = Point3::new(0, 0, m2.index());
    assert!(matches!(
        db.add_spatial_routed_via_between(n, via, poly, metal2),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn rebuild_keeps_routed_geometry() {
    let Fixture {
        mut db, m1, m2, via, ..
    } = fixture();
    let n = db.add_net(Net::new("n")).unwrap();
    db.build_spatial();
    let wire = Rect::from_sides(0, 0, 10, 10);
    db.add_spatial_routed_wire(n, m1, wire).unwrap();
    let at = Point::new(500, 500);
    db.add_spatial_routed_via(n, via, at).unwrap();
    db.build_spatial();
    let at_via = Rect::from_sides(500, 500, 500, 500);
    assert!(db.exist_spatial_routed_wire_net(m1, wire, n).unwrap());
    assert!(db.exist_spatial_routed_wire_net(m2, at_via, n).unwrap());
}

#[test]
fn od_overlap_area_is_additive() {
    let mut db = CirDb::new("top");
    db.add_spatial_od(Rect::from_sides(0, 0, 10, 10));
    db.add_spatial_od(Rect::from_sides(20, 0, 30, 10));
    let span = Rect::from_sides(5, 0, 25, 10);
    assert_eq!(db.overlap_area_with_od(span), 50 + 50);
    let away = Rect::from_sides(100, 100, 200, 200);
    assert_eq!(db.overlap_area_with_od(away), 0);
}

#[test]
fn net_guide_queries() {
    let Fixture { mut db, m1, m2, .. } = fixture();
    let g = Rect::from_sides(0, 0, 1000, 200);
    let n = db.add_net(Net::new("n").with_guide(m1, g)).unwrap();
    db.build_spatial();
    let m = db.add_net(Net::new("m").with_guide(m2, g)).unwrap();

    let inside = Rect::from_sides(500, 100, 600, 150);
    assert!(db.exist_spatial_net_guide(n, m1, inside).unwrap());
    assert!(!db.exist_spatial_net_guide(n, m2, inside).unwrap());
    assert!(db.exist_spatial_net_guide(m, m2, inside).unwrap());

    let mut out = vec![];
    let corner = Rect::from_sides(0, 0, 1, 1);
    assert!(db.query_spatial_net_guide(n, m1, corner, &mut out).unwrap());
    assert_eq!(out, vec![g]);
    let above = Rect::from_sides(0, 300, 1, 301);
    assert!(!db.query_spatial_net_guide(n, m1, above, &mut out).unwrap());
    assert!(out.is_empty());
}

#[test]
fn blockages_connect_to_lowest_overlapping_pin() {
    let Fixture { mut db, m1, m2, .. } = fixture();
    let a = db
        .add_pin(Pin::new("a").with_shape(m1, Rect::from_sides(0, 0, 10, 10)))
        .unwrap();
    let b = db
        .add_pin(Pin::new("b").with_shape(m1, Rect::from_sides(5, 0, 15, 10)))
        .unwrap();
    let k0 = db.add_blk(m1, Blk::new(Rect::from_sides(6, 0, 8, 10)));
    let k1 = db.add_blk(m1, Blk::new(Rect::from_sides(12, 0, 14, 10)));
    let k2 = db.add_blk(m2, Blk::new(Rect::from_sides(0, 0, 10, 10)));
    let (k0, k1, k2) = (k0.unwrap(), k1.unwrap(), k2.unwrap());

    assert_eq!(db.connect_blks_to_pins(), 2);
    assert_eq!(db.blk(k0).pin(), Some(a));
    assert_eq!(db.blk(k1).pin(), Some(b));
    assert!(!db.blk(k2).is_connected_to_pin());
    assert_eq!(db.pin(a).connected_blks(), &[k0]);
    assert_eq!(db.pin(b).connected_blks(), &[k1]);
    assert_eq!(db.connect_blks_to_pins(), 0);
}

#[test]
fn blockages_connect_through_built_indexes() {
    let Fixture { mut db, m1, m2, .. } = fixture();
    let a = db
        .add_pin(Pin::new("a").with_shape(m1, Rect::from_sides(0, 0, 10, 10)))
        .unwrap();
    db.build_spatial();
    let b = db
        .add_pin(
            Pin::new("b")
                .with_shape(m1, Rect::from_sides(5, 0, 15, 10))
                .with_shape(m2, Rect::from_sides(100, 100, 110, 110)),
        )
        .unwrap();
    // touches a at x = 10 and overlaps b
    let bridge = Rect::from_sides(10, 0, 12, 10);
    let k0 = db.add_blk(m1, Blk::new(bridge)).unwrap();
    let corner = Rect::from_sides(110, 110, 120, 120);
    let k1 = db.add_blk(m2, Blk::new(corner)).unwrap();
    let under_a = Rect::from_sides(0, 0, 10, 10);
    let k2 = db.add_blk(m2, Blk::new(under_a)).unwrap();

    assert_eq!(db.connect_blks_to_pins(), 2);
    assert_eq!(db.blk(k0).pin(), Some(a));
    assert_eq!(db.blk(k1).pin(), Some(b));
    assert!(!db.blk(k2).is_connected_to_pin());
    assert_eq!(db.pin(b).connected_blks(), &[k1]);
}

#[test]
fn nets_added_after_guide_ingestion_have_no_guide() {
    let Fixture { mut db, .. } = fixture();
    let early = db.add_net(Net::new("early").with_min_width(1)).unwrap();
    let guide = db.route_guide_mut();
    guide.ensure_init(1, 1, 100, 1).unwrap();
    guide.set_guide(40, early, 0, 0).unwrap();
    guide.set_net_has_guide(early, true).unwrap();

    let late = db.add_net(Net::new("late").with_min_width(1)).unwrap();
    assert_eq!(db.route_guide().num_nets(), 2);
    db.finalize_route_guide().unwrap();
    assert!(!db.route_guide().has_guide(late));
    assert_eq!(db.route_guide().probability(late, 0, 0).unwrap(), 0);
    // congestion only: avg 40 * 100 / 100
    assert_eq!(db.route_guide_cost(late, 0, 0).unwrap(), 40);
    assert_eq!(db.route_guide_cost(early, 0, 0).unwrap(), 259);

    let later = db.add_net(Net::new("later")).unwrap();
    assert_eq!(db.route_guide_cost(later, 0, 0).unwrap(), 40);
}

#[test]
fn performance_guides_and_stats() {
    let Fixture { mut db, .. } = fixture();
    let n = db.add_net(Net::new("n")).unwrap();
    let m = db.add_net(Net::new("m")).unwrap();
    db.set_pa_guide(&[1, 2], &[3, 4], &[5, 6]).unwrap();
    assert_eq!(db.hor_guide(m).unwrap(), 2);
    assert_eq!(db.ver_guide(n).unwrap(), 3);
    assert_eq!(db.via_guide(m).unwrap(), 6);
    assert!(matches!(
        db.set_pa_guide(&[1], &[3, 4], &[5, 6]),
        Err(Error::InvalidArgument(_))
    ));
    db.set_pa_critical(&[false, true]).unwrap();
    assert!(!db.is_critical(n).unwrap());
    assert!(db.is_critical(m).unwrap());

    let stats = NetStats {
        wire_length: 1200,
        via_count: 4,
        deg_sym: 0.5,
    };
    db.set_net_stats(m, stats).unwrap();
    assert_eq!(*db.net(m).stats(), stats);
}

#[test]
fn post_process_wires() {
    let Fixture { mut db, m1, m2, .. } = fixture();
    let mask = Rect::from_sides(0, 0, 10, 10);
    db.add_mask_wire(m2, mask).unwrap();
    let patch = Rect::from_sides(0, 0, 20, 10);
    db.add_patch_wire(m1, patch).unwrap();
    assert_eq!(db.mask_wires(m2), &[mask]);
    assert!(db.mask_wires(m1).is_empty());
    assert_eq!(db.patch_wires(m1).len(), 1);
}
