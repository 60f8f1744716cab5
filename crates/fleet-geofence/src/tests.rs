//! Unit tests for fleet-geofence.

use fleet_core::{DeviceId, GeoPoint, GeofenceId, PositionFix, UnixMs};

use crate::{Geometry, GeofenceDescriptor, GeofenceIndex, compute_membership, occupant_counts};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn fix(device: u64, lat: f64, lon: f64) -> PositionFix {
    PositionFix::new(DeviceId(device), GeoPoint::new(lat, lon), 0.0, 0.0, UnixMs(0))
}

fn descriptor(id: u64, area: &str) -> GeofenceDescriptor {
    GeofenceDescriptor {
        id: GeofenceId(id),
        name: format!("zone-{id}"),
        area: area.to_string(),
        color: None,
        hidden: false,
    }
}

/// Unit square around the origin: (±0.5, ±0.5) in lon/lat.
const SQUARE: &str = "POLYGON ((-0.5 -0.5, 0.5 -0.5, 0.5 0.5, -0.5 0.5, -0.5 -0.5))";

/// The same square with a hole covering the inner (±0.2, ±0.2).
const SQUARE_WITH_HOLE: &str = "POLYGON ((-0.5 -0.5, 0.5 -0.5, 0.5 0.5, -0.5 0.5, -0.5 -0.5), \
                                (-0.2 -0.2, 0.2 -0.2, 0.2 0.2, -0.2 0.2, -0.2 -0.2))";

// ── Geometry parsing ──────────────────────────────────────────────────────────

#[cfg(test)]
mod parsing {
    use super::*;

    #[test]
    fn circle() {
        let g = Geometry::parse("CIRCLE (40.4168 -3.7038, 120)").unwrap();
        match g {
            Geometry::Circle { center, radius_m } => {
                assert!((center.lat - 40.4168).abs() < 1e-9);
                assert!((center.lon + 3.7038).abs() < 1e-9);
                assert!((radius_m - 120.0).abs() < 1e-9);
            }
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn circle_malformed() {
        assert_eq!(Geometry::parse("CIRCLE (40.4168 -3.7038)"), None);
        assert_eq!(Geometry::parse("CIRCLE (a b, c)"), None);
        assert_eq!(Geometry::parse(""), None);
        assert_eq!(Geometry::parse("LINESTRING (0 0, 1 1)"), None);
    }

    #[test]
    fn polygon_rings() {
        let g = Geometry::parse(SQUARE_WITH_HOLE).unwrap();
        match g {
            Geometry::Polygon(rings) => {
                assert_eq!(rings.len(), 2);
                assert_eq!(rings[0].len(), 5);
                // WKT order is [lon, lat].
                assert_eq!(rings[0][1], [0.5, -0.5]);
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn multipolygon() {
        let area = "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 1, 0 0)), \
                    ((10 10, 11 10, 11 11, 10 11, 10 10)))";
        let g = Geometry::parse(area).unwrap();
        match g {
            Geometry::MultiPolygon(polygons) => {
                assert_eq!(polygons.len(), 2);
                assert_eq!(polygons[0].len(), 1);
            }
            other => panic!("expected multipolygon, got {other:?}"),
        }
    }

    #[test]
    fn polygon_malformed() {
        assert_eq!(Geometry::parse("POLYGON ()"), None);
        assert_eq!(Geometry::parse("POLYGON ((0 0, 1 1))"), None); // < 3 vertices
        assert_eq!(Geometry::parse("POLYGON ((0 x, 1 1, 2 2))"), None);
        assert_eq!(Geometry::parse("POLYGON (0 0, 1 1, 2 2)"), None); // missing ring parens
    }
}

// ── Containment ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod containment {
    use super::*;

    #[test]
    fn circle_contains() {
        let g = Geometry::parse("CIRCLE (0 0, 1000)").unwrap();
        assert!(g.contains(GeoPoint::new(0.0, 0.0)));
        assert!(g.contains(GeoPoint::new(0.005, 0.0))); // ~550 m north
        assert!(!g.contains(GeoPoint::new(0.05, 0.0))); // ~5.5 km north
    }

    #[test]
    fn circle_rejects_non_finite_point() {
        let g = Geometry::parse("CIRCLE (0 0, 1000)").unwrap();
        assert!(!g.contains(GeoPoint::new(f64::NAN, 0.0)));
    }

    #[test]
    fn polygon_inside_outside() {
        let g = Geometry::parse(SQUARE).unwrap();
        assert!(g.contains(GeoPoint::new(0.0, 0.0)));
        assert!(g.contains(GeoPoint::new(0.4, -0.4)));
        assert!(!g.contains(GeoPoint::new(0.6, 0.0)));
        assert!(!g.contains(GeoPoint::new(0.0, 0.6)));
    }

    #[test]
    fn point_in_hole_is_not_contained() {
        let g = Geometry::parse(SQUARE_WITH_HOLE).unwrap();
        // Between outer ring and hole: contained.
        assert!(g.contains(GeoPoint::new(0.35, 0.35)));
        // Strictly inside the hole: not contained.
        assert!(!g.contains(GeoPoint::new(0.0, 0.0)));
    }

    #[test]
    fn multipolygon_any_part() {
        let area = "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 1, 0 0)), \
                    ((10 10, 11 10, 11 11, 10 11, 10 10)))";
        let g = Geometry::parse(area).unwrap();
        assert!(g.contains(GeoPoint::new(0.5, 0.5)));
        assert!(g.contains(GeoPoint::new(10.5, 10.5)));
        assert!(!g.contains(GeoPoint::new(5.0, 5.0)));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        let g = Geometry::Polygon(vec![]);
        assert!(!g.contains(GeoPoint::new(0.0, 0.0)));
    }
}

// ── Membership ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod membership {
    use super::*;

    #[test]
    fn geometric_signal() {
        let mut index = GeofenceIndex::new();
        index.rebuild(&[descriptor(1, SQUARE)]);

        let inside = fix(10, 0.0, 0.0);
        let outside = fix(11, 5.0, 5.0);

        let m = compute_membership(&index, [&inside, &outside]);
        let devices = &m[&GeofenceId(1)];
        assert!(devices.contains(&DeviceId(10)));
        assert!(!devices.contains(&DeviceId(11)));
    }

    #[test]
    fn server_signal_survives_unparseable_geometry() {
        let mut index = GeofenceIndex::new();
        index.rebuild(&[descriptor(7, "not a geometry")]);
        assert!(index.get(GeofenceId(7)).unwrap().geometry.is_none());

        let mut reported = fix(10, 0.0, 0.0);
        reported.geofence_ids.push(GeofenceId(7));

        let m = compute_membership(&index, [&reported]);
        assert!(m[&GeofenceId(7)].contains(&DeviceId(10)));
    }

    #[test]
    fn union_of_both_signals() {
        let mut index = GeofenceIndex::new();
        index.rebuild(&[descriptor(1, SQUARE)]);

        // Geometrically inside but not reported.
        let geometric = fix(10, 0.0, 0.0);
        // Reported but geometrically outside (server lag).
        let mut lagged = fix(11, 5.0, 5.0);
        lagged.geofence_ids.push(GeofenceId(1));

        let m = compute_membership(&index, [&geometric, &lagged]);
        assert_eq!(m[&GeofenceId(1)].len(), 2);
    }

    #[test]
    fn unknown_reported_ids_are_ignored() {
        let mut index = GeofenceIndex::new();
        index.rebuild(&[descriptor(1, SQUARE)]);

        let mut f = fix(10, 5.0, 5.0);
        f.geofence_ids.push(GeofenceId(999));

        let m = compute_membership(&index, [&f]);
        assert_eq!(m.len(), 1);
        assert!(m[&GeofenceId(1)].is_empty());
    }

    #[test]
    fn empty_geofences_report_zero() {
        let mut index = GeofenceIndex::new();
        index.rebuild(&[descriptor(1, SQUARE), descriptor(2, "CIRCLE (50 50, 100)")]);

        let m = compute_membership(&index, [&fix(10, 0.0, 0.0)]);
        let counts = occupant_counts(&m);
        assert_eq!(counts[&GeofenceId(1)], 1);
        assert_eq!(counts[&GeofenceId(2)], 0);
    }

    #[test]
    fn hidden_geofences_still_counted_but_filtered_from_visible() {
        let mut hidden = descriptor(1, SQUARE);
        hidden.hidden = true;
        let mut index = GeofenceIndex::new();
        index.rebuild(&[hidden, descriptor(2, SQUARE)]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.visible().count(), 1);

        let m = compute_membership(&index, [&fix(10, 0.0, 0.0)]);
        assert_eq!(m[&GeofenceId(1)].len(), 1);
    }
}
