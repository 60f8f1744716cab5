//! Unit tests for fleet-core primitives.

#[cfg(test)]
mod ids {
    use crate::{DeviceId, GeofenceId};

    #[test]
    fn raw_roundtrip() {
        let id = DeviceId::from(42u64);
        assert_eq!(u64::from(id), 42);
        assert_eq!(id, DeviceId(42));
    }

    #[test]
    fn display() {
        assert_eq!(DeviceId(7).to_string(), "DeviceId(7)");
        assert_eq!(GeofenceId(3).to_string(), "GeofenceId(3)");
    }

    #[test]
    fn serde_transparent() {
        let json = serde_json::to_string(&DeviceId(9)).unwrap();
        assert_eq!(json, "9");
    }
}

#[cfg(test)]
mod geo {
    use crate::geo::interpolate_angle;
    use crate::GeoPoint;

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(40.4168, -3.7038);
        assert!(p.distance_m(p) < 0.01);
    }

    #[test]
    fn one_degree_latitude() {
        // ~1 degree of latitude ≈ 111 km
        let a = GeoPoint::new(40.0, -3.7);
        let b = GeoPoint::new(41.0, -3.7);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 500.0, "got {d}");
    }

    #[test]
    fn non_finite_is_infinite() {
        let p = GeoPoint::new(40.0, -3.7);
        assert_eq!(p.distance_m(GeoPoint::new(f64::NAN, 0.0)), f64::INFINITY);
        assert_eq!(GeoPoint::new(f64::INFINITY, 0.0).distance_m(p), f64::INFINITY);
        // Infinity never matches a radius threshold.
        assert!(!(p.distance_m(GeoPoint::new(f64::NAN, 0.0)) <= 1e12));
    }

    #[test]
    fn destination_point_roundtrip() {
        let center = GeoPoint::new(40.4168, -3.7038);
        for bearing in [0.0, 90.0, 180.0, 270.0] {
            let handle = center.destination_point(500.0, bearing);
            let d = center.distance_m(handle);
            assert!((d - 500.0).abs() < 1.0, "bearing {bearing}: got {d}");
        }
    }

    #[test]
    fn destination_point_east_moves_longitude() {
        let center = GeoPoint::new(0.0, 0.0);
        let east = center.destination_point(1_000.0, 90.0);
        assert!(east.lon > center.lon);
        assert!((east.lat - center.lat).abs() < 1e-6);
    }

    #[test]
    fn angle_interpolation_wraps_short_way() {
        assert!(interpolate_angle(350.0, 10.0, 0.5).abs() < 1e-9);
        assert!((interpolate_angle(10.0, 350.0, 0.5)).abs() < 1e-9);
    }

    #[test]
    fn angle_interpolation_endpoints() {
        assert!((interpolate_angle(90.0, 180.0, 0.0) - 90.0).abs() < 1e-9);
        assert!((interpolate_angle(90.0, 180.0, 1.0) - 180.0).abs() < 1e-9);
        assert!((interpolate_angle(90.0, 180.0, 0.5) - 135.0).abs() < 1e-9);
    }

    #[test]
    fn angle_interpolation_normalizes_inputs() {
        // -10 and 370 are the same headings as 350 and 10.
        assert!(interpolate_angle(-10.0, 370.0, 0.5).abs() < 1e-9);
    }
}

#[cfg(test)]
mod units {
    use crate::{knots_to_kmh, knots_to_mps};

    #[test]
    fn knot_conversions() {
        assert!((knots_to_kmh(10.0) - 18.52).abs() < 1e-9);
        assert!((knots_to_mps(10.0) - 18.52 / 3.6).abs() < 1e-9);
    }

    #[test]
    fn negative_and_nan_clamp_to_zero() {
        assert_eq!(knots_to_kmh(-5.0), 0.0);
        assert_eq!(knots_to_kmh(f64::NAN), 0.0);
        assert_eq!(knots_to_mps(f64::NEG_INFINITY), 0.0);
    }
}

#[cfg(test)]
mod time {
    use crate::UnixMs;

    #[test]
    fn arithmetic() {
        let t = UnixMs(1_000);
        assert_eq!(t.offset(500), UnixMs(1_500));
        assert_eq!(t.offset(500) - t, 500);
        assert_eq!(t.since(UnixMs(1_500)), -500);
    }
}
