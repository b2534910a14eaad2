//! # Spherical-Earth Geodesy
//!
//! Great-circle distance, initial bearing and forward projection on a sphere
//! of radius [`EARTH_RADIUS_M`]. All functions are total over well-formed
//! positions and have no side effects.

use crate::GeoPosition;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Normalize an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to the modulus for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Normalize a longitude in degrees into `[-180, 180)`.
#[must_use]
pub fn normalize_longitude(degrees: f64) -> f64 {
    normalize_degrees(degrees + 180.0) - 180.0
}

/// Great-circle distance between two points (Haversine formula)
#[must_use]
pub fn distance_meters(a: &GeoPosition, b: &GeoPosition) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    // Rounding can push h just past 1 for near-antipodal points
    let h = ((delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial bearing of the great-circle path from `a` to `b`, in `[0, 360)`.
///
/// The bearing is not symmetric: the return leg generally differs from
/// `initial_bearing_degrees(a, b) + 180` because great circles converge
/// towards the poles.
#[must_use]
pub fn initial_bearing_degrees(a: &GeoPosition, b: &GeoPosition) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Point reached by travelling `distance_m` from `origin` along the initial
/// bearing `bearing_deg`.
///
/// The returned longitude is normalized into `[-180, 180)`.
#[must_use]
pub fn destination_point(origin: &GeoPosition, bearing_deg: f64, distance_m: f64) -> GeoPosition {
    let angular = distance_m / EARTH_RADIUS_M;
    let bearing = bearing_deg.to_radians();
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();

    let sin_lat2 = lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos();
    // Clamp guards asin against rounding just outside [-1, 1]
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    GeoPosition {
        latitude: lat2.to_degrees(),
        longitude: normalize_longitude(lon2.to_degrees()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(latitude: f64, longitude: f64) -> GeoPosition {
        GeoPosition { latitude, longitude }
    }

    fn samples() -> Vec<GeoPosition> {
        vec![
            pos(0.0, 0.0),
            pos(52.52, 13.405),
            pos(-33.8688, 151.2093),
            pos(64.1466, -21.9426),
            pos(-89.5, 179.9),
            pos(31.6289, 65.7372),
        ]
    }

    #[test]
    fn test_distance_symmetry() {
        let points = samples();
        for a in &points {
            for b in &points {
                let ab = distance_meters(a, b);
                let ba = distance_meters(b, a);
                let scale = ab.abs().max(1.0);
                assert!((ab - ba).abs() / scale < 1e-6, "{a:?} <-> {b:?}: {ab} vs {ba}");
            }
        }
    }

    #[test]
    fn test_distance_identity() {
        for p in samples() {
            assert_eq!(distance_meters(&p, &p), 0.0);
        }
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let d = distance_meters(&pos(0.0, 0.0), &pos(0.0, 1.0));
        // 2 * pi * R / 360
        assert!((d - 111_194.93).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_cardinal_bearings() {
        let origin = pos(0.0, 0.0);
        assert!((initial_bearing_degrees(&origin, &pos(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((initial_bearing_degrees(&origin, &pos(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((initial_bearing_degrees(&origin, &pos(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((initial_bearing_degrees(&origin, &pos(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_range() {
        let points = samples();
        for a in &points {
            for b in &points {
                let bearing = initial_bearing_degrees(a, b);
                assert!((0.0..360.0).contains(&bearing), "{bearing}");
            }
        }
    }

    #[test]
    fn test_bearing_is_not_a_simple_reverse() {
        let berlin = pos(52.52, 13.405);
        let sydney = pos(-33.8688, 151.2093);
        let out = initial_bearing_degrees(&berlin, &sydney);
        let back = initial_bearing_degrees(&sydney, &berlin);
        assert!((normalize_degrees(out + 180.0) - back).abs() > 1.0);
    }

    #[test]
    fn test_forward_then_measure_round_trip() {
        for origin in samples() {
            for bearing in [0.0, 45.0, 90.0, 137.5, 180.0, 270.0, 359.0] {
                for distance in [1.0, 16.67, 500.0, 4500.0, 25_000.0] {
                    let dest = destination_point(&origin, bearing, distance);
                    let measured = distance_meters(&origin, &dest);
                    let rel = (measured - distance).abs() / distance;
                    assert!(rel < 1e-3, "{origin:?} {bearing} {distance}: {measured}");
                }
            }
        }
    }

    #[test]
    fn test_destination_heads_along_bearing() {
        let origin = pos(52.52, 13.405);
        let dest = destination_point(&origin, 90.0, 1000.0);
        let bearing = initial_bearing_degrees(&origin, &dest);
        assert!((bearing - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_destination_normalizes_longitude_across_antimeridian() {
        let origin = pos(0.0, 179.999);
        let dest = destination_point(&origin, 90.0, 1000.0);
        assert!((-180.0..180.0).contains(&dest.longitude));
        assert!(dest.longitude < 0.0);
    }

    #[test]
    fn test_zero_distance_is_identity() {
        let origin = pos(-33.8688, 151.2093);
        let dest = destination_point(&origin, 123.0, 0.0);
        assert!((dest.latitude - origin.latitude).abs() < 1e-12);
        assert!((dest.longitude - origin.longitude).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_helpers() {
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert!((0.0..360.0).contains(&normalize_degrees(-1e-20)));
        assert_eq!(normalize_longitude(180.0), -180.0);
        assert_eq!(normalize_longitude(190.0), -170.0);
        assert_eq!(normalize_longitude(-180.0), -180.0);
    }

    #[test]
    fn test_antipodal_distance_is_finite() {
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_M;
        let point = |latitude, longitude| GeoPosition { latitude, longitude };
        let pairs = [
            (point(0.0, 0.0), point(0.0, -180.0)),
            (point(52.52, 13.405), point(-52.52, -166.595)),
            (point(90.0, 0.0), point(-90.0, 0.0)),
        ];

        for (a, b) in pairs {
            let d = distance_meters(&a, &b);
            assert!(d.is_finite(), "{a:?} -> {b:?}");
            assert!((d - half_circumference).abs() < 1.0, "{d}");
        }
    }
}
