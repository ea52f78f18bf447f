//! Spherical Web Mercator (EPSG:3857) conversions.

use std::f64::consts::PI;

pub const EARTH_RADIUS: f64 = 6_378_137.0;
/// Half the projected world width in meters.
pub const HALF_WORLD: f64 = PI * EARTH_RADIUS;
/// Latitude limit of the square Web Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Project geographic lon/lat degrees into EPSG:3857 meters.
pub fn from_lon_lat(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Inverse of [`from_lon_lat`].
pub fn to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

#[cfg(test)]
mod tests {
    use super::{HALF_WORLD, from_lon_lat, to_lon_lat};

    fn assert_close(actual: f64, expected: f64, eps: f64) {
        let diff = (actual - expected).abs();
        assert!(diff < eps, "expected {expected}, got {actual} (diff: {diff})");
    }

    #[test]
    fn origin_maps_to_origin() {
        let (x, y) = from_lon_lat(0.0, 0.0);
        assert_close(x, 0.0, 1e-9);
        assert_close(y, 0.0, 1e-9);
    }

    #[test]
    fn antimeridian_is_half_world() {
        let (x, _) = from_lon_lat(180.0, 0.0);
        assert_close(x, HALF_WORLD, 1e-6);
    }

    #[test]
    fn hanoi_roundtrips() {
        let (x, y) = from_lon_lat(105.8342, 21.0278);
        let (lon, lat) = to_lon_lat(x, y);
        assert_close(lon, 105.8342, 1e-9);
        assert_close(lat, 21.0278, 1e-9);
    }

    #[test]
    fn initial_center_lies_over_vietnam() {
        let (lon, lat) = to_lon_lat(11_710_584.69, 2_101_345.02);
        assert!((102.0..110.0).contains(&lon), "lon {lon}");
        assert!((8.0..24.0).contains(&lat), "lat {lat}");
    }

    #[test]
    fn polar_latitudes_are_clamped() {
        let (_, y) = from_lon_lat(0.0, 90.0);
        assert!(y.is_finite());
        assert_close(y, HALF_WORLD, 1e-3);
    }
}
