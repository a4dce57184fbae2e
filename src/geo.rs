//! Geographic placement on the earth sphere.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f32,
    pub lon: f32,
}

impl GeoPoint {
    pub const fn new(lat: f32, lon: f32) -> Self {
        Self { lat, lon }
    }
}

/// Convert latitude/longitude to a point on a sphere of `radius`.
///
/// Matches the UV layout of [`crate::geometry::sphere`], so a marker placed
/// here lands on the same spot of an equirectangular earth texture.
pub fn lat_lon_to_position(point: GeoPoint, radius: f32) -> Vec3 {
    let phi = (90.0 - point.lat).to_radians();
    let theta = (point.lon + 180.0).to_radians();

    Vec3::new(
        -(radius * phi.sin() * theta.cos()),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// A cubic Bézier curve in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Vec3,
    pub p1: Vec3,
    pub p2: Vec3,
    pub p3: Vec3,
}

impl CubicBezier {
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self { p0, p1, p2, p3 }
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        let u = 1.0 - t;
        self.p0 * (u * u * u)
            + self.p1 * (3.0 * u * u * t)
            + self.p2 * (3.0 * u * t * t)
            + self.p3 * (t * t * t)
    }

    /// Unit tangent at `t`.
    pub fn tangent_at(&self, t: f32) -> Vec3 {
        let u = 1.0 - t;
        let d = (self.p1 - self.p0) * (3.0 * u * u)
            + (self.p2 - self.p1) * (6.0 * u * t)
            + (self.p3 - self.p2) * (3.0 * t * t);
        d.normalize_or(Vec3::X)
    }
}

/// Build the arc a flight takes between two surface points.
///
/// Control points sit a quarter and three quarters of the way along the
/// chord, pushed out from the sphere so the arc height grows with distance.
pub fn flight_curve(from: Vec3, to: Vec3, radius: f32) -> CubicBezier {
    let distance = from.distance(to);
    let altitude = radius * 0.1 + distance * 0.35;

    let c1 = from.lerp(to, 0.25).normalize_or(Vec3::Y) * (radius + altitude);
    let c2 = from.lerp(to, 0.75).normalize_or(Vec3::Y) * (radius + altitude);

    CubicBezier::new(from, c1, c2, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn north_pole_is_up() {
        let p = lat_lon_to_position(GeoPoint::new(90.0, 0.0), 2.0);
        assert!(approx(p, Vec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn prime_meridian_on_equator_is_positive_x() {
        let p = lat_lon_to_position(GeoPoint::new(0.0, 0.0), 1.0);
        assert!(approx(p, Vec3::X));
    }

    #[test]
    fn positions_lie_on_sphere() {
        for (lat, lon) in [(37.5, 127.0), (-33.9, 151.2), (51.5, -0.1)] {
            let p = lat_lon_to_position(GeoPoint::new(lat, lon), 1.3);
            assert!((p.length() - 1.3).abs() < 1e-4);
        }
    }

    #[test]
    fn flight_curve_hits_endpoints_and_arcs_outward() {
        let from = lat_lon_to_position(GeoPoint::new(37.5665, 126.978), 1.0);
        let to = lat_lon_to_position(GeoPoint::new(13.4443, 144.7937), 1.0);
        let curve = flight_curve(from, to, 1.0);

        assert!(approx(curve.point_at(0.0), from));
        assert!(approx(curve.point_at(1.0), to));
        assert!(curve.point_at(0.5).length() > 1.0);
    }
}
