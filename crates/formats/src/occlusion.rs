//! Horizon occlusion point.
//!
//! The point lives in ellipsoid-scaled space (the ellipsoid becomes the unit
//! sphere). If it is below the horizon as seen from the camera, the whole tile
//! is too. See Cesium's "Computing the horizon occlusion point".

use foundation::math::{Ellipsoid, Vec3};

/// Computes the occlusion point for ECEF `points` along the direction of
/// `center` (usually the bounding sphere center).
///
/// Returns the scaled-space point. When no finite, positive magnitude exists
/// (points inside the ellipsoid, degenerate direction) the scaled center is
/// returned instead so the tile is never culled wrongly.
pub fn occlusion_point(points: &[Vec3], center: Vec3, ellipsoid: Ellipsoid) -> Vec3 {
    let scaled_center = ellipsoid.to_scaled_space(center);
    let Some(direction) = scaled_center.normalize() else {
        return scaled_center;
    };

    let mut max_magnitude = f64::NEG_INFINITY;
    for p in points {
        let m = magnitude(ellipsoid.to_scaled_space(*p), direction);
        if !m.is_finite() || m < 0.0 {
            return scaled_center;
        }
        max_magnitude = max_magnitude.max(m);
    }

    if max_magnitude > 0.0 && max_magnitude.is_finite() {
        direction * max_magnitude
    } else {
        scaled_center
    }
}

fn magnitude(scaled: Vec3, direction: Vec3) -> f64 {
    let mag_sq = scaled.length_squared();
    let mag = mag_sq.sqrt();
    let to_point = scaled / mag;

    let mag_sq = mag_sq.max(1.0);
    let mag = mag.max(1.0);

    let cos_alpha = to_point.dot(direction);
    let sin_alpha = to_point.cross(direction).length();
    let cos_beta = 1.0 / mag;
    let sin_beta = (mag_sq - 1.0).sqrt() * cos_beta;

    1.0 / (cos_alpha * cos_beta - sin_alpha * sin_beta)
}

#[cfg(test)]
mod tests {
    use super::occlusion_point;
    use foundation::math::{Ellipsoid, Geodetic, Vec3};

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "expected {b}, got {a}");
    }

    #[test]
    fn single_surface_point_occludes_at_itself() {
        let e = Ellipsoid::WGS84;
        let p = e.geodetic_to_ecef(Geodetic::from_lon_lat_deg(0.0, 0.0, 0.0)).to_vec3();
        let occ = occlusion_point(&[p], p, e);
        assert_close(occ.x, 1.0, 1e-9);
        assert_close(occ.y, 0.0, 1e-12);
        assert_close(occ.z, 0.0, 1e-12);
    }

    #[test]
    fn point_lies_above_the_surface_along_the_center_direction() {
        let e = Ellipsoid::WGS84;
        let pts: Vec<Vec3> = [(0.0, 0.0), (0.5, 0.0), (0.0, 0.5), (0.5, 0.5)]
            .iter()
            .map(|&(lon, lat)| {
                e.geodetic_to_ecef(Geodetic::from_lon_lat_deg(lon, lat, 100.0))
                    .to_vec3()
            })
            .collect();
        let center = pts.iter().fold(Vec3::ZERO, |acc, p| acc + *p) / pts.len() as f64;
        let occ = occlusion_point(&pts, center, e);

        assert!(occ.length() > 1.0);
        let dir = e.to_scaled_space(center).normalize().unwrap();
        assert_close(occ.normalize().unwrap().dot(dir), 1.0, 1e-12);
    }

    #[test]
    fn zero_center_falls_back() {
        let occ = occlusion_point(&[Vec3::new(1.0, 2.0, 3.0)], Vec3::ZERO, Ellipsoid::WGS84);
        assert_eq!(occ, Vec3::ZERO);
    }
}
