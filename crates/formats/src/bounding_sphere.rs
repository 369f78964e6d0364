use foundation::Aabb3;
use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f64,
}

/// How the header's bounding sphere is derived from ECEF positions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SphereMethod {
    /// Box center, radius to the box corner. Fastest, loosest.
    BoundingBox,
    /// Box center, radius to the farthest point.
    Naive,
    /// Ritter's two-pass approximation.
    Ritter,
    /// Runs naive and ritter and keeps the smaller sphere.
    #[default]
    Auto,
}

impl SphereMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            SphereMethod::BoundingBox => "bounding_box",
            SphereMethod::Naive => "naive",
            SphereMethod::Ritter => "ritter",
            SphereMethod::Auto => "auto",
        }
    }
}

impl std::str::FromStr for SphereMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bounding_box" | "bbox" => Ok(SphereMethod::BoundingBox),
            "naive" => Ok(SphereMethod::Naive),
            "ritter" => Ok(SphereMethod::Ritter),
            "auto" => Ok(SphereMethod::Auto),
            other => Err(format!("unknown sphere method: {other}")),
        }
    }
}

/// Returns `None` for an empty point set.
pub fn bounding_sphere(points: &[Vec3], method: SphereMethod) -> Option<BoundingSphere> {
    match method {
        SphereMethod::BoundingBox => from_bounding_box(points),
        SphereMethod::Naive => naive(points),
        SphereMethod::Ritter => ritter(points),
        SphereMethod::Auto => {
            let naive = naive(points)?;
            let ritter = ritter(points)?;
            Some(if naive.radius < ritter.radius {
                naive
            } else {
                ritter
            })
        }
    }
}

pub fn from_bounding_box(points: &[Vec3]) -> Option<BoundingSphere> {
    let aabb = Aabb3::from_points(points.iter().copied())?;
    let center = aabb.center();
    Some(BoundingSphere {
        center,
        radius: center.distance(aabb.min_corner()),
    })
}

pub fn naive(points: &[Vec3]) -> Option<BoundingSphere> {
    let aabb = Aabb3::from_points(points.iter().copied())?;
    let center = aabb.center();
    let radius = points
        .iter()
        .map(|p| center.distance(*p))
        .fold(0.0, f64::max);
    Some(BoundingSphere { center, radius })
}

pub fn ritter(points: &[Vec3]) -> Option<BoundingSphere> {
    let first = *points.first()?;

    // Per axis: the first point holding the minimum and the maximum.
    let mut min_pts = [first; 3];
    let mut max_pts = [first; 3];
    for p in points {
        let coords = p.as_array();
        for axis in 0..3 {
            if coords[axis] < min_pts[axis].as_array()[axis] {
                min_pts[axis] = *p;
            }
            if coords[axis] > max_pts[axis].as_array()[axis] {
                max_pts[axis] = *p;
            }
        }
    }

    let mut widest = 0;
    let mut widest_span = min_pts[0].distance(max_pts[0]);
    for axis in 1..3 {
        let span = min_pts[axis].distance(max_pts[axis]);
        if span > widest_span {
            widest = axis;
            widest_span = span;
        }
    }

    let mut center = (min_pts[widest] + max_pts[widest]) * 0.5;
    let mut radius = max_pts[widest].distance(center);

    for p in points {
        let d = p.distance(center);
        if d > radius {
            let new_radius = (radius + d) * 0.5;
            center = (center * new_radius + *p * (d - new_radius)) / d;
            radius = new_radius;
        }
    }

    Some(BoundingSphere { center, radius })
}
