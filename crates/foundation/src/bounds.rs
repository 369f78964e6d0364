use crate::math::Vec3;

/// Axis-aligned bounding box in 3D.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb3 {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Aabb3 { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Aabb3::new(first.as_array(), first.as_array());
        for p in iter {
            aabb.extend(p);
        }
        Some(aabb)
    }

    pub fn extend(&mut self, p: Vec3) {
        let p = p.as_array();
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(p[axis]);
            self.max[axis] = self.max[axis].max(p[axis]);
        }
    }

    pub fn min_corner(&self) -> Vec3 {
        Vec3::from_array(self.min)
    }

    pub fn max_corner(&self) -> Vec3 {
        Vec3::from_array(self.max)
    }

    pub fn center(&self) -> Vec3 {
        (self.min_corner() + self.max_corner()) * 0.5
    }
}
