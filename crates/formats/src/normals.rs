use foundation::math::Vec3;

/// Per-vertex normals from area-weighted face normals.
///
/// `points` are ECEF positions, `indices` a triangle list already validated
/// against `points.len()`. Vertices touched only by degenerate triangles (or
/// by none) get the zero vector.
pub fn compute_vertex_normals(points: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut sums = vec![Vec3::ZERO; points.len()];
    for tri in indices.chunks_exact(3) {
        let a = points[tri[0] as usize];
        let b = points[tri[1] as usize];
        let c = points[tri[2] as usize];
        let face = (b - a).cross(c - a);
        // |face| is twice the triangle area.
        let weighted = face * (face.length() * 0.5);
        for &i in tri {
            sums[i as usize] = sums[i as usize] + weighted;
        }
    }
    sums.into_iter()
        .map(|n| n.normalize().unwrap_or(Vec3::ZERO))
        .collect()
}

/// Oct-encodes a unit vector into two 8-bit SNORM values.
pub fn oct_encode(normal: Vec3) -> [u8; 2] {
    let l1 = normal.x.abs() + normal.y.abs() + normal.z.abs();
    if l1 == 0.0 || !l1.is_finite() {
        return [to_snorm(0.0), to_snorm(0.0)];
    }
    let mut x = normal.x / l1;
    let mut y = normal.y / l1;
    if normal.z < 0.0 {
        let (ox, oy) = (x, y);
        x = (1.0 - oy.abs()) * sign_not_zero(ox);
        y = (1.0 - ox.abs()) * sign_not_zero(oy);
    }
    [to_snorm(x), to_snorm(y)]
}

pub fn oct_decode(encoded: [u8; 2]) -> Vec3 {
    let x = from_snorm(encoded[0]);
    let y = from_snorm(encoded[1]);
    let z = 1.0 - (x.abs() + y.abs());
    let (x, y) = if z < 0.0 {
        (
            (1.0 - y.abs()) * sign_not_zero(x),
            (1.0 - x.abs()) * sign_not_zero(y),
        )
    } else {
        (x, y)
    };
    Vec3::new(x, y, z).normalize().unwrap_or(Vec3::ZERO)
}

fn sign_not_zero(v: f64) -> f64 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

fn to_snorm(v: f64) -> u8 {
    ((v.clamp(-1.0, 1.0) * 0.5 + 0.5) * 255.0).round() as u8
}

fn from_snorm(v: u8) -> f64 {
    (v as f64 / 255.0 * 2.0 - 1.0).clamp(-1.0, 1.0)
}
