//! Placement of tile-local meshes in the shared world grid.
//!
//! Meshes arrive in unit tile coordinates (`[0, 1]` on both axes, `v` growing
//! northward) while world rows grow southward, so the vertical axis is flipped
//! both in the scale and in the offset.

use foundation::math::{Mat4, Vec3};

/// Width of the world in common units at zoom 0 (512 px web-mercator convention).
pub const WORLD_SIZE: f64 = 512.0;

/// Affine model matrix for one tile: translation plus non-uniform scale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TileTransform {
    matrix: Mat4,
}

impl TileTransform {
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// Maps a point in local tile coordinates into world coordinates.
    pub fn apply(&self, local: Vec3) -> Vec3 {
        self.matrix.transform_point(local)
    }

    pub fn to_cols_array(&self) -> [f64; 16] {
        self.matrix.to_cols_array()
    }
}

/// Model matrix placing tile `(x, y, z)` in the 512-unit world.
///
/// `x, y` must lie in `[0, 2^z)`; tiles come from the tile scheduler so the
/// range is not checked here.
pub fn compute_tile_transform(tile: crate::TileAddress) -> TileTransform {
    let world_scale = 2f64.powi(tile.z as i32);

    let x_scale = WORLD_SIZE / world_scale;
    let y_scale = -x_scale;

    let x_offset = (WORLD_SIZE * tile.x as f64) / world_scale;
    let y_offset = WORLD_SIZE * (1.0 - tile.y as f64 / world_scale);

    // translate().scale(): the order matters, see the module docs of `Mat4`.
    let matrix = Mat4::IDENTITY
        .translate(Vec3::new(x_offset, y_offset, 0.0))
        .scale(Vec3::new(x_scale, y_scale, 1.0));

    TileTransform { matrix }
}
