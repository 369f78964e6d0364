//! Tile placement and elevation bookkeeping for a quantized-mesh terrain view.
//!
//! - [`tile`]: quadtree tile addressing.
//! - [`transform`]: per-tile model matrix into the shared 512-unit world grid.
//! - [`depth`]: monotonic aggregation of loaded tiles' elevation ranges.
//! - [`mesh_error`]: target mesh error per zoom level.

pub mod depth;
pub mod mesh_error;
pub mod tile;
pub mod transform;

pub use depth::*;
pub use mesh_error::*;
pub use tile::*;
pub use transform::*;
