//! quantized-mesh-1.0 terrain tiles: encoder and header reader.

pub mod bounding_sphere;
pub mod extensions;
pub mod header;
pub mod index_codec;
pub mod normals;
pub mod occlusion;
pub mod quantized_mesh;
pub mod zigzag;

pub use bounding_sphere::{BoundingSphere, SphereMethod, bounding_sphere};
pub use extensions::{Extension, WaterMask};
pub use header::{HEADER_LEN, HeaderError, QuantizedMeshHeader};
pub use index_codec::{decode_indices, encode_indices};
pub use normals::{compute_vertex_normals, oct_decode, oct_encode};
pub use occlusion::occlusion_point;
pub use quantized_mesh::*;
pub use zigzag::{zig_zag_decode, zig_zag_encode};
