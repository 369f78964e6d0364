//! quantized-mesh-1.0 encoder.
//!
//! Input positions are `[lon°, lat°, height m]` triples; the tile body is
//! written little-endian in the order header, vertex data, index data, edge
//! indices, extensions.

use crate::bounding_sphere::{SphereMethod, bounding_sphere};
use crate::extensions::{Extension, metadata_payload, write_extension};
use crate::header::{HEADER_LEN, QuantizedMeshHeader};
use crate::index_codec::{encode_indices, first_use_order, is_first_use_ordered};
use crate::normals::{compute_vertex_normals, oct_encode};
use crate::occlusion::occlusion_point;
use crate::zigzag::encode_deltas;
use foundation::Aabb3;
use foundation::math::{Ellipsoid, Geodetic, Vec3};
use std::io::Write;

/// Largest quantized coordinate.
pub const QUANTIZED_MAX: u16 = 32767;

/// Above this many vertices indices are written as `u32`.
pub const MAX_VERTICES_16: usize = 65536;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EncodeOptions {
    /// `[minx, miny, maxx, maxy]` in degrees; defaults to the positions' extent.
    pub bounds: Option<[f64; 4]>,
    pub sphere_method: SphereMethod,
    pub ellipsoid: Ellipsoid,
    pub extensions: Vec<Extension>,
}

#[derive(Debug)]
pub enum EncodeError {
    Io { source: String },
    EmptyPositions,
    PositionsNotTriples { len: usize },
    IndicesNotTriangles { len: usize },
    IndexOutOfRange { index: u32, vertex_count: usize },
    ExtensionLength { id: u8, len: usize },
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::Io { source } => write!(f, "I/O error: {source}"),
            EncodeError::EmptyPositions => write!(f, "mesh has no positions"),
            EncodeError::PositionsNotTriples { len } => {
                write!(f, "positions length {len} is not a multiple of 3")
            }
            EncodeError::IndicesNotTriangles { len } => {
                write!(f, "indices length {len} is not a multiple of 3")
            }
            EncodeError::IndexOutOfRange {
                index,
                vertex_count,
            } => write!(f, "index {index} out of range for {vertex_count} vertices"),
            EncodeError::ExtensionLength { id, len } => {
                write!(f, "extension {id} has invalid payload length {len}")
            }
        }
    }
}

impl std::error::Error for EncodeError {}

impl From<std::io::Error> for EncodeError {
    fn from(e: std::io::Error) -> Self {
        EncodeError::Io {
            source: e.to_string(),
        }
    }
}

/// Splits a flat `[lon, lat, h, ...]` buffer into triples.
pub fn positions_from_flat(flat: &[f64]) -> Result<Vec<[f64; 3]>, EncodeError> {
    if flat.len() % 3 != 0 {
        return Err(EncodeError::PositionsNotTriples { len: flat.len() });
    }
    if flat.is_empty() {
        return Err(EncodeError::EmptyPositions);
    }
    Ok(flat
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect())
}

fn to_ecef(positions: &[[f64; 3]], ellipsoid: Ellipsoid) -> Vec<Vec3> {
    positions
        .iter()
        .map(|&[lon, lat, h]| {
            ellipsoid
                .geodetic_to_ecef(Geodetic::from_lon_lat_deg(lon, lat, h))
                .to_vec3()
        })
        .collect()
}

pub fn compute_header(
    positions: &[[f64; 3]],
    sphere_method: SphereMethod,
    ellipsoid: Ellipsoid,
) -> Result<QuantizedMeshHeader, EncodeError> {
    let ecef = to_ecef(positions, ellipsoid);
    header_from_ecef(positions, &ecef, sphere_method, ellipsoid)
}

fn header_from_ecef(
    positions: &[[f64; 3]],
    ecef: &[Vec3],
    sphere_method: SphereMethod,
    ellipsoid: Ellipsoid,
) -> Result<QuantizedMeshHeader, EncodeError> {
    let aabb = Aabb3::from_points(ecef.iter().copied()).ok_or(EncodeError::EmptyPositions)?;
    let center = aabb.center();
    let sphere = bounding_sphere(ecef, sphere_method).ok_or(EncodeError::EmptyPositions)?;
    let occlusion = occlusion_point(ecef, sphere.center, ellipsoid);

    let (min_h, max_h) = positions
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p[2]), hi.max(p[2]))
        });

    Ok(QuantizedMeshHeader {
        center_x: center.x,
        center_y: center.y,
        center_z: center.z,
        minimum_height: min_h as f32,
        maximum_height: max_h as f32,
        bounding_sphere_center_x: sphere.center.x,
        bounding_sphere_center_y: sphere.center.y,
        bounding_sphere_center_z: sphere.center.z,
        bounding_sphere_radius: sphere.radius,
        horizon_occlusion_point_x: occlusion.x,
        horizon_occlusion_point_y: occlusion.y,
        horizon_occlusion_point_z: occlusion.z,
    })
}

fn quantize(v: f64, lo: f64, hi: f64) -> u16 {
    let span = hi - lo;
    if span == 0.0 || !span.is_finite() {
        return 0;
    }
    (((v - lo) / span).clamp(0.0, 1.0) * QUANTIZED_MAX as f64) as u16
}

/// Maps positions onto the `0..=32767` grid as `[u, v, h]`.
///
/// Heights always use the positions' own range. Values outside `bounds` clamp
/// to the tile edge.
pub fn quantize_positions(positions: &[[f64; 3]], bounds: Option<[f64; 4]>) -> Vec<[u16; 3]> {
    let mut ext = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
    let (mut min_h, mut max_h) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in positions {
        ext[0] = ext[0].min(p[0]);
        ext[1] = ext[1].min(p[1]);
        ext[2] = ext[2].max(p[0]);
        ext[3] = ext[3].max(p[1]);
        min_h = min_h.min(p[2]);
        max_h = max_h.max(p[2]);
    }
    let [minx, miny, maxx, maxy] = bounds.unwrap_or(ext);

    positions
        .iter()
        .map(|p| {
            [
                quantize(p[0], minx, maxx),
                quantize(p[1], miny, maxy),
                quantize(p[2], min_h, max_h),
            ]
        })
        .collect()
}

/// West, south, east and north edge vertex indices, in vertex order.
pub fn edge_indices(quantized: &[[u16; 3]]) -> [Vec<u32>; 4] {
    let mut edges: [Vec<u32>; 4] = Default::default();
    for (i, q) in quantized.iter().enumerate() {
        let i = i as u32;
        if q[0] == 0 {
            edges[0].push(i);
        }
        if q[1] == 0 {
            edges[1].push(i);
        }
        if q[0] == QUANTIZED_MAX {
            edges[2].push(i);
        }
        if q[1] == QUANTIZED_MAX {
            edges[3].push(i);
        }
    }
    edges
}

fn validate_indices(indices: &[u32], vertex_count: usize) -> Result<(), EncodeError> {
    if indices.len() % 3 != 0 {
        return Err(EncodeError::IndicesNotTriangles { len: indices.len() });
    }
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(&index) => Err(EncodeError::IndexOutOfRange {
            index,
            vertex_count,
        }),
        None => Ok(()),
    }
}

/// Renumbers vertices so the index buffer references them in first-use order,
/// which high-water-mark encoding requires.
fn reorder_for_first_use(positions: &mut Vec<[f64; 3]>, indices: &mut [u32]) {
    if is_first_use_ordered(indices) {
        return;
    }
    let remap = first_use_order(indices, positions.len());
    let mut reordered = vec![[0.0; 3]; positions.len()];
    for (old, p) in positions.iter().enumerate() {
        reordered[remap[old] as usize] = *p;
    }
    *positions = reordered;
    for idx in indices.iter_mut() {
        *idx = remap[*idx as usize];
    }
}

fn write_u16s<W: Write>(w: &mut W, values: &[u16]) -> std::io::Result<()> {
    for v in values {
        w.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn write_index_array<W: Write>(w: &mut W, values: &[u32], wide: bool) -> std::io::Result<()> {
    for &v in values {
        if wide {
            w.write_all(&v.to_le_bytes())?;
        } else {
            w.write_all(&(v as u16).to_le_bytes())?;
        }
    }
    Ok(())
}

/// Encodes one terrain tile into `w`.
pub fn encode<W: Write>(
    w: &mut W,
    positions: &[f64],
    indices: &[u32],
    options: &EncodeOptions,
) -> Result<(), EncodeError> {
    let mut positions = positions_from_flat(positions)?;
    let mut indices = indices.to_vec();
    validate_indices(&indices, positions.len())?;
    for ext in &options.extensions {
        if let Extension::WaterMask(mask) = ext {
            if !mask.is_valid() {
                return Err(EncodeError::ExtensionLength {
                    id: ext.id(),
                    len: mask.payload().len(),
                });
            }
        }
    }
    reorder_for_first_use(&mut positions, &mut indices);

    let ecef = to_ecef(&positions, options.ellipsoid);
    let header = header_from_ecef(&positions, &ecef, options.sphere_method, options.ellipsoid)?;
    header.write_to(w)?;

    let quantized = quantize_positions(&positions, options.bounds);
    let vertex_count = quantized.len();
    w.write_all(&(vertex_count as u32).to_le_bytes())?;
    for axis in 0..3 {
        let component: Vec<u16> = quantized.iter().map(|q| q[axis]).collect();
        write_u16s(w, &encode_deltas(&component))?;
    }

    let wide = vertex_count > MAX_VERTICES_16;
    let alignment = if wide { 4 } else { 2 };
    let offset = HEADER_LEN + 4 + vertex_count * 6;
    let padding = (alignment - offset % alignment) % alignment;
    w.write_all(&[0u8; 4][..padding])?;

    w.write_all(&((indices.len() / 3) as u32).to_le_bytes())?;
    write_index_array(w, &encode_indices(&indices), wide)?;

    for edge in edge_indices(&quantized) {
        w.write_all(&(edge.len() as u32).to_le_bytes())?;
        write_index_array(w, &edge, wide)?;
    }

    for ext in &options.extensions {
        match ext {
            Extension::VertexNormals => {
                let payload: Vec<u8> = compute_vertex_normals(&ecef, &indices)
                    .into_iter()
                    .flat_map(oct_encode)
                    .collect();
                write_extension(w, ext.id(), &payload)?;
            }
            Extension::WaterMask(mask) => write_extension(w, ext.id(), mask.payload())?,
            Extension::Metadata(value) => {
                write_extension(w, ext.id(), &metadata_payload(value))?
            }
        }
    }
    Ok(())
}

pub fn encode_to_vec(
    positions: &[f64],
    indices: &[u32],
    options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    encode(&mut out, positions, indices, options)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{EXT_OCT_VERTEX_NORMALS, EXT_WATER_MASK, WaterMask};
    use crate::index_codec::decode_indices;
    use crate::zigzag::decode_deltas;
    use pretty_assertions::assert_eq;

    const POSITIONS: [f64; 18] = [
        0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0, 4.0, 2.0, 3.0, 4.0, 8.0, 9.0, 10.0, 12.0, 13.0,
        14.0,
    ];
    const TRIANGLES: [u32; 12] = [0, 1, 2, 1, 2, 3, 2, 3, 4, 3, 4, 5];

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "expected {b}, got {a}");
    }

    struct Reader<'a> {
        bytes: &'a [u8],
        at: usize,
    }

    impl<'a> Reader<'a> {
        fn take(&mut self, n: usize) -> &'a [u8] {
            let out = &self.bytes[self.at..self.at + n];
            self.at += n;
            out
        }
        fn u8(&mut self) -> u8 {
            self.take(1)[0]
        }
        fn u16(&mut self) -> u16 {
            u16::from_le_bytes(self.take(2).try_into().unwrap())
        }
        fn u32(&mut self) -> u32 {
            u32::from_le_bytes(self.take(4).try_into().unwrap())
        }
        fn u16s(&mut self, n: usize) -> Vec<u16> {
            (0..n).map(|_| self.u16()).collect()
        }
        fn indices(&mut self, n: usize, wide: bool) -> Vec<u32> {
            (0..n)
                .map(|_| if wide { self.u32() } else { self.u16() as u32 })
                .collect()
        }
    }

    struct Decoded {
        header: QuantizedMeshHeader,
        u: Vec<u16>,
        v: Vec<u16>,
        h: Vec<u16>,
        indices: Vec<u32>,
        edges: [Vec<u32>; 4],
        extensions: Vec<(u8, Vec<u8>)>,
    }

    fn decode(bytes: &[u8]) -> Decoded {
        let header = QuantizedMeshHeader::from_bytes(bytes).unwrap();
        let mut r = Reader {
            bytes,
            at: HEADER_LEN,
        };
        let n = r.u32() as usize;
        let u = decode_deltas(&r.u16s(n));
        let v = decode_deltas(&r.u16s(n));
        let h = decode_deltas(&r.u16s(n));
        let wide = n > MAX_VERTICES_16;
        let align = if wide { 4 } else { 2 };
        while r.at % align != 0 {
            assert_eq!(r.u8(), 0);
        }
        let tri = r.u32() as usize;
        let indices = decode_indices(&r.indices(tri * 3, wide));
        let mut edges: [Vec<u32>; 4] = Default::default();
        for edge in edges.iter_mut() {
            let count = r.u32() as usize;
            *edge = r.indices(count, wide);
        }
        let mut extensions = Vec::new();
        while r.at < bytes.len() {
            let id = r.u8();
            let len = r.u32() as usize;
            extensions.push((id, r.take(len).to_vec()));
        }
        Decoded {
            header,
            u,
            v,
            h,
            indices,
            edges,
            extensions,
        }
    }

    #[test]
    fn encodes_small_mesh_with_edges() {
        let bytes = encode_to_vec(&POSITIONS, &TRIANGLES, &EncodeOptions::default()).unwrap();
        let tile = decode(&bytes);

        assert_eq!(tile.indices, TRIANGLES.to_vec());
        let expected = quantize_positions(&positions_from_flat(&POSITIONS).unwrap(), None);
        assert_eq!(tile.u, expected.iter().map(|q| q[0]).collect::<Vec<_>>());
        assert_eq!(tile.v, expected.iter().map(|q| q[1]).collect::<Vec<_>>());
        assert_eq!(tile.h, expected.iter().map(|q| q[2]).collect::<Vec<_>>());

        assert_eq!(tile.edges[0], vec![0, 2]);
        assert_eq!(tile.edges[1], vec![0]);
        assert_eq!(tile.edges[2], vec![5]);
        assert_eq!(tile.edges[3], vec![5]);
        assert!(tile.extensions.is_empty());

        assert_eq!(tile.header.minimum_height, 0.0);
        assert_eq!(tile.header.maximum_height, 14.0);
    }

    #[test]
    fn quantization_truncates_onto_grid() {
        let q = quantize_positions(&positions_from_flat(&POSITIONS).unwrap(), None);
        assert_eq!(q[0], [0, 0, 0]);
        assert_eq!(q[1][0], 2730);
        assert_eq!(q[5], [32767, 32767, 32767]);
    }

    #[test]
    fn explicit_bounds_clamp_outside_values() {
        let q = quantize_positions(&[[-1.0, 0.5, 3.0], [2.0, 0.5, 3.0]], Some([0.0, 0.0, 1.0, 1.0]));
        assert_eq!(q[0], [0, 16383, 0]);
        assert_eq!(q[1], [32767, 16383, 0]);
    }

    #[test]
    fn header_center_is_ecef_box_center() {
        let positions = positions_from_flat(&POSITIONS).unwrap();
        let header = compute_header(&positions, SphereMethod::Auto, Ellipsoid::WGS84).unwrap();
        let ecef = to_ecef(&positions, Ellipsoid::WGS84);
        let aabb = Aabb3::from_points(ecef.iter().copied()).unwrap();
        assert_close(header.center_x, aabb.center().x, 1e-6);
        assert_close(header.center_z, aabb.center().z, 1e-6);
        let sphere_center = Vec3::new(
            header.bounding_sphere_center_x,
            header.bounding_sphere_center_y,
            header.bounding_sphere_center_z,
        );
        for p in &ecef {
            assert!(p.distance(sphere_center) <= header.bounding_sphere_radius + 1e-6);
        }
        assert!(header.horizon_occlusion_point_x > 0.9);
    }

    #[test]
    fn out_of_order_indices_reorder_vertices() {
        let positions = [0.0, 0.0, 5.0, 1.0, 0.0, 6.0, 0.0, 1.0, 7.0, 1.0, 1.0, 8.0];
        let indices = [3, 1, 2, 2, 1, 0];
        let tile = decode(&encode_to_vec(&positions, &indices, &EncodeOptions::default()).unwrap());

        assert_eq!(tile.indices, vec![0, 1, 2, 2, 1, 3]);
        // Old vertex 3 (height 8, the maximum) is now vertex 0.
        assert_eq!(tile.h[0], 32767);
        assert_eq!(tile.h[3], 0);
    }

    #[test]
    fn many_vertices_switch_to_wide_indices() {
        let side = 257usize;
        let mut positions = Vec::with_capacity(side * side * 3);
        for row in 0..side {
            for col in 0..side {
                positions.extend_from_slice(&[col as f64 * 0.001, row as f64 * 0.001, (row + col) as f64]);
            }
        }
        let mut indices = Vec::new();
        for row in 0..side - 1 {
            for col in 0..side - 1 {
                let a = (row * side + col) as u32;
                let b = a + 1;
                let c = a + side as u32;
                let d = c + 1;
                indices.extend_from_slice(&[a, b, c, b, d, c]);
            }
        }
        let bytes = encode_to_vec(&positions, &indices, &EncodeOptions::default()).unwrap();
        let tile = decode(&bytes);
        assert_eq!(tile.u.len(), side * side);
        assert_eq!(tile.indices.len(), indices.len());
        assert_eq!(tile.edges[0].len(), side);
        assert_eq!(tile.edges[3].len(), side);
    }

    #[test]
    fn writes_extensions_in_order() {
        let options = EncodeOptions {
            extensions: vec![
                Extension::VertexNormals,
                Extension::WaterMask(WaterMask::water()),
            ],
            ..EncodeOptions::default()
        };
        let tile = decode(&encode_to_vec(&POSITIONS, &TRIANGLES, &options).unwrap());
        assert_eq!(tile.extensions.len(), 2);
        assert_eq!(tile.extensions[0].0, EXT_OCT_VERTEX_NORMALS);
        assert_eq!(tile.extensions[0].1.len(), 6 * 2);
        assert_eq!(tile.extensions[1], (EXT_WATER_MASK, vec![255]));
    }

    #[test]
    fn rejects_malformed_input() {
        let opts = EncodeOptions::default();
        assert!(matches!(
            encode_to_vec(&[], &[], &opts),
            Err(EncodeError::EmptyPositions)
        ));
        assert!(matches!(
            encode_to_vec(&[0.0, 1.0], &[], &opts),
            Err(EncodeError::PositionsNotTriples { len: 2 })
        ));
        assert!(matches!(
            encode_to_vec(&POSITIONS, &[0, 1], &opts),
            Err(EncodeError::IndicesNotTriangles { len: 2 })
        ));
        assert!(matches!(
            encode_to_vec(&POSITIONS, &[0, 1, 6], &opts),
            Err(EncodeError::IndexOutOfRange { index: 6, vertex_count: 6 })
        ));
        let bad_mask = EncodeOptions {
            extensions: vec![Extension::WaterMask(WaterMask::Grid(vec![0; 3]))],
            ..EncodeOptions::default()
        };
        assert!(matches!(
            encode_to_vec(&POSITIONS, &TRIANGLES, &bad_mask),
            Err(EncodeError::ExtensionLength { id: 2, len: 3 })
        ));
    }
}
