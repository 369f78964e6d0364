use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Size of the fixed quantized-mesh header in bytes.
pub const HEADER_LEN: usize = 88;

/// Fixed-size header at the start of every `.terrain` tile.
///
/// Center and sphere are ECEF meters; the occlusion point is in
/// ellipsoid-scaled space. Heights are stored as `f32` on disk.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantizedMeshHeader {
    pub center_x: f64,
    pub center_y: f64,
    pub center_z: f64,
    pub minimum_height: f32,
    pub maximum_height: f32,
    pub bounding_sphere_center_x: f64,
    pub bounding_sphere_center_y: f64,
    pub bounding_sphere_center_z: f64,
    pub bounding_sphere_radius: f64,
    pub horizon_occlusion_point_x: f64,
    pub horizon_occlusion_point_y: f64,
    pub horizon_occlusion_point_z: f64,
}

#[derive(Debug)]
pub enum HeaderError {
    Truncated { len: usize },
    Io { source: String },
}

impl std::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderError::Truncated { len } => {
                write!(f, "quantized-mesh header truncated: {len} of {HEADER_LEN} bytes")
            }
            HeaderError::Io { source } => write!(f, "I/O error: {source}"),
        }
    }
}

impl std::error::Error for HeaderError {}

impl QuantizedMeshHeader {
    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        let mut at = 0;
        let mut put = |bytes: &[u8]| {
            out[at..at + bytes.len()].copy_from_slice(bytes);
            at += bytes.len();
        };
        put(&self.center_x.to_le_bytes());
        put(&self.center_y.to_le_bytes());
        put(&self.center_z.to_le_bytes());
        put(&self.minimum_height.to_le_bytes());
        put(&self.maximum_height.to_le_bytes());
        put(&self.bounding_sphere_center_x.to_le_bytes());
        put(&self.bounding_sphere_center_y.to_le_bytes());
        put(&self.bounding_sphere_center_z.to_le_bytes());
        put(&self.bounding_sphere_radius.to_le_bytes());
        put(&self.horizon_occlusion_point_x.to_le_bytes());
        put(&self.horizon_occlusion_point_y.to_le_bytes());
        put(&self.horizon_occlusion_point_z.to_le_bytes());
        out
    }

    /// Reads only the header; the rest of the stream is left untouched.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, HeaderError> {
        let mut buf = [0u8; HEADER_LEN];
        let mut filled = 0;
        while filled < HEADER_LEN {
            match r.read(&mut buf[filled..]) {
                Ok(0) => return Err(HeaderError::Truncated { len: filled }),
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(HeaderError::Io {
                        source: e.to_string(),
                    });
                }
            }
        }
        Ok(Self::from_array(&buf))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HeaderError> {
        let buf: &[u8; HEADER_LEN] = bytes
            .get(..HEADER_LEN)
            .and_then(|b| b.try_into().ok())
            .ok_or(HeaderError::Truncated { len: bytes.len() })?;
        Ok(Self::from_array(buf))
    }

    fn from_array(buf: &[u8; HEADER_LEN]) -> Self {
        let f64_at = |at: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&buf[at..at + 8]);
            f64::from_le_bytes(b)
        };
        let f32_at = |at: usize| {
            let mut b = [0u8; 4];
            b.copy_from_slice(&buf[at..at + 4]);
            f32::from_le_bytes(b)
        };
        Self {
            center_x: f64_at(0),
            center_y: f64_at(8),
            center_z: f64_at(16),
            minimum_height: f32_at(24),
            maximum_height: f32_at(28),
            bounding_sphere_center_x: f64_at(32),
            bounding_sphere_center_y: f64_at(40),
            bounding_sphere_center_z: f64_at(48),
            bounding_sphere_radius: f64_at(56),
            horizon_occlusion_point_x: f64_at(64),
            horizon_occlusion_point_y: f64_at(72),
            horizon_occlusion_point_z: f64_at(80),
        }
    }

    /// `(minimum_height, maximum_height)` widened to `f64`.
    pub fn height_range(&self) -> (f64, f64) {
        (self.minimum_height as f64, self.maximum_height as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> QuantizedMeshHeader {
        QuantizedMeshHeader {
            center_x: 6377169.5,
            center_y: 55648.50390625,
            center_z: 55284.421875,
            minimum_height: 0.0,
            maximum_height: 4.0,
            bounding_sphere_center_x: 6377169.5,
            bounding_sphere_center_y: 55648.504,
            bounding_sphere_center_z: 55284.42,
            bounding_sphere_radius: 78447.81,
            horizon_occlusion_point_x: 1.0001657,
            horizon_occlusion_point_y: 0.0087256,
            horizon_occlusion_point_z: 0.0086976,
        }
    }

    #[test]
    fn header_is_88_bytes_in_field_order() {
        let mut buf = Vec::new();
        sample().write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_LEN);
        assert_eq!(&buf[0..8], &6377169.5f64.to_le_bytes());
        assert_eq!(&buf[28..32], &4.0f32.to_le_bytes());
        assert_eq!(&buf[56..64], &78447.81f64.to_le_bytes());
    }

    #[test]
    fn reads_header_and_ignores_body() {
        let mut bytes = sample().to_bytes().to_vec();
        bytes.extend_from_slice(&[1, 2, 3, 4]);
        assert_eq!(QuantizedMeshHeader::from_bytes(&bytes).unwrap(), sample());
        let mut cursor = std::io::Cursor::new(bytes);
        assert_eq!(QuantizedMeshHeader::read_from(&mut cursor).unwrap(), sample());
        assert_eq!(cursor.position(), HEADER_LEN as u64);
    }

    #[test]
    fn short_input_is_truncated() {
        let bytes = sample().to_bytes();
        match QuantizedMeshHeader::from_bytes(&bytes[..40]) {
            Err(HeaderError::Truncated { len }) => assert_eq!(len, 40),
            other => panic!("expected truncation, got {other:?}"),
        }
        let mut cursor = std::io::Cursor::new(&bytes[..10]);
        assert!(matches!(
            QuantizedMeshHeader::read_from(&mut cursor),
            Err(HeaderError::Truncated { len: 10 })
        ));
    }

    #[test]
    fn serializes_with_format_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["maximumHeight"], 4.0);
        assert!(json.get("horizonOcclusionPointZ").is_some());
    }
}
