/// Target mesh error (meters) of the root tile.
///
/// Follows the common quantized-mesh heuristic of a root error around 77 km,
/// halving with every zoom level.
pub const ROOT_MESH_MAX_ERROR: f64 = 77_067.34;

/// Maximum mesh error to request for tiles at zoom `z`, rounded to centimeters.
pub fn mesh_max_error(z: u8) -> f64 {
    let raw = ROOT_MESH_MAX_ERROR / 2f64.powi(z as i32);
    (raw * 100.0).round() / 100.0
}

/// Query-string form of [`mesh_max_error`], always with two decimals.
pub fn mesh_max_error_param(z: u8) -> String {
    format!("{:.2}", mesh_max_error(z))
}

#[cfg(test)]
mod tests {
    use super::{mesh_max_error, mesh_max_error_param};

    #[test]
    fn root_error_is_unchanged() {
        assert_eq!(mesh_max_error(0), 77_067.34);
    }

    #[test]
    fn error_halves_per_zoom_and_rounds_to_centimeters() {
        assert_eq!(mesh_max_error(4), 4816.71);
        assert_eq!(mesh_max_error(12), 18.82);
        assert_eq!(mesh_max_error(13), 9.41);
        assert_eq!(mesh_max_error(15), 2.35);
    }

    #[test]
    fn param_keeps_trailing_zeros() {
        assert_eq!(mesh_max_error_param(1), "38533.67");
        assert_eq!(mesh_max_error_param(40), "0.00");
    }
}
