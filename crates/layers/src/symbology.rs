/// Fallback mesh color when no imagery is draped, RGB 0–255.
pub const UNTEXTURED_COLOR: [u8; 3] = [200, 200, 200];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LayerStyle {
    pub visible: bool,
    pub color: [u8; 3],
    pub wireframe: bool,
}

impl LayerStyle {
    pub const fn new(visible: bool, color: [u8; 3], wireframe: bool) -> Self {
        Self {
            visible,
            color,
            wireframe,
        }
    }
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self::new(true, UNTEXTURED_COLOR, false)
    }
}
