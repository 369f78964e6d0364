//! View-model of the quantized-mesh terrain viewer.
//!
//! Holds the camera, the running depth range and the layer toggles, and turns
//! them into terrain layer props each frame. Rendering lives elsewhere.

pub mod config;
pub mod flight;
pub mod state;
pub mod view_state;

pub use config::*;
pub use flight::*;
pub use state::*;
pub use view_state::*;
