//! Terrain and imagery tile requests, and the load results fed to the viewer.

pub mod client;
pub mod sources;
pub mod tile_data;
pub mod viewport;

pub use client::*;
pub use sources::*;
pub use tile_data::*;
pub use viewport::*;
