pub mod layer;
pub mod symbology;
pub mod terrain;

pub use layer::*;
pub use symbology::*;
pub use terrain::*;
