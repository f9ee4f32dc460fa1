//! Model, placement and texture loading

pub mod placement;
pub mod textures;
pub mod wavefront;

pub use placement::{ObjectPlacement, Placement, PlacementTable};
pub use textures::{checkerboard, TextureLibrary};
pub use wavefront::{import_model, ImportedObject, Mesh};
