// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles textures, buffers, and bind groups for rendering.

pub mod drawable;
pub mod global_bindings;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use drawable::{DrawableGpu, TextureSlots};
pub use global_bindings::{BindGroupLayouts, GlobalBindings};
pub use material::{Material, ObjectUniform, TextureMode, TextureSet};
pub use texture_resource::{ShadowCube, TextureResource};
