//! # Graphics Module
//!
//! Everything between the scene description and the swapchain:
//!
//! - **Scene graph** ([`scene`]) - arena-backed node hierarchy, update and
//!   collision passes, render visitors
//! - **Camera** ([`camera`]) - free-flying camera driven by [`crate::input`]
//! - **Lighting** ([`lighting`]) - fixed-capacity light registry packed into one uniform
//! - **Resources** ([`resources`]) - materials, textures and per-object GPU state
//! - **Rendering** ([`rendering`]) - pipelines, shadow cubes, post-processing
//! - **UI** ([`ui`]) - imgui overlay and control panel

pub mod camera;
pub mod lighting;
pub mod rendering;
pub mod resources;
pub mod scene;
pub mod transform;
pub mod ui;

pub use camera::MovableCamera;
pub use rendering::RenderEngine;
pub use scene::SceneGraph;
