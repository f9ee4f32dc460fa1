//! Scenic
//!
//! A real-time scene-graph renderer built on wgpu and winit. It loads
//! Wavefront models and a seeded orrery, then lights them with packed
//! directional, point and spot lights. Point and spot casters get shadow
//! cube maps, and the frame finishes with a post-processing pass and an
//! imgui control panel.

pub mod app;
pub mod assets;
pub mod config;
pub mod constants;
pub mod error;
pub mod gfx;
pub mod input;
pub mod orrery;
pub mod wgpu_utils;

pub use app::{populate_scene, SceneReport, ScenicApp};
pub use config::{CollisionMode, DemoConfig};
