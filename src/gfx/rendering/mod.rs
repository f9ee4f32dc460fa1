//! Frame graph: pipelines, shader contracts, shadow cubes, post-processing
//! and the engine that sequences them.

pub mod contract;
pub mod pass;
pub mod pipeline_manager;
pub mod post_process;
pub mod render_engine;
pub mod shadow;

pub use pass::{PassKind, ShadowCaster};
pub use pipeline_manager::{DepthConfig, PipelineConfig, PipelineManager};
pub use post_process::PostUniform;
pub use render_engine::{EngineState, FrameInputs, FrameStats, RenderEngine};
