//! # Scene Management Module
//!
//! The scene graph and everything stored in it.
//!
//! ## Key Components
//!
//! - [`SceneGraph`] - arena-backed tree with the update and render traversals
//! - [`SceneNode`] - a node's pose, children, classification and counters
//! - [`NodeKind`] - closed set of node variants (root, drawable, orbiting body)
//! - [`Vertex`] - GPU vertex format with position, normal and texture coordinates
//!
//! ## Usage
//!
//! ```no_run
//! use scenic::gfx::scene::{Classification, NodeKind, Pose, SceneGraph};
//!
//! let mut graph = SceneGraph::default();
//! // let id = graph.create_object(NodeKind::Drawable(drawable), Pose::default(), Classification::Visual);
//! graph.update();
//! ```

pub mod arena;
pub mod graph;
pub mod kind;
pub mod node;
pub mod vertex;

pub use arena::NodeId;
pub use graph::{CollisionEvent, HitKind, RenderVisitor, SceneGraph};
pub use kind::{Drawable, NodeKind, OrbitParams, OrbitingBody, Renderable, Updatable};
pub use node::{Classification, Pose, SceneNode};
pub use vertex::Vertex;
