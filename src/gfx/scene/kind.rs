//! Node variants and the capabilities the traversals dispatch through

use std::{f32::consts::PI, rc::Rc};

use cgmath::{Vector3, Zero};

use super::{arena::NodeId, node::Pose};
use crate::{
    assets::wavefront::Mesh,
    gfx::{resources::drawable::DrawableGpu, transform},
};

/// Per-tick behaviour run before collision-aware integration.
pub trait Updatable {
    /// Variant hook. May change velocity, position or rotation.
    fn update(&mut self, pose: &mut Pose);

    fn on_physical_hit(&mut self, _other: NodeId) {}

    fn on_trigger_hit(&mut self, _other: NodeId) {}
}

/// Variants that issue draw calls.
pub trait Renderable {
    fn drawable(&self) -> &Drawable;

    fn drawable_mut(&mut self) -> &mut Drawable;
}

/// Imported geometry plus the GPU resources created for it.
///
/// The mesh is shared between nodes built from the same source file; the
/// GPU side is owned by this node alone and created lazily by the render
/// engine.
pub struct Drawable {
    pub mesh: Rc<Mesh>,
    pub gpu: Option<DrawableGpu>,
}

impl Drawable {
    pub fn new(mesh: Rc<Mesh>) -> Self {
        Self { mesh, gpu: None }
    }
}

impl Updatable for Drawable {
    fn update(&mut self, _pose: &mut Pose) {}
}

impl Renderable for Drawable {
    fn drawable(&self) -> &Drawable {
        self
    }

    fn drawable_mut(&mut self) -> &mut Drawable {
        self
    }
}

/// Parameters of a circular, inclined orbit around the parent's origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitParams {
    /// Starting (ρ, θ, φ).
    pub pol: Vector3<f32>,
    /// Spin added to the rotation every tick.
    pub spin: Vector3<f32>,
    /// θ advance per tick.
    pub speed: f32,
    pub inclination: f32,
    /// Phase of the inclination wave.
    pub offset: f32,
    /// Optional axis whose two complementary components are swapped.
    pub axis: Option<usize>,
}

/// A drawable that travels along an orbit.
pub struct OrbitingBody {
    pub orbit: OrbitParams,
    pol: Vector3<f32>,
    pub drawable: Drawable,
}

impl OrbitingBody {
    pub fn new(orbit: OrbitParams, drawable: Drawable) -> Self {
        Self {
            orbit,
            pol: transform::clamp_angles(orbit.pol),
            drawable,
        }
    }

    /// Initial pose: on the orbit at the starting angles, spinning.
    pub fn initial_pose(&self, rot: Vector3<f32>, scl: Vector3<f32>) -> Pose {
        let mut pose = Pose::new(self.position(), rot, scl);
        pose.ang_velocity = self.orbit.spin;
        pose
    }

    /// Current (ρ, θ, φ).
    pub fn pol(&self) -> Vector3<f32> {
        self.pol
    }

    fn position(&self) -> Vector3<f32> {
        transform::swap_off_axis(transform::spherical_to_cartesian(self.pol), self.orbit.axis)
    }
}

impl Updatable for OrbitingBody {
    fn update(&mut self, pose: &mut Pose) {
        let theta = self.pol.y;
        self.pol.z =
            PI / 2.0 + self.orbit.inclination * (self.orbit.offset + theta % (2.0 * PI)).cos();
        self.pol.y += self.orbit.speed;
        pose.velocity = Vector3::zero();
        pose.set_loc(self.position());
    }
}

impl Renderable for OrbitingBody {
    fn drawable(&self) -> &Drawable {
        &self.drawable
    }

    fn drawable_mut(&mut self) -> &mut Drawable {
        &mut self.drawable
    }
}

/// Closed set of node variants.
pub enum NodeKind {
    /// The graph's single root. Identity transform, never updated or drawn.
    Root,
    Drawable(Drawable),
    OrbitingBody(OrbitingBody),
}

impl NodeKind {
    pub fn as_updatable_mut(&mut self) -> Option<&mut dyn Updatable> {
        match self {
            NodeKind::Root => None,
            NodeKind::Drawable(drawable) => Some(drawable),
            NodeKind::OrbitingBody(body) => Some(body),
        }
    }

    pub fn as_renderable(&self) -> Option<&dyn Renderable> {
        match self {
            NodeKind::Root => None,
            NodeKind::Drawable(drawable) => Some(drawable),
            NodeKind::OrbitingBody(body) => Some(body),
        }
    }

    pub fn as_renderable_mut(&mut self) -> Option<&mut dyn Renderable> {
        match self {
            NodeKind::Root => None,
            NodeKind::Drawable(drawable) => Some(drawable),
            NodeKind::OrbitingBody(body) => Some(body),
        }
    }

    /// Orbiting bodies pass `T · S` to their children so satellites follow
    /// the orbit without inheriting the spin.
    pub fn ignores_rotation_for_children(&self) -> bool {
        matches!(self, NodeKind::OrbitingBody(_))
    }

    pub fn default_name(&self) -> &str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Drawable(drawable) => &drawable.mesh.name,
            NodeKind::OrbitingBody(body) => &body.drawable.mesh.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    fn test_mesh() -> Rc<Mesh> {
        Rc::new(Mesh::empty("Body"))
    }

    fn orbit(radius: f32, speed: f32) -> OrbitParams {
        OrbitParams {
            pol: Vector3::new(radius, 0.0, 0.0),
            spin: Vector3::new(0.0, -0.005, 0.0),
            speed,
            inclination: 0.0,
            offset: 0.0,
            axis: None,
        }
    }

    #[test]
    fn test_orbit_stays_on_radius() {
        let mut body = OrbitingBody::new(orbit(10.0, 0.1), Drawable::new(test_mesh()));
        let mut pose = body.initial_pose(Vector3::zero(), Vector3::new(1.0, 1.0, 1.0));
        for _ in 0..50 {
            body.update(&mut pose);
            assert!((pose.loc().magnitude() - 10.0).abs() < 1e-3);
        }
        assert!((body.pol().y - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_flat_orbit_stays_on_equator() {
        let mut body = OrbitingBody::new(orbit(5.0, 0.3), Drawable::new(test_mesh()));
        let mut pose = Pose::default();
        body.update(&mut pose);
        assert!(pose.loc().y.abs() < 1e-5);
        assert!((body.pol().z - PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_inclined_orbit_leaves_plane() {
        let mut params = orbit(5.0, 0.0);
        params.inclination = PI / 8.0;
        let mut body = OrbitingBody::new(params, Drawable::new(test_mesh()));
        let mut pose = Pose::default();
        body.update(&mut pose);
        // φ = π/2 + π/8 · cos(0)
        assert!((body.pol().z - (PI / 2.0 + PI / 8.0)).abs() < 1e-6);
        assert!(pose.loc().y < 0.0);
    }

    #[test]
    fn test_only_orbiting_bodies_drop_rotation_for_children() {
        let body = NodeKind::OrbitingBody(OrbitingBody::new(
            orbit(1.0, 0.0),
            Drawable::new(test_mesh()),
        ));
        let drawable = NodeKind::Drawable(Drawable::new(test_mesh()));
        assert!(body.ignores_rotation_for_children());
        assert!(!drawable.ignores_rotation_for_children());
        assert!(NodeKind::Root.as_renderable().is_none());
    }
}
