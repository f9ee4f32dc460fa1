//! Scene nodes and their local transform state

use cgmath::{Matrix4, SquareMatrix, Vector3, Zero};

use super::{arena::NodeId, kind::NodeKind};
use crate::gfx::transform;

/// How a node takes part in overlap checks while moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Rendered only. Moves are still checked against solid nodes.
    Visual,
    /// Blocks and is blocked by other solid nodes.
    Solid,
    /// Never blocked. Reports overlaps with other trigger nodes.
    Trigger,
}

/// Position, rotation and scale plus the motion applied each update.
///
/// `local_offset` is rebuilt by every setter, so it always matches the last
/// `loc`/`rot`/`scl` written.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    loc: Vector3<f32>,
    rot: Vector3<f32>,
    scl: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub ang_velocity: Vector3<f32>,
    local_offset: Matrix4<f32>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(
            Vector3::zero(),
            Vector3::zero(),
            Vector3::new(1.0, 1.0, 1.0),
        )
    }
}

impl Pose {
    pub fn new(loc: Vector3<f32>, rot: Vector3<f32>, scl: Vector3<f32>) -> Self {
        Self {
            loc,
            rot,
            scl,
            velocity: Vector3::zero(),
            ang_velocity: Vector3::zero(),
            local_offset: transform::local_offset(loc, rot, scl),
        }
    }

    pub fn loc(&self) -> Vector3<f32> {
        self.loc
    }

    pub fn rot(&self) -> Vector3<f32> {
        self.rot
    }

    pub fn scl(&self) -> Vector3<f32> {
        self.scl
    }

    pub fn local_offset(&self) -> &Matrix4<f32> {
        &self.local_offset
    }

    /// `T · S` without rotation, handed to children of orbiting bodies.
    pub fn nonrotational_offset(&self) -> Matrix4<f32> {
        transform::nonrotational_offset(self.loc, self.scl)
    }

    pub fn set_loc(&mut self, loc: Vector3<f32>) {
        self.loc = loc;
        self.recompute();
    }

    pub fn set_rot(&mut self, rot: Vector3<f32>) {
        self.rot = rot;
        self.recompute();
    }

    pub fn set_scl(&mut self, scl: Vector3<f32>) {
        self.scl = scl;
        self.recompute();
    }

    /// Position the node would reach after this tick's velocity.
    pub fn tentative_loc(&self) -> Vector3<f32> {
        self.loc + self.velocity
    }

    /// Applies one tick of motion. Rotation always advances; the position
    /// only moves when `accept_move` is set.
    pub fn integrate(&mut self, accept_move: bool) {
        if accept_move {
            self.loc += self.velocity;
        }
        self.rot += self.ang_velocity;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.local_offset = transform::local_offset(self.loc, self.rot, self.scl);
    }
}

/// A node of the scene graph.
///
/// The parent owns its children through the id list; the arena owns the
/// storage.
pub struct SceneNode {
    id: NodeId,
    pub name: String,
    pub pose: Pose,
    pub(super) children: Vec<NodeId>,
    pub(super) parent: Option<NodeId>,
    classification: Classification,
    pub collision_radius: f32,
    pub(super) update_count: u64,
    pub(super) render_count: u64,
    pub kind: NodeKind,
}

impl SceneNode {
    pub(super) fn new(
        id: NodeId,
        kind: NodeKind,
        pose: Pose,
        classification: Classification,
        parent: Option<NodeId>,
    ) -> Self {
        Self {
            id,
            name: kind.default_name().to_string(),
            pose,
            children: Vec::new(),
            parent,
            classification,
            collision_radius: 1.0,
            update_count: 0,
            render_count: 0,
            kind,
        }
    }

    pub(super) fn root(id: NodeId) -> Self {
        Self::new(
            id,
            NodeKind::Root,
            Pose::default(),
            Classification::Visual,
            None,
        )
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Offset composed into this node's children.
    pub fn child_basis(&self) -> Matrix4<f32> {
        if self.kind.ignores_rotation_for_children() {
            self.pose.nonrotational_offset()
        } else {
            *self.pose.local_offset()
        }
    }

    /// Root contributes the identity and never updates or renders itself.
    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Root)
    }

    pub(super) fn root_offset() -> Matrix4<f32> {
        Matrix4::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_keep_offset_in_sync() {
        let mut pose = Pose::default();
        pose.set_loc(Vector3::new(1.0, 2.0, 3.0));
        pose.set_rot(Vector3::new(0.0, 0.5, 0.0));
        pose.set_scl(Vector3::new(2.0, 2.0, 2.0));
        assert_eq!(
            *pose.local_offset(),
            transform::local_offset(pose.loc(), pose.rot(), pose.scl())
        );
    }

    #[test]
    fn test_rejected_move_still_rotates() {
        let mut pose = Pose::default();
        pose.velocity = Vector3::new(1.0, 0.0, 0.0);
        pose.ang_velocity = Vector3::new(0.0, 0.1, 0.0);
        pose.integrate(false);
        assert_eq!(pose.loc(), Vector3::zero());
        assert_eq!(pose.rot(), Vector3::new(0.0, 0.1, 0.0));

        pose.integrate(true);
        assert_eq!(pose.loc(), Vector3::new(1.0, 0.0, 0.0));
    }
}
