//! Scene graph: node factory, lookup, destruction and the two traversals
//!
//! The graph owns every node in a generation-checked arena. Parent/child
//! links are ids, so destroying a subtree never leaves a dangling borrow and
//! a stale id simply fails to resolve.
//!
//! Update walks depth-first from the root's children, parent before
//! children, in insertion order: variant hook, then collision-aware
//! integration. Render walks the same order, composing world transforms top
//! down and handing each node to a [`RenderVisitor`] together with the
//! current [`PassKind`].

use cgmath::{InnerSpace, Matrix4, Vector3};

use super::{
    arena::{Arena, NodeId},
    kind::NodeKind,
    node::{Classification, Pose, SceneNode},
};
use crate::{config::CollisionMode, gfx::rendering::pass::PassKind, gfx::transform};

/// Which hook an overlap fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Physical,
    Trigger,
}

/// Record of one hit hook invocation, drained by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    pub kind: HitKind,
    pub node: NodeId,
    pub other: NodeId,
}

/// Receives every non-root node during a render traversal.
///
/// The node is handed out mutably so the visitor can refresh per-object GPU
/// state; the tree structure itself is not reachable from it.
pub trait RenderVisitor {
    fn visit(&mut self, node: &mut SceneNode, world: &Matrix4<f32>, pass: PassKind);
}

#[derive(Default)]
struct ClassTables {
    visual: Vec<NodeId>,
    solid: Vec<NodeId>,
    trigger: Vec<NodeId>,
}

impl ClassTables {
    fn table(&self, classification: Classification) -> &Vec<NodeId> {
        match classification {
            Classification::Visual => &self.visual,
            Classification::Solid => &self.solid,
            Classification::Trigger => &self.trigger,
        }
    }

    fn table_mut(&mut self, classification: Classification) -> &mut Vec<NodeId> {
        match classification {
            Classification::Visual => &mut self.visual,
            Classification::Solid => &mut self.solid,
            Classification::Trigger => &mut self.trigger,
        }
    }
}

pub struct SceneGraph {
    nodes: Arena<SceneNode>,
    root: NodeId,
    tables: ClassTables,
    collision_mode: CollisionMode,
    events: Vec<CollisionEvent>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new(CollisionMode::default())
    }
}

impl SceneGraph {
    pub fn new(collision_mode: CollisionMode) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.insert_with(SceneNode::root);
        Self {
            nodes,
            root,
            tables: ClassTables::default(),
            collision_mode,
            events: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn collision_mode(&self) -> CollisionMode {
        self.collision_mode
    }

    pub fn set_collision_mode(&mut self, mode: CollisionMode) {
        self.collision_mode = mode;
    }

    /// Number of nodes, root excluded.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    /// All live nodes, root excluded, in slot order.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut SceneNode> {
        let root = self.root;
        self.nodes
            .iter_mut()
            .filter(move |(id, _)| *id != root)
            .map(|(_, node)| node)
    }

    /// Creates a node directly under the root.
    pub fn create_object(
        &mut self,
        kind: NodeKind,
        pose: Pose,
        classification: Classification,
    ) -> NodeId {
        self.attach(self.root, kind, pose, classification)
    }

    /// Creates a node under `parent`, or under the root when `parent` is
    /// `None`. A parent id that no longer resolves drops the creation.
    pub fn create_parented_object(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        pose: Pose,
        classification: Classification,
    ) -> Option<NodeId> {
        let parent = parent.unwrap_or(self.root);
        if !self.nodes.contains(parent) {
            log::error!(
                "Parent {} not found, '{}' was not created",
                parent,
                kind.default_name()
            );
            return None;
        }
        Some(self.attach(parent, kind, pose, classification))
    }

    fn attach(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        pose: Pose,
        classification: Classification,
    ) -> NodeId {
        let id = self
            .nodes
            .insert_with(|id| SceneNode::new(id, kind, pose, classification, Some(parent)));
        self.tables.table_mut(classification).push(id);
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id);
        }
        log::debug!("Created node {} under {}", id, parent);
        id
    }

    /// First node named `name`, searching one classification table or all
    /// of them (visual, solid, trigger) when `filter` is `None`.
    pub fn find_by_name(&self, name: &str, filter: Option<Classification>) -> Option<NodeId> {
        let tables: &[Classification] = match &filter {
            Some(classification) => std::slice::from_ref(classification),
            None => &[
                Classification::Visual,
                Classification::Solid,
                Classification::Trigger,
            ],
        };
        tables
            .iter()
            .flat_map(|classification| self.tables.table(*classification).iter())
            .copied()
            .find(|id| self.nodes.get(*id).is_some_and(|node| node.name == name))
    }

    /// Removes `id` and its whole subtree and detaches it from its parent.
    ///
    /// Returns the number of nodes removed. The root cannot be destroyed.
    pub fn destroy(&mut self, id: NodeId) -> usize {
        if id == self.root {
            log::warn!("Refusing to destroy the scene root");
            return 0;
        }
        let Some(parent) = self.nodes.get(id).map(|node| node.parent) else {
            return 0;
        };
        if let Some(parent_node) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent_node.children.retain(|child| *child != id);
        }

        let mut pending = vec![id];
        let mut removed = 0;
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(next) {
                self.tables
                    .table_mut(node.classification())
                    .retain(|entry| *entry != next);
                pending.extend(node.children);
                removed += 1;
            }
        }
        log::debug!("Destroyed {} node(s) rooted at {}", removed, id);
        removed
    }

    /// World transform of `id`: the composed child bases of its ancestors
    /// times its own local offset.
    pub fn world_transform(&self, id: NodeId) -> Option<Matrix4<f32>> {
        let node = self.nodes.get(id)?;
        let mut bases = Vec::new();
        let mut cursor = node.parent;
        while let Some(ancestor_id) = cursor {
            let ancestor = self.nodes.get(ancestor_id)?;
            if !ancestor.is_root() {
                bases.push(ancestor.child_basis());
            }
            cursor = ancestor.parent;
        }
        bases.reverse();
        bases.push(*node.pose.local_offset());
        Some(transform::compose(bases.iter()))
    }

    /// Runs one update tick over the whole tree.
    pub fn update(&mut self) {
        let children = self.children_of(self.root);
        for child in children {
            self.update_node(child);
        }
    }

    fn update_node(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.update_count += 1;
        if let Some(updatable) = node.kind.as_updatable_mut() {
            updatable.update(&mut node.pose);
        }
        self.integrate(id);

        for child in self.children_of(id) {
            self.update_node(child);
        }
    }

    fn integrate(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let tentative = node.pose.tentative_loc();
        let radius = node.collision_radius;
        let classification = node.classification();

        let (table, hit_kind) = match classification {
            Classification::Trigger => (Classification::Trigger, HitKind::Trigger),
            Classification::Solid | Classification::Visual => {
                (Classification::Solid, HitKind::Physical)
            }
        };
        let hits: Vec<NodeId> = if self.collision_mode == CollisionMode::Disabled {
            Vec::new()
        } else {
            self.tables
                .table(table)
                .iter()
                .copied()
                .filter(|other| *other != id)
                .filter(|other| {
                    self.nodes.get(*other).is_some_and(|other| {
                        self.overlaps(tentative, radius, other.pose.loc(), other.collision_radius)
                    })
                })
                .collect()
        };

        let accept = classification == Classification::Trigger || hits.is_empty();
        if let Some(node) = self.nodes.get_mut(id) {
            node.pose.integrate(accept);
        }

        for other in hits {
            self.dispatch_hit(id, other, hit_kind);
            self.dispatch_hit(other, id, hit_kind);
        }
    }

    /// Bounding-sphere test under the configured mode.
    pub fn overlaps(
        &self,
        loc: Vector3<f32>,
        radius: f32,
        other_loc: Vector3<f32>,
        other_radius: f32,
    ) -> bool {
        match self.collision_mode {
            CollisionMode::Disabled => false,
            CollisionMode::Spheres => (loc - other_loc).magnitude() < radius + other_radius,
        }
    }

    fn dispatch_hit(&mut self, target: NodeId, other: NodeId, kind: HitKind) {
        let Some(node) = self.nodes.get_mut(target) else {
            log::debug!("Skipping hit hook on stale node {}", target);
            return;
        };
        if let Some(updatable) = node.kind.as_updatable_mut() {
            match kind {
                HitKind::Physical => updatable.on_physical_hit(other),
                HitKind::Trigger => updatable.on_trigger_hit(other),
            }
        }
        self.events.push(CollisionEvent {
            kind,
            node: target,
            other,
        });
    }

    /// Takes the hit events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Walks the tree for one pass, visiting every non-root node with its
    /// world transform.
    pub fn render<V: RenderVisitor>(&mut self, pass: PassKind, visitor: &mut V) {
        let root_world = SceneNode::root_offset();
        for child in self.children_of(self.root) {
            self.render_node(child, &root_world, pass, visitor);
        }
    }

    fn render_node<V: RenderVisitor>(
        &mut self,
        id: NodeId,
        parent_world: &Matrix4<f32>,
        pass: PassKind,
        visitor: &mut V,
    ) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.render_count += 1;
        let world = parent_world * node.pose.local_offset();
        let child_world = parent_world * node.child_basis();
        visitor.visit(node, &world, pass);

        for child in self.children_of(id) {
            self.render_node(child, &child_world, pass, visitor);
        }
    }

    fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::wavefront::Mesh,
        gfx::scene::kind::{Drawable, OrbitParams, OrbitingBody},
    };
    use cgmath::{SquareMatrix, Vector4, Zero};
    use std::rc::Rc;

    fn drawable(name: &str) -> NodeKind {
        NodeKind::Drawable(Drawable::new(Rc::new(Mesh::empty(name))))
    }

    fn at(x: f32, y: f32, z: f32) -> Pose {
        Pose::new(
            Vector3::new(x, y, z),
            Vector3::zero(),
            Vector3::new(1.0, 1.0, 1.0),
        )
    }

    fn origin_of(m: Matrix4<f32>) -> Vector3<f32> {
        let p = m * Vector4::new(0.0, 0.0, 0.0, 1.0);
        Vector3::new(p.x, p.y, p.z)
    }

    struct Recorder {
        visits: Vec<(String, Matrix4<f32>, PassKind)>,
    }

    impl RenderVisitor for Recorder {
        fn visit(&mut self, node: &mut SceneNode, world: &Matrix4<f32>, pass: PassKind) {
            self.visits.push((node.name.clone(), *world, pass));
        }
    }

    #[test]
    fn test_moving_parent_moves_child() {
        let mut graph = SceneGraph::default();
        let a = graph.create_object(drawable("A"), at(0.0, 0.0, 0.0), Classification::Visual);
        let b = graph
            .create_parented_object(Some(a), drawable("B"), at(0.0, 2.0, 0.0), Classification::Visual)
            .unwrap();

        graph.get_mut(a).unwrap().pose.set_loc(Vector3::new(1.0, 0.0, 0.0));

        let world = graph.world_transform(b).unwrap();
        assert!((origin_of(world) - Vector3::new(1.0, 2.0, 0.0)).magnitude() < 1e-6);

        let mut recorder = Recorder { visits: Vec::new() };
        graph.render(PassKind::Render, &mut recorder);
        let (_, rendered, _) = &recorder.visits[1];
        assert_eq!(*rendered, world);
    }

    #[test]
    fn test_world_transform_is_product_of_ancestors() {
        let mut graph = SceneGraph::default();
        let poses = [
            Pose::new(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.3, 0.0), Vector3::new(2.0, 2.0, 2.0)),
            Pose::new(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.2, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0)),
            Pose::new(Vector3::new(0.0, 0.0, 3.0), Vector3::new(0.0, 0.0, 0.7), Vector3::new(0.5, 0.5, 0.5)),
        ];
        let mut parent = None;
        let mut expected = Matrix4::identity();
        for (depth, pose) in poses.iter().enumerate() {
            expected = expected * pose.local_offset();
            let id = graph
                .create_parented_object(parent, drawable(&format!("n{depth}")), pose.clone(), Classification::Visual)
                .unwrap();
            assert_eq!(graph.world_transform(id).unwrap(), expected);
            parent = Some(id);
        }
    }

    #[test]
    fn test_missing_parent_creates_nothing() {
        let mut graph = SceneGraph::default();
        let doomed = graph.create_object(drawable("doomed"), Pose::default(), Classification::Visual);
        graph.destroy(doomed);
        let before = graph.len();

        let created = graph.create_parented_object(
            Some(doomed),
            drawable("orphan"),
            Pose::default(),
            Classification::Visual,
        );
        assert!(created.is_none());
        assert_eq!(graph.len(), before);
        assert!(graph.find_by_name("orphan", None).is_none());
        assert!(graph.get(graph.root()).unwrap().children().is_empty());

        let mut recorder = Recorder { visits: Vec::new() };
        graph.render(PassKind::Render, &mut recorder);
        assert!(recorder.visits.is_empty());
    }

    #[test]
    fn test_find_by_name_respects_filter() {
        let mut graph = SceneGraph::default();
        let wall = graph.create_object(drawable("wall"), Pose::default(), Classification::Solid);
        assert_eq!(graph.find_by_name("wall", None), Some(wall));
        assert_eq!(graph.find_by_name("wall", Some(Classification::Solid)), Some(wall));
        assert_eq!(graph.find_by_name("wall", Some(Classification::Visual)), None);
    }

    #[test]
    fn test_destroy_removes_subtree_and_detaches() {
        let mut graph = SceneGraph::default();
        let a = graph.create_object(drawable("A"), Pose::default(), Classification::Visual);
        let b = graph
            .create_parented_object(Some(a), drawable("B"), Pose::default(), Classification::Visual)
            .unwrap();
        let c = graph
            .create_parented_object(Some(b), drawable("C"), Pose::default(), Classification::Trigger)
            .unwrap();
        let keep = graph.create_object(drawable("keep"), Pose::default(), Classification::Visual);

        assert_eq!(graph.destroy(b), 2);
        assert!(graph.get(b).is_none());
        assert!(graph.get(c).is_none());
        assert!(graph.get(a).unwrap().children().is_empty());
        assert!(graph.find_by_name("C", None).is_none());
        assert_eq!(graph.len(), 2);
        assert!(graph.get(keep).is_some());
        assert_eq!(graph.destroy(graph.root()), 0);
    }

    #[test]
    fn test_traversals_are_depth_first_in_insertion_order() {
        let mut graph = SceneGraph::default();
        let a = graph.create_object(drawable("A"), Pose::default(), Classification::Visual);
        graph.create_object(drawable("D"), Pose::default(), Classification::Visual);
        let b = graph
            .create_parented_object(Some(a), drawable("B"), Pose::default(), Classification::Visual)
            .unwrap();
        graph.create_parented_object(Some(b), drawable("C"), Pose::default(), Classification::Visual);

        let mut recorder = Recorder { visits: Vec::new() };
        graph.render(PassKind::Render, &mut recorder);
        let order: Vec<&str> = recorder.visits.iter().map(|(name, _, _)| name.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C", "D"]);

        graph.update();
        graph.update();
        assert_eq!(graph.get(b).unwrap().update_count(), 2);
        assert_eq!(graph.get(b).unwrap().render_count(), 1);
        assert_eq!(graph.get(graph.root()).unwrap().update_count(), 0);
    }

    #[test]
    fn test_pass_kind_reaches_visitor() {
        use crate::gfx::rendering::pass::ShadowCaster;

        let mut graph = SceneGraph::default();
        graph.create_object(drawable("A"), Pose::default(), Classification::Visual);
        let pass = PassKind::Shadow {
            caster: ShadowCaster::Spot,
            face: 4,
        };
        let mut recorder = Recorder { visits: Vec::new() };
        graph.render(pass, &mut recorder);
        assert_eq!(recorder.visits[0].2, pass);
    }

    #[test]
    fn test_orbiting_body_children_ignore_its_rotation() {
        let mut graph = SceneGraph::default();
        let orbit = OrbitParams {
            pol: Vector3::new(10.0, 0.0, std::f32::consts::FRAC_PI_2),
            spin: Vector3::zero(),
            speed: 0.0,
            inclination: 0.0,
            offset: 0.0,
            axis: None,
        };
        let body = OrbitingBody::new(orbit, Drawable::new(Rc::new(Mesh::empty("planet"))));
        let pose = body.initial_pose(Vector3::new(0.0, 1.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
        let planet = graph.create_object(NodeKind::OrbitingBody(body), pose, Classification::Visual);
        let moon = graph
            .create_parented_object(Some(planet), drawable("moon"), at(2.0, 0.0, 0.0), Classification::Visual)
            .unwrap();

        // Rotation about Y would swing the moon off the X axis.
        let world = graph.world_transform(moon).unwrap();
        assert!((origin_of(world) - Vector3::new(12.0, 0.0, 0.0)).magnitude() < 1e-4);
    }

    #[test]
    fn test_solid_move_into_solid_is_rejected() {
        let mut graph = SceneGraph::new(CollisionMode::Spheres);
        let wall = graph.create_object(drawable("wall"), at(3.0, 0.0, 0.0), Classification::Solid);
        let mover = graph.create_object(drawable("mover"), at(0.0, 0.0, 0.0), Classification::Solid);
        graph.get_mut(mover).unwrap().pose.velocity = Vector3::new(1.5, 0.0, 0.0);

        graph.update();
        assert_eq!(graph.get(mover).unwrap().pose.loc(), Vector3::zero());

        let events = graph.drain_events();
        assert!(events.contains(&CollisionEvent {
            kind: HitKind::Physical,
            node: mover,
            other: wall
        }));
        assert!(events.contains(&CollisionEvent {
            kind: HitKind::Physical,
            node: wall,
            other: mover
        }));
        assert!(graph.drain_events().is_empty());
    }

    #[test]
    fn test_trigger_moves_through_and_reports() {
        let mut graph = SceneGraph::new(CollisionMode::Spheres);
        let zone = graph.create_object(drawable("zone"), at(1.0, 0.0, 0.0), Classification::Trigger);
        let runner = graph.create_object(drawable("runner"), at(0.0, 0.0, 0.0), Classification::Trigger);
        graph.get_mut(runner).unwrap().pose.velocity = Vector3::new(0.5, 0.0, 0.0);

        graph.update();
        assert_eq!(graph.get(runner).unwrap().pose.loc(), Vector3::new(0.5, 0.0, 0.0));
        let events = graph.drain_events();
        assert!(events.iter().all(|e| e.kind == HitKind::Trigger));
        assert!(events.iter().any(|e| e.node == runner && e.other == zone));
    }

    #[test]
    fn test_switching_collision_mode_takes_effect_next_update() {
        let mut graph = SceneGraph::default();
        graph.create_object(drawable("wall"), at(2.0, 0.0, 0.0), Classification::Solid);
        let mover = graph.create_object(drawable("mover"), at(0.0, 0.0, 0.0), Classification::Solid);
        graph.get_mut(mover).unwrap().pose.velocity = Vector3::new(0.5, 0.0, 0.0);

        graph.update();
        assert_eq!(graph.get(mover).unwrap().pose.loc(), Vector3::new(0.5, 0.0, 0.0));

        graph.set_collision_mode(CollisionMode::Spheres);
        assert_eq!(graph.collision_mode(), CollisionMode::Spheres);
        graph.update();
        assert_eq!(graph.get(mover).unwrap().pose.loc(), Vector3::new(0.5, 0.0, 0.0));
        assert!(!graph.drain_events().is_empty());
    }

    #[test]
    fn test_disabled_mode_never_collides() {
        let mut graph = SceneGraph::default();
        graph.create_object(drawable("wall"), at(0.5, 0.0, 0.0), Classification::Solid);
        let mover = graph.create_object(drawable("mover"), at(0.0, 0.0, 0.0), Classification::Visual);
        graph.get_mut(mover).unwrap().pose.velocity = Vector3::new(0.5, 0.0, 0.0);

        graph.update();
        assert_eq!(graph.get(mover).unwrap().pose.loc(), Vector3::new(0.5, 0.0, 0.0));
        assert!(graph.drain_events().is_empty());
    }
}
