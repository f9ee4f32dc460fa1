//! Seeded placement of orbiting bodies
//!
//! Every top-level body gets the next ring out from the origin; satellites
//! get the next ring around their parent. All randomness comes from the
//! injected generator, so a seed fully determines the layout.

use std::{collections::HashMap, f32::consts::PI};

use cgmath::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    assets::ImportedObject,
    gfx::scene::{Classification, Drawable, NodeId, NodeKind, OrbitParams, OrbitingBody, SceneGraph},
};

const RING_SPACING: f32 = 10.0;
const SATELLITE_SPACING: f32 = 2.0;

pub struct Orrery<R: Rng = StdRng> {
    rng: R,
    bodies: usize,
    satellites: HashMap<NodeId, usize>,
}

impl Orrery<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Orrery<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            bodies: 0,
            satellites: HashMap::new(),
        }
    }

    /// Number of top-level bodies placed so far.
    pub fn body_count(&self) -> usize {
        self.bodies
    }

    /// Draws the orbit of the next body around `parent`, or around the
    /// origin when `parent` is `None`.
    pub fn next_orbit(&mut self, parent: Option<NodeId>) -> OrbitParams {
        match parent {
            None => {
                self.bodies += 1;
                let n = self.bodies as f32;
                let phase = 2.0 * PI * self.rng.random::<f32>();
                let inclination = if self.bodies % 6 == 0 {
                    PI / 8.0
                } else {
                    PI / 32.0 * self.rng.random::<f32>()
                };
                let offset = 2.0 * PI * self.rng.random::<f32>();
                OrbitParams {
                    pol: Vector3::new(RING_SPACING * n, phase, 0.0),
                    spin: Vector3::new(0.0, -0.005 / n, 0.0),
                    speed: 0.0005 + 0.003 / n,
                    inclination,
                    offset,
                    axis: None,
                }
            }
            Some(parent) => {
                let k = self.satellites.entry(parent).or_insert(0);
                *k += 1;
                let k = *k as f32;
                let phase = 2.0 * PI * self.rng.random::<f32>();
                let speed = 0.002 + 0.01 * self.rng.random::<f32>();
                let inclination = PI / 16.0 * self.rng.random::<f32>();
                let offset = 2.0 * PI * self.rng.random::<f32>();
                OrbitParams {
                    pol: Vector3::new(SATELLITE_SPACING * k, phase, 0.0),
                    spin: Vector3::new(0.0, -0.01 / k, 0.0),
                    speed,
                    inclination,
                    offset,
                    axis: None,
                }
            }
        }
    }

    /// Places every object of one body model on a shared orbit.
    ///
    /// Rotation and scale come from the first object's placement. Returns
    /// the created nodes, empty when `objects` is empty or the parent is
    /// gone.
    pub fn add_body(
        &mut self,
        graph: &mut SceneGraph,
        parent: Option<NodeId>,
        objects: &[ImportedObject],
    ) -> Vec<NodeId> {
        let Some(first) = objects.first() else {
            return Vec::new();
        };
        let orbit = self.next_orbit(parent);
        log::debug!(
            "Placing '{}' at radius {:.1} (speed {:.4}, inclination {:.3})",
            first.name,
            orbit.pol.x,
            orbit.speed,
            orbit.inclination
        );
        let (rot, scl) = (first.placement.rot, first.placement.scl);
        objects
            .iter()
            .filter_map(|object| {
                let body = OrbitingBody::new(orbit, Drawable::new(object.mesh.clone()));
                let pose = body.initial_pose(rot, scl);
                graph.create_parented_object(
                    parent,
                    NodeKind::OrbitingBody(body),
                    pose,
                    Classification::Visual,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{Mesh, Placement};
    use std::rc::Rc;

    fn planet(name: &str) -> Vec<ImportedObject> {
        vec![ImportedObject {
            name: name.to_string(),
            mesh: Rc::new(Mesh::empty(name)),
            placement: Placement::default(),
            parent: None,
        }]
    }

    #[test]
    fn test_same_seed_same_layout() {
        let mut a = Orrery::seeded(4257);
        let mut b = Orrery::seeded(4257);
        for _ in 0..8 {
            assert_eq!(a.next_orbit(None), b.next_orbit(None));
        }
        let mut c = Orrery::seeded(4258);
        let mut d = Orrery::seeded(4257);
        assert_ne!(c.next_orbit(None), d.next_orbit(None));
    }

    #[test]
    fn test_ring_formulas() {
        let mut orrery = Orrery::seeded(1);
        let orbits: Vec<OrbitParams> = (0..6).map(|_| orrery.next_orbit(None)).collect();
        for (i, orbit) in orbits.iter().enumerate() {
            let n = (i + 1) as f32;
            assert_eq!(orbit.pol.x, 10.0 * n);
            assert!((0.0..2.0 * PI).contains(&orbit.pol.y));
            assert_eq!(orbit.spin, Vector3::new(0.0, -0.005 / n, 0.0));
            assert!((orbit.speed - (0.0005 + 0.003 / n)).abs() < 1e-7);
            assert!(orbit.inclination <= PI / 32.0 || i == 5);
        }
        assert_eq!(orbits[5].inclination, PI / 8.0);
        assert_eq!(orrery.body_count(), 6);
    }

    #[test]
    fn test_satellites_count_per_parent() {
        let mut graph = SceneGraph::default();
        let mut orrery = Orrery::seeded(4257);
        let earth = orrery.add_body(&mut graph, None, &planet("Earth"))[0];
        let mars = orrery.add_body(&mut graph, None, &planet("Mars"))[0];

        let moon = orrery.next_orbit(Some(earth));
        let second_moon = orrery.next_orbit(Some(earth));
        let phobos = orrery.next_orbit(Some(mars));
        assert_eq!(moon.pol.x, 2.0);
        assert_eq!(second_moon.pol.x, 4.0);
        assert_eq!(phobos.pol.x, 2.0);
        // Satellites do not consume ring numbers.
        assert_eq!(orrery.body_count(), 2);
    }

    #[test]
    fn test_add_body_parents_into_graph() {
        let mut graph = SceneGraph::default();
        let mut orrery = Orrery::seeded(4257);
        let sun = orrery.add_body(&mut graph, None, &planet("Sun"));
        assert_eq!(sun.len(), 1);
        let moon = orrery.add_body(&mut graph, Some(sun[0]), &planet("Moon"));
        assert_eq!(graph.get(moon[0]).unwrap().parent(), Some(sun[0]));
        assert_eq!(graph.find_by_name("Moon", Some(Classification::Visual)), Some(moon[0]));

        graph.destroy(sun[0]);
        assert!(orrery.add_body(&mut graph, Some(sun[0]), &planet("Lost")).is_empty());
        assert!(orrery.add_body(&mut graph, None, &[]).is_empty());
    }
}
