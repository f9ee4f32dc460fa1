//! Fixed-capacity light registry and light uniform packing
//!
//! Lights live in three per-type arrays. A light's slot is its index in that
//! array, assigned on registration and never reused since lights cannot be
//! removed individually. [`LightSystem::pack`] serializes the registry into
//! the byte layout the render shader declares as `Lights`:
//!
//! | offset | content |
//! |---|---|
//! | 0 / 4 / 8 | point / directional / spot counts (u32) |
//! | 16 | ambient (vec3) |
//! | 32 | directional array, stride 32 |
//! | 128 | point array, stride 32 |
//! | 224 | spot array, stride 48 |

use cgmath::Vector3;

use crate::{
    constants::{max_lights, offset, size},
    gfx::rendering::pass::ShadowCaster,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub color: [f32; 3],
    /// Cosine threshold of the cone.
    pub cutoff: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Directional,
    Point,
    Spot,
}

/// Slot assigned to a registered light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightHandle {
    pub light_type: LightType,
    pub slot: usize,
}

pub struct LightSystem {
    ambient: [f32; 3],
    directional: Vec<DirectionalLight>,
    point: Vec<PointLight>,
    spot: Vec<SpotLight>,
}

impl LightSystem {
    pub fn new(ambient: [f32; 3]) -> Self {
        Self {
            ambient,
            directional: Vec::with_capacity(max_lights::DIRECTIONAL),
            point: Vec::with_capacity(max_lights::POINT),
            spot: Vec::with_capacity(max_lights::SPOT),
        }
    }

    /// The stock rig: one directional, one point at the origin and one spot
    /// looking straight down.
    pub fn with_default_rig(ambient: [f32; 3]) -> Self {
        let mut lights = Self::new(ambient);
        lights.add_directional(Vector3::new(1.0, -1.0, 1.0), [0.5, 0.5, 0.5]);
        lights.add_point(Vector3::new(0.0, 0.0, 0.0), [2.0, 2.0, 2.0]);
        lights.add_spot(
            Vector3::new(0.0, 10.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            [0.2, 0.2, 0.2],
            0.1,
        );
        lights
    }

    pub fn add_directional(
        &mut self,
        direction: Vector3<f32>,
        color: [f32; 3],
    ) -> Option<LightHandle> {
        if self.directional.len() >= max_lights::DIRECTIONAL {
            log::debug!("Directional light rejected, registry full");
            return None;
        }
        self.directional.push(DirectionalLight { direction, color });
        Some(LightHandle {
            light_type: LightType::Directional,
            slot: self.directional.len() - 1,
        })
    }

    pub fn add_point(&mut self, position: Vector3<f32>, color: [f32; 3]) -> Option<LightHandle> {
        if self.point.len() >= max_lights::POINT {
            log::debug!("Point light rejected, registry full");
            return None;
        }
        self.point.push(PointLight { position, color });
        Some(LightHandle {
            light_type: LightType::Point,
            slot: self.point.len() - 1,
        })
    }

    pub fn add_spot(
        &mut self,
        position: Vector3<f32>,
        direction: Vector3<f32>,
        color: [f32; 3],
        cutoff: f32,
    ) -> Option<LightHandle> {
        if self.spot.len() >= max_lights::SPOT {
            log::debug!("Spot light rejected, registry full");
            return None;
        }
        self.spot.push(SpotLight {
            position,
            direction,
            color,
            cutoff,
        });
        Some(LightHandle {
            light_type: LightType::Spot,
            slot: self.spot.len() - 1,
        })
    }

    pub fn directional(&self, slot: usize) -> Option<&DirectionalLight> {
        self.directional.get(slot)
    }

    pub fn point(&self, slot: usize) -> Option<&PointLight> {
        self.point.get(slot)
    }

    pub fn spot(&self, slot: usize) -> Option<&SpotLight> {
        self.spot.get(slot)
    }

    pub fn ambient(&self) -> [f32; 3] {
        self.ambient
    }

    /// (directional, point, spot) counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.directional.len(), self.point.len(), self.spot.len())
    }

    /// Position of the light that casts into `caster`'s cube map, if that
    /// light has been registered.
    pub fn shadow_caster_position(&self, caster: ShadowCaster) -> Option<Vector3<f32>> {
        match caster {
            ShadowCaster::Point => self.point(0).map(|light| light.position),
            ShadowCaster::Spot => self.spot(0).map(|light| light.position),
        }
    }

    /// Serializes every registered light into the light uniform layout.
    pub fn pack(&self) -> Vec<u8> {
        use offset::{dir_light, light_uniform, point_light, spot_light};

        let mut bytes = vec![0u8; size::LIGHT_UNIFORM as usize];
        put_u32(&mut bytes, light_uniform::NUM_POINT_LIGHTS, self.point.len() as u32);
        put_u32(&mut bytes, light_uniform::NUM_DIR_LIGHTS, self.directional.len() as u32);
        put_u32(&mut bytes, light_uniform::NUM_SPOT_LIGHTS, self.spot.len() as u32);
        put_f32s(&mut bytes, light_uniform::AMBIENT_LIGHT, &self.ambient);

        for (slot, light) in self.directional.iter().enumerate() {
            let base = light_uniform::DIR_LIGHTS + slot as u64 * size::DIR_LIGHT;
            put_vec3(&mut bytes, base + dir_light::DIRECTION, light.direction);
            put_f32s(&mut bytes, base + dir_light::COLOR, &light.color);
        }
        for (slot, light) in self.point.iter().enumerate() {
            let base = light_uniform::POINT_LIGHTS + slot as u64 * size::POINT_LIGHT;
            put_vec3(&mut bytes, base + point_light::POSITION, light.position);
            put_f32s(&mut bytes, base + point_light::COLOR, &light.color);
        }
        for (slot, light) in self.spot.iter().enumerate() {
            let base = light_uniform::SPOT_LIGHTS + slot as u64 * size::SPOT_LIGHT;
            put_vec3(&mut bytes, base + spot_light::POSITION, light.position);
            put_vec3(&mut bytes, base + spot_light::DIRECTION, light.direction);
            put_f32s(&mut bytes, base + spot_light::CUTOFF, &[light.cutoff]);
            put_f32s(&mut bytes, base + spot_light::COLOR, &light.color);
        }
        bytes
    }
}

fn put_u32(bytes: &mut [u8], at: u64, value: u32) {
    let at = at as usize;
    bytes[at..at + 4].copy_from_slice(&value.to_ne_bytes());
}

fn put_vec3(bytes: &mut [u8], at: u64, v: Vector3<f32>) {
    put_f32s(bytes, at, &[v.x, v.y, v.z]);
}

fn put_f32s(bytes: &mut [u8], at: u64, values: &[f32]) {
    let at = at as usize;
    let src: &[u8] = bytemuck::cast_slice(values);
    bytes[at..at + src.len()].copy_from_slice(src);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_ne_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    fn read_f32(bytes: &[u8], at: usize) -> f32 {
        f32::from_bits(read_u32(bytes, at))
    }

    #[test]
    fn test_fourth_point_light_is_rejected() {
        let mut lights = LightSystem::new([0.0; 3]);
        for i in 0..3 {
            let handle = lights
                .add_point(Vector3::new(i as f32, 0.0, 0.0), [1.0; 3])
                .unwrap();
            assert_eq!(handle.slot, i);
        }
        assert!(lights.add_point(Vector3::new(9.0, 0.0, 0.0), [1.0; 3]).is_none());
        for i in 0..3 {
            assert_eq!(lights.point(i).unwrap().position.x, i as f32);
        }
        assert!(lights.point(3).is_none());
    }

    #[test]
    fn test_each_type_has_its_own_capacity() {
        let mut lights = LightSystem::new([0.0; 3]);
        for _ in 0..max_lights::DIRECTIONAL {
            assert!(lights.add_directional(Vector3::new(0.0, -1.0, 0.0), [1.0; 3]).is_some());
        }
        assert!(lights.add_directional(Vector3::new(0.0, -1.0, 0.0), [1.0; 3]).is_none());
        let spot = lights.add_spot(Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, -1.0, 0.0), [1.0; 3], 0.5);
        assert_eq!(
            spot,
            Some(LightHandle {
                light_type: LightType::Spot,
                slot: 0
            })
        );
    }

    #[test]
    fn test_directional_lights_pack_at_stride() {
        let mut lights = LightSystem::new([0.3, 0.3, 0.3]);
        let k = 2;
        for i in 0..k {
            lights.add_directional(Vector3::new(i as f32 + 1.0, -1.0, 0.5), [0.5, 0.25, i as f32]);
        }
        let bytes = lights.pack();
        assert_eq!(bytes.len(), 368);
        assert_eq!(read_u32(&bytes, 4), k as u32);
        assert_eq!(read_u32(&bytes, 0), 0);
        assert_eq!(read_f32(&bytes, 16), 0.3);
        for i in 0..k {
            let base = 32 + 32 * i;
            assert_eq!(read_f32(&bytes, base), i as f32 + 1.0);
            assert_eq!(read_f32(&bytes, base + 4), -1.0);
            assert_eq!(read_f32(&bytes, base + 16), 0.5);
            assert_eq!(read_f32(&bytes, base + 24), i as f32);
        }
    }

    #[test]
    fn test_default_rig_layout() {
        let lights = LightSystem::with_default_rig([0.3, 0.3, 0.3]);
        assert_eq!(lights.counts(), (1, 1, 1));
        let bytes = lights.pack();
        assert_eq!(read_u32(&bytes, 8), 1);
        // Point light color at 128 + 16.
        assert_eq!(read_f32(&bytes, 144), 2.0);
        // Spot light: position y at 224 + 4, direction y at 224 + 20,
        // cutoff at 224 + 28, color at 224 + 32.
        assert_eq!(read_f32(&bytes, 228), 10.0);
        assert_eq!(read_f32(&bytes, 244), -1.0);
        assert_eq!(read_f32(&bytes, 252), 0.1);
        assert_eq!(read_f32(&bytes, 256), 0.2);
        assert_eq!(
            lights.shadow_caster_position(ShadowCaster::Spot),
            Some(Vector3::new(0.0, 10.0, 0.0))
        );
    }
}
