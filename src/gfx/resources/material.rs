//! Phong material, texture mode bits and the per-object uniform
//!
//! Every drawable owns one [`ObjectUniform`]: its world transform followed by
//! the material reflectances and the mask of texture slots the fragment
//! shader should sample instead of the flat colors.

use std::ops::{BitOr, BitOrAssign};

use cgmath::Matrix4;

/// Bitmask of bound texture slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct TextureMode(u32);

impl TextureMode {
    pub const NONE: TextureMode = TextureMode(0);
    pub const AMBIENT: TextureMode = TextureMode(1);
    pub const DIFFUSE: TextureMode = TextureMode(2);
    pub const SPECULAR: TextureMode = TextureMode(4);
    pub const NORMAL: TextureMode = TextureMode(8);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: TextureMode) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for TextureMode {
    type Output = TextureMode;

    fn bitor(self, rhs: TextureMode) -> TextureMode {
        TextureMode(self.0 | rhs.0)
    }
}

impl BitOrAssign for TextureMode {
    fn bitor_assign(&mut self, rhs: TextureMode) {
        self.0 |= rhs.0;
    }
}

/// Phong reflectances as read from an `.mtl` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
}

impl Default for Material {
    /// Stand-in for components an `.mtl` entry leaves out.
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            ambient: [0.5, 0.5, 0.5],
            diffuse: [0.5, 0.5, 0.5],
            specular: [0.0, 0.0, 0.0],
            shininess: 0.0,
        }
    }
}

impl Material {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_ambient(mut self, ambient: [f32; 3]) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_diffuse(mut self, diffuse: [f32; 3]) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn with_specular(mut self, specular: [f32; 3], shininess: f32) -> Self {
        self.specular = specular;
        self.shininess = shininess;
        self
    }
}

/// Texture file names referenced by a material, one per slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureSet {
    pub ambient: Option<String>,
    pub diffuse: Option<String>,
    pub specular: Option<String>,
    pub normal: Option<String>,
}

impl TextureSet {
    /// Mode bits of the slots that reference a file.
    pub fn mode(&self) -> TextureMode {
        let mut mode = TextureMode::NONE;
        if self.ambient.is_some() {
            mode |= TextureMode::AMBIENT;
        }
        if self.diffuse.is_some() {
            mode |= TextureMode::DIFFUSE;
        }
        if self.specular.is_some() {
            mode |= TextureMode::SPECULAR;
        }
        if self.normal.is_some() {
            mode |= TextureMode::NORMAL;
        }
        mode
    }

    /// A diffuse map without an ambient map doubles as the ambient map.
    pub fn ambient_override(&self) -> bool {
        self.diffuse.is_some() && self.ambient.is_none()
    }
}

/// Per-object uniform, 128 bytes.
///
/// `k_specular` and `shininess` share one 16-byte row, so `Ns` lands at
/// byte 108 and the texture mode at 112.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub transform: [[f32; 4]; 4],
    pub k_ambient: [f32; 3],
    _pad0: f32,
    pub k_diffuse: [f32; 3],
    _pad1: f32,
    pub k_specular: [f32; 3],
    pub shininess: f32,
    pub texture_mode: u32,
    _pad2: [u32; 3],
}

impl Default for ObjectUniform {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

impl ObjectUniform {
    pub fn new(world: &Matrix4<f32>, material: &Material, mode: TextureMode) -> Self {
        Self {
            transform: (*world).into(),
            k_ambient: material.ambient,
            k_diffuse: material.diffuse,
            k_specular: material.specular,
            shininess: material.shininess,
            texture_mode: mode.bits(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{offset, size};
    use cgmath::{SquareMatrix, Vector3};

    #[test]
    fn test_object_uniform_matches_layout_constants() {
        assert_eq!(std::mem::size_of::<ObjectUniform>() as u64, size::OBJECT_UNIFORM);

        let material = Material::new("m")
            .with_ambient([0.1, 0.2, 0.3])
            .with_diffuse([0.4, 0.5, 0.6])
            .with_specular([0.7, 0.8, 0.9], 32.0);
        let world = Matrix4::from_translation(Vector3::new(4.0, 5.0, 6.0));
        let uniform = ObjectUniform::new(&world, &material, TextureMode::DIFFUSE | TextureMode::NORMAL);
        let bytes: &[u8] = bytemuck::bytes_of(&uniform);
        let f32_at = |at: u64| {
            let at = at as usize;
            f32::from_ne_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };

        // Column-major: translation is the fourth column.
        assert_eq!(f32_at(offset::object_uniform::TRANSFORM + 48), 4.0);
        let material_base = offset::object_uniform::MATERIAL;
        assert_eq!(f32_at(material_base + offset::material::K_AMBIENT), 0.1);
        assert_eq!(f32_at(material_base + offset::material::K_DIFFUSE + 8), 0.6);
        assert_eq!(f32_at(material_base + offset::material::K_SPECULAR + 4), 0.8);
        assert_eq!(f32_at(material_base + offset::material::SHINE), 32.0);
        let mode_at = offset::object_uniform::TEXTURE_MODE as usize;
        assert_eq!(
            u32::from_ne_bytes([bytes[mode_at], bytes[mode_at + 1], bytes[mode_at + 2], bytes[mode_at + 3]]),
            10
        );
    }

    #[test]
    fn test_texture_set_mode_and_override() {
        let mut set = TextureSet {
            diffuse: Some("rock.png".to_string()),
            ..Default::default()
        };
        assert_eq!(set.mode(), TextureMode::DIFFUSE);
        assert!(set.ambient_override());

        set.ambient = Some("rock_ao.png".to_string());
        assert!(set.mode().contains(TextureMode::AMBIENT | TextureMode::DIFFUSE));
        assert!(!set.ambient_override());
        assert!(TextureSet::default().mode().is_empty());
    }

    #[test]
    fn test_identity_uniform() {
        let uniform = ObjectUniform::new(&Matrix4::identity(), &Material::default(), TextureMode::NONE);
        assert_eq!(uniform.transform[0][0], 1.0);
        assert_eq!(uniform.k_diffuse, [0.5, 0.5, 0.5]);
        assert_eq!(uniform.texture_mode, 0);
    }
}
