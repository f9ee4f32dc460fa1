//! Compile-time constants shared by the CPU side and the WGSL shader contract.
//!
//! Every offset in this module is a byte offset into a uniform buffer whose
//! struct is declared in the WGSL sources under `gfx/rendering`. Changing a
//! light capacity moves the point and spot arrays, so the shader `Lights`
//! struct has to be edited in lockstep.

/// Maximum number of lights per type held by the light registry.
pub mod max_lights {
    pub const DIRECTIONAL: usize = 3;
    pub const POINT: usize = 3;
    pub const SPOT: usize = 3;
    pub const SHADOWED_POINT: usize = 1;
    pub const SHADOWED_SPOT: usize = 1;
}

/// Struct and buffer sizes in bytes.
pub mod size {
    use super::max_lights;

    pub const MATERIAL: u64 = 48;
    pub const DIR_LIGHT: u64 = 32;
    pub const POINT_LIGHT: u64 = 32;
    pub const SPOT_LIGHT: u64 = 48;
    pub const OBJECT_UNIFORM: u64 = 64 + MATERIAL + 16;
    pub const LIGHT_UNIFORM: u64 = 32
        + max_lights::DIRECTIONAL as u64 * DIR_LIGHT
        + max_lights::POINT as u64 * POINT_LIGHT
        + max_lights::SPOT as u64 * SPOT_LIGHT;
    pub const CAMERA_UNIFORM: u64 = 32;
    pub const SHADOW_UNIFORM: u64 = 80;
    pub const POST_UNIFORM: u64 = 16;
}

/// Byte offsets inside the uniform structs.
pub mod offset {
    pub mod vertex {
        /// pos(vec3f), nml(vec3f), uvs(vec2f)
        pub const STRIDE: u64 = 4 * 3 + 4 * 3 + 4 * 2;
        pub const POS: u64 = 0;
        pub const NML: u64 = 4 * 3;
        pub const UVS: u64 = 2 * 4 * 3;
    }

    pub mod material {
        pub const K_AMBIENT: u64 = 0;
        pub const K_DIFFUSE: u64 = 16;
        pub const K_SPECULAR: u64 = 32;
        pub const SHINE: u64 = 32 + 12;
    }

    pub mod object_uniform {
        pub const TRANSFORM: u64 = 0;
        pub const MATERIAL: u64 = 64;
        pub const TEXTURE_MODE: u64 = 112;
    }

    pub mod dir_light {
        pub const DIRECTION: u64 = 0;
        pub const COLOR: u64 = 16;
    }

    pub mod point_light {
        pub const POSITION: u64 = 0;
        pub const COLOR: u64 = 16;
    }

    pub mod spot_light {
        pub const POSITION: u64 = 0;
        pub const DIRECTION: u64 = 16;
        pub const CUTOFF: u64 = 16 + 12;
        pub const COLOR: u64 = 16 + 12 + 4;
    }

    pub mod light_uniform {
        use crate::constants::{max_lights, size};

        pub const NUM_POINT_LIGHTS: u64 = 0;
        pub const NUM_DIR_LIGHTS: u64 = 4;
        pub const NUM_SPOT_LIGHTS: u64 = 8;
        pub const AMBIENT_LIGHT: u64 = 16;
        pub const DIR_LIGHTS: u64 = 32;
        pub const POINT_LIGHTS: u64 = DIR_LIGHTS + max_lights::DIRECTIONAL as u64 * size::DIR_LIGHT;
        pub const SPOT_LIGHTS: u64 = POINT_LIGHTS + max_lights::POINT as u64 * size::POINT_LIGHT;
    }

    pub mod camera_uniform {
        pub const TRANSLATION: u64 = 0;
        pub const ROTATION: u64 = 16;
    }
}

/// Clear color of the main pass (sky blue).
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 146.0 / 255.0,
    g: 219.0 / 255.0,
    b: 250.0 / 255.0,
    a: 1.0,
};

/// Largest 2D texture side requested from the device. Shadow cube faces
/// are 2D layers, so this also bounds the shadow map size.
pub const MAX_TEXTURE_DIMENSION: u32 = 4096;

/// Side length of the generated "missing texture" checkerboard.
pub const MISSING_TEXTURE_SIZE: u32 = 16;

/// Near and far planes of the shadow cube projection. The far plane is also
/// hard-coded as `SHADOW_FAR` in the render and shadow shaders.
pub const SHADOW_NEAR_PLANE: f32 = 0.1;
pub const SHADOW_FAR_PLANE: f32 = 100.0;

/// Static models loaded at startup from `Models/Static/<name>`.
pub const MODELS: &[&str] = &["Chappy", "Strawberry"];

/// Bodies placed by the orrery, loaded from `Models/Planet/<name>`.
pub const PLANETS: &[&str] = &["Mercury", "Venus", "Earth", "Mars", "Jupiter", "Saturn"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_uniform_layout() {
        assert_eq!(size::LIGHT_UNIFORM, 368);
        assert_eq!(offset::light_uniform::POINT_LIGHTS, 128);
        assert_eq!(offset::light_uniform::SPOT_LIGHTS, 224);
        assert_eq!(
            offset::light_uniform::SPOT_LIGHTS + max_lights::SPOT as u64 * size::SPOT_LIGHT,
            size::LIGHT_UNIFORM
        );
    }

    #[test]
    fn test_object_uniform_layout() {
        assert_eq!(size::OBJECT_UNIFORM, 128);
        assert_eq!(offset::object_uniform::MATERIAL + size::MATERIAL, offset::object_uniform::TEXTURE_MODE);
        assert_eq!(offset::vertex::STRIDE, 32);
    }
}
