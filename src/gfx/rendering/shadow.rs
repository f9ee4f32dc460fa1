//! Omnidirectional shadow maps
//!
//! Each shadow-casting light owns a depth cube. A face is rendered with a 90°
//! left-handed perspective looking down one axis from the light; the shadow
//! fragment shader stores `distance / SHADOW_FAR_PLANE` as depth, so the
//! main pass compares linear distances no matter which face it samples.

use cgmath::{EuclideanSpace, Matrix4, Point3, Vector3};

use super::pass::ShadowCaster;
use crate::{
    constants::{SHADOW_FAR_PLANE, SHADOW_NEAR_PLANE},
    gfx::resources::texture_resource::ShadowCube,
};

/// Shadow uniform, 80 bytes: face view-projection, light position and far
/// plane.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowUniform {
    pub view_proj: [[f32; 4]; 4],
    pub light_pos: [f32; 3],
    pub far: f32,
}

impl Default for ShadowUniform {
    fn default() -> Self {
        Self::for_face(Vector3::new(0.0, 0.0, 0.0), 0)
    }
}

impl ShadowUniform {
    pub fn for_face(light: Vector3<f32>, face: usize) -> Self {
        Self {
            view_proj: (face_projection() * face_view(light, face)).into(),
            light_pos: light.into(),
            far: SHADOW_FAR_PLANE,
        }
    }
}

/// (look direction, up) per cube face in +X, -X, +Y, -Y, +Z, -Z order.
const FACES: [([f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
];

pub fn face_view(light: Vector3<f32>, face: usize) -> Matrix4<f32> {
    let (direction, up) = FACES[face % FACES.len()];
    let eye = Point3::from_vec(light);
    Matrix4::look_at_lh(eye, eye + Vector3::from(direction), Vector3::from(up))
}

/// 90° square left-handed perspective with a 0..1 depth range.
pub fn face_projection() -> Matrix4<f32> {
    let (near, far) = (SHADOW_NEAR_PLANE, SHADOW_FAR_PLANE);
    let f = 1.0 / (std::f32::consts::FRAC_PI_4).tan();
    let range = far / (far - near);
    #[rustfmt::skip]
    let projection = Matrix4::new(
        f,   0.0, 0.0,            0.0,
        0.0, f,   0.0,            0.0,
        0.0, 0.0, range,          1.0,
        0.0, 0.0, -near * range,  0.0,
    );
    projection
}

/// Depth cubes of every shadow caster.
pub struct ShadowMaps {
    point: ShadowCube,
    spot: ShadowCube,
    size: u32,
}

impl ShadowMaps {
    pub fn new(device: &wgpu::Device, size: u32) -> Self {
        Self {
            point: ShadowCube::new(device, size, "Point Shadow Cube"),
            spot: ShadowCube::new(device, size, "Spot Shadow Cube"),
            size,
        }
    }

    pub fn cube(&self, caster: ShadowCaster) -> &ShadowCube {
        match caster {
            ShadowCaster::Point => &self.point,
            ShadowCaster::Spot => &self.spot,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Resets every face to the far plane so nothing reads as shadowed.
    pub fn clear(&self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Shadow Clear Encoder"),
        });
        for caster in ShadowCaster::ALL {
            for view in &self.cube(caster).face_views {
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Shadow Clear Pass"),
                    color_attachments: &[],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector4};

    fn project(light: Vector3<f32>, face: usize, point: Vector3<f32>) -> Vector4<f32> {
        let uniform = ShadowUniform::for_face(light, face);
        Matrix4::from(uniform.view_proj) * point.extend(1.0)
    }

    #[test]
    fn test_each_face_centres_its_axis() {
        let light = Vector3::new(0.0, 10.0, 0.0);
        for (face, (direction, _)) in FACES.iter().enumerate() {
            let point = light + Vector3::from(*direction) * 5.0;
            let clip = project(light, face, point);
            assert!(clip.x.abs() < 1e-4, "face {face}: x = {}", clip.x);
            assert!(clip.y.abs() < 1e-4, "face {face}: y = {}", clip.y);
            assert!((clip.w - 5.0).abs() < 1e-4, "face {face}: w = {}", clip.w);
            let depth = clip.z / clip.w;
            assert!(depth > 0.0 && depth < 1.0);
        }
    }

    #[test]
    fn test_faces_see_disjoint_directions() {
        let light = Vector3::new(1.0, 2.0, 3.0);
        let point = light + Vector3::new(4.0, 0.5, -0.5);
        let visible: Vec<usize> = (0..6)
            .filter(|&face| {
                let clip = project(light, face, point);
                clip.w > 0.0 && clip.x.abs() <= clip.w && clip.y.abs() <= clip.w
            })
            .collect();
        assert_eq!(visible, vec![0]);
    }

    #[test]
    fn test_up_vectors_are_perpendicular() {
        for (direction, up) in FACES {
            assert_eq!(Vector3::from(direction).dot(Vector3::from(up)), 0.0);
        }
    }

    #[test]
    fn test_uniform_size() {
        assert_eq!(std::mem::size_of::<ShadowUniform>() as u64, crate::constants::size::SHADOW_UNIFORM);
        assert_eq!(ShadowUniform::default().far, SHADOW_FAR_PLANE);
    }
}
