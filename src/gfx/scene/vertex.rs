//! # Vertex Data Structures
//!
//! GPU vertex format shared by the render and shadow pipelines.

use crate::constants::offset::vertex;

/// A 3D vertex with position, normal and texture coordinates.
///
/// # Memory Layout
///
/// `#[repr(C)]` keeps the field order and gives a 32-byte stride, which is
/// what the shaders read at locations 0, 1 and 2.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
        wgpu::VertexAttribute {
            offset: vertex::POS,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: vertex::NML,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: vertex::UVS,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x2,
        },
    ];

    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// - Attribute 0: Position (Float32x3)
    /// - Attribute 1: Normal (Float32x3)
    /// - Attribute 2: UV (Float32x2)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: vertex::STRIDE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_stride_matches_layout() {
        assert_eq!(std::mem::size_of::<Vertex>() as u64, vertex::STRIDE);
        assert_eq!(Vertex::desc().attributes.len(), 3);
    }
}
