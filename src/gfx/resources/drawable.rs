//! Per-object GPU resources
//!
//! Owned by exactly one scene node: the expanded vertex buffer, the object
//! uniform and the two bind groups that expose it to the render and shadow
//! pipelines.

use cgmath::Matrix4;
use wgpu::util::DeviceExt;

use super::{
    global_bindings::BindGroupLayouts,
    material::{ObjectUniform, TextureMode},
};
use crate::{
    assets::Mesh,
    wgpu_utils::{BindGroupBuilder, UniformBuffer},
};

/// Views bound to the four texture slots of group 0. Slots the material
/// does not texture get the engine's dummy view.
pub struct TextureSlots<'a> {
    pub ambient: &'a wgpu::TextureView,
    pub diffuse: &'a wgpu::TextureView,
    pub specular: &'a wgpu::TextureView,
    pub normal: &'a wgpu::TextureView,
}

pub struct DrawableGpu {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    uniform: UniformBuffer<ObjectUniform>,
    render_group: wgpu::BindGroup,
    shadow_group: wgpu::BindGroup,
    texture_mode: TextureMode,
}

impl DrawableGpu {
    pub fn new(
        device: &wgpu::Device,
        layouts: &BindGroupLayouts,
        sampler: &wgpu::Sampler,
        mesh: &Mesh,
        slots: TextureSlots<'_>,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let uniform = UniformBuffer::new_labelled(device, &format!("{} Object Uniform", mesh.name));

        // A diffuse map stands in for a missing ambient map.
        let ambient_override = mesh.textures.ambient_override();
        let ambient = if ambient_override { slots.diffuse } else { slots.ambient };
        let mut texture_mode = mesh.textures.mode();
        if ambient_override {
            texture_mode |= TextureMode::AMBIENT;
        }

        let render_group = BindGroupBuilder::new(&layouts.object)
            .resource(uniform.binding_resource())
            .sampler(sampler)
            .texture(ambient)
            .texture(slots.diffuse)
            .texture(slots.specular)
            .texture(slots.normal)
            .create(device, &format!("{} Object Bind Group", mesh.name));
        let shadow_group = BindGroupBuilder::new(&layouts.shadow_object)
            .resource(uniform.binding_resource())
            .create(device, &format!("{} Shadow Object Bind Group", mesh.name));

        Self {
            vertex_buffer,
            vertex_count: mesh.vertex_count(),
            uniform,
            render_group,
            shadow_group,
            texture_mode,
        }
    }

    pub fn texture_mode(&self) -> TextureMode {
        self.texture_mode
    }

    pub fn write_uniform(&mut self, queue: &wgpu::Queue, world: &Matrix4<f32>, mesh: &Mesh) {
        self.uniform
            .update_content(queue, ObjectUniform::new(world, &mesh.material, self.texture_mode));
    }

    /// Binds group 0 of the render pipeline and draws.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(0, &self.render_group, &[]);
        self.draw_vertices(render_pass);
    }

    /// Binds group 0 of the shadow pipeline and draws.
    pub fn draw_depth(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(0, &self.shadow_group, &[]);
        self.draw_vertices(render_pass);
    }

    fn draw_vertices(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.vertex_count == 0 {
            return;
        }
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..self.vertex_count, 0..1);
    }
}
