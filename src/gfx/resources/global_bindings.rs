//! Bind group layouts and the frame-global bind groups
//!
//! Slot contract of the render pipeline:
//!
//! | group | bindings |
//! |---|---|
//! | 0 object | 0 uniform, 1 sampler, 2 ambient, 3 diffuse, 4 specular, 5 normal |
//! | 1 lights | 0 light uniform |
//! | 2 scene | 0 camera uniform, 1 comparison sampler, 2 point cube, 3 spot cube |
//!
//! The shadow pipeline binds the object uniform alone at group 0 and the
//! shadow uniform at group 1.

use crate::{
    constants::size,
    gfx::{
        camera::CameraUniform,
        rendering::{
            pass::ShadowCaster,
            shadow::{ShadowMaps, ShadowUniform},
        },
    },
    wgpu_utils::{
        binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
        RawUniformBuffer, UniformBuffer,
    },
};

/// Every bind group layout the pipelines are created against.
pub struct BindGroupLayouts {
    pub object: BindGroupLayoutWithDesc,
    pub lights: BindGroupLayoutWithDesc,
    pub scene: BindGroupLayoutWithDesc,
    pub shadow_object: BindGroupLayoutWithDesc,
    pub shadow: BindGroupLayoutWithDesc,
}

impl BindGroupLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let object = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::sized_uniform(size::OBJECT_UNIFORM))
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::texture_2d())
            .create(device, "Object Bind Group Layout");

        let lights = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::sized_uniform(size::LIGHT_UNIFORM))
            .create(device, "Light Bind Group Layout");

        let scene = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::sized_uniform(size::CAMERA_UNIFORM))
            .next_binding_fragment(binding_types::comparison_sampler())
            .next_binding_fragment(binding_types::depth_texture_cube())
            .next_binding_fragment(binding_types::depth_texture_cube())
            .create(device, "Scene Bind Group Layout");

        let shadow_object = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::sized_uniform(size::OBJECT_UNIFORM))
            .create(device, "Shadow Object Bind Group Layout");

        let shadow = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::sized_uniform(size::SHADOW_UNIFORM))
            .create(device, "Shadow Bind Group Layout");

        Self {
            object,
            lights,
            scene,
            shadow_object,
            shadow,
        }
    }
}

/// Buffers and bind groups shared by every draw of a frame.
pub struct GlobalBindings {
    pub light_buffer: RawUniformBuffer,
    pub camera_ubo: UniformBuffer<CameraUniform>,
    pub shadow_ubo: UniformBuffer<ShadowUniform>,
    light_group: wgpu::BindGroup,
    scene_group: wgpu::BindGroup,
    shadow_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(
        device: &wgpu::Device,
        layouts: &BindGroupLayouts,
        shadow_maps: &ShadowMaps,
        shadow_sampler: &wgpu::Sampler,
    ) -> Self {
        let light_buffer = RawUniformBuffer::new(device, size::LIGHT_UNIFORM, "Light Uniform Buffer");
        let camera_ubo = UniformBuffer::new_labelled(device, "Camera Uniform Buffer");
        let shadow_ubo = UniformBuffer::new_labelled(device, "Shadow Uniform Buffer");

        let light_group = BindGroupBuilder::new(&layouts.lights)
            .resource(light_buffer.binding_resource())
            .create(device, "Light Bind Group");

        let scene_group = BindGroupBuilder::new(&layouts.scene)
            .resource(camera_ubo.binding_resource())
            .sampler(shadow_sampler)
            .texture(&shadow_maps.cube(ShadowCaster::Point).cube_view)
            .texture(&shadow_maps.cube(ShadowCaster::Spot).cube_view)
            .create(device, "Scene Bind Group");

        let shadow_group = BindGroupBuilder::new(&layouts.shadow)
            .resource(shadow_ubo.binding_resource())
            .create(device, "Shadow Bind Group");

        Self {
            light_buffer,
            camera_ubo,
            shadow_ubo,
            light_group,
            scene_group,
            shadow_group,
        }
    }

    /// Binds groups 1 and 2 of the render pipeline.
    pub fn bind_render(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(1, &self.light_group, &[]);
        render_pass.set_bind_group(2, &self.scene_group, &[]);
    }

    /// Binds group 1 of the shadow pipeline.
    pub fn bind_shadow(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(1, &self.shadow_group, &[]);
    }
}
