//! Fullscreen post-processing of the scene color target
//!
//! The main pass renders into an offscreen [`SCENE_COLOR_FORMAT`] texture.
//! This pass draws a two-triangle quad over the swapchain image, sampling that
//! texture and applying exposure, vignette and an optional grayscale
//! conversion.
//!
//! [`SCENE_COLOR_FORMAT`]: crate::gfx::resources::TextureResource::SCENE_COLOR_FORMAT

use wgpu::util::DeviceExt;

use crate::{
    constants::size,
    input::{controls, InputState},
    wgpu_utils::{
        binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
        UniformBuffer,
    },
};

/// Post uniform, 16 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PostUniform {
    pub exposure: f32,
    pub vignette: f32,
    pub grayscale: u32,
    _padding: u32,
}

impl Default for PostUniform {
    fn default() -> Self {
        Self::new(1.0, 0.0, false)
    }
}

impl PostUniform {
    pub fn new(exposure: f32, vignette: f32, grayscale: bool) -> Self {
        Self {
            exposure: exposure.max(0.0),
            vignette: vignette.clamp(0.0, 1.0),
            grayscale: grayscale as u32,
            _padding: 0,
        }
    }

    /// Reads the panel mirrors, keeping the defaults for controls that were
    /// never touched.
    pub fn from_input(input: &InputState) -> Self {
        let defaults = Self::default();
        Self::new(
            input.slider_or(controls::EXPOSURE, defaults.exposure),
            input.slider_or(controls::VIGNETTE, defaults.vignette),
            input.toggle_or(controls::GRAYSCALE, false),
        )
    }
}

/// Two triangles covering clip space. xy is the position, zw the texture
/// coordinate with v pointing down.
#[rustfmt::skip]
pub const QUAD_VERTICES: [[f32; 4]; 6] = [
    [-1.0, -1.0, 0.0, 1.0],
    [ 1.0, -1.0, 1.0, 1.0],
    [ 1.0,  1.0, 1.0, 0.0],
    [-1.0, -1.0, 0.0, 1.0],
    [ 1.0,  1.0, 1.0, 0.0],
    [-1.0,  1.0, 0.0, 0.0],
];

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    offset: 0,
    shader_location: 0,
    format: wgpu::VertexFormat::Float32x4,
}];

pub fn screen_quad_desc() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &QUAD_ATTRIBUTES,
    }
}

/// Resources of the post pass. The bind group references the scene color
/// view and is rebuilt whenever that target is recreated.
pub struct PostProcess {
    layout: BindGroupLayoutWithDesc,
    sampler: wgpu::Sampler,
    quad: wgpu::Buffer,
    uniform: UniformBuffer<PostUniform>,
    bind_group: wgpu::BindGroup,
}

impl PostProcess {
    pub fn new(device: &wgpu::Device, scene_color: &wgpu::TextureView) -> Self {
        let layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sized_uniform(size::POST_UNIFORM))
            .create(device, "Post Bind Group Layout");

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Post Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let quad = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Screen Quad"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform = UniformBuffer::new_labelled(device, "Post Uniform Buffer");
        let bind_group = Self::create_bind_group(device, &layout, &sampler, scene_color, &uniform);

        Self {
            layout,
            sampler,
            quad,
            uniform,
            bind_group,
        }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        sampler: &wgpu::Sampler,
        scene_color: &wgpu::TextureView,
        uniform: &UniformBuffer<PostUniform>,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .sampler(sampler)
            .texture(scene_color)
            .resource(uniform.binding_resource())
            .create(device, "Post Bind Group")
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout.layout
    }

    /// Rebinds a freshly created scene color target.
    pub fn resize(&mut self, device: &wgpu::Device, scene_color: &wgpu::TextureView) {
        self.bind_group =
            Self::create_bind_group(device, &self.layout, &self.sampler, scene_color, &self.uniform);
    }

    pub fn update(&mut self, queue: &wgpu::Queue, settings: PostUniform) {
        self.uniform.update_content(queue, settings);
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.quad.slice(..));
        render_pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
    }
}
