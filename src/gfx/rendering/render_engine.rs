//! WGPU frame orchestration
//!
//! Owns the surface, device and every frame-global GPU resource, and drives
//! the three passes of a frame in order: shadow cube faces, the shaded main
//! pass into the offscreen scene color target, then the post-process pass
//! onto the swapchain image with the GUI overlay on top.

use std::collections::HashMap;

use cgmath::Matrix4;

use super::{
    contract::{self, ShaderContract},
    pass::{PassKind, ShadowCaster},
    pipeline_manager::{DepthConfig, PipelineConfig, PipelineManager},
    post_process::{screen_quad_desc, PostProcess, PostUniform},
    shadow::{ShadowMaps, ShadowUniform},
};
use crate::{
    assets::TextureLibrary,
    config::DemoConfig,
    constants::{CLEAR_COLOR, MAX_TEXTURE_DIMENSION},
    error::SetupError,
    gfx::{
        camera::CameraUniform,
        lighting::LightSystem,
        resources::{
            BindGroupLayouts, DrawableGpu, GlobalBindings, TextureResource, TextureSlots,
        },
        scene::{Drawable, RenderVisitor, SceneGraph, SceneNode},
    },
};

const RENDER_PIPELINE: &str = "render";
const SHADOW_PIPELINE: &str = "shadow";
const POST_PIPELINE: &str = "post_process";

const SHADERS: [(ShaderContract, &str); 3] = [
    (contract::RENDER, include_str!("render.wgsl")),
    (contract::SHADOW, include_str!("shadow.wgsl")),
    (contract::POST_PROCESS, include_str!("post_process.wgsl")),
];

/// Setup progress. Only a `Ready` engine renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EngineState {
    Uninitialized,
    AdapterAcquired,
    DeviceReady,
    PipelinesBuilt,
    Ready,
}

/// Per-frame values produced by the update step.
pub struct FrameInputs<'a> {
    pub camera: CameraUniform,
    pub lights: &'a LightSystem,
    pub post: PostUniform,
    pub shadows: bool,
}

/// What a rendered frame drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub shadow_draws: usize,
    pub draws: usize,
}

/// Hands each drawable node to the active render pass.
struct DrawVisitor<'a, 'pass> {
    queue: &'a wgpu::Queue,
    render_pass: &'a mut wgpu::RenderPass<'pass>,
    drawn: usize,
}

impl RenderVisitor for DrawVisitor<'_, '_> {
    fn visit(&mut self, node: &mut SceneNode, world: &Matrix4<f32>, pass: PassKind) {
        let Some(renderable) = node.kind.as_renderable_mut() else {
            return;
        };
        let Drawable { mesh, gpu } = renderable.drawable_mut();
        let Some(gpu) = gpu.as_mut() else {
            return;
        };
        gpu.write_uniform(self.queue, world, &**mesh);
        if pass.is_shadow() {
            gpu.draw_depth(self.render_pass);
        } else {
            gpu.draw(self.render_pass);
        }
        self.drawn += 1;
    }
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    format: wgpu::TextureFormat,
    state: EngineState,
    pipeline_manager: PipelineManager,
    layouts: BindGroupLayouts,
    global_bindings: GlobalBindings,

    shadow_maps: ShadowMaps,
    // Set once the cubes hold the cleared state, so disabling shadows
    // costs one clear instead of one per frame.
    shadows_cleared: bool,

    depth_texture: TextureResource,
    scene_color: TextureResource,
    post: PostProcess,

    object_sampler: wgpu::Sampler,
    blank_texture: TextureResource,
    material_textures: HashMap<String, TextureResource>,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Brings the GPU up step by step, checks every shader against its bind
    /// slot contract and builds the three pipelines. Any failure is fatal and
    /// returned as a [`SetupError`].
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        settings: &DemoConfig,
    ) -> Result<Self, SetupError> {
        let mut state = EngineState::Uninitialized;
        let (width, height) = (width.max(1), height.max(1));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        advance(&mut state, EngineState::AdapterAcquired);
        log::info!("Using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Scenic Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: MAX_TEXTURE_DIMENSION,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(SetupError::NoSurfaceFormat)?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: present_mode(settings.vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        advance(&mut state, EngineState::DeviceReady);

        let layouts = BindGroupLayouts::new(&device);
        let depth_texture = TextureResource::create_depth_texture(&device, width, height, "Depth Texture");
        let scene_color = TextureResource::create_scene_color(&device, width, height);
        let post = PostProcess::new(&device, &scene_color.view);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        for (shader_contract, source) in SHADERS {
            shader_contract.verify(source)?;
            pipeline_manager.load_shader(shader_contract.shader, source)?;
        }

        pipeline_manager.register_pipeline(
            RENDER_PIPELINE,
            PipelineConfig::default_with_shader(contract::RENDER.shader)
                .with_label("Render Pipeline")
                .with_bind_group_layouts(vec![
                    layouts.object.layout.clone(),
                    layouts.lights.layout.clone(),
                    layouts.scene.layout.clone(),
                ])
                .with_depth_stencil(DepthConfig::new(TextureResource::DEPTH_FORMAT))
                .with_color_target(TextureResource::SCENE_COLOR_FORMAT),
        );

        // Both faces are drawn so open meshes still cast shadows. Depth is
        // written by the shader, the bias is applied when sampling.
        pipeline_manager.register_pipeline(
            SHADOW_PIPELINE,
            PipelineConfig::default_with_shader(contract::SHADOW.shader)
                .with_label("Shadow Pipeline")
                .with_cull_mode(None)
                .with_bind_group_layouts(vec![
                    layouts.shadow_object.layout.clone(),
                    layouts.shadow.layout.clone(),
                ])
                .with_depth_stencil(DepthConfig::new(TextureResource::DEPTH_FORMAT)),
        );

        pipeline_manager.register_pipeline(
            POST_PIPELINE,
            PipelineConfig::default_with_shader(contract::POST_PROCESS.shader)
                .with_label("Post Process Pipeline")
                .with_cull_mode(None)
                .with_vertex_layouts(vec![screen_quad_desc()])
                .with_bind_group_layouts(vec![post.layout().clone()])
                .with_color_target(format),
        );

        pipeline_manager.create_all_pipelines()?;
        advance(&mut state, EngineState::PipelinesBuilt);

        let shadow_maps = ShadowMaps::new(&device, settings.shadow_map_size);
        let shadow_sampler = TextureResource::create_shadow_sampler(&device);
        let global_bindings = GlobalBindings::new(&device, &layouts, &shadow_maps, &shadow_sampler);
        let object_sampler = TextureResource::create_object_sampler(&device);
        let blank_texture = TextureResource::create_solid(&device, &queue, [255; 4], "Blank Texture");
        advance(&mut state, EngineState::Ready);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            format,
            state,
            pipeline_manager,
            layouts,
            global_bindings,
            shadow_maps,
            shadows_cleared: false,
            depth_texture,
            scene_color,
            post,
            object_sampler,
            blank_texture,
            material_textures: HashMap::new(),
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Creates GPU resources for every drawable node that has none yet.
    ///
    /// Textures are uploaded once per file name and shared between nodes.
    /// Returns the number of nodes that were prepared.
    pub fn prepare_drawables(&mut self, scene: &mut SceneGraph, textures: &mut TextureLibrary) -> usize {
        let mut prepared = 0;
        for node in scene.nodes_mut() {
            let Some(renderable) = node.kind.as_renderable_mut() else {
                continue;
            };
            let drawable = renderable.drawable_mut();
            if drawable.gpu.is_some() {
                continue;
            }
            let mesh = drawable.mesh.clone();
            let set = &mesh.textures;
            for name in [&set.ambient, &set.diffuse, &set.specular, &set.normal]
                .into_iter()
                .flatten()
            {
                self.upload_texture(textures, name);
            }

            let slots = TextureSlots {
                ambient: self.texture_view(set.ambient.as_deref()),
                diffuse: self.texture_view(set.diffuse.as_deref()),
                specular: self.texture_view(set.specular.as_deref()),
                normal: self.texture_view(set.normal.as_deref()),
            };
            let gpu = DrawableGpu::new(&self.device, &self.layouts, &self.object_sampler, &mesh, slots);
            log::debug!(
                "Prepared '{}': {} vertices, texture mode {:#06b}",
                node.name,
                mesh.vertex_count(),
                gpu.texture_mode().bits()
            );
            drawable.gpu = Some(gpu);
            prepared += 1;
        }
        prepared
    }

    fn upload_texture(&mut self, textures: &mut TextureLibrary, name: &str) {
        if self.material_textures.contains_key(name) {
            return;
        }
        let image = textures.get(name);
        let resource = TextureResource::create_from_image(&self.device, &self.queue, &image, name);
        self.material_textures.insert(name.to_string(), resource);
    }

    fn texture_view(&self, name: Option<&str>) -> &wgpu::TextureView {
        name.and_then(|name| self.material_textures.get(name))
            .map(|resource| &resource.view)
            .unwrap_or(&self.blank_texture.view)
    }

    /// Renders a frame with an optional UI overlay
    ///
    /// The overlay callback records into the frame's encoder after the post
    /// pass, targeting the swapchain view.
    pub fn render_frame<F>(
        &mut self,
        scene: &mut SceneGraph,
        inputs: &FrameInputs<'_>,
        ui_callback: Option<F>,
    ) -> Result<FrameStats, wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        if self.state != EngineState::Ready {
            log::warn!("Frame skipped, engine is {:?}", self.state);
            return Ok(FrameStats::default());
        }

        let surface_texture = self.surface.get_current_texture()?;
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.global_bindings
            .light_buffer
            .update_bytes(&self.queue, &inputs.lights.pack());
        self.global_bindings
            .camera_ubo
            .update_content(&self.queue, inputs.camera);
        self.post.update(&self.queue, inputs.post);

        let mut stats = FrameStats::default();
        if inputs.shadows {
            stats.shadow_draws = self.render_shadows(scene, inputs.lights);
            self.shadows_cleared = false;
        } else if !self.shadows_cleared {
            self.shadow_maps.clear(&self.device, &self.queue);
            self.shadows_cleared = true;
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.scene_color.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(RENDER_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                self.global_bindings.bind_render(&mut render_pass);
                let mut visitor = DrawVisitor {
                    queue: &self.queue,
                    render_pass: &mut render_pass,
                    drawn: 0,
                };
                scene.render(PassKind::Render, &mut visitor);
                stats.draws = visitor.drawn;
            }
        }

        {
            let mut post_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Post Process Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(POST_PIPELINE) {
                post_pass.set_pipeline(pipeline);
                self.post.draw(&mut post_pass);
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(&self.device, &self.queue, &mut encoder, &surface_view);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(stats)
    }

    /// Renders all six faces of every caster's cube.
    ///
    /// The shadow uniform is shared by every face, so each face is written
    /// and submitted on its own before the next one overwrites it.
    fn render_shadows(&mut self, scene: &mut SceneGraph, lights: &LightSystem) -> usize {
        let Some(pipeline) = self.pipeline_manager.get_pipeline(SHADOW_PIPELINE) else {
            return 0;
        };
        let mut drawn = 0;
        for caster in ShadowCaster::ALL {
            let Some(light) = lights.shadow_caster_position(caster) else {
                continue;
            };
            let cube = self.shadow_maps.cube(caster);
            for (face, face_view) in cube.face_views.iter().enumerate() {
                self.global_bindings
                    .shadow_ubo
                    .force_update_content(&self.queue, ShadowUniform::for_face(light, face));

                let mut encoder = self
                    .device
                    .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                        label: Some("Shadow Encoder"),
                    });
                {
                    let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some(&format!("Shadow Pass ({} face {})", caster.label(), face)),
                        color_attachments: &[],
                        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                            view: face_view,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        }),
                        occlusion_query_set: None,
                        timestamp_writes: None,
                    });
                    shadow_pass.set_pipeline(pipeline);
                    self.global_bindings.bind_shadow(&mut shadow_pass);

                    let mut visitor = DrawVisitor {
                        queue: &self.queue,
                        render_pass: &mut shadow_pass,
                        drawn: 0,
                    };
                    scene.render(PassKind::Shadow { caster, face }, &mut visitor);
                    drawn += visitor.drawn;
                }
                self.queue.submit(std::iter::once(encoder.finish()));
            }
        }
        drawn
    }

    /// Resizes the surface and recreates the size-dependent targets
    ///
    /// Zero-sized requests (minimised windows) are ignored. The shadow cubes
    /// keep their fixed resolution.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture = TextureResource::create_depth_texture(&self.device, width, height, "Depth Texture");
        self.scene_color = TextureResource::create_scene_color(&self.device, width, height);
        self.post.resize(&self.device, &self.scene_color.view);
        log::debug!("Resized render targets to {}x{}", width, height);
    }

    /// Reconfigures the surface with its current size after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn vsync(&self) -> bool {
        self.config.present_mode == present_mode(true)
    }

    /// Switches the present mode. Reconfigures the surface only on change.
    pub fn set_vsync(&mut self, enable: bool) {
        if self.vsync() == enable {
            return;
        }
        self.config.present_mode = present_mode(enable);
        self.surface.configure(&self.device, &self.config);
        log::info!("Present mode set to {:?}", self.config.present_mode);
    }

    /// Returns current surface dimensions
    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn shadow_map_size(&self) -> u32 {
        self.shadow_maps.size()
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

fn advance(state: &mut EngineState, next: EngineState) {
    debug_assert!(next > *state, "setup went from {:?} back to {:?}", state, next);
    log::info!("Render engine: {:?} -> {:?}", state, next);
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_advance_in_setup_order() {
        let order = [
            EngineState::Uninitialized,
            EngineState::AdapterAcquired,
            EngineState::DeviceReady,
            EngineState::PipelinesBuilt,
            EngineState::Ready,
        ];
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]));

        let mut state = EngineState::Uninitialized;
        for next in &order[1..] {
            advance(&mut state, *next);
        }
        assert_eq!(state, EngineState::Ready);
    }

    #[test]
    fn test_bundled_shaders_pass_their_contracts() {
        for (shader_contract, source) in SHADERS {
            assert!(shader_contract.verify(source).is_ok(), "{}", shader_contract.shader);
        }
        let names: Vec<&str> = SHADERS.iter().map(|(c, _)| c.shader).collect();
        assert_eq!(names, vec![RENDER_PIPELINE, SHADOW_PIPELINE, POST_PIPELINE]);
    }

    #[test]
    fn test_present_mode_follows_vsync() {
        assert_eq!(present_mode(true), wgpu::PresentMode::AutoVsync);
        assert_eq!(present_mode(false), wgpu::PresentMode::AutoNoVsync);
    }
}
