//! winit application: window, event routing and the update-then-render loop

use std::{path::Path, sync::Arc};

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    assets::{import_model, ImportedObject, TextureLibrary},
    config::DemoConfig,
    error::SetupError,
    gfx::{
        camera::MovableCamera,
        lighting::LightSystem,
        rendering::{FrameInputs, FrameStats, PostUniform, RenderEngine},
        scene::{Classification, Drawable, NodeId, NodeKind, Pose, SceneGraph},
        ui::{control_panel, PanelStats, PanelValues, UiManager},
    },
    input::{controls, InputState},
    orrery::Orrery,
};

/// Nodes created while populating the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneReport {
    pub static_nodes: usize,
    pub bodies: usize,
    pub dropped: usize,
}

/// Loads the configured static models and places the orrery bodies.
///
/// Models that fail to import are logged and skipped. Objects whose parent
/// name does not resolve are logged and dropped.
pub fn populate_scene(config: &DemoConfig, graph: &mut SceneGraph) -> SceneReport {
    let mut report = SceneReport::default();

    for name in &config.models {
        let Some(objects) = import_or_skip(&config.model_dir(name), name) else {
            continue;
        };
        for object in objects {
            let Some(parent) = resolve_parent(graph, &object) else {
                report.dropped += 1;
                continue;
            };
            let pose = Pose::new(object.placement.loc, object.placement.rot, object.placement.scl);
            let kind = NodeKind::Drawable(Drawable::new(object.mesh.clone()));
            match graph.create_parented_object(parent, kind, pose, Classification::Visual) {
                Some(_) => report.static_nodes += 1,
                None => report.dropped += 1,
            }
        }
    }

    let mut orrery = Orrery::seeded(config.orrery_seed);
    for name in &config.planets {
        let Some(objects) = import_or_skip(&config.planet_dir(name), name) else {
            continue;
        };
        let Some(first) = objects.first() else {
            continue;
        };
        let Some(parent) = resolve_parent(graph, first) else {
            report.dropped += objects.len();
            continue;
        };
        report.bodies += orrery.add_body(graph, parent, &objects).len();
    }

    log::info!(
        "Scene populated: {} static node(s), {} orbiting node(s), {} dropped",
        report.static_nodes,
        report.bodies,
        report.dropped
    );
    report
}

fn import_or_skip(dir: &Path, name: &str) -> Option<Vec<ImportedObject>> {
    match import_model(dir, name) {
        Ok(objects) => Some(objects),
        Err(e) => {
            log::error!("Skipping model '{}': {}", name, e);
            None
        }
    }
}

/// `Some(None)` for top-level objects, `Some(Some(id))` for a resolved
/// parent, `None` when the named parent does not exist.
fn resolve_parent(graph: &SceneGraph, object: &ImportedObject) -> Option<Option<NodeId>> {
    match &object.parent {
        None => Some(None),
        Some(parent_name) => match graph.find_by_name(parent_name, None) {
            Some(id) => Some(Some(id)),
            None => {
                log::error!(
                    "Parent '{}' of '{}' not found, object not created",
                    parent_name,
                    object.name
                );
                None
            }
        },
    }
}

pub struct ScenicApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

/// GPU-side state that only exists once the window does.
struct Gpu {
    window: Arc<Window>,
    render_engine: RenderEngine,
    ui_manager: UiManager,
}

struct AppState {
    config: DemoConfig,
    gpu: Option<Gpu>,
    scene: SceneGraph,
    textures: TextureLibrary,
    camera: MovableCamera,
    lights: LightSystem,
    input: InputState,
    frame: u64,
    last_stats: FrameStats,
    setup_error: Option<SetupError>,
}

impl ScenicApp {
    /// Builds the scene from `config`. The window and GPU come up on the
    /// first `resumed` event.
    pub fn new(config: DemoConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create the event loop")?;

        let mut scene = SceneGraph::new(config.collision_mode);
        populate_scene(&config, &mut scene);
        let textures = TextureLibrary::new(config.texture_dir())
            .with_search_dir(config.asset_root.join("Models"));
        let lights = LightSystem::with_default_rig(config.ambient_light);

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                gpu: None,
                scene,
                textures,
                camera: MovableCamera::default(),
                lights,
                input: InputState::new(),
                frame: 0,
                last_stats: FrameStats::default(),
                setup_error: None,
                config,
            },
        })
    }

    /// Runs the event loop until the window closes or setup fails.
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut self.app_state)
            .context("event loop terminated abnormally")?;

        match self.app_state.setup_error.take() {
            Some(e) => Err(e).context("renderer setup failed"),
            None => Ok(()),
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.app_state.scene
    }
}

impl AppState {
    fn create_gpu(&self, event_loop: &ActiveEventLoop) -> Result<Option<Gpu>, SetupError> {
        let attributes = WindowAttributes::default()
            .with_title("Scenic")
            .with_inner_size(PhysicalSize::new(self.config.window_width, self.config.window_height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                return Ok(None);
            }
        };

        let (width, height) = window.inner_size().into();
        let render_engine =
            pollster::block_on(RenderEngine::new(window.clone(), width, height, &self.config))?;
        let mut ui_manager = UiManager::new(
            render_engine.device(),
            render_engine.queue(),
            render_engine.surface_format(),
            &window,
        );
        ui_manager.update_display_size(width, height);

        Ok(Some(Gpu {
            window,
            render_engine,
            ui_manager,
        }))
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let AppState {
            config,
            gpu,
            scene,
            textures,
            camera,
            lights,
            input,
            frame,
            last_stats,
            ..
        } = self;
        let Some(Gpu {
            window,
            render_engine,
            ui_manager,
        }) = gpu.as_mut()
        else {
            return;
        };

        let panel = PanelValues::read(input, config);
        if scene.collision_mode() != panel.collision_mode() {
            log::info!("Collision mode: {:?}", panel.collision_mode());
            scene.set_collision_mode(panel.collision_mode());
        }
        render_engine.set_vsync(panel.vsync);

        camera.update(input);
        if !input.button(controls::PAUSE) {
            scene.update();
            for event in scene.drain_events() {
                log::debug!("{:?} hit: {} <-> {}", event.kind, event.node, event.other);
            }
        }
        render_engine.prepare_drawables(scene, textures);

        let inputs = FrameInputs {
            camera: camera.uniform(),
            lights,
            post: PostUniform::from_input(input),
            shadows: panel.shadows,
        };
        let panel_stats = PanelStats {
            frame: *frame,
            nodes: scene.len(),
            draws: last_stats.draws,
            shadow_draws: last_stats.shadow_draws,
        };

        let result = render_engine.render_frame(
            scene,
            &inputs,
            Some(
                |device: &wgpu::Device,
                 queue: &wgpu::Queue,
                 encoder: &mut wgpu::CommandEncoder,
                 view: &wgpu::TextureView| {
                    ui_manager.draw(device, queue, encoder, window, view, |ui| {
                        control_panel(ui, input, &panel_stats, config);
                    });
                },
            ),
        );

        match result {
            Ok(stats) => {
                *last_stats = stats;
                *frame += 1;
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                render_engine.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Frame dropped: {}", e),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match self.create_gpu(event_loop) {
            Ok(Some(mut gpu)) => {
                let (width, height) = gpu.render_engine.surface_size();
                self.camera.set_viewport(width, height);
                let prepared = gpu
                    .render_engine
                    .prepare_drawables(&mut self.scene, &mut self.textures);
                log::info!("{} drawable(s) uploaded", prepared);
                self.gpu = Some(gpu);
            }
            Ok(None) => event_loop.exit(),
            Err(e) => {
                log::error!("{}", e);
                self.setup_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        if gpu.ui_manager.handle_input(&gpu.window, &ui_event) {
            gpu.window.request_redraw();
            return;
        }

        match event {
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if key_event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    event_loop.exit();
                }
                self.input.process_keyboard_event(&key_event);
            }
            WindowEvent::Focused(false) => self.input.clear_keys(),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                gpu.render_engine.resize(width, height);
                gpu.ui_manager.update_display_size(width, height);
                self.camera.set_viewport(width, height);
            }
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}
