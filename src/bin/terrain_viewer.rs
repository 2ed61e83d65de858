//! Interactive terrain viewer.
//!
//! Generates a heightfield mesh (Perlin noise or heightmap image) and renders
//! it with diffuse shading, a height-based color ramp, and a free-fly camera.
//!
//! Controls: WASD move, Space/LCtrl up/down, mouse look, F wireframe toggle,
//! T terrain-mode toggle (full regeneration), Esc quit.

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use wgpu::util::DeviceExt;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalSize, Size},
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, WindowAttributes, WindowId},
};

use terramesh::camera::{Camera, CameraController, MoveDirection};
use terramesh::terrain::{build_terrain, NoiseParams, TerrainConfig, TerrainMesh, TerrainMode};

#[derive(Parser, Debug)]
#[command(name = "terrain_viewer")]
#[command(about = "Interactive viewer for generated heightfield terrain")]
struct Args {
    /// Grid width in vertices (noise mode).
    #[arg(long, default_value = "200")]
    width: u32,

    /// Grid height in vertices (noise mode).
    #[arg(long, default_value = "200")]
    height: u32,

    /// Start in image-heightmap mode instead of noise mode.
    #[arg(long)]
    image: bool,

    /// Heightmap image path (required to enter image mode).
    #[arg(long)]
    heightmap: Option<PathBuf>,

    /// Vertical exaggeration applied to every height sample.
    #[arg(long, default_value = "50.0")]
    height_scale: f32,

    /// Horizontal frequency of the noise field.
    #[arg(long, default_value = "0.03")]
    noise_scale: f32,

    /// Number of noise octaves (1-16).
    #[arg(long, default_value = "6")]
    octaves: u32,

    /// Amplitude decay per octave, strictly between 0 and 1.
    #[arg(long, default_value = "0.5")]
    persistence: f32,

    /// Random seed; omit for a fresh field on every (re)generation.
    #[arg(short, long)]
    seed: Option<u64>,
}

type AnyResult<T> = Result<T, Box<dyn Error>>;

fn other_err(msg: impl Into<String>) -> Box<dyn Error> {
    Box::new(io::Error::new(io::ErrorKind::Other, msg.into()))
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 3],
    height_scale: f32,
    light_pos: [f32; 3],
    _pad0: f32,
    light_color: [f32; 3],
    _pad1: f32,
}

impl Uniforms {
    fn new(camera: &Camera, aspect: f32, height_scale: f32) -> Self {
        Self {
            view_proj: camera.view_projection(aspect).to_cols_array_2d(),
            camera_pos: camera.position.to_array(),
            height_scale,
            light_pos: [50.0, 200.0, 50.0],
            _pad0: 0.0,
            light_color: [1.0, 1.0, 1.0],
            _pad1: 0.0,
        }
    }
}

fn main() -> AnyResult<()> {
    env_logger::init();
    let args = Args::parse();

    let config = TerrainConfig {
        mode: if args.image {
            TerrainMode::Image
        } else {
            TerrainMode::Noise
        },
        width: args.width,
        height: args.height,
        height_scale: args.height_scale,
        noise: NoiseParams {
            noise_scale: args.noise_scale,
            octaves: args.octaves,
            persistence: args.persistence,
        },
        heightmap_path: args.heightmap,
        seed: args.seed,
    };

    // Generation is synchronous and runs to completion before the window
    // opens; a failed or empty build is fatal, no fallback terrain.
    let mesh = build_terrain(&config).map_err(|e| other_err(e.to_string()))?;
    if mesh.is_empty() {
        return Err(other_err("terrain generation produced an empty mesh"));
    }
    println!(
        "Terrain generated: {} vertices, {} indices",
        mesh.vertex_count(),
        mesh.index_count()
    );

    let event_loop = EventLoop::new()?;

    let mut app = App {
        config,
        pending_mesh: Some(mesh),
        window: None,
        window_id: None,
        state: None,
        camera: Camera::default(),
        controller: CameraController::default(),
        wireframe: false,
        last_frame: Instant::now(),
    };

    event_loop.run_app(&mut app)?;
    Ok(())
}

struct App {
    config: TerrainConfig,
    pending_mesh: Option<TerrainMesh>,

    window: Option<&'static winit::window::Window>,
    window_id: Option<WindowId>,
    state: Option<GpuState>,

    camera: Camera,
    controller: CameraController,
    wireframe: bool,
    last_frame: Instant,
}

impl App {
    /// Discards the current buffers and rebuilds the terrain in the other
    /// mode. On failure the previous terrain stays up.
    fn toggle_terrain_mode(&mut self) {
        let mut next = self.config.clone();
        next.mode = self.config.mode.toggled();

        match build_terrain(&next) {
            Ok(mesh) if !mesh.is_empty() => {
                println!(
                    "Switched to {:?} mode: {} vertices, {} indices",
                    next.mode,
                    mesh.vertex_count(),
                    mesh.index_count()
                );
                self.config = next;
                if let Some(state) = self.state.as_mut() {
                    state.mesh = MeshBuffers::upload(&state.device, &mesh);
                }
            }
            Ok(_) => {
                log::warn!("regeneration produced an empty mesh; keeping current terrain");
            }
            Err(e) => {
                log::warn!("terrain regeneration failed: {}; keeping current terrain", e);
            }
        }
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool, repeat: bool) {
        let direction = match code {
            KeyCode::KeyW => Some(MoveDirection::Forward),
            KeyCode::KeyS => Some(MoveDirection::Backward),
            KeyCode::KeyA => Some(MoveDirection::Left),
            KeyCode::KeyD => Some(MoveDirection::Right),
            KeyCode::Space => Some(MoveDirection::Up),
            KeyCode::ControlLeft => Some(MoveDirection::Down),
            _ => None,
        };
        if let Some(direction) = direction {
            self.controller.set_moving(direction, pressed);
            return;
        }

        if !pressed || repeat {
            return;
        }
        match code {
            KeyCode::KeyF => {
                let supported = self
                    .state
                    .as_ref()
                    .is_some_and(|s| s.pipeline_wire.is_some());
                if supported {
                    self.wireframe = !self.wireframe;
                } else {
                    log::warn!("wireframe mode unavailable: adapter lacks POLYGON_MODE_LINE");
                }
            }
            KeyCode::KeyT => self.toggle_terrain_mode(),
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title("terramesh viewer")
                    .with_inner_size(Size::Physical(PhysicalSize::new(1280u32, 720u32))),
            )
            .expect("failed to create window");

        // Leak the window so we can hold a `'static` reference for wgpu surface lifetime.
        let window: &'static winit::window::Window = Box::leak(Box::new(window));
        self.window_id = Some(window.id());
        self.window = Some(window);

        // Free-fly mouse look wants a captured cursor; not every platform
        // supports locking, so fall back to confinement.
        if window.set_cursor_grab(CursorGrabMode::Locked).is_err() {
            window.set_cursor_grab(CursorGrabMode::Confined).ok();
        }
        window.set_cursor_visible(false);

        let mesh = self
            .pending_mesh
            .take()
            .expect("initial terrain mesh must be built before the event loop starts");
        let gpu = pollster::block_on(GpuState::new(window, &mesh))
            .expect("failed to initialize GPU state");

        self.state = Some(gpu);
        self.last_frame = Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if Some(window_id) != self.window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(state) = self.state.as_mut() {
                    state.resize(size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    event_loop.exit();
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.handle_key(code, event.state == ElementState::Pressed, event.repeat);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                // Clamp dt so a stall does not teleport the camera.
                let dt = (now - self.last_frame).as_secs_f32().min(0.1);
                self.last_frame = now;
                self.controller.update(&mut self.camera, dt);

                let Some(state) = self.state.as_mut() else { return };
                let uniforms = Uniforms::new(
                    &self.camera,
                    state.aspect(),
                    self.config.height_scale,
                );
                if let Err(e) = state.render(&uniforms, self.wireframe) {
                    match e {
                        wgpu::SurfaceError::Lost => state.reconfigure_surface(),
                        wgpu::SurfaceError::OutOfMemory => event_loop.exit(),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &winit::event_loop::ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.controller
                .mouse_look(&mut self.camera, dx as f32, dy as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        if let Some(w) = self.window {
            w.request_redraw();
        }
    }
}

/// GPU-side terrain buffers.
///
/// Owns the vertex and index buffers for one uploaded mesh; replaced
/// wholesale on regeneration.
struct MeshBuffers {
    vertex_buf: wgpu::Buffer,
    index_buf: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn upload(device: &wgpu::Device, mesh: &TerrainMesh) -> Self {
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain-vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain-indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buf,
            index_buf,
            index_count: mesh.indices.len() as u32,
        }
    }

    fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.vertex_buf.slice(..));
        rpass.set_index_buffer(self.index_buf.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

struct GpuState {
    window_size: PhysicalSize<u32>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    depth_view: wgpu::TextureView,
    uniforms_buf: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline_fill: wgpu::RenderPipeline,
    pipeline_wire: Option<wgpu::RenderPipeline>,
    mesh: MeshBuffers,
}

impl GpuState {
    async fn new(window: &'static winit::window::Window, mesh: &TerrainMesh) -> AnyResult<Self> {
        let window_size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| other_err("No suitable GPU adapter found"))?;

        // Wireframe rendering needs line polygon mode; request it only when
        // the adapter can provide it and skip the wire pipeline otherwise.
        let wire_supported = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if wire_supported {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            wgpu::Features::empty()
        };

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("terrain-viewer-device"),
                    required_features,
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: window_size.width.max(1),
            height: window_size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, config.width, config.height);

        let uniforms_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("terrain-uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("terrain-shader"),
            source: wgpu::ShaderSource::Wgsl(TERRAIN_WGSL.into()),
        });

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("terrain-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Uniforms>() as u64),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("terrain-bind-group"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms_buf.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("terrain-pipeline-layout"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });

        // Interleaved position.xyz + normal.xyz, 6 floats per vertex.
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: 6 * std::mem::size_of::<f32>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 3 * std::mem::size_of::<f32>() as wgpu::BufferAddress,
                    shader_location: 1,
                },
            ],
        };

        let make_pipeline = |label: &str, polygon_mode: wgpu::PolygonMode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[vertex_layout.clone()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: if polygon_mode == wgpu::PolygonMode::Fill {
                        Some(wgpu::Face::Back)
                    } else {
                        None
                    },
                    polygon_mode,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let pipeline_fill = make_pipeline("terrain-pipeline-fill", wgpu::PolygonMode::Fill);
        let pipeline_wire =
            wire_supported.then(|| make_pipeline("terrain-pipeline-wire", wgpu::PolygonMode::Line));

        let mesh = MeshBuffers::upload(&device, mesh);

        Ok(Self {
            window_size,
            surface,
            device,
            queue,
            config,
            depth_view,
            uniforms_buf,
            bind_group,
            pipeline_fill,
            pipeline_wire,
            mesh,
        })
    }

    fn aspect(&self) -> f32 {
        (self.config.width.max(1) as f32) / (self.config.height.max(1) as f32)
    }

    fn reconfigure_surface(&mut self) {
        self.config.width = self.window_size.width.max(1);
        self.config.height = self.window_size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, self.config.width, self.config.height);
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.window_size = size;
        self.reconfigure_surface();
    }

    fn render(&mut self, uniforms: &Uniforms, wireframe: bool) -> Result<(), wgpu::SurfaceError> {
        self.queue
            .write_buffer(&self.uniforms_buf, 0, bytemuck::bytes_of(uniforms));

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("terrain-encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("terrain-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.2,
                            g: 0.3,
                            b: 0.3,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let pipeline = if wireframe {
                self.pipeline_wire.as_ref().unwrap_or(&self.pipeline_fill)
            } else {
                &self.pipeline_fill
            };
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, &self.bind_group, &[]);
            self.mesh.draw(&mut rpass);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("terrain-depth"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}

const TERRAIN_WGSL: &str = r#"
struct Uniforms {
  view_proj: mat4x4<f32>,
  camera_pos: vec3<f32>,
  height_scale: f32,
  light_pos: vec3<f32>,
  _pad0: f32,
  light_color: vec3<f32>,
  _pad1: f32,
};

@group(0) @binding(0) var<uniform> u: Uniforms;

struct VsIn {
  @location(0) position: vec3<f32>,
  @location(1) normal: vec3<f32>,
};

struct VsOut {
  @builtin(position) clip: vec4<f32>,
  @location(0) world_pos: vec3<f32>,
  @location(1) normal: vec3<f32>,
};

@vertex
fn vs_main(in: VsIn) -> VsOut {
  var out: VsOut;
  out.world_pos = in.position;
  out.normal = in.normal;
  out.clip = u.view_proj * vec4<f32>(in.position, 1.0);
  return out;
}

// Height-based color ramp: grass in the valleys, rock on the slopes,
// snow on the peaks. `relative` is height / height_scale, roughly [-1, 1]
// for noise terrain and [0, 1] for heightmap terrain.
fn terrain_color(relative: f32) -> vec3<f32> {
  let grass = vec3<f32>(0.22, 0.45, 0.22);
  let rock = vec3<f32>(0.45, 0.42, 0.40);
  let snow = vec3<f32>(0.93, 0.94, 0.95);
  let t = clamp(relative * 0.5 + 0.5, 0.0, 1.0);
  if (t < 0.6) {
    return mix(grass, rock, smoothstep(0.25, 0.6, t));
  }
  return mix(rock, snow, smoothstep(0.6, 0.85, t));
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
  let n = normalize(in.normal);
  let light_dir = normalize(u.light_pos - in.world_pos);
  let diffuse = max(dot(n, light_dir), 0.0);
  let ambient = 0.25;
  let base = terrain_color(in.world_pos.y / u.height_scale);
  let color = base * u.light_color * (ambient + diffuse);
  return vec4<f32>(color, 1.0);
}
"#;
