//! wgpu backend implementation
//!
//! Primitives are buffered as vertex ranges during the frame and replayed in
//! a single render pass when the frame ends, against either the swapchain or
//! the active offscreen target.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use wgpu::util::DeviceExt;

use crate::backend::traits::*;
use crate::backend::types::*;

const SHADER: &str = r#"
struct VsIn {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
}

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
}

@vertex
fn vs_main(in: VsIn) -> VsOut {
    var out: VsOut;
    out.position = vec4<f32>(in.position, 0.0, 1.0);
    out.uv = in.uv;
    out.color = in.color;
    return out;
}

@fragment
fn fs_shape(in: VsOut) -> @location(0) vec4<f32> {
    return in.color;
}

@group(0) @binding(0) var t_color: texture_2d<f32>;
@group(0) @binding(1) var s_color: sampler;

@fragment
fn fs_sprite(in: VsOut) -> @location(0) vec4<f32> {
    return textureSample(t_color, s_color, in.uv) * in.color;
}
"#;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Vertex2d {
    position: [f32; 2],
    uv: [f32; 2],
    color: [f32; 4],
}

impl Vertex2d {
    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
            0 => Float32x2,
            1 => Float32x2,
            2 => Float32x4,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex2d>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeTopology {
    Triangles,
    Lines,
    Points,
}

/// Buffered draw replayed at frame end
enum FrameCommand {
    Shapes {
        topology: ShapeTopology,
        vertices: Range<u32>,
    },
    Textured {
        texture: u64,
        blend: BlendMode,
        vertices: Range<u32>,
    },
}

struct GpuTexture {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

struct OffscreenTarget {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct Pipelines {
    shape_triangles: wgpu::RenderPipeline,
    shape_lines: wgpu::RenderPipeline,
    shape_points: wgpu::RenderPipeline,
    sprite_alpha: wgpu::RenderPipeline,
    sprite_additive: wgpu::RenderPipeline,
}

/// wgpu backend implementation
pub struct WgpuBackend {
    #[allow(dead_code)]
    instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
    #[allow(dead_code)]
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,

    sampler: wgpu::Sampler,
    texture_layout: wgpu::BindGroupLayout,
    pipelines: Pipelines,

    textures: HashMap<u64, GpuTexture>,
    next_texture_id: u64,

    state: DrawState,
    render_target: Option<OffscreenTarget>,

    // Frame recording
    frame_texture: Option<wgpu::SurfaceTexture>,
    frame_active: bool,
    vertices: Vec<Vertex2d>,
    commands: Vec<FrameCommand>,
    draw_calls: u64,
}

impl WgpuBackend {
    /// Create a new backend against the given window
    pub fn new(window: Arc<winit::window::Window>, vsync: bool) -> BackendResult<Self> {
        pollster::block_on(Self::new_async(window, vsync))
    }

    async fn new_async(window: Arc<winit::window::Window>, vsync: bool) -> BackendResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| BackendError::SurfaceCreationFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| BackendError::InitializationFailed("No suitable adapter found".into()))?;

        let adapter_info = adapter.get_info();
        log::info!(
            "Selected GPU: {} ({:?} backend)",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Graphics Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .map_err(|e| BackendError::DeviceCreationFailed(e.to_string()))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let present_mode = if vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sprite Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipelines = Self::create_pipelines(&device, surface_format, &texture_layout);

        Ok(Self {
            instance,
            surface,
            adapter,
            device,
            queue,
            surface_config,
            sampler,
            texture_layout,
            pipelines,
            textures: HashMap::new(),
            next_texture_id: 1,
            state: DrawState::default(),
            render_target: None,
            frame_texture: None,
            frame_active: false,
            vertices: Vec::new(),
            commands: Vec::new(),
            draw_calls: 0,
        })
    }

    fn create_pipelines(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> Pipelines {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("2D Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let shape_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shape Pipeline Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let sprite_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[texture_layout],
            push_constant_ranges: &[],
        });

        let additive = wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        };

        let build = |label: &str,
                     layout: &wgpu::PipelineLayout,
                     entry_point: &str,
                     topology: wgpu::PrimitiveTopology,
                     blend: wgpu::BlendState| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    compilation_options: Default::default(),
                    buffers: &[Vertex2d::layout()],
                },
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point,
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
            })
        };

        Pipelines {
            shape_triangles: build(
                "Shape Triangles",
                &shape_layout,
                "fs_shape",
                wgpu::PrimitiveTopology::TriangleList,
                wgpu::BlendState::ALPHA_BLENDING,
            ),
            shape_lines: build(
                "Shape Lines",
                &shape_layout,
                "fs_shape",
                wgpu::PrimitiveTopology::LineList,
                wgpu::BlendState::ALPHA_BLENDING,
            ),
            shape_points: build(
                "Shape Points",
                &shape_layout,
                "fs_shape",
                wgpu::PrimitiveTopology::PointList,
                wgpu::BlendState::ALPHA_BLENDING,
            ),
            sprite_alpha: build(
                "Sprite Alpha",
                &sprite_layout,
                "fs_sprite",
                wgpu::PrimitiveTopology::TriangleList,
                wgpu::BlendState::ALPHA_BLENDING,
            ),
            sprite_additive: build(
                "Sprite Additive",
                &sprite_layout,
                "fs_sprite",
                wgpu::PrimitiveTopology::TriangleList,
                additive,
            ),
        }
    }

    fn create_offscreen_target(&self) -> OffscreenTarget {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Target"),
            size: wgpu::Extent3d {
                width: self.surface_config.width,
                height: self.surface_config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.surface_config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        OffscreenTarget { texture, view }
    }

    fn ndc(&self, p: Vec2) -> [f32; 2] {
        let (w, h) = (
            self.surface_config.width as f32,
            self.surface_config.height as f32,
        );
        [p.x / w * 2.0 - 1.0, 1.0 - p.y / h * 2.0]
    }

    fn push_vertex(&mut self, p: Vec2, uv: [f32; 2], color: [f32; 4]) {
        let position = self.ndc(p);
        self.vertices.push(Vertex2d {
            position,
            uv,
            color,
        });
    }

    fn push_shapes(&mut self, topology: ShapeTopology, points: &[Vec2]) {
        if !self.frame_active {
            return;
        }
        let start = self.vertices.len() as u32;
        let color = self.state.color.to_f32();
        for &p in points {
            self.push_vertex(p, [0.0, 0.0], color);
        }
        let end = self.vertices.len() as u32;
        self.commands.push(FrameCommand::Shapes {
            topology,
            vertices: start..end,
        });
        self.draw_calls += 1;
    }

    /// Corners of `dst` rotated around its center by `angle` degrees.
    fn rotated_corners(dst: ScreenRect, angle: f32) -> [Vec2; 4] {
        let c = dst.center();
        let (sin, cos) = angle.to_radians().sin_cos();
        let rotate = |p: Vec2| {
            let d = p - c;
            c + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
        };
        [
            rotate(Vec2::new(dst.x, dst.y)),
            rotate(Vec2::new(dst.x + dst.w, dst.y)),
            rotate(Vec2::new(dst.x + dst.w, dst.y + dst.h)),
            rotate(Vec2::new(dst.x, dst.y + dst.h)),
        ]
    }
}

impl RenderBackend for WgpuBackend {
    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            let max_size = self.device.limits().max_texture_dimension_2d;
            self.surface_config.width = width.min(max_size);
            self.surface_config.height = height.min(max_size);
            self.surface.configure(&self.device, &self.surface_config);

            // The backing offscreen target is sized to the surface; rebuild
            // it against the new dimensions with the default target bound.
            if self.render_target.take().is_some() {
                self.render_target = Some(self.create_offscreen_target());
            }
        }
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    fn begin_frame(&mut self) -> BackendResult<()> {
        if self.render_target.is_none() {
            let output = self.surface.get_current_texture().map_err(|e| match e {
                wgpu::SurfaceError::Lost => BackendError::SurfaceLost,
                wgpu::SurfaceError::OutOfMemory => BackendError::OutOfMemory,
                _ => BackendError::AcquireImageFailed(e.to_string()),
            })?;
            self.frame_texture = Some(output);
        }

        self.vertices.clear();
        self.commands.clear();
        self.frame_active = true;
        Ok(())
    }

    fn end_frame(&mut self) -> BackendResult<()> {
        if !self.frame_active {
            return Ok(());
        }
        self.frame_active = false;

        let swapchain_view = self
            .frame_texture
            .as_ref()
            .map(|t| t.texture.create_view(&wgpu::TextureViewDescriptor::default()));
        let view = match (&self.render_target, &swapchain_view) {
            (Some(target), _) => &target.view,
            (None, Some(view)) => view,
            (None, None) => return Err(BackendError::PresentFailed("no frame in flight".into())),
        };

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Frame Vertices"),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_vertex_buffer(0, vertex_buffer.slice(..));

            for command in &self.commands {
                match command {
                    FrameCommand::Shapes { topology, vertices } => {
                        let pipeline = match topology {
                            ShapeTopology::Triangles => &self.pipelines.shape_triangles,
                            ShapeTopology::Lines => &self.pipelines.shape_lines,
                            ShapeTopology::Points => &self.pipelines.shape_points,
                        };
                        pass.set_pipeline(pipeline);
                        pass.draw(vertices.clone(), 0..1);
                    }
                    FrameCommand::Textured {
                        texture,
                        blend,
                        vertices,
                    } => {
                        let Some(gpu_texture) = self.textures.get(texture) else {
                            continue;
                        };
                        let pipeline = match blend {
                            BlendMode::Alpha => &self.pipelines.sprite_alpha,
                            BlendMode::Additive => &self.pipelines.sprite_additive,
                        };
                        pass.set_pipeline(pipeline);
                        pass.set_bind_group(0, &gpu_texture.bind_group, &[]);
                        pass.draw(vertices.clone(), 0..1);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        if self.render_target.take().is_some() {
            // Render-to-texture mode: release the temporary target and leave
            // the default one bound for the next frame. Nothing is presented.
            self.frame_texture = None;
        } else if let Some(texture) = self.frame_texture.take() {
            texture.present();
        }

        self.vertices.clear();
        self.commands.clear();
        Ok(())
    }

    fn reset(
        &mut self,
        window: Option<&Arc<winit::window::Window>>,
        vsync: bool,
    ) -> BackendResult<()> {
        let window = window.ok_or_else(|| {
            BackendError::InitializationFailed("wgpu backend requires a window".into())
        })?;
        log::info!("WgpuBackend: full device reset");
        *self = Self::new(window.clone(), vsync)?;
        Ok(())
    }

    fn create_texture(
        &mut self,
        desc: &TextureDescriptor,
        pixels: &[u8],
    ) -> BackendResult<TextureHandle> {
        let expected = desc.width as usize * desc.height as usize * 4;
        if pixels.len() != expected {
            return Err(BackendError::TextureCreationFailed(format!(
                "pixel buffer is {} bytes, expected {}",
                pixels.len(),
                expected
            )));
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: desc.label.as_deref(),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(desc.width * 4),
                rows_per_image: Some(desc.height),
            },
            wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: desc.label.as_deref(),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let id = self.next_texture_id;
        self.next_texture_id += 1;
        self.textures.insert(
            id,
            GpuTexture {
                texture,
                bind_group,
                width: desc.width,
                height: desc.height,
            },
        );

        Ok(TextureHandle(id))
    }

    fn update_texture(&mut self, texture: TextureHandle, pixels: &[u8]) -> BackendResult<()> {
        let gpu_texture = self
            .textures
            .get(&texture.0)
            .ok_or_else(|| BackendError::TextureCreationFailed("texture not found".into()))?;
        if pixels.len() != gpu_texture.width as usize * gpu_texture.height as usize * 4 {
            return Err(BackendError::TextureCreationFailed(
                "pixel buffer does not match texture size".into(),
            ));
        }

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &gpu_texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(gpu_texture.width * 4),
                rows_per_image: Some(gpu_texture.height),
            },
            wgpu::Extent3d {
                width: gpu_texture.width,
                height: gpu_texture.height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture.0);
        if self.state.texture == Some(texture) {
            self.state.texture = None;
        }
    }

    fn draw_state(&self) -> DrawState {
        self.state
    }

    fn apply_draw_state(&mut self, state: DrawState) {
        self.state = state;
    }

    fn set_draw_color(&mut self, color: Color) {
        self.state.color = color;
    }

    fn set_blend_mode(&mut self, blend: BlendMode) {
        self.state.blend = blend;
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.state.texture = texture;
    }

    fn fill_rect(&mut self, rect: ScreenRect) {
        let (x0, y0) = (rect.x, rect.y);
        let (x1, y1) = (rect.x + rect.w, rect.y + rect.h);
        self.push_shapes(
            ShapeTopology::Triangles,
            &[
                Vec2::new(x0, y0),
                Vec2::new(x1, y0),
                Vec2::new(x1, y1),
                Vec2::new(x0, y0),
                Vec2::new(x1, y1),
                Vec2::new(x0, y1),
            ],
        );
    }

    fn stroke_rect(&mut self, rect: ScreenRect) {
        let (x0, y0) = (rect.x, rect.y);
        let (x1, y1) = (rect.x + rect.w, rect.y + rect.h);
        self.push_shapes(
            ShapeTopology::Lines,
            &[
                Vec2::new(x0, y0),
                Vec2::new(x1, y0),
                Vec2::new(x1, y0),
                Vec2::new(x1, y1),
                Vec2::new(x1, y1),
                Vec2::new(x0, y1),
                Vec2::new(x0, y1),
                Vec2::new(x0, y0),
            ],
        );
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2) {
        self.push_shapes(ShapeTopology::Lines, &[from, to]);
    }

    fn draw_point(&mut self, point: Vec2) {
        self.push_shapes(ShapeTopology::Points, &[point]);
    }

    fn draw_textured(
        &mut self,
        src: Option<FrameRect>,
        dst: ScreenRect,
        angle: f32,
        flip: TexFlip,
    ) {
        if !self.frame_active {
            return;
        }
        let Some(handle) = self.state.texture else {
            log::warn!("draw_textured called with no texture bound");
            return;
        };
        let Some(gpu_texture) = self.textures.get(&handle.0) else {
            return;
        };

        let (tw, th) = (gpu_texture.width as f32, gpu_texture.height as f32);
        let (mut u0, mut v0, mut u1, mut v1) = match src {
            Some(r) => (
                r.x as f32 / tw,
                r.y as f32 / th,
                (r.x + r.w) as f32 / tw,
                (r.y + r.h) as f32 / th,
            ),
            None => (0.0, 0.0, 1.0, 1.0),
        };
        match flip {
            TexFlip::None => {}
            TexFlip::Horizontal => std::mem::swap(&mut u0, &mut u1),
            TexFlip::Vertical => std::mem::swap(&mut v0, &mut v1),
        }

        let corners = Self::rotated_corners(dst, angle);
        let color = self.state.color.to_f32();
        let uvs = [[u0, v0], [u1, v0], [u1, v1], [u0, v1]];

        let start = self.vertices.len() as u32;
        for &i in &[0usize, 1, 2, 0, 2, 3] {
            self.push_vertex(corners[i], uvs[i], color);
        }
        let end = self.vertices.len() as u32;

        self.commands.push(FrameCommand::Textured {
            texture: handle.0,
            blend: self.state.blend,
            vertices: start..end,
        });
        self.draw_calls += 1;
    }

    fn enable_render_target(&mut self, enable: bool) -> BackendResult<()> {
        if enable {
            if self.render_target.is_none() {
                self.render_target = Some(self.create_offscreen_target());
            }
        } else {
            self.render_target = None;
        }
        Ok(())
    }

    fn render_target_active(&self) -> bool {
        self.render_target.is_some()
    }

    fn draw_call_count(&self) -> u64 {
        self.draw_calls
    }
}
