use super::*;

use wgpu::util::DeviceExt;

mod overlay;

use overlay::TextOverlay;

/// The output image format, fixed for the process lifetime.
pub const IMAGE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Errors from the graphics service. All of them are fatal at startup;
/// there is no fallback pipeline and no shader hot-reload.
#[derive(Debug, thiserror::Error)]
pub enum GfxError {
    #[error("creating window surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible graphics adapter")]
    NoAdapter,
    #[error("requesting device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("compiling shader module '{module}': {log}")]
    ShaderCompile { module: &'static str, log: String },
    #[error("linking pipeline '{pipeline}': {log}")]
    PipelineLink { pipeline: &'static str, log: String },
    #[error("acquiring surface frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct BlitVertex {
    position: [f32; 2],
    tex_coord: [f32; 2],
}

// The render target's row 0 is the bottom scanline, so V grows upward.
const QUAD_VERTICES: [BlitVertex; 4] = [
    BlitVertex {
        position: [-1.0, -1.0],
        tex_coord: [0.0, 0.0],
    },
    BlitVertex {
        position: [1.0, -1.0],
        tex_coord: [1.0, 0.0],
    },
    BlitVertex {
        position: [1.0, 1.0],
        tex_coord: [1.0, 1.0],
    },
    BlitVertex {
        position: [-1.0, 1.0],
        tex_coord: [0.0, 1.0],
    },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

const BLIT_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

/// Fullscreen compositor plus the text overlay, on top of wgpu.
///
/// Owns the surface and the RGBA32F image texture the kernel output is
/// uploaded into each frame.
pub struct Gfx {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    image_texture: wgpu::Texture,
    image_size: (u32, u32),
    blit_pipeline: wgpu::RenderPipeline,
    blit_bind_group: wgpu::BindGroup,
    quad_vertices: wgpu::Buffer,
    quad_indices: wgpu::Buffer,
    overlay: TextOverlay,
}

impl Gfx {
    pub fn create(
        window: Arc<winit::window::Window>,
        image_size: (u32, u32),
    ) -> Result<Self, GfxError> {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window.clone())?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(GfxError::NoAdapter)?;
        info!("Graphics adapter: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        ))?;

        // The kernel writes gamma-encoded values, so present through a
        // non-sRGB surface format when one exists.
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .unwrap_or(caps.formats[0]);
        let window_size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: window_size.width.max(1),
            height: window_size.height.max(1),
            // No vsync, so the overlay reports the true frame time.
            present_mode: wgpu::PresentMode::AutoNoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);
        debug!("Surface: {}x{} {format:?}", surface_config.width, surface_config.height);

        let image_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("raytraced-image"),
            size: wgpu::Extent3d {
                width: image_size.0,
                height: image_size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: IMAGE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let image_view = image_texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Rgba32Float is not filterable without extra features; nearest
        // sampling is exact anyway when the window matches the image.
        let image_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("image-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let blit_shader = compile_module(&device, "blit", include_str!("blit.wgsl"))?;

        let blit_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("blit-bind-group-layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: false },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                        count: None,
                    },
                ],
            });
        let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit-bind-group"),
            layout: &blit_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&image_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&image_sampler),
                },
            ],
        });

        let blit_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("blit-pipeline-layout"),
                bind_group_layouts: &[&blit_bind_group_layout],
                push_constant_ranges: &[],
            });
        let blit_pipeline = link_pipeline(&device, "blit", || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("blit-pipeline"),
                layout: Some(&blit_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &blit_shader,
                    entry_point: "vs_main",
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<BlitVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &BLIT_VERTEX_ATTRIBUTES,
                    }],
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &blit_shader,
                    entry_point: "fs_main",
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
            })
        })?;

        let quad_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blit-vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("blit-indices"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let overlay = TextOverlay::create(&device, &queue, format)?;

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            image_texture,
            image_size,
            blit_pipeline,
            blit_bind_group,
            quad_vertices,
            quad_indices,
            overlay,
        })
    }

    /// Upload the finished frame and draw it as a fullscreen quad, then the
    /// overlay text on top. Must only be called with an image handed back by
    /// the dispatch fence.
    pub fn present(&mut self, image: &RenderTarget, overlay_text: &str) -> Result<(), GfxError> {
        debug_assert_eq!(image.size(), self.image_size);

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.image_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_bytes(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(16 * image.width()),
                rows_per_image: Some(image.height()),
            },
            wgpu::Extent3d {
                width: image.width(),
                height: image.height(),
                depth_or_array_layers: 1,
            },
        );

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Reconfigure and let this frame's duration extend; the next
                // iteration presents normally.
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let screen = (self.surface_config.width, self.surface_config.height);
        self.overlay.queue_text(
            &self.queue,
            overlay_text,
            (10.0, screen.1 as f32 - 30.0),
            1.0,
            ColorRgb::WHITE,
            screen,
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("present-encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("composite-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
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
            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &self.blit_bind_group, &[]);
            pass.set_vertex_buffer(0, self.quad_vertices.slice(..));
            pass.set_index_buffer(self.quad_indices.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
            self.overlay.draw(&mut pass);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();

        Ok(())
    }
}

/// Compile one WGSL module, surfacing validation failures as a typed error
/// instead of the uncaptured-error hook.
fn compile_module(
    device: &wgpu::Device,
    name: &'static str,
    source: &str,
) -> Result<wgpu::ShaderModule, GfxError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(name),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    match pollster::block_on(device.pop_error_scope()) {
        None => Ok(module),
        Some(error) => Err(GfxError::ShaderCompile {
            module: name,
            log: error.to_string(),
        }),
    }
}

/// Run a pipeline constructor inside a validation error scope so stage
/// mismatches surface as a typed link error.
fn link_pipeline<T>(
    device: &wgpu::Device,
    name: &'static str,
    create: impl FnOnce() -> T,
) -> Result<T, GfxError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = create();
    match pollster::block_on(device.pop_error_scope()) {
        None => Ok(pipeline),
        Some(error) => Err(GfxError::PipelineLink {
            pipeline: name,
            log: error.to_string(),
        }),
    }
}
