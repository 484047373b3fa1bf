use super::*;

//
// Bitmap font
//

const GLYPH_SIZE: u32 = 8;

/// 8x8 bitmaps, one bit per pixel, row 0 at the top. Just enough coverage
/// for the telemetry strings the overlay draws.
#[rustfmt::skip]
const FONT_BITMAPS: [(char, [u8; 8]); 16] = [
    ('0', [0x3C, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3C]),
    ('1', [0x18, 0x38, 0x18, 0x18, 0x18, 0x18, 0x18, 0x7E]),
    ('2', [0x3C, 0x66, 0x06, 0x0C, 0x18, 0x30, 0x60, 0x7E]),
    ('3', [0x3C, 0x66, 0x06, 0x1C, 0x06, 0x06, 0x66, 0x3C]),
    ('4', [0x0C, 0x1C, 0x2C, 0x4C, 0x7E, 0x0C, 0x0C, 0x0C]),
    ('5', [0x7E, 0x60, 0x60, 0x7C, 0x06, 0x06, 0x66, 0x3C]),
    ('6', [0x3C, 0x66, 0x60, 0x7C, 0x66, 0x66, 0x66, 0x3C]),
    ('7', [0x7E, 0x06, 0x0C, 0x18, 0x30, 0x30, 0x30, 0x30]),
    ('8', [0x3C, 0x66, 0x66, 0x3C, 0x66, 0x66, 0x66, 0x3C]),
    ('9', [0x3C, 0x66, 0x66, 0x66, 0x3E, 0x06, 0x66, 0x3C]),
    ('F', [0x7E, 0x60, 0x60, 0x7C, 0x60, 0x60, 0x60, 0x60]),
    ('P', [0x7C, 0x66, 0x66, 0x7C, 0x60, 0x60, 0x60, 0x60]),
    ('S', [0x3C, 0x66, 0x60, 0x3C, 0x06, 0x06, 0x66, 0x3C]),
    (':', [0x00, 0x18, 0x18, 0x00, 0x00, 0x18, 0x18, 0x00]),
    (' ', [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
    ('.', [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18]),
];

/// Immutable per-character record: where the glyph lives in the atlas and
/// how it is placed relative to the text cursor.
#[derive(Clone, Copy, Debug)]
pub struct Glyph {
    pub atlas_column: u32,
    pub size: (f32, f32),
    pub bearing: (f32, f32),
    pub advance: f32,
}

pub struct Font {
    glyphs: Vec<(char, Glyph)>,
    atlas_size: (u32, u32),
}

impl Font {
    /// Builds the glyph table and the single-row R8 atlas image.
    fn build() -> (Self, Vec<u8>) {
        let atlas_size = (GLYPH_SIZE * FONT_BITMAPS.len() as u32, GLYPH_SIZE);
        let mut pixels = vec![0_u8; (atlas_size.0 * atlas_size.1) as usize];
        let mut glyphs = Vec::with_capacity(FONT_BITMAPS.len());
        for (column, (ch, rows)) in FONT_BITMAPS.iter().enumerate() {
            for y in 0..GLYPH_SIZE {
                for x in 0..GLYPH_SIZE {
                    let bit = (rows[y as usize] >> (7 - x)) & 1;
                    let atlas_x = column as u32 * GLYPH_SIZE + x;
                    pixels[(y * atlas_size.0 + atlas_x) as usize] = bit * 255;
                }
            }
            glyphs.push((
                *ch,
                Glyph {
                    atlas_column: column as u32,
                    size: (GLYPH_SIZE as f32, GLYPH_SIZE as f32),
                    bearing: (0.0, GLYPH_SIZE as f32),
                    advance: 10.0,
                },
            ));
        }
        (Self { glyphs, atlas_size }, pixels)
    }

    /// Absence of a character is defined behavior, not an error: the caller
    /// skips it without advancing the cursor.
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs
            .iter()
            .find(|(glyph_char, _)| *glyph_char == ch)
            .map(|(_, glyph)| glyph)
    }

    fn uv_span(&self, glyph: &Glyph) -> (f32, f32) {
        let u0 = (glyph.atlas_column * GLYPH_SIZE) as f32 / self.atlas_size.0 as f32;
        let u1 = ((glyph.atlas_column + 1) * GLYPH_SIZE) as f32 / self.atlas_size.0 as f32;
        (u0, u1)
    }
}

//
// Overlay renderer
//

const MAX_GLYPHS: usize = 64;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct OverlayVertex {
    position: [f32; 2],
    tex_coord: [f32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct OverlayUniforms {
    screen_size: [f32; 2],
    _padding: [f32; 2],
    color: [f32; 4],
}

const OVERLAY_VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

/// Draws left-to-right with a fixed glyph advance, streaming one quad per
/// glyph into a dynamic vertex buffer.
pub struct TextOverlay {
    font: Font,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl TextOverlay {
    pub fn create(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, GfxError> {
        let (font, atlas_pixels) = Font::build();

        let atlas_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glyph-atlas"),
            size: wgpu::Extent3d {
                width: font.atlas_size.0,
                height: font.atlas_size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &atlas_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &atlas_pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(font.atlas_size.0),
                rows_per_image: Some(font.atlas_size.1),
            },
            wgpu::Extent3d {
                width: font.atlas_size.0,
                height: font.atlas_size.1,
                depth_or_array_layers: 1,
            },
        );
        let atlas_view = atlas_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let atlas_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("glyph-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("overlay-uniforms"),
            size: std::mem::size_of::<OverlayUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("overlay-vertices"),
            size: (MAX_GLYPHS * 6 * std::mem::size_of::<OverlayVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = compile_module(device, "overlay", include_str!("overlay.wgsl"))?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("overlay-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("overlay-bind-group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&atlas_sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("overlay-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = link_pipeline(device, "overlay", || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("overlay-pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<OverlayVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &OVERLAY_VERTEX_ATTRIBUTES,
                    }],
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_main",
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
            })
        })?;

        Ok(Self {
            font,
            pipeline,
            bind_group,
            uniform_buffer,
            vertex_buffer,
            vertex_count: 0,
        })
    }

    /// Stage one string for this frame's overlay draw. Coordinates are in
    /// screen pixels with the origin at the bottom-left corner.
    pub fn queue_text(
        &mut self,
        queue: &wgpu::Queue,
        text: &str,
        origin: (f32, f32),
        scale: f32,
        color: ColorRgb,
        screen: (u32, u32),
    ) {
        let mut vertices = layout_text(&self.font, text, origin, scale);
        vertices.truncate(MAX_GLYPHS * 6);

        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&OverlayUniforms {
                screen_size: [screen.0 as f32, screen.1 as f32],
                _padding: [0.0, 0.0],
                color: [color.red(), color.green(), color.blue(), 1.0],
            }),
        );
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        self.vertex_count = vertices.len() as u32;
    }

    pub fn draw<'pass>(&'pass self, pass: &mut wgpu::RenderPass<'pass>) {
        if self.vertex_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

/// Lay a string out into glyph quads. Characters without a glyph are
/// skipped and do not advance the cursor.
fn layout_text(font: &Font, text: &str, origin: (f32, f32), scale: f32) -> Vec<OverlayVertex> {
    let mut vertices = Vec::with_capacity(text.len() * 6);
    let (mut x, y) = origin;
    for ch in text.chars() {
        let Some(glyph) = font.glyph(ch) else {
            continue;
        };
        let x0 = x + glyph.bearing.0 * scale;
        let y0 = y - (glyph.size.1 - glyph.bearing.1) * scale;
        let w = glyph.size.0 * scale;
        let h = glyph.size.1 * scale;
        let (u0, u1) = font.uv_span(glyph);

        // Two triangles; atlas V is 0 at the glyph's top row.
        let quad = [
            ([x0, y0 + h], [u0, 0.0]),
            ([x0, y0], [u0, 1.0]),
            ([x0 + w, y0], [u1, 1.0]),
            ([x0, y0 + h], [u0, 0.0]),
            ([x0 + w, y0], [u1, 1.0]),
            ([x0 + w, y0 + h], [u1, 0.0]),
        ];
        for (position, tex_coord) in quad {
            vertices.push(OverlayVertex {
                position,
                tex_coord,
            });
        }

        x += glyph.advance * scale;
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_glyphs_resolve() {
        let (font, atlas) = Font::build();
        for ch in "0123456789FPS:. ".chars() {
            assert!(font.glyph(ch).is_some(), "missing glyph for {ch:?}");
        }
        assert_eq!(atlas.len(), (font.atlas_size.0 * font.atlas_size.1) as usize);
    }

    #[test]
    fn test_unknown_glyph_is_skipped_without_advancing() {
        let (font, _) = Font::build();
        let with_unknown = layout_text(&font, "1X2", (0.0, 0.0), 1.0);
        let without = layout_text(&font, "12", (0.0, 0.0), 1.0);
        // Same quad count and same cursor positions: the unknown character
        // contributed nothing.
        assert_eq!(with_unknown.len(), 12);
        for (a, b) in with_unknown.iter().zip(&without) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.tex_coord, b.tex_coord);
        }
    }

    #[test]
    fn test_advance_and_scale() {
        let (font, _) = Font::build();
        let vertices = layout_text(&font, "00", (10.0, 0.0), 2.0);
        assert_eq!(vertices.len(), 12);
        // First quad starts at x=10, second one advance*scale later.
        assert_eq!(vertices[1].position[0], 10.0);
        assert_eq!(vertices[7].position[0], 10.0 + 20.0);
        // Quads are 16 pixels wide at scale 2.
        assert_eq!(vertices[5].position[0], 10.0 + 16.0);
    }

    #[test]
    fn test_atlas_bits_match_bitmap() {
        let (font, atlas) = Font::build();
        let glyph = font.glyph('1').unwrap();
        // Row 7 of '1' is 0x7E: six lit pixels with one dark on each side.
        let row = 7 * font.atlas_size.0 + glyph.atlas_column * GLYPH_SIZE;
        let slice = &atlas[row as usize..row as usize + 8];
        assert_eq!(slice, &[0, 255, 255, 255, 255, 255, 255, 0]);
    }
}
