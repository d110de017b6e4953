//! GPU renderer for a gallery instance.
//!
//! Draws the image surfaces as textured quads (back-to-front, alpha blended)
//! plus the variant's wireframe chrome. Per-draw data lives in one dynamic
//! uniform buffer with one aligned slot per draw.

use wgpu::util::DeviceExt;

use glam::{Mat4, Vec3};

use crate::assets::{self, ImageData};
use crate::gallery::{GalleryInstance, GalleryVariant};
use crate::gpu::mesh::{self, LineVertex};
use crate::gpu::pipeline;
use crate::gpu::texture::{self, GpuTexture};

/// Uniform slots are aligned to the conservative WebGPU default.
const UNIFORM_ALIGNMENT: usize = 256;
/// Per-frame cap on surface draws; overflow drops the farthest surfaces.
const MAX_SURFACES_PER_FRAME: usize = 512;
/// Chrome line draws per frame (wireframes, grids, axes, border).
const MAX_LINE_DRAWS: usize = 8;

const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SurfaceUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    /// rgb = brightness tint, a = opacity.
    tint: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct LineUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

/// One chrome draw: a vertex range plus its transform/color, and whether it
/// renders over the surfaces (the highlight border) or under them.
struct LineDraw {
    range: std::ops::Range<u32>,
    uniforms: LineUniforms,
    overlay: bool,
}

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    size: wgpu::Extent3d,

    surface_pipeline: wgpu::RenderPipeline,
    quad_vertex_buffer: wgpu::Buffer,
    quad_index_buffer: wgpu::Buffer,
    quad_index_count: u32,
    surface_uniform_buffer: wgpu::Buffer,
    surface_bind_group: wgpu::BindGroup,

    texture_bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    placeholder: GpuTexture,
    textures: Vec<Option<GpuTexture>>,

    line_pipeline: wgpu::RenderPipeline,
    line_uniform_buffer: wgpu::Buffer,
    line_bind_group: wgpu::BindGroup,
    line_vertex_buffer: wgpu::Buffer,
    line_vertex_capacity: usize,

    // Static chrome geometry for the instance's variant.
    sphere_wire: Vec<LineVertex>,
    border_rect: Vec<LineVertex>,
    grid: Vec<LineVertex>,
    field_boundary: Vec<LineVertex>,
    axes: Vec<Vec<LineVertex>>,
}

fn create_dynamic_uniform_parts(
    device: &wgpu::Device,
    slots: usize,
    min_size: u64,
    label: &str,
) -> (wgpu::Buffer, wgpu::BindGroupLayout, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (UNIFORM_ALIGNMENT * slots) as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: wgpu::BufferSize::new(min_size),
            },
            count: None,
        }],
        label: Some(label),
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(min_size),
            }),
        }],
        label: Some(label),
    });
    (buffer, layout, bind_group)
}

impl Renderer {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        gallery: &GalleryInstance,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };

        // === Surface pipeline ===

        let (surface_uniform_buffer, surface_uniform_layout, surface_bind_group) =
            create_dynamic_uniform_parts(
                &device,
                MAX_SURFACES_PER_FRAME,
                std::mem::size_of::<SurfaceUniforms>() as u64,
                "surface_uniforms",
            );
        let texture_bind_group_layout = texture::create_texture_bind_group_layout(&device);

        let surface_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Surface Pipeline Layout"),
                bind_group_layouts: &[&surface_uniform_layout, &texture_bind_group_layout],
                push_constant_ranges: &[],
            });
        let surface_pipeline =
            pipeline::create_surface_pipeline(&device, &surface_pipeline_layout, format);

        let (quad_vertices, quad_indices) = mesh::create_quad_geometry();
        let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Index Buffer"),
            contents: bytemuck::cast_slice(&quad_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let sampler = texture::create_sampler(&device);
        let placeholder = texture::upload(
            &device,
            &queue,
            &texture_bind_group_layout,
            &sampler,
            &assets::placeholder(),
            "placeholder",
        );

        // === Line pipeline ===

        let (line_uniform_buffer, line_uniform_layout, line_bind_group) =
            create_dynamic_uniform_parts(
                &device,
                MAX_LINE_DRAWS,
                std::mem::size_of::<LineUniforms>() as u64,
                "line_uniforms",
            );
        let line_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Line Pipeline Layout"),
            bind_group_layouts: &[&line_uniform_layout],
            push_constant_ranges: &[],
        });
        let line_pipeline = pipeline::create_line_pipeline(&device, &line_pipeline_layout, format);

        let line_vertex_capacity = 4096;
        let line_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Line Vertex Buffer"),
            size: (line_vertex_capacity * std::mem::size_of::<LineVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // === Static chrome for this variant ===

        let chrome = gallery.chrome();
        let (sphere_wire, border_rect, grid, field_boundary, axes) = match gallery.variant() {
            GalleryVariant::Sphere => (
                mesh::sphere_wireframe(3.0, 24, 32),
                mesh::rect_outline(1.5, 1.5),
                Vec::new(),
                Vec::new(),
                Vec::new(),
            ),
            GalleryVariant::Wave => (
                Vec::new(),
                Vec::new(),
                mesh::grid_lines(chrome.wave_extent.max(1.0), 40),
                mesh::flat_rect_outline(chrome.wave_extent.max(1.0), chrome.wave_extent.max(1.0)),
                Vec::new(),
            ),
            GalleryVariant::Tunnel => (
                Vec::new(),
                Vec::new(),
                Vec::new(),
                Vec::new(),
                mesh::axis_lines(20.0).into_iter().collect(),
            ),
            GalleryVariant::Stack => (Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new()),
        };

        Self {
            device,
            queue,
            size,
            surface_pipeline,
            quad_vertex_buffer,
            quad_index_buffer,
            quad_index_count: quad_indices.len() as u32,
            surface_uniform_buffer,
            surface_bind_group,
            texture_bind_group_layout,
            sampler,
            placeholder,
            textures: Vec::new(),
            line_pipeline,
            line_uniform_buffer,
            line_bind_group,
            line_vertex_buffer,
            line_vertex_capacity,
            sphere_wire,
            border_rect,
            grid,
            field_boundary,
            axes,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Output size changed. Zero-sized outputs are ignored; the old size is
    /// kept until a usable one arrives.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.size.width = width;
        self.size.height = height;
    }

    /// Upload pixels for one image; surfaces bound to it stop using the
    /// placeholder on the next frame.
    pub fn install_image(&mut self, image_index: usize, data: &ImageData) {
        if self.textures.len() <= image_index {
            self.textures.resize_with(image_index + 1, || None);
        }
        self.textures[image_index] = Some(texture::upload(
            &self.device,
            &self.queue,
            &self.texture_bind_group_layout,
            &self.sampler,
            data,
            &format!("image {}", image_index),
        ));
    }

    fn texture_for(&self, image_index: Option<usize>) -> &GpuTexture {
        image_index
            .and_then(|i| self.textures.get(i))
            .and_then(|t| t.as_ref())
            .unwrap_or(&self.placeholder)
    }

    fn assemble_line_draws(
        &self,
        gallery: &GalleryInstance,
        view_proj: [[f32; 4]; 4],
        vertices: &mut Vec<LineVertex>,
        draws: &mut Vec<LineDraw>,
    ) {
        let chrome = gallery.chrome();
        let mut push = |set: &[LineVertex], model: Mat4, color: [f32; 4], overlay: bool| {
            if set.is_empty() || draws.len() >= MAX_LINE_DRAWS {
                return;
            }
            let start = vertices.len() as u32;
            vertices.extend_from_slice(set);
            draws.push(LineDraw {
                range: start..vertices.len() as u32,
                uniforms: LineUniforms {
                    view_proj,
                    model: model.to_cols_array_2d(),
                    color,
                },
                overlay,
            });
        };

        match gallery.variant() {
            GalleryVariant::Sphere => {
                push(
                    &self.sphere_wire,
                    Mat4::from_quat(chrome.sphere_rotation),
                    [0.5, 0.5, 0.5, 0.1],
                    false,
                );
                if let Some(index) = chrome.highlight {
                    if let Some(s) = gallery.surfaces().get(index) {
                        let model = Mat4::from_scale_rotation_translation(
                            Vec3::new(s.scale.x, s.scale.y, 1.0),
                            s.rotation,
                            s.position,
                        );
                        push(&self.border_rect, model, [1.0, 0.0, 0.0, 1.0], true);
                    }
                }
            }
            GalleryVariant::Wave => {
                push(
                    &self.grid,
                    Mat4::from_translation(Vec3::new(0.0, chrome.grid_offset_y, 0.0)),
                    [0.5, 0.5, 0.5, 0.1],
                    false,
                );
                push(
                    &self.field_boundary,
                    Mat4::from_translation(Vec3::new(0.0, chrome.boundary_offset_y, 0.0)),
                    [0.0, 0.0, 0.0, 0.1],
                    false,
                );
            }
            GalleryVariant::Tunnel => {
                if let Some(segments) = gallery.boundary_segments() {
                    let mut boundary = Vec::with_capacity(segments.len() * 2);
                    for [a, b] in segments {
                        boundary.push(LineVertex::new((*a).into()));
                        boundary.push(LineVertex::new((*b).into()));
                    }
                    push(
                        &boundary,
                        Mat4::from_scale(Vec3::splat(chrome.tunnel_scale)),
                        [0.8, 0.8, 0.8, 0.15],
                        false,
                    );
                }
                let axis_colors = [
                    [1.0, 0.0, 0.0, 1.0],
                    [0.0, 1.0, 0.0, 1.0],
                    [0.0, 0.0, 1.0, 1.0],
                ];
                for (axis, color) in self.axes.iter().zip(axis_colors) {
                    push(axis, Mat4::IDENTITY, color, false);
                }
            }
            GalleryVariant::Stack => {}
        }
    }

    /// Render one frame of the gallery into `view`.
    pub fn render(&mut self, view: &wgpu::TextureView, gallery: &GalleryInstance) {
        let view_proj = gallery
            .pose()
            .view_projection(self.size.width as f32, self.size.height as f32)
            .to_cols_array_2d();
        let eye = gallery.pose().eye;

        // Alpha blending needs far surfaces first.
        let surfaces = gallery.surfaces();
        let mut order: Vec<usize> = (0..surfaces.len())
            .filter(|&i| surfaces[i].opacity > 0.0)
            .collect();
        order.sort_by(|&a, &b| {
            let da = surfaces[a].position.distance_squared(eye);
            let db = surfaces[b].position.distance_squared(eye);
            db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
        });
        if order.len() > MAX_SURFACES_PER_FRAME {
            order.drain(..order.len() - MAX_SURFACES_PER_FRAME);
        }

        for (slot, &i) in order.iter().enumerate() {
            let s = &surfaces[i];
            let uniforms = SurfaceUniforms {
                view_proj,
                model: Mat4::from_scale_rotation_translation(s.scale, s.rotation, s.position)
                    .to_cols_array_2d(),
                tint: [s.brightness, s.brightness, s.brightness, s.opacity],
            };
            self.queue.write_buffer(
                &self.surface_uniform_buffer,
                (slot * UNIFORM_ALIGNMENT) as u64,
                bytemuck::bytes_of(&uniforms),
            );
        }

        let mut line_vertices = Vec::new();
        let mut line_draws = Vec::new();
        self.assemble_line_draws(gallery, view_proj, &mut line_vertices, &mut line_draws);

        if line_vertices.len() > self.line_vertex_capacity {
            self.line_vertex_capacity = line_vertices.len().next_power_of_two();
            self.line_vertex_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Line Vertex Buffer"),
                size: (self.line_vertex_capacity * std::mem::size_of::<LineVertex>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
        }
        if !line_vertices.is_empty() {
            self.queue.write_buffer(
                &self.line_vertex_buffer,
                0,
                bytemuck::cast_slice(&line_vertices),
            );
        }
        for (slot, draw) in line_draws.iter().enumerate() {
            self.queue.write_buffer(
                &self.line_uniform_buffer,
                (slot * UNIFORM_ALIGNMENT) as u64,
                bytemuck::bytes_of(&draw.uniforms),
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Gallery Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Gallery Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let draw_lines = |pass: &mut wgpu::RenderPass<'_>, overlay: bool| {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_vertex_buffer(0, self.line_vertex_buffer.slice(..));
                for (slot, draw) in line_draws.iter().enumerate() {
                    if draw.overlay != overlay {
                        continue;
                    }
                    pass.set_bind_group(
                        0,
                        &self.line_bind_group,
                        &[(slot * UNIFORM_ALIGNMENT) as u32],
                    );
                    pass.draw(draw.range.clone(), 0..1);
                }
            };

            // Background chrome, then surfaces back-to-front, then overlays.
            draw_lines(&mut pass, false);

            pass.set_pipeline(&self.surface_pipeline);
            pass.set_vertex_buffer(0, self.quad_vertex_buffer.slice(..));
            pass.set_index_buffer(self.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            for (slot, &i) in order.iter().enumerate() {
                let s = &surfaces[i];
                pass.set_bind_group(
                    0,
                    &self.surface_bind_group,
                    &[(slot * UNIFORM_ALIGNMENT) as u32],
                );
                pass.set_bind_group(1, &self.texture_for(s.image_index).bind_group, &[]);
                pass.draw_indexed(0..self.quad_index_count, 0, 0..1);
            }

            draw_lines(&mut pass, true);
        }
        self.queue.submit(Some(encoder.finish()));
    }
}
