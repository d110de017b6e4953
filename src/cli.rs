use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::WindowBuilder;

use crate::assets::ImageLoader;
use crate::gallery::{GalleryInstance, GalleryVariant};
use crate::gpu::renderer::Renderer;
use crate::readout;
use crate::surface::TextureSlot;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VariantArg {
    Sphere,
    Wave,
    Stack,
    Tunnel,
}

impl From<VariantArg> for GalleryVariant {
    fn from(v: VariantArg) -> Self {
        match v {
            VariantArg::Sphere => GalleryVariant::Sphere,
            VariantArg::Wave => GalleryVariant::Wave,
            VariantArg::Stack => GalleryVariant::Stack,
            VariantArg::Tunnel => GalleryVariant::Tunnel,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open an interactive gallery window
    Run {
        /// Gallery variant to display
        #[arg(long, value_enum, default_value_t = VariantArg::Sphere)]
        variant: VariantArg,

        /// Image files, in display order
        images: Vec<PathBuf>,

        /// Window width
        #[arg(long, default_value_t = 1280)]
        width: u32,

        /// Window height
        #[arg(long, default_value_t = 720)]
        height: u32,

        /// JSON settings file (as produced by "copy settings")
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Render frames to disk
    Render {
        /// Gallery variant to render
        #[arg(long, value_enum, default_value_t = VariantArg::Tunnel)]
        variant: VariantArg,

        /// Image files, in display order
        images: Vec<PathBuf>,

        /// Output directory for frames
        #[arg(long)]
        out: PathBuf,

        /// Frames per second
        #[arg(long, default_value_t = 60.0)]
        fps: f32,

        /// Duration in seconds
        #[arg(long, default_value_t = 6.0)]
        duration: f32,

        /// Output width
        #[arg(long, default_value_t = 800)]
        width: u32,

        /// Output height
        #[arg(long, default_value_t = 600)]
        height: u32,

        /// JSON settings file (as produced by "copy settings")
        #[arg(long)]
        settings: Option<PathBuf>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { variant, images, width, height, settings } => {
            run_window(variant.into(), images, width, height, settings)
        }
        Commands::Render { variant, images, out, fps, duration, width, height, settings } => {
            pollster::block_on(render_offline(
                variant.into(),
                images,
                out,
                fps,
                duration,
                width,
                height,
                settings,
            ))
        }
    }
}

fn apply_settings_file(gallery: &mut GalleryInstance, path: Option<PathBuf>) -> Result<()> {
    if let Some(path) = path {
        let json = std::fs::read_to_string(&path)?;
        let applied = gallery.apply_settings_json(&json)?;
        log::info!("applied {} settings from {:?}", applied, path);
    }
    Ok(())
}

fn window_title(gallery: &GalleryInstance) -> String {
    let mut title = format!(
        "galleria [{}] | {}",
        gallery.variant().name(),
        readout::camera_line(gallery.pose())
    );
    if let Some(morph) = gallery.morph_text() {
        title.push_str(" | ");
        title.push_str(&morph.replace('\n', "  "));
    }
    title
}

fn run_window(
    variant: GalleryVariant,
    images: Vec<PathBuf>,
    width: u32,
    height: u32,
    settings: Option<PathBuf>,
) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("galleria")
            .with_inner_size(PhysicalSize::new(width, height))
            .build(&event_loop)?,
    );

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    let surface = instance.create_surface(window.clone())?;
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: Some(&surface),
        force_fallback_adapter: false,
    }))
    .ok_or_else(|| anyhow::anyhow!("No adapter found"))?;
    let (device, queue) =
        pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default(), None))?;

    let size = window.inner_size();
    let caps = surface.get_capabilities(&adapter);
    let format = caps
        .formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .unwrap_or(caps.formats[0]);
    let mut config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode: caps.alpha_modes[0],
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &config);

    let mut gallery = GalleryInstance::new(variant, images.len(), config.width, config.height);
    apply_settings_file(&mut gallery, settings)?;
    let cancel = gallery.cancel_token();
    let mut renderer = Renderer::new(device, queue, format, config.width, config.height, &gallery);
    let loader = ImageLoader::spawn(images);

    let mut cursor = (0.0f32, 0.0f32);
    let mut last_frame = Instant::now();
    let mut title_clock = 0.0f32;

    event_loop.run(move |event, elwt| {
        let event = match event {
            Event::WindowEvent { event, .. } => event,
            Event::AboutToWait => {
                window.request_redraw();
                return;
            }
            _ => return,
        };
        match event {
            WindowEvent::CloseRequested => {
                cancel.cancel();
                elwt.exit();
            }
            WindowEvent::Resized(new_size) => {
                config.width = new_size.width.max(1);
                config.height = new_size.height.max(1);
                surface.configure(renderer.device(), &config);
                gallery.resize(new_size.width, new_size.height);
                renderer.resize(new_size.width, new_size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                cursor = (position.x as f32, position.y as f32);
                gallery.pointer_moved(cursor.0, cursor.1);
            }
            WindowEvent::CursorLeft { .. } => gallery.pointer_left(),
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => match state {
                ElementState::Pressed => gallery.pointer_pressed(cursor.0, cursor.1),
                ElementState::Released => gallery.pointer_released(),
            },
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - last_frame).as_secs_f32();
                last_frame = now;

                let loaded = loader.poll();
                let arrived = !loaded.is_empty();
                for (index, result) in loaded {
                    match result {
                        Ok(data) => {
                            renderer.install_image(index, &data);
                            gallery.set_texture_state(index, TextureSlot::Ready);
                        }
                        Err(_) => gallery.set_texture_state(index, TextureSlot::Failed),
                    }
                }
                if arrived && gallery.textures_pending() == 0 {
                    log::info!("image loading finished");
                }

                if !gallery.tick(dt) {
                    return;
                }

                title_clock += dt;
                if title_clock > 0.25 {
                    title_clock = 0.0;
                    window.set_title(&window_title(&gallery));
                }

                match surface.get_current_texture() {
                    Ok(frame) => {
                        let view = frame
                            .texture
                            .create_view(&wgpu::TextureViewDescriptor::default());
                        renderer.render(&view, &gallery);
                        frame.present();
                    }
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        surface.configure(renderer.device(), &config);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("surface out of memory");
                        elwt.exit();
                    }
                    Err(e) => log::warn!("surface error: {:?}", e),
                }
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn render_offline(
    variant: GalleryVariant,
    images: Vec<PathBuf>,
    out_dir: PathBuf,
    fps: f32,
    duration: f32,
    width: u32,
    height: u32,
    settings: Option<PathBuf>,
) -> Result<()> {
    let total_frames = (duration * fps).ceil().max(1.0) as usize;
    let dt = 1.0 / fps.max(1.0);

    std::fs::create_dir_all(&out_dir)?;

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| anyhow::anyhow!("No adapter found"))?;
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor::default(), None)
        .await?;

    let texture_desc = wgpu::TextureDescriptor {
        label: Some("Target Texture"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    };
    let texture = device.create_texture(&texture_desc);
    let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    // Readback buffer with 256-byte aligned rows.
    let u32_size = std::mem::size_of::<u32>() as u32;
    let unpadded_bytes_per_row = u32_size * width;
    let align = 256;
    let padded_bytes_per_row_padding = (align - unpadded_bytes_per_row % align) % align;
    let padded_bytes_per_row = unpadded_bytes_per_row + padded_bytes_per_row_padding;

    let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Output Buffer"),
        size: (padded_bytes_per_row * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut gallery = GalleryInstance::new(variant, images.len(), width, height);
    apply_settings_file(&mut gallery, settings)?;
    let mut renderer = Renderer::new(device, queue, texture_desc.format, width, height, &gallery);

    // Offline runs decode up front; failed images stay on the placeholder.
    for (index, path) in images.iter().enumerate() {
        match crate::assets::decode_file(path) {
            Ok(data) => {
                renderer.install_image(index, &data);
                gallery.set_texture_state(index, TextureSlot::Ready);
            }
            Err(e) => {
                log::warn!("failed to load {:?}: {}", path, e);
                gallery.set_texture_state(index, TextureSlot::Failed);
            }
        }
    }

    println!("Rendering {} frames to {:?}...", total_frames, out_dir);

    for i in 0..total_frames {
        gallery.tick(dt);
        renderer.render(&texture_view, &gallery);

        let mut encoder = renderer
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &output_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            texture_desc.size,
        );
        renderer.queue().submit(Some(encoder.finish()));

        let buffer_slice = output_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |v| {
            let _ = tx.send(v);
        });
        renderer.device().poll(wgpu::Maintain::Wait);
        rx.recv()??;

        let data = buffer_slice.get_mapped_range();
        let mut unpadded_data = Vec::with_capacity((width * height * 4) as usize);
        for row in 0..height {
            let start = (row * padded_bytes_per_row) as usize;
            let end = start + (width * 4) as usize;
            unpadded_data.extend_from_slice(&data[start..end]);
        }

        let frame_path = out_dir.join(format!("frame_{:05}.png", i));
        image::save_buffer(&frame_path, &unpadded_data, width, height, image::ColorType::Rgba8)?;

        drop(data);
        output_buffer.unmap();

        if i % 60 == 0 {
            print!(".");
            use std::io::Write;
            std::io::stdout().flush()?;
        }
    }
    println!("\nDone.");

    Ok(())
}
