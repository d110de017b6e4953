//! Web shell: a gallery bound to a canvas, driven from JavaScript.
//!
//! The host owns the requestAnimationFrame loop and calls `frame(dt)` each
//! tick; pointer and resize events are forwarded the same way. Image pixels
//! are decoded host-side and pushed in as RGBA buffers.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::assets::ImageData;
use crate::gallery::{CancelToken, GalleryInstance, GalleryVariant};
use crate::gpu::renderer::Renderer;
use crate::surface::TextureSlot;

#[wasm_bindgen]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

struct GalleryContext {
    renderer: Renderer,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    gallery: GalleryInstance,
    cancel: CancelToken,
}

#[wasm_bindgen]
pub struct WasmGallery {
    inner: Rc<RefCell<GalleryContext>>,
}

/// Create a gallery bound to `canvas`. `variant` is one of "sphere", "wave",
/// "stack", "tunnel"; `image_count` fixes the layout, with pixels arriving
/// later via `push_image`.
#[wasm_bindgen]
pub async fn create_gallery(
    canvas: HtmlCanvasElement,
    variant: &str,
    image_count: usize,
) -> Result<WasmGallery, JsValue> {
    let variant = GalleryVariant::from_name(variant)
        .ok_or_else(|| JsValue::from_str(&format!("unknown variant: {}", variant)))?;
    let width = canvas.width().max(1);
    let height = canvas.height().max(1);

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
        ..Default::default()
    });
    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
        .map_err(|e| JsValue::from_str(&format!("surface error: {:?}", e)))?;
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| JsValue::from_str("no adapter found"))?;
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor::default(), None)
        .await
        .map_err(|e| JsValue::from_str(&format!("device error: {:?}", e)))?;

    let caps = surface.get_capabilities(&adapter);
    let format = caps.formats.first().copied().unwrap_or(wgpu::TextureFormat::Bgra8Unorm);
    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width,
        height,
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &config);

    let gallery = GalleryInstance::new(variant, image_count, width, height);
    let cancel = gallery.cancel_token();
    let renderer = Renderer::new(device, queue, format, width, height, &gallery);

    log::info!("gallery created: {} ({} images)", variant.name(), image_count);

    Ok(WasmGallery {
        inner: Rc::new(RefCell::new(GalleryContext {
            renderer,
            surface,
            config,
            gallery,
            cancel,
        })),
    })
}

#[wasm_bindgen]
impl WasmGallery {
    /// Push decoded RGBA8 pixels for one image. Returns false if the buffer
    /// does not match the dimensions.
    pub fn push_image(&self, image_index: usize, pixels: &[u8], width: u32, height: u32) -> bool {
        let mut inner = self.inner.borrow_mut();
        match ImageData::from_rgba8(width, height, pixels.to_vec()) {
            Some(data) => {
                inner.renderer.install_image(image_index, &data);
                inner.gallery.set_texture_state(image_index, TextureSlot::Ready);
                true
            }
            None => {
                log::warn!("bad pixel buffer for image {}", image_index);
                inner.gallery.set_texture_state(image_index, TextureSlot::Failed);
                false
            }
        }
    }

    /// Advance and render one frame. `dt` is seconds since the last call.
    pub fn frame(&self, dt: f32) {
        let mut inner = self.inner.borrow_mut();
        let ctx = &mut *inner;

        if !ctx.gallery.tick(dt) {
            return;
        }

        match ctx.surface.get_current_texture() {
            Ok(output) => {
                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                ctx.renderer.render(&view, &ctx.gallery);
                output.present();
            }
            Err(wgpu::SurfaceError::Lost) => {
                ctx.surface.configure(ctx.renderer.device(), &ctx.config);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
            }
            Err(e) => {
                log::warn!("surface error: {:?}", e);
            }
        }
    }

    pub fn resize(&self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let mut inner = self.inner.borrow_mut();
        let ctx = &mut *inner;
        ctx.config.width = width;
        ctx.config.height = height;
        ctx.surface.configure(ctx.renderer.device(), &ctx.config);
        ctx.renderer.resize(width, height);
        ctx.gallery.resize(width, height);
    }

    pub fn pointer_down(&self, x: f32, y: f32) {
        self.inner.borrow_mut().gallery.pointer_pressed(x, y);
    }

    pub fn pointer_move(&self, x: f32, y: f32) {
        self.inner.borrow_mut().gallery.pointer_moved(x, y);
    }

    pub fn pointer_up(&self) {
        self.inner.borrow_mut().gallery.pointer_released();
    }

    pub fn pointer_leave(&self) {
        self.inner.borrow_mut().gallery.pointer_left();
    }

    /// Set a named parameter; returns false for names this variant does not
    /// expose.
    pub fn set_setting(&self, name: &str, value: f32) -> bool {
        self.inner.borrow_mut().gallery.set_setting(name, value)
    }

    /// Current settings as a JSON object (the "copy settings" payload).
    pub fn settings_json(&self) -> String {
        self.inner.borrow().gallery.settings_json()
    }

    /// Parameter descriptions (name/min/max/step/value) as a JSON array, for
    /// building the settings panel.
    pub fn settings_specs_json(&self) -> String {
        self.inner.borrow().gallery.settings().specs_json()
    }

    /// Camera coordinates for the diagnostics readout.
    pub fn camera_readout(&self) -> String {
        self.inner.borrow().gallery.camera_text()
    }

    /// Morph coefficients for the diagnostics readout; empty for variants
    /// without one.
    pub fn morph_readout(&self) -> String {
        self.inner.borrow().gallery.morph_text().unwrap_or_default()
    }

    /// Index of the highlighted surface, or -1.
    pub fn highlighted(&self) -> i32 {
        self.inner
            .borrow()
            .gallery
            .highlight()
            .map(|i| i as i32)
            .unwrap_or(-1)
    }

    /// Stop the frame loop permanently. Subsequent `frame` calls are no-ops;
    /// GPU resources are freed when the instance is garbage collected.
    pub fn dispose(&self) {
        self.inner.borrow().cancel.cancel();
    }
}
