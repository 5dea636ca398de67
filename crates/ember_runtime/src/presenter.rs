//! wgpu presenter
//!
//! Owns the surface and presents the frame: sky clear for the game view,
//! a dark red wash for the death screen. Mesh and skeleton drawing belong
//! to the engine's render path and would attach here.

use crate::RuntimeError;
use ember_scene::Scene;
use std::sync::Arc;
use winit::window::Window;

const DEATH_CLEAR: wgpu::Color = wgpu::Color {
    r: 0.25,
    g: 0.02,
    b: 0.02,
    a: 1.0,
};

pub struct Presenter {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
}

impl Presenter {
    /// Create a presenter for `window` using the selected backends.
    pub fn new(
        window: Arc<Window>,
        width: u32,
        height: u32,
        backends: wgpu::Backends,
    ) -> Result<Self, RuntimeError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            compatible_surface: Some(&surface),
            ..Default::default()
        }))
        .ok_or(RuntimeError::NoAdapter)?;
        log::info!("graphics adapter: {}", adapter.get_info().name);

        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default(), None))?;

        let config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .ok_or(RuntimeError::SurfaceConfig)?;
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    /// Resize the surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
    }

    /// Present one frame.
    pub fn render(&mut self, scene: &Scene, death_screen: bool) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(error) => {
                log::warn!("skipping frame: {error}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let clear = if death_screen {
            DEATH_CLEAR
        } else {
            let [r, g, b, a] = scene.sky_colour();
            wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            }
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("present"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
    }
}

/// Map the config's backend selector onto wgpu backends.
pub fn backends_from_selector(selector: &str) -> wgpu::Backends {
    match selector.to_lowercase().as_str() {
        "vulkan" => wgpu::Backends::VULKAN,
        "metal" => wgpu::Backends::METAL,
        "dx12" => wgpu::Backends::DX12,
        "gl" => wgpu::Backends::GL,
        "auto" | "" => wgpu::Backends::all(),
        other => {
            log::warn!("unknown graphics_api '{other}', using auto");
            wgpu::Backends::all()
        }
    }
}
