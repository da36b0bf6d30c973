use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::window::Window;

use crate::compositor::{clear_screen, Compositor};
use crate::frame::Frame;
use crate::model::{IndexedMesh, Mesh, Texture, TextureOptions};
use crate::render_target::{RenderTarget, RenderTargetDescriptor};
use crate::scene::{Scene, SceneRenderer};

/// Clear color of the offscreen scene pass.
pub const SCENE_CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.78,
    g: 0.2,
    b: 0.2,
    a: 1.0,
};

/// Surface configuration plus whether the window currently has any area.
///
/// A minimized window reports a 0x0 size. The last non-zero configuration is
/// kept, but nothing may be configured or presented until the window comes back.
#[derive(Clone, Debug)]
pub struct SurfaceState {
    config: wgpu::SurfaceConfiguration,
    minimized: bool,
}

impl SurfaceState {
    pub fn new(config: wgpu::SurfaceConfiguration) -> Self {
        Self {
            minimized: config.width == 0 || config.height == 0,
            config,
        }
    }

    pub fn config(&self) -> &wgpu::SurfaceConfiguration {
        &self.config
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    /// Records a window resize. Returns `true` when the surface has to be
    /// configured with the new size.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            self.minimized = true;
            return false;
        }
        self.minimized = false;
        self.config.width = width;
        self.config.height = height;
        true
    }
}

/// Owns the GPU context and every resource the frame loop touches.
pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_state: SurfaceState,
    target: RenderTarget,
    scene_renderer: SceneRenderer,
    compositor: Compositor,
    mesh: Mesh,
}

impl Renderer {
    /// Sets up the surface for `window` and uploads `mesh`. Without a texture
    /// path the model is drawn with plain white.
    pub fn new(
        window: Arc<Window>,
        mesh: IndexedMesh,
        texture: Option<(&Path, &TextureOptions)>,
    ) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .context("failed to create window surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?}, driver {})", info.name, info.backend, info.driver);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Primary Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no supported formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        log::info!("Surface format {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut descriptor =
            RenderTargetDescriptor::new("Scene Target", config.width, config.height);
        descriptor.color[0].clear_color = SCENE_CLEAR_COLOR;
        let target = RenderTarget::new(&device, &descriptor)?;

        let texture = match texture {
            Some((path, options)) => Texture::from_path(&device, &queue, path, options)?,
            None => Texture::white(&device, &queue),
        };
        let scene_renderer = SceneRenderer::new(&device, target.descriptor(), &texture);
        let compositor = Compositor::new(&device, surface_format);
        let mesh = Mesh::from_indexed(&device, "Model", mesh);

        Ok(Self {
            device,
            queue,
            surface,
            surface_state: SurfaceState::new(config),
            target,
            scene_renderer,
            compositor,
            mesh,
        })
    }

    pub fn is_minimized(&self) -> bool {
        self.surface_state.is_minimized()
    }

    /// Follows a window resize. The surface is only reconfigured for a
    /// non-zero size; the render target ignores zero sizes on its own.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.surface_state.resize(width, height) {
            self.surface.configure(&self.device, self.surface_state.config());
        }
        self.target.resize(&self.device, width, height);
    }

    /// Reapplies the current configuration after the surface was lost.
    /// Does nothing while the window is minimized.
    pub fn reconfigure(&mut self) {
        if self.surface_state.is_minimized() {
            return;
        }
        self.surface.configure(&self.device, self.surface_state.config());
    }

    /// Clears the window, draws the scene into the offscreen target and
    /// composites the result, then presents. Skipped while minimized.
    pub fn render_frame(&mut self, scene: &Scene, elapsed: f32) -> Result<(), wgpu::SurfaceError> {
        if self.surface_state.is_minimized() {
            return Ok(());
        }
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut frame = Frame::new(&self.device);

        clear_screen(&mut frame, &view, wgpu::Color::BLACK);

        let uniforms = scene.uniforms(self.target.aspect_ratio(), elapsed);
        self.scene_renderer.prepare(&self.queue, &uniforms);
        let scene_renderer = &self.scene_renderer;
        let mesh = &self.mesh;
        self.target.render(&mut frame, |pass| {
            scene_renderer.draw(pass, mesh);
            Ok::<_, wgpu::SurfaceError>(())
        })?;

        if let Some(color) = self.target.color_attachment(0) {
            self.compositor.draw(&self.device, &mut frame, &view, color);
        }

        self.queue.submit(std::iter::once(frame.finish()));
        output.present();
        Ok(())
    }
}
