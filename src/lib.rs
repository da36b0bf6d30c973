use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec3;
use winit::window::Window;

pub mod compositor;
pub mod config;
pub mod frame;
pub mod model;
pub mod render_target;
pub mod renderer;
pub mod scene;
#[cfg(test)]
mod test_support;

use config::ViewerConfig;
use model::{IndexedMesh, ModelLoader};
use renderer::Renderer;
use scene::{Camera, Scene};

/// Everything the event loop drives: the window, the scene and the renderer.
pub struct State {
    window: Arc<Window>,
    pub scene: Scene,
    renderer: Renderer,
    start: Instant,
}

impl State {
    pub fn new(window: Window, config: &ViewerConfig) -> Result<Self> {
        let window = Arc::new(window);

        let mesh = match &config.model {
            Some(path) => ModelLoader::load(path)
                .with_context(|| format!("failed to load model {}", path.display()))?,
            None => {
                log::info!("No model given, drawing the built-in cube");
                IndexedMesh::cube()
            }
        };

        let texture_options = config.texture_options();
        let texture = config
            .texture
            .as_deref()
            .map(|path| (path, &texture_options));
        let renderer = Renderer::new(window.clone(), mesh, texture)?;

        let mut scene = Scene::new(Camera::new(Vec3::new(0.0, 1.0, 5.0)));
        scene.motion = config.motion();
        scene.set_ambient_light(0.2);
        scene.set_directional_light(Vec3::ONE, Vec3::new(-0.5, -1.0, -0.5));

        Ok(Self {
            window,
            scene,
            renderer,
            start: Instant::now(),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Zero sizes (minimized windows) leave the surface and target as they are.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
    }

    /// True while the window has no area; rendering is paused until it gets one back.
    pub fn is_minimized(&self) -> bool {
        self.renderer.is_minimized()
    }

    pub fn reconfigure(&mut self) {
        self.renderer.reconfigure();
    }

    pub fn update(&mut self) {
        self.scene.update();
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let elapsed = self.start.elapsed().as_secs_f32();
        self.renderer.render_frame(&self.scene, elapsed)
    }
}
