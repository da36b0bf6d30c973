pub mod camera;
pub mod renderer;
pub mod transform;

pub use camera::Camera;
pub use renderer::SceneRenderer;
pub use transform::Transform;

use std::time::Instant;

use glam::{Mat4, Vec3};
use winit::keyboard::KeyCode;

/// Per-frame shader inputs for the scene pass. Matches `SceneUniforms` in
/// `shaders/scene.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub model_view_projection: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub light_direction: [f32; 4],
    pub light_color: [f32; 4],
    pub ambient: [f32; 4],
    /// x holds the elapsed time in seconds.
    pub params: [f32; 4],
}

/// How the model is oriented over time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ModelMotion {
    /// A constant rotation in radians.
    Fixed { angle: f32 },
    Spinning { radians_per_second: f32 },
}

impl Default for ModelMotion {
    fn default() -> Self {
        ModelMotion::Fixed {
            angle: 30f32.to_radians(),
        }
    }
}

impl ModelMotion {
    pub fn angle_at(&self, elapsed: f32) -> f32 {
        match *self {
            ModelMotion::Fixed { angle } => angle,
            ModelMotion::Spinning { radians_per_second } => radians_per_second * elapsed,
        }
    }
}

pub struct Scene {
    pub camera: Camera,
    pub motion: ModelMotion,
    pub rotation_axis: Vec3,
    pub model_position: Vec3,
    ambient_light: Vec3,
    directional_light: Vec3,
    light_direction: Vec3,
    last_update: Instant,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            motion: ModelMotion::default(),
            rotation_axis: Vec3::Z,
            model_position: Vec3::new(0.0, 1.0, 0.0),
            light_direction: Vec3::new(-1.0, -1.0, -1.0).normalize(),
            directional_light: Vec3::ONE,
            ambient_light: Vec3::splat(0.2),
            last_update: Instant::now(),
        }
    }

    /// Advances the camera by the wall-clock time since the last call.
    pub fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_update).as_secs_f32();
        self.last_update = now;

        self.camera.update(dt);
    }

    pub fn process_keyboard(&mut self, key: KeyCode, pressed: bool) -> bool {
        self.camera.process_keyboard(key, pressed)
    }

    pub fn process_mouse(&mut self, dx: f32, dy: f32) {
        self.camera.process_mouse(dx, dy);
    }

    pub fn set_ambient_light(&mut self, intensity: f32) {
        self.ambient_light = Vec3::splat(intensity.clamp(0.0, 1.0));
    }

    pub fn set_directional_light(&mut self, color: Vec3, direction: Vec3) {
        self.directional_light = color.clamp(Vec3::ZERO, Vec3::ONE);
        self.light_direction = direction.normalize();
    }

    pub fn model_transform(&self, elapsed: f32) -> Transform {
        Transform::from_axis_angle(
            self.rotation_axis,
            self.motion.angle_at(elapsed),
            self.model_position,
        )
    }

    pub fn uniforms(&self, aspect: f32, elapsed: f32) -> SceneUniforms {
        let transform = self.model_transform(elapsed);
        let model: Mat4 = transform.to_matrix();
        let view_projection = self.camera.view_projection_matrix(aspect);

        SceneUniforms {
            model_view_projection: (view_projection * model).to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            normal: transform.normal_matrix().to_cols_array_2d(),
            light_direction: self.light_direction.extend(0.0).to_array(),
            light_color: self.directional_light.extend(1.0).to_array(),
            ambient: self.ambient_light.extend(1.0).to_array(),
            params: [elapsed, 0.0, 0.0, 0.0],
        }
    }
}
