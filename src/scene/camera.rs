use glam::{Mat4, Vec3};
use winit::keyboard::KeyCode;

/// Which movement keys are held.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Movement {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// First-person fly camera. Angles are in degrees.
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub near: f32,
    pub speed: f32,
    pub sensitivity: f32,
    pub movement: Movement,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: -90.0,
            pitch: 0.0,
            fov: 45.0,
            near: 0.001,
            speed: 5.0,
            sensitivity: 0.1,
            movement: Movement::default(),
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.view_direction(), Vec3::Y)
    }

    /// Perspective with no far plane.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_infinite_rh(self.fov.to_radians(), aspect, self.near)
    }

    pub fn view_projection_matrix(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Horizontal forward direction, ignoring pitch.
    pub fn forward(&self) -> Vec3 {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        Vec3::new(yaw_cos, 0.0, yaw_sin).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    pub fn view_direction(&self) -> Vec3 {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize()
    }

    pub fn process_mouse(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-89.0, 89.0);
    }

    pub fn process_keyboard(&mut self, key: KeyCode, pressed: bool) -> bool {
        let flag = match key {
            KeyCode::KeyW | KeyCode::ArrowUp => &mut self.movement.forward,
            KeyCode::KeyS | KeyCode::ArrowDown => &mut self.movement.backward,
            KeyCode::KeyA | KeyCode::ArrowLeft => &mut self.movement.left,
            KeyCode::KeyD | KeyCode::ArrowRight => &mut self.movement.right,
            KeyCode::Space => &mut self.movement.up,
            KeyCode::ShiftLeft => &mut self.movement.down,
            _ => return false,
        };
        *flag = pressed;
        true
    }

    pub fn update(&mut self, dt: f32) {
        let velocity = self.speed * dt;
        let forward = self.forward();
        let right = self.right();
        let m = self.movement;

        let mut delta = Vec3::ZERO;
        if m.forward {
            delta += forward;
        }
        if m.backward {
            delta -= forward;
        }
        if m.right {
            delta += right;
        }
        if m.left {
            delta -= right;
        }
        if m.up {
            delta += Vec3::Y;
        }
        if m.down {
            delta -= Vec3::Y;
        }
        self.position += delta * velocity;
    }
}
