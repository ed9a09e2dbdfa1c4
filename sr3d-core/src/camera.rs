/// First-person camera state and the controllers that move it.
///
/// Two movement models are available:
///
/// - [`NudgeController`]: each held key nudges the velocity, which is damped
///   every frame. Free flight, no gravity.
/// - [`PhysicsController`]: keys apply forces; gravity, ground friction, air
///   drag and a jump impulse that only fires close to the ground.
///
/// Mouse look is shared by both through [`MouseLook`].

use crate::input::{FrameInput, Key};
use crate::math::{radians, Vec3};
use crate::transform::{Mat4, Transform};

/// World up axis.
pub fn world_up() -> Vec3 {
    Vec3::y()
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Radians about the world Y axis; 0 looks down +Z.
    pub yaw: f32,
    /// Radians above the horizon.
    pub pitch: f32,
}

impl CameraState {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Unit look direction from yaw and pitch.
    pub fn look_dir(&self) -> Vec3 {
        let (sp, cp) = self.pitch.sin_cos();
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(cp * sy, sp, cp * cy)
    }

    /// Camera-to-world matrix.
    pub fn point_at(&self) -> Mat4 {
        let target = self.position + self.look_dir();
        Transform::point_at(&self.position, &target, &world_up())
    }

    /// World-to-camera matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Transform::quick_inverse(&self.point_at())
    }
}

/// Moves a camera from one frame of input.
pub trait CameraController {
    fn name(&self) -> &'static str;
    fn update(&mut self, camera: &mut CameraState, input: &FrameInput, dt: f32);
}

/// Relative mouse look: the pointer offset from the screen centre turns the
/// camera, then the pointer is put back in the centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseLook {
    /// Radians per pixel of pointer travel.
    pub sensitivity: f32,
    /// Absolute pitch limit in radians.
    pub pitch_limit: f32,
}

impl Default for MouseLook {
    fn default() -> Self {
        Self {
            sensitivity: 0.002,
            pitch_limit: radians(50.0),
        }
    }
}

impl MouseLook {
    /// Applies the pointer offset. Returns where the cursor should be moved
    /// to, or `None` if it has not moved.
    pub fn apply(&self, camera: &mut CameraState, input: &FrameInput) -> Option<(i32, i32)> {
        let center = input.screen_center();
        if input.mouse == center {
            return None;
        }
        let dx = (center.0 - input.mouse.0) as f32;
        let dy = (center.1 - input.mouse.1) as f32;
        camera.yaw += self.sensitivity * dx;
        camera.pitch = (camera.pitch + self.sensitivity * dy)
            .clamp(-self.pitch_limit, self.pitch_limit);
        Some(center)
    }
}

/// Free flight with damped velocity nudges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NudgeController {
    /// Velocity added per second while a movement key is held.
    pub thrust: f32,
    /// Velocity is divided by `1 + damping * dt` every frame.
    pub damping: f32,
    /// Radians per second for the arrow keys.
    pub turn_speed: f32,
    pub pitch_limit: f32,
}

impl Default for NudgeController {
    fn default() -> Self {
        Self {
            thrust: 40.0,
            damping: 8.0,
            turn_speed: 2.0,
            pitch_limit: radians(50.0),
        }
    }
}

impl CameraController for NudgeController {
    fn name(&self) -> &'static str {
        "nudge"
    }

    fn update(&mut self, camera: &mut CameraState, input: &FrameInput, dt: f32) {
        let turn = self.turn_speed * dt;
        if input.held(Key::Left) {
            camera.yaw -= turn;
        }
        if input.held(Key::Right) {
            camera.yaw += turn;
        }
        if input.held(Key::Up) {
            camera.pitch += turn;
        }
        if input.held(Key::Down) {
            camera.pitch -= turn;
        }
        camera.pitch = camera.pitch.clamp(-self.pitch_limit, self.pitch_limit);

        let forward = camera.look_dir();
        let right = world_up().cross(&forward);
        let nudge = self.thrust * dt;

        let mut push = Vec3::zeros();
        if input.held(Key::W) {
            push += forward;
        }
        if input.held(Key::S) {
            push -= forward;
        }
        if input.held(Key::A) {
            push += right;
        }
        if input.held(Key::D) {
            push -= right;
        }
        if input.held(Key::E) {
            push += world_up();
        }
        if input.held(Key::Q) {
            push -= world_up();
        }

        camera.acceleration = Vec3::zeros();
        camera.velocity += push * nudge;
        camera.position += camera.velocity * dt;
        camera.velocity /= 1.0 + self.damping * dt;
    }
}

/// Walking camera: forces, gravity, friction and jumping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsController {
    pub mass: f32,
    /// Vertical acceleration, negative is down.
    pub gravity: f32,
    /// Friction coefficient while on the ground.
    pub ground_friction: f32,
    /// Drag coefficient while airborne.
    pub air_drag: f32,
    /// Walk force per second of frame time.
    pub walk_force: f32,
    pub jump_speed: f32,
    /// Heights below this count as standing on the ground.
    pub ground_height: f32,
}

impl Default for PhysicsController {
    fn default() -> Self {
        Self {
            mass: 1.0,
            gravity: -10.0,
            ground_friction: 100.0,
            air_drag: 50.0,
            walk_force: 10000.0,
            jump_speed: 7.0,
            ground_height: 0.02,
        }
    }
}

impl PhysicsController {
    pub fn on_ground(&self, camera: &CameraState) -> bool {
        camera.position.y < self.ground_height
    }

    /// Factor applied to horizontal velocity for one step of friction or
    /// drag. The resisting force `-k·|g|·v` is integrated implicitly, so the
    /// factor stays in `(0, 1]` for any `dt` and a long frame cannot flip the
    /// direction of travel.
    fn resistance(&self, camera: &CameraState, dt: f32) -> f32 {
        let k = if camera.position.y <= self.ground_height {
            self.ground_friction
        } else {
            self.air_drag
        };
        1.0 / (1.0 + k * self.gravity.abs() / self.mass * dt * dt)
    }
}

impl CameraController for PhysicsController {
    fn name(&self) -> &'static str {
        "physics"
    }

    fn update(&mut self, camera: &mut CameraState, input: &FrameInput, dt: f32) {
        let look = camera.look_dir();
        let walk = self.walk_force * dt;
        let forward = Vec3::new(look.x * walk, 0.0, look.z * walk);
        let right = world_up().cross(&forward);

        if input.held(Key::Space) && self.on_ground(camera) {
            camera.position.y = self.ground_height * 0.5;
            camera.velocity.y = self.jump_speed;
        }

        if input.held(Key::W) {
            camera.acceleration += forward;
        }
        if input.held(Key::S) {
            camera.acceleration -= forward;
        }
        if input.held(Key::A) {
            camera.acceleration += right;
        }
        if input.held(Key::D) {
            camera.acceleration -= right;
        }
        camera.acceleration /= self.mass;

        if camera.position.y > 0.0 {
            camera.velocity.y += self.gravity * dt;
        } else {
            camera.velocity.y = 0.0;
            camera.acceleration.y = 0.0;
        }

        let resistance = self.resistance(camera, dt);
        camera.velocity += camera.acceleration * dt;
        camera.velocity.x *= resistance;
        camera.velocity.z *= resistance;

        camera.position += camera.velocity * dt;
        if camera.position.y < 0.0 {
            camera.position.y = 0.0;
        }
        camera.acceleration = Vec3::zeros();
    }
}
