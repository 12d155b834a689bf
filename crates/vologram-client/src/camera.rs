//! Orbit camera for inspecting the vologram.
//!
//! Left-drag orbits around the target, the scroll wheel zooms.

use bevy::ecs::message::MessageReader;
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;

/// Closest the camera gets to its target, in meters.
pub const MIN_DISTANCE: f32 = 0.3;
/// Furthest the camera gets from its target, in meters.
pub const MAX_DISTANCE: f32 = 50.0;

/// Plugin for orbit camera controls.
pub struct CameraControllerPlugin;

impl Plugin for CameraControllerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .add_systems(Startup, spawn_camera)
            .add_systems(Update, (zoom_with_scroll, orbit_with_mouse, apply_orbit).chain());
    }
}

/// Settings for camera movement.
#[derive(Resource)]
pub struct CameraSettings {
    /// Radians per pixel of mouse movement.
    pub mouse_sensitivity: f32,
    /// Distance factor per scroll line.
    pub zoom_step: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.005,
            zoom_step: 1.1,
        }
    }
}

/// Orbit state of the camera.
#[derive(Component)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        // Captures stand on the origin and are roughly human sized.
        Self {
            target: Vec3::new(0.0, 1.0, 0.0),
            distance: 3.5,
            yaw: 0.0,
            pitch: 0.1,
        }
    }
}

fn spawn_camera(mut commands: Commands) {
    let orbit = OrbitCamera::default();
    commands.spawn((Camera3d::default(), orbit_transform(&orbit), orbit));
}

fn orbit_transform(orbit: &OrbitCamera) -> Transform {
    let rotation = Quat::from_euler(EulerRot::YXZ, orbit.yaw, -orbit.pitch, 0.0);
    let position = orbit.target + rotation * Vec3::new(0.0, 0.0, orbit.distance);
    Transform::from_translation(position).looking_at(orbit.target, Vec3::Y)
}

/// Zoom with the mouse wheel.
#[allow(clippy::needless_pass_by_value)]
fn zoom_with_scroll(
    mut scroll_events: MessageReader<MouseWheel>,
    settings: Res<CameraSettings>,
    mut query: Query<&mut OrbitCamera>,
) {
    let scroll: f32 = scroll_events.read().map(|event| event.y).sum();
    if scroll == 0.0 {
        return;
    }

    for mut orbit in &mut query {
        let factor = settings.zoom_step.powf(-scroll);
        orbit.distance = (orbit.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

/// Orbit while the left button is held.
#[allow(clippy::needless_pass_by_value)]
fn orbit_with_mouse(
    mut mouse_motion: MessageReader<MouseMotion>,
    mouse: Res<ButtonInput<MouseButton>>,
    settings: Res<CameraSettings>,
    mut query: Query<&mut OrbitCamera>,
) {
    let delta: Vec2 = mouse_motion.read().map(|event| event.delta).sum();
    if !mouse.pressed(MouseButton::Left) || delta == Vec2::ZERO {
        return;
    }

    for mut orbit in &mut query {
        orbit.yaw -= delta.x * settings.mouse_sensitivity;
        // Stop short of the poles so `looking_at` keeps a stable up vector.
        orbit.pitch = (orbit.pitch + delta.y * settings.mouse_sensitivity).clamp(-1.5, 1.5);
    }
}

fn apply_orbit(mut query: Query<(&OrbitCamera, &mut Transform), Changed<OrbitCamera>>) {
    for (orbit, mut transform) in &mut query {
        *transform = orbit_transform(orbit);
    }
}
