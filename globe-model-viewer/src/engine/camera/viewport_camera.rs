use bevy::input::mouse::MouseScrollUnit;
use bevy::math::EulerRot;
use bevy::{
    input::mouse::{MouseMotion, MouseWheel},
    prelude::*,
};

use crate::engine::scene::origin::SceneOrigin;

/// Target pose the render camera eases towards every frame.
///
/// `focus_point` is the camera position in scene-local metres; yaw and pitch
/// follow Bevy's Y-up convention, so yaw 0 looks north (-Z) and a negative
/// pitch looks down.
#[derive(Resource)]
pub struct ViewportCamera {
    pub focus_point: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub last_mouse_pos: Vec2,
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self {
            focus_point: Vec3::new(0.0, 100.0, 0.0),
            yaw: 0.0,
            pitch: -0.6,
            last_mouse_pos: Vec2::ZERO,
        }
    }
}

impl ViewportCamera {
    /// Aim at a new pose. Heading is clockwise from north, both angles in radians.
    pub fn fly_to(&mut self, position: Vec3, heading: f32, pitch: f32) {
        self.focus_point = position;
        self.yaw = -heading;
        self.pitch = pitch.clamp(-1.55, 1.55);
    }

    /// Height above the origin's tangent plane, used to scale movement speed.
    pub fn height(&self) -> f32 {
        self.focus_point.y.abs().max(1.0)
    }

    pub fn view_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }
}

/// Move camera state into a new origin without changing where it is on the globe.
pub fn rebase_camera(
    viewport_camera: &mut ViewportCamera,
    camera_transform: Option<&mut Transform>,
    from: &SceneOrigin,
    to: &SceneOrigin,
) {
    viewport_camera.focus_point = to.to_local(from.to_fixed(viewport_camera.focus_point));
    if let Some(transform) = camera_transform {
        transform.translation = to.to_local(from.to_fixed(transform.translation));
    }
}

pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut maps_camera: ResMut<ViewportCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    mut cursor_moved: EventReader<CursorMoved>,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    // Update cursor position
    for cursor in cursor_moved.read() {
        maps_camera.last_mouse_pos = cursor.position;
    }

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();

    // Right drag looks around
    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        let yaw_sens = 0.0035;
        let pitch_sens = 0.0030;
        maps_camera.yaw += -mouse_delta.x * yaw_sens;
        maps_camera.pitch += -mouse_delta.y * pitch_sens;
        maps_camera.pitch = maps_camera.pitch.clamp(-1.55, 1.55);
    }

    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }

    // Wheel dollies along the view direction
    if scroll_accum.abs() > f32::EPSILON {
        let dolly_speed = (maps_camera.height() * 0.2).clamp(0.5, 5000.0);
        let forward = (maps_camera.view_rotation() * Vec3::Z).normalize();
        maps_camera.focus_point -= forward * (scroll_accum * dolly_speed);
    }

    let mut move_input = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        move_input.z -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        move_input.z += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        move_input.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        move_input.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyE) {
        move_input.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyQ) {
        move_input.y -= 1.0;
    }

    if move_input != Vec3::ZERO {
        let view_rot = maps_camera.view_rotation();
        let forward = (view_rot * Vec3::Z).normalize();
        let right = (view_rot * Vec3::X).normalize();

        // Shift = faster, ctrl = slower
        let mut speed = maps_camera.height().clamp(2.0, 2000.0);
        if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
            speed *= 3.5;
        }
        if keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]) {
            speed *= 0.25;
        }

        let world_delta = right * move_input.x + Vec3::Y * move_input.y + forward * move_input.z;
        maps_camera.focus_point += world_delta.normalize() * speed * time.delta_secs();
    }

    let target_rot = maps_camera.view_rotation();
    let target_pos = maps_camera.focus_point;

    let lerp_speed = (12.0 * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform.translation.lerp(target_pos, lerp_speed);
    camera_transform.rotation = camera_transform.rotation.slerp(target_rot, lerp_speed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::geodesy::{Cartographic, Ellipsoid};

    #[test]
    fn test_heading_turns_view_clockwise() {
        let mut camera = ViewportCamera::default();

        camera.fly_to(Vec3::ZERO, 0.0, 0.0);
        let north = camera.view_rotation() * Vec3::NEG_Z;
        assert!((north - Vec3::NEG_Z).length() < 1e-5);

        camera.fly_to(Vec3::ZERO, std::f32::consts::FRAC_PI_2, 0.0);
        let east = camera.view_rotation() * Vec3::NEG_Z;
        assert!((east - Vec3::X).length() < 1e-5, "{east:?}");
    }

    #[test]
    fn test_negative_pitch_looks_down() {
        let mut camera = ViewportCamera::default();
        camera.fly_to(Vec3::ZERO, 0.0, -std::f32::consts::FRAC_PI_4);
        let forward = camera.view_rotation() * Vec3::NEG_Z;
        assert!(forward.y < -0.7);
    }

    #[test]
    fn test_rebase_keeps_globe_position() {
        let ellipsoid = Ellipsoid::wgs84();
        let from = SceneOrigin::at(Cartographic::from_degrees(-71.0, 42.0, 0.0), ellipsoid);
        let to = SceneOrigin::at(Cartographic::from_degrees(-71.001, 42.001, 0.0), ellipsoid);

        let mut camera = ViewportCamera::default();
        camera.focus_point = Vec3::new(10.0, 500.0, -20.0);
        let mut transform = Transform::from_translation(camera.focus_point);
        let before = from.to_fixed(camera.focus_point);

        rebase_camera(&mut camera, Some(&mut transform), &from, &to);

        assert!((to.to_fixed(camera.focus_point) - before).length() < 0.05);
        assert_eq!(transform.translation, camera.focus_point);
    }
}
