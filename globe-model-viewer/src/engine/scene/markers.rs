use bevy::prelude::*;

/// Tag for anything drawn by the measuring tools. Picking ignores these.
#[derive(Component)]
pub struct MeasurementVisual;

/// Sphere kept at a constant on-screen diameter. The mesh has unit diameter.
#[derive(Component)]
pub struct ScreenSizedMarker {
    pub pixels: f32,
}

/// Line segment kept at a constant on-screen width.
///
/// The mesh is a unit cuboid stretched along local X to the segment length,
/// so only the Y and Z scale change with distance.
#[derive(Component)]
pub struct ScreenSizedLine {
    pub pixels: f32,
}

/// World size of one screen pixel at `distance` in front of a perspective camera.
pub fn world_units_per_pixel(distance: f32, fov: f32, viewport_height: f32) -> f32 {
    if viewport_height <= 0.0 {
        return 0.0;
    }
    2.0 * distance * (fov * 0.5).tan() / viewport_height
}

/// Rescale markers and lines after the camera has moved.
pub fn scale_screen_sized_visuals(
    camera_query: Query<(&Camera, &Projection, &GlobalTransform), With<Camera3d>>,
    mut markers: Query<(&ScreenSizedMarker, &mut Transform), Without<ScreenSizedLine>>,
    mut lines: Query<(&ScreenSizedLine, &mut Transform, &GlobalTransform), Without<ScreenSizedMarker>>,
) {
    let Ok((camera, projection, camera_transform)) = camera_query.single() else {
        return;
    };
    let Projection::Perspective(perspective) = projection else {
        return;
    };
    let Some(viewport) = camera.logical_viewport_size() else {
        return;
    };
    let eye = camera_transform.translation();

    for (marker, mut transform) in &mut markers {
        let distance = transform.translation.distance(eye);
        let size = marker.pixels * world_units_per_pixel(distance, perspective.fov, viewport.y);
        transform.scale = Vec3::splat(size.max(f32::EPSILON));
    }

    for (line, mut transform, global) in &mut lines {
        let distance = global.translation().distance(eye);
        let width = line.pixels * world_units_per_pixel(distance, perspective.fov, viewport.y);
        transform.scale.y = width.max(f32::EPSILON);
        transform.scale.z = width.max(f32::EPSILON);
    }
}
