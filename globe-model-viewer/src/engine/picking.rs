use bevy::math::DVec3;
use bevy::picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::engine::geodesy::ray_ellipsoid;
use crate::engine::scene::grid::GroundGrid;
use crate::engine::scene::markers::MeasurementVisual;
use crate::engine::scene::origin::SceneOrigin;

/// Where the cursor ray first met the model or the globe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenePick {
    /// Earth-fixed position in metres.
    pub position: DVec3,
    /// Mesh entity hit, when the model was nearer than the ellipsoid.
    pub model_hit: Option<Entity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Click,
    Move,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ScenePointerEvent {
    pub action: PointerAction,
    pub pick: ScenePick,
}

/// Cast the cursor ray on left clicks and cursor moves.
pub fn pick_under_cursor(
    buttons: Res<ButtonInput<MouseButton>>,
    mut cursor_moved: EventReader<CursorMoved>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    origin: Res<SceneOrigin>,
    mut ray_cast: MeshRayCast,
    skipped: Query<(), Or<(With<MeasurementVisual>, With<GroundGrid>)>>,
    mut pointer_events: EventWriter<ScenePointerEvent>,
) {
    let moved = cursor_moved.read().count() > 0;
    let clicked = buttons.just_pressed(MouseButton::Left);
    if !moved && !clicked {
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor) else {
        return;
    };

    let filter = |entity: Entity| !skipped.contains(entity);
    let settings = MeshRayCastSettings::default().with_filter(&filter);
    let mesh_hit = ray_cast
        .cast_ray(ray, &settings)
        .first()
        .map(|(entity, hit)| (*entity, hit.distance as f64, origin.to_fixed(hit.point)));

    let fixed_origin = origin.to_fixed(ray.origin);
    let fixed_direction = origin.direction_to_fixed(*ray.direction);
    let globe_hit = ray_ellipsoid(fixed_origin, fixed_direction, origin.ellipsoid()).map(|interval| {
        let distance = interval.nearest();
        (distance, fixed_origin + fixed_direction * distance)
    });

    let Some(pick) = nearest_pick(mesh_hit, globe_hit) else {
        return;
    };

    if moved {
        pointer_events.write(ScenePointerEvent {
            action: PointerAction::Move,
            pick,
        });
    }
    if clicked {
        pointer_events.write(ScenePointerEvent {
            action: PointerAction::Click,
            pick,
        });
    }
}

/// Prefer whichever of the mesh and ellipsoid hits is closer along the ray.
fn nearest_pick(
    mesh_hit: Option<(Entity, f64, DVec3)>,
    globe_hit: Option<(f64, DVec3)>,
) -> Option<ScenePick> {
    match (mesh_hit, globe_hit) {
        (Some((entity, mesh_distance, position)), Some((globe_distance, _)))
            if mesh_distance <= globe_distance =>
        {
            Some(ScenePick {
                position,
                model_hit: Some(entity),
            })
        }
        (Some((entity, _, position)), None) => Some(ScenePick {
            position,
            model_hit: Some(entity),
        }),
        (_, Some((_, position))) => Some(ScenePick {
            position,
            model_hit: None,
        }),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::geodesy::{Cartographic, Ellipsoid};

    #[test]
    fn test_model_in_front_of_globe_wins() {
        let model = Entity::from_raw(3);
        let pick = nearest_pick(
            Some((model, 80.0, DVec3::X)),
            Some((100.0, DVec3::Y)),
        )
        .unwrap();
        assert_eq!(pick.model_hit, Some(model));
        assert_eq!(pick.position, DVec3::X);
    }

    #[test]
    fn test_globe_in_front_of_model_wins() {
        let pick = nearest_pick(
            Some((Entity::from_raw(3), 120.0, DVec3::X)),
            Some((100.0, DVec3::Y)),
        )
        .unwrap();
        assert_eq!(pick.model_hit, None);
        assert_eq!(pick.position, DVec3::Y);
    }

    #[test]
    fn test_no_hits_no_pick() {
        assert_eq!(nearest_pick(None, None), None);
    }

    #[test]
    fn test_downward_ray_from_camera_lands_below_it() {
        let ellipsoid = Ellipsoid::wgs84();
        let origin = SceneOrigin::at(Cartographic::from_degrees(-71.0349999, 42.213, 0.0), ellipsoid);

        let fixed_origin = origin.to_fixed(Vec3::new(0.0, 1000.0, 0.0));
        let fixed_direction = origin.direction_to_fixed(Vec3::NEG_Y);
        let interval = ray_ellipsoid(fixed_origin, fixed_direction, &ellipsoid).unwrap();

        assert!((interval.nearest() - 1000.0).abs() < 0.5);
        let hit = origin.to_local(fixed_origin + fixed_direction * interval.nearest());
        assert!(hit.length() < 0.5, "{hit:?}");
    }
}
