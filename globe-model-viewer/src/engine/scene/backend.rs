use std::sync::Arc;

use bevy::asset::RenderAssetUsages;
use bevy::ecs::system::SystemParam;
use bevy::math::{DMat4, DVec3};
use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use constants::render_settings::{
    AREA_COLOUR, AREA_FILL_ALPHA, DISTANCE_COLOUR, LABEL_COLOUR, LABEL_FONT_SIZE,
    POINT_MARKER_COLOUR,
};

use super::labels::WorldLabel;
use super::markers::{MeasurementVisual, ScreenSizedLine, ScreenSizedMarker};
use super::origin::SceneOrigin;
use crate::engine::camera::viewport_camera::{ViewportCamera, rebase_camera};
use crate::engine::loading::memory_source::{ModelMemorySource, model_file_name};
use crate::engine::loading::model_loader::{ModelNodes, ModelPlacement, ModelRoot, PendingModel};
use crate::engine::loading::settings_loader::{ViewerSettings, ground_anchor};
use crate::model::lifecycle::{CameraDestination, ModelStage, SpawnRequest};
use crate::tools::measure::session::{LabelPlacement, MeasurementCanvas};
use crate::tools::tool_manager::ToolType;

/// The Bevy world as seen by the model controller and the measurement session.
#[derive(SystemParam)]
pub struct BevyScene<'w, 's> {
    commands: Commands<'w, 's>,
    meshes: ResMut<'w, Assets<Mesh>>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    asset_server: Res<'w, AssetServer>,
    memory: Res<'w, ModelMemorySource>,
    origin: ResMut<'w, SceneOrigin>,
    viewport_camera: ResMut<'w, ViewportCamera>,
    cameras: Query<'w, 's, &'static mut Transform, With<Camera3d>>,
    settings: Res<'w, ViewerSettings>,
}

impl BevyScene<'_, '_> {
    /// Swap the pending marker for the loaded scene.
    pub fn show_model_scene(&mut self, model: Entity, scene: Handle<Scene>) {
        self.commands
            .entity(model)
            .remove::<PendingModel>()
            .insert(SceneRoot(scene));
    }

    /// Re-anchor the scene, carrying the camera along.
    fn rebase(&mut self, next: SceneOrigin) {
        let mut camera_transform = self.cameras.single_mut().ok();
        rebase_camera(
            &mut self.viewport_camera,
            camera_transform.as_deref_mut(),
            &self.origin,
            &next,
        );
        let anchor = next.anchor();
        debug!(
            "Scene origin moved to {:.7}, {:.7}",
            anchor.longitude_degrees(),
            anchor.latitude_degrees()
        );
        *self.origin = next;
    }

    fn unlit_material(&mut self, colour: Color) -> Handle<StandardMaterial> {
        self.materials.add(StandardMaterial {
            base_color: colour,
            unlit: true,
            ..default()
        })
    }

    fn local_points(&self, positions: &[DVec3]) -> Vec<Vec3> {
        positions.iter().map(|p| self.origin.to_local(*p)).collect()
    }
}

impl ModelStage for BevyScene<'_, '_> {
    fn spawn_model(&mut self, request: SpawnRequest) -> Entity {
        let next = SceneOrigin::at(ground_anchor(&request.coordinates), *self.origin.ellipsoid());
        self.rebase(next);

        let file_name = model_file_name(request.generation);
        let asset_path = self.memory.insert(&file_name, Arc::clone(&request.file.bytes));
        let handle = self.asset_server.load(asset_path);

        self.commands
            .spawn((
                Name::new(request.file.name.clone()),
                ModelRoot {
                    generation: request.generation,
                },
                ModelPlacement(request.placement),
                PendingModel { handle },
                ModelNodes(request.nodes),
                self.origin.model_transform(&request.placement),
                Visibility::default(),
            ))
            .id()
    }

    fn set_placement(&mut self, model: Entity, placement: &DMat4) {
        let transform = self.origin.model_transform(placement);
        if let Ok(mut entity) = self.commands.get_entity(model) {
            entity.insert((ModelPlacement(*placement), transform));
        }
    }

    fn despawn_model(&mut self, model: Entity) {
        self.commands.entity(model).try_despawn();
    }

    fn release_model_file(&mut self, generation: u64) {
        let file_name = model_file_name(generation);
        if self.memory.remove(&file_name) {
            debug!("Released {}", file_name);
        }
    }

    fn fly_to(&mut self, destination: &CameraDestination) {
        let position = self.origin.cartographic_to_local(&destination.position);
        self.viewport_camera.fly_to(
            position,
            destination.heading as f32,
            destination.pitch as f32,
        );
    }
}

impl MeasurementCanvas for BevyScene<'_, '_> {
    fn add_marker(&mut self, position: DVec3, tool: ToolType) -> Entity {
        let mesh = self.meshes.add(Sphere::new(0.5));
        let material = self.unlit_material(tool_colour(tool));
        let pixels = self.settings.marker_pixel_size;

        self.commands
            .spawn((
                Mesh3d(mesh),
                MeshMaterial3d(material),
                Transform::from_translation(self.origin.to_local(position)),
                ScreenSizedMarker { pixels },
                MeasurementVisual,
                NotShadowCaster,
            ))
            .id()
    }

    fn add_label(&mut self, position: DVec3, text: &str, placement: LabelPlacement) -> Entity {
        self.commands
            .spawn((
                Text::new(text),
                TextFont {
                    font_size: LABEL_FONT_SIZE,
                    ..default()
                },
                TextColor(LABEL_COLOUR),
                BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
                Node {
                    position_type: PositionType::Absolute,
                    padding: UiRect::axes(Val::Px(6.0), Val::Px(3.0)),
                    ..default()
                },
                Visibility::Hidden,
                WorldLabel {
                    anchor: self.origin.to_local(position),
                    placement,
                },
                MeasurementVisual,
            ))
            .id()
    }

    fn add_polyline(&mut self, positions: &[DVec3], closed: bool, tool: ToolType) -> Entity {
        let points = self.local_points(positions);
        let mesh = self.meshes.add(Cuboid::new(1.0, 1.0, 1.0));
        let material = self.unlit_material(tool_colour(tool));
        let pixels = self.settings.line_pixel_width;

        let line = self
            .commands
            .spawn((
                Name::new(format!("{} line", tool.to_string())),
                Transform::IDENTITY,
                Visibility::Visible,
                MeasurementVisual,
            ))
            .id();

        for (start, end) in line_segments(&points, closed) {
            let Some(transform) = segment_transform(start, end) else {
                continue;
            };
            self.commands.spawn((
                Mesh3d(mesh.clone()),
                MeshMaterial3d(material.clone()),
                transform,
                ScreenSizedLine { pixels },
                MeasurementVisual,
                NotShadowCaster,
                ChildOf(line),
            ));
        }

        line
    }

    fn add_polygon(&mut self, positions: &[DVec3], tool: ToolType) -> Entity {
        let points = self.local_points(positions);
        let mesh = self.meshes.add(create_polygon_mesh(&points));
        let material = self.materials.add(StandardMaterial {
            base_color: tool_colour(tool).with_alpha(AREA_FILL_ALPHA),
            alpha_mode: AlphaMode::Blend,
            cull_mode: None,
            double_sided: true,
            unlit: true,
            ..default()
        });

        self.commands
            .spawn((
                Mesh3d(mesh),
                MeshMaterial3d(material),
                Transform::IDENTITY,
                MeasurementVisual,
                NotShadowCaster,
            ))
            .id()
    }

    fn remove(&mut self, entity: Entity) {
        self.commands.entity(entity).try_despawn();
    }
}

/// Recompute model transforms after the origin moves.
pub fn follow_scene_origin(
    origin: Res<SceneOrigin>,
    mut models: Query<(&ModelPlacement, &mut Transform), With<ModelRoot>>,
) {
    if !origin.is_changed() {
        return;
    }
    for (placement, mut transform) in &mut models {
        *transform = origin.model_transform(&placement.0);
    }
}

fn tool_colour(tool: ToolType) -> Color {
    match tool {
        ToolType::Point => POINT_MARKER_COLOUR,
        ToolType::Distance => DISTANCE_COLOUR,
        ToolType::Area => AREA_COLOUR,
    }
}

/// Consecutive pairs, plus the closing pair for loops of three or more.
fn line_segments(points: &[Vec3], closed: bool) -> Vec<(Vec3, Vec3)> {
    let mut segments: Vec<(Vec3, Vec3)> = points.windows(2).map(|w| (w[0], w[1])).collect();
    if closed && points.len() > 2 {
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            segments.push((*last, *first));
        }
    }
    segments
}

/// Unit cuboid stretched along X from `start` to `end`.
fn segment_transform(start: Vec3, end: Vec3) -> Option<Transform> {
    let direction = end - start;
    let length = direction.length();
    if length <= f32::EPSILON {
        return None;
    }
    Some(Transform {
        translation: (start + end) * 0.5,
        rotation: Quat::from_rotation_arc(Vec3::X, direction / length),
        scale: Vec3::new(length, 1.0, 1.0),
    })
}

/// Fan-triangulated fill through the picked vertices.
fn create_polygon_mesh(points: &[Vec3]) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    if points.len() < 3 {
        return mesh;
    }

    let mut indices = Vec::with_capacity((points.len() - 2) * 3);
    for i in 1..(points.len() - 1) {
        indices.extend_from_slice(&[0, i as u32, (i + 1) as u32]);
    }

    let normal = (points[1] - points[0])
        .cross(points[2] - points[0])
        .try_normalize()
        .unwrap_or(Vec3::Y);
    let vertices: Vec<[f32; 3]> = points.iter().map(|p| p.to_array()).collect();
    let normals = vec![normal.to_array(); points.len()];

    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vertices);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_outline_adds_return_segment() {
        let points = [Vec3::ZERO, Vec3::X, Vec3::Z];
        assert_eq!(line_segments(&points, false).len(), 2);

        let closed = line_segments(&points, true);
        assert_eq!(closed.len(), 3);
        assert_eq!(closed[2], (Vec3::Z, Vec3::ZERO));

        // Two points never close on themselves.
        assert_eq!(line_segments(&points[..2], true).len(), 1);
    }

    #[test]
    fn test_segment_spans_its_endpoints() {
        let start = Vec3::new(1.0, 2.0, 3.0);
        let end = Vec3::new(1.0, 2.0, -7.0);
        let transform = segment_transform(start, end).unwrap();

        assert!((transform.transform_point(Vec3::new(-0.5, 0.0, 0.0)) - start).length() < 1e-4);
        assert!((transform.transform_point(Vec3::new(0.5, 0.0, 0.0)) - end).length() < 1e-4);
        assert!(segment_transform(start, start).is_none());
    }

    #[test]
    fn test_polygon_mesh_fans_from_first_vertex() {
        let points = [
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, -10.0),
            Vec3::new(0.0, 0.0, -10.0),
        ];
        let mesh = create_polygon_mesh(&points);

        assert_eq!(mesh.count_vertices(), 4);
        match mesh.indices() {
            Some(Indices::U32(indices)) => assert_eq!(indices, &vec![0, 1, 2, 0, 2, 3]),
            other => panic!("unexpected indices {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_polygon_is_empty() {
        let mesh = create_polygon_mesh(&[Vec3::ZERO, Vec3::X]);
        assert_eq!(mesh.count_vertices(), 0);
        assert!(mesh.indices().is_none());
    }
}
