/// Surface-following reference grid around the scene origin
use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::view::NoFrustumCulling;
use constants::render_settings::GRID_COLOUR;

use super::origin::SceneOrigin;
use crate::engine::loading::settings_loader::{GridSettings, ViewerSettings};

/// Vertices per grid line; enough to follow the ellipsoid over a few kilometres.
const SEGMENTS_PER_LINE: usize = 32;

#[derive(Component)]
pub struct GroundGrid;

/// Rebuild the grid when the origin moves or the settings change.
pub fn rebuild_ground_grid(
    mut commands: Commands,
    origin: Res<SceneOrigin>,
    settings: Res<ViewerSettings>,
    existing: Query<Entity, With<GroundGrid>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !origin.is_changed() && !settings.is_changed() {
        return;
    }

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    if !settings.grid.enabled || !settings.grid.is_buildable() {
        return;
    }

    let grid_material = materials.add(StandardMaterial {
        base_color: GRID_COLOUR,
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });

    commands.spawn((
        Mesh3d(meshes.add(create_surface_grid_mesh(&origin, &settings.grid))),
        MeshMaterial3d(grid_material),
        Visibility::Visible,
        NoFrustumCulling,
        Transform::IDENTITY,
        GroundGrid,
    ));
}

/// Lines along local X and Z, each sampled and dropped onto the ellipsoid.
fn create_surface_grid_mesh(origin: &SceneOrigin, grid: &GridSettings) -> Mesh {
    let extent = grid.extent.max(grid.spacing);
    let line_count = (2.0 * extent / grid.spacing).round().max(1.0) as usize;
    let spacing = 2.0 * extent / line_count as f32;

    let mut vertices: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for line in 0..=line_count {
        let fixed_coord = -extent + line as f32 * spacing;
        for along_x in [true, false] {
            let first = vertices.len() as u32;
            for step in 0..=SEGMENTS_PER_LINE {
                let varying = -extent + step as f32 * (2.0 * extent / SEGMENTS_PER_LINE as f32);
                let (x, z) = if along_x {
                    (varying, fixed_coord)
                } else {
                    (fixed_coord, varying)
                };
                vertices.push(drop_to_surface(origin, Vec3::new(x, 0.0, z)).to_array());
            }
            for segment in 0..SEGMENTS_PER_LINE as u32 {
                indices.extend_from_slice(&[first + segment, first + segment + 1]);
            }
        }
    }

    let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vertices);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Project a tangent-plane point to height zero on the ellipsoid.
fn drop_to_surface(origin: &SceneOrigin, local: Vec3) -> Vec3 {
    let fixed = origin.to_fixed(local);
    match origin.ellipsoid().cartesian_to_cartographic(fixed) {
        Some(mut cartographic) => {
            cartographic.height = 0.0;
            origin.cartographic_to_local(&cartographic)
        }
        None => local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::geodesy::{Cartographic, Ellipsoid};

    #[test]
    fn test_grid_curves_down_away_from_origin() {
        let origin = SceneOrigin::at(
            Cartographic::from_degrees(-71.0349999, 42.213, 0.0),
            Ellipsoid::wgs84(),
        );

        let centre = drop_to_surface(&origin, Vec3::ZERO);
        assert!(centre.length() < 1e-3);

        // About 0.31 m of drop 2 km out on a 6371 km sphere.
        let edge = drop_to_surface(&origin, Vec3::new(2000.0, 0.0, 0.0));
        assert!(edge.y < -0.2 && edge.y > -0.5, "drop was {}", edge.y);
    }

    #[test]
    fn test_grid_mesh_has_two_lines_per_step() {
        let origin = SceneOrigin::default();
        let grid = GridSettings {
            enabled: true,
            extent: 100.0,
            spacing: 50.0,
        };
        let mesh = create_surface_grid_mesh(&origin, &grid);

        let lines = 2 * 5;
        assert_eq!(mesh.count_vertices(), lines * (SEGMENTS_PER_LINE + 1));
        assert_eq!(
            mesh.indices().map(Indices::len),
            Some(lines * SEGMENTS_PER_LINE * 2)
        );
    }
}
