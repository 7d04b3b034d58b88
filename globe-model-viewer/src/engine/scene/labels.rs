use bevy::prelude::*;
use constants::render_settings::LABEL_PIXEL_OFFSET;

use crate::tools::measure::session::LabelPlacement;

/// Screen-space text pinned to a point in the scene.
#[derive(Component)]
pub struct WorldLabel {
    pub anchor: Vec3,
    pub placement: LabelPlacement,
}

/// Move labels to their projected anchors; hide those behind the camera.
pub fn position_world_labels(
    camera_query: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut labels: Query<(&WorldLabel, &mut Node, &mut Visibility, &ComputedNode)>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    for (label, mut node, mut visibility, computed) in &mut labels {
        let Ok(screen) = camera.world_to_viewport(camera_transform, label.anchor) else {
            *visibility = Visibility::Hidden;
            continue;
        };

        let size = computed.size() * computed.inverse_scale_factor();
        let (left, top) = label_corner(screen, size, label.placement);
        node.left = Val::Px(left);
        node.top = Val::Px(top);
        *visibility = Visibility::Visible;
    }
}

/// Top-left corner for a label of `size` anchored at `screen`.
fn label_corner(screen: Vec2, size: Vec2, placement: LabelPlacement) -> (f32, f32) {
    let left = screen.x - size.x * 0.5;
    match placement {
        LabelPlacement::Above => (left, screen.y - size.y + LABEL_PIXEL_OFFSET),
        LabelPlacement::Centred => (left, screen.y - size.y * 0.5),
    }
}
