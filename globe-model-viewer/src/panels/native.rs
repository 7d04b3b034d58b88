use bevy::prelude::*;

use super::view::InfoPanels;

#[derive(Component)]
pub struct ModelPanelText;

#[derive(Component)]
pub struct MeasurementPanelText;

/// Two text panels in the top-left corner standing in for the page's side bar.
pub fn spawn_info_panels(mut commands: Commands) {
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            max_width: Val::Px(360.0),
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(8.0),
            ..default()
        })
        .with_children(|parent| {
            for (title, text) in [("Model", "No model loaded"), ("Measurement", "Select a measurement tool")] {
                let mut panel = parent.spawn((
                    Node {
                        flex_direction: FlexDirection::Column,
                        padding: UiRect::all(Val::Px(8.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.05, 0.05, 0.08, 0.8)),
                ));
                panel.with_children(|panel| {
                    panel.spawn((
                        Text::new(title),
                        TextFont {
                            font_size: 15.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.6, 0.8, 1.0)),
                    ));
                    let mut body = panel.spawn((
                        Text::new(text),
                        TextFont {
                            font_size: 13.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                    ));
                    if title == "Model" {
                        body.insert(ModelPanelText);
                    } else {
                        body.insert(MeasurementPanelText);
                    }
                });
            }
        });
}

pub fn update_info_panels(
    panels: Res<InfoPanels>,
    mut model_text: Query<&mut Text, (With<ModelPanelText>, Without<MeasurementPanelText>)>,
    mut measurement_text: Query<&mut Text, (With<MeasurementPanelText>, Without<ModelPanelText>)>,
) {
    if !panels.is_changed() {
        return;
    }
    for mut text in &mut model_text {
        text.0 = panels.model_text();
    }
    for mut text in &mut measurement_text {
        text.0 = panels.measurement().to_plain_text();
    }
}
