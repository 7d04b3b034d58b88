use bevy::prelude::*;

use crate::engine::picking::{PointerAction, ScenePointerEvent};
use crate::engine::scene::backend::BevyScene;
use crate::model::inspector::GltfNodeIndex;
use crate::model::lifecycle::ModelController;
use crate::panels::view::InfoPanels;
use crate::tools::measure::session::MeasurementSession;

/// Send scene pointer events to the running tool, or to the inspector when none is.
pub fn route_pointer_events(
    mut events: EventReader<ScenePointerEvent>,
    mut session: ResMut<MeasurementSession>,
    controller: Res<ModelController>,
    mut panels: ResMut<InfoPanels>,
    parents: Query<&ChildOf>,
    node_indices: Query<&GltfNodeIndex>,
    mut scene: BevyScene,
) {
    for event in events.read() {
        let position = event.pick.position;
        match (event.action, session.is_measuring()) {
            (PointerAction::Click, true) => {
                if let Some(readout) = session.click(position, &mut scene) {
                    panels.show_measurement(readout);
                }
            }
            (PointerAction::Move, true) => {
                if let Some(readout) = session.pointer_moved(position) {
                    panels.show_measurement(readout);
                }
            }
            (PointerAction::Click, false) => {
                let (Some(hit), Some(model)) = (event.pick.model_hit, controller.model_entity())
                else {
                    continue;
                };
                let element = element_under(
                    hit,
                    model,
                    |entity| parents.get(entity).ok().map(ChildOf::parent),
                    |entity| node_indices.get(entity).ok().map(|index| index.0),
                );
                if let Some(node_id) = element {
                    controller.inspect(node_id, &mut panels);
                }
            }
            (PointerAction::Move, false) => {}
        }
    }
}

/// Walk up from a hit mesh to the model root.
///
/// Returns `None` when the hit is not part of the model, otherwise the
/// nearest tagged glTF node index on the way, if any.
fn element_under(
    hit: Entity,
    model: Entity,
    parent_of: impl Fn(Entity) -> Option<Entity>,
    node_index_of: impl Fn(Entity) -> Option<usize>,
) -> Option<Option<usize>> {
    let mut node_id = None;
    let mut current = Some(hit);

    while let Some(entity) = current {
        if node_id.is_none() {
            node_id = node_index_of(entity);
        }
        if entity == model {
            return Some(node_id);
        }
        current = parent_of(entity);
    }

    None
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct Hierarchy {
        parents: HashMap<Entity, Entity>,
        indices: HashMap<Entity, usize>,
    }

    impl Hierarchy {
        fn element_under(&self, hit: Entity, model: Entity) -> Option<Option<usize>> {
            element_under(
                hit,
                model,
                |entity| self.parents.get(&entity).copied(),
                |entity| self.indices.get(&entity).copied(),
            )
        }
    }

    fn entity(id: u32) -> Entity {
        Entity::from_raw(id)
    }

    fn hierarchy() -> Hierarchy {
        // model(1) -> scene(2) -> node 0 (3) -> node 4 (4) -> mesh (5)
        Hierarchy {
            parents: HashMap::from([
                (entity(2), entity(1)),
                (entity(3), entity(2)),
                (entity(4), entity(3)),
                (entity(5), entity(4)),
                (entity(9), entity(8)),
            ]),
            indices: HashMap::from([(entity(3), 0), (entity(4), 4)]),
        }
    }

    #[test]
    fn test_nearest_tagged_ancestor_wins() {
        assert_eq!(hierarchy().element_under(entity(5), entity(1)), Some(Some(4)));
        assert_eq!(hierarchy().element_under(entity(3), entity(1)), Some(Some(0)));
    }

    #[test]
    fn test_untagged_part_of_model_has_no_node_id() {
        assert_eq!(hierarchy().element_under(entity(2), entity(1)), Some(None));
    }

    #[test]
    fn test_hits_outside_model_are_ignored() {
        assert_eq!(hierarchy().element_under(entity(9), entity(1)), None);
    }
}
