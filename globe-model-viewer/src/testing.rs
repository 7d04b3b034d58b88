//! Recording stand-in for the Bevy scene used by unit tests.

use std::collections::HashSet;

use bevy::math::{DMat4, DVec3};
use bevy::prelude::Entity;

use crate::model::lifecycle::{CameraDestination, ModelStage, SpawnRequest};
use crate::tools::measure::session::{LabelPlacement, MeasurementCanvas};
use crate::tools::tool_manager::ToolType;

#[derive(Debug, Clone, PartialEq)]
pub enum StageCall {
    Spawn { entity: Entity, file_name: String, generation: u64 },
    SetPlacement(Entity, DMat4),
    Despawn(Entity),
    FlyTo(CameraDestination),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasCall {
    Marker(Entity, ToolType),
    Label(Entity, String, LabelPlacement),
    Polyline { entity: Entity, points: usize, closed: bool },
    Polygon { entity: Entity, points: usize },
    Remove(Entity),
}

#[derive(Default)]
pub struct RecordingScene {
    next_id: u32,
    stage: Vec<StageCall>,
    canvas: Vec<CanvasCall>,
    removed: HashSet<Entity>,
    stored_files: HashSet<u64>,
}

impl RecordingScene {
    fn allocate(&mut self) -> Entity {
        self.next_id += 1;
        Entity::from_raw(self.next_id)
    }

    pub fn stage_calls(&self) -> &[StageCall] {
        &self.stage
    }

    pub fn calls(&self) -> &[CanvasCall] {
        &self.canvas
    }

    pub fn spawned(&self) -> usize {
        self.stage
            .iter()
            .filter(|call| matches!(call, StageCall::Spawn { .. }))
            .count()
    }

    /// Generations whose upload is still held by the stage.
    pub fn stored_model_files(&self) -> usize {
        self.stored_files.len()
    }

    pub fn fly_count(&self) -> usize {
        self.stage
            .iter()
            .filter(|call| matches!(call, StageCall::FlyTo(_)))
            .count()
    }

    pub fn last_fly_to(&self) -> Option<CameraDestination> {
        self.stage.iter().rev().find_map(|call| match call {
            StageCall::FlyTo(destination) => Some(*destination),
            _ => None,
        })
    }

    pub fn markers(&self) -> usize {
        self.count(|call| matches!(call, CanvasCall::Marker(..)))
    }

    pub fn labels(&self) -> usize {
        self.count(|call| matches!(call, CanvasCall::Label(..)))
    }

    pub fn polylines(&self) -> usize {
        self.count(|call| matches!(call, CanvasCall::Polyline { .. }))
    }

    pub fn label_texts(&self) -> Vec<String> {
        self.canvas
            .iter()
            .filter_map(|call| match call {
                CanvasCall::Label(_, text, _) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn label_placements(&self) -> Vec<LabelPlacement> {
        self.canvas
            .iter()
            .filter_map(|call| match call {
                CanvasCall::Label(_, _, placement) => Some(*placement),
                _ => None,
            })
            .collect()
    }

    /// Canvas entities added and not yet removed.
    pub fn live_entities(&self) -> usize {
        self.live(|_| true)
    }

    pub fn live_polylines(&self) -> usize {
        self.live(|call| matches!(call, CanvasCall::Polyline { .. }))
    }

    pub fn live_polygons(&self) -> usize {
        self.live(|call| matches!(call, CanvasCall::Polygon { .. }))
    }

    pub fn live_labels(&self) -> usize {
        self.live(|call| matches!(call, CanvasCall::Label(..)))
    }

    fn count(&self, predicate: impl Fn(&CanvasCall) -> bool) -> usize {
        self.canvas.iter().filter(|call| predicate(call)).count()
    }

    fn live(&self, predicate: impl Fn(&CanvasCall) -> bool) -> usize {
        self.canvas
            .iter()
            .filter(|call| predicate(call))
            .filter_map(|call| match call {
                CanvasCall::Marker(entity, _)
                | CanvasCall::Label(entity, ..)
                | CanvasCall::Polyline { entity, .. }
                | CanvasCall::Polygon { entity, .. } => Some(*entity),
                CanvasCall::Remove(_) => None,
            })
            .filter(|entity| !self.removed.contains(entity))
            .count()
    }
}

impl ModelStage for RecordingScene {
    fn spawn_model(&mut self, request: SpawnRequest) -> Entity {
        let entity = self.allocate();
        self.stage.push(StageCall::Spawn {
            entity,
            file_name: request.file.name.clone(),
            generation: request.generation,
        });
        self.stored_files.insert(request.generation);
        entity
    }

    fn set_placement(&mut self, model: Entity, placement: &DMat4) {
        self.stage.push(StageCall::SetPlacement(model, *placement));
    }

    fn despawn_model(&mut self, model: Entity) {
        self.stage.push(StageCall::Despawn(model));
    }

    fn release_model_file(&mut self, generation: u64) {
        self.stored_files.remove(&generation);
    }

    fn fly_to(&mut self, destination: &CameraDestination) {
        self.stage.push(StageCall::FlyTo(*destination));
    }
}

impl MeasurementCanvas for RecordingScene {
    fn add_marker(&mut self, _position: DVec3, tool: ToolType) -> Entity {
        let entity = self.allocate();
        self.canvas.push(CanvasCall::Marker(entity, tool));
        entity
    }

    fn add_label(&mut self, _position: DVec3, text: &str, placement: LabelPlacement) -> Entity {
        let entity = self.allocate();
        self.canvas
            .push(CanvasCall::Label(entity, text.to_string(), placement));
        entity
    }

    fn add_polyline(&mut self, positions: &[DVec3], closed: bool, _tool: ToolType) -> Entity {
        let entity = self.allocate();
        self.canvas.push(CanvasCall::Polyline {
            entity,
            points: positions.len(),
            closed,
        });
        entity
    }

    fn add_polygon(&mut self, positions: &[DVec3], _tool: ToolType) -> Entity {
        let entity = self.allocate();
        self.canvas.push(CanvasCall::Polygon {
            entity,
            points: positions.len(),
        });
        entity
    }

    fn remove(&mut self, entity: Entity) {
        self.removed.insert(entity);
        self.canvas.push(CanvasCall::Remove(entity));
    }
}
