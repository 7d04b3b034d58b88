use std::sync::Arc;

use bevy::math::DMat4;
use bevy::prelude::*;
use constants::viewer_defaults::{FLY_TO_HEIGHT_OFFSET, FLY_TO_PITCH_DEGREES};
use serde::{Deserialize, Serialize};

use super::coordinates::{CoordinateForm, Coordinates, placement_transform};
use super::file::ModelFile;
use super::glb::NodeTable;
use super::inspector::ElementInfo;
use crate::engine::geodesy::{Cartographic, Ellipsoid};
use crate::error::{UserInputError, ViewerError};
use crate::panels::view::{InfoPanels, ModelInfoBlock};
use crate::tools::measure::session::{MeasurementCanvas, MeasurementSession};

/// Everything the stage needs to put a model into the scene.
pub struct SpawnRequest<'a> {
    pub file: &'a ModelFile,
    pub coordinates: Coordinates,
    pub placement: DMat4,
    pub nodes: Arc<NodeTable>,
    pub generation: u64,
}

/// Camera target: position plus heading/pitch/roll in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraDestination {
    pub position: Cartographic,
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Scene operations the controller delegates to the engine.
///
/// Spawning is asynchronous; the engine reports back through
/// [`ModelController::complete_load`] with the request's generation.
pub trait ModelStage {
    fn spawn_model(&mut self, request: SpawnRequest) -> Entity;
    fn set_placement(&mut self, model: Entity, placement: &DMat4);
    fn despawn_model(&mut self, model: Entity);
    /// Drop the stored upload for a load the engine is done reading.
    fn release_model_file(&mut self, generation: u64);
    fn fly_to(&mut self, destination: &CameraDestination);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelState {
    #[default]
    Empty,
    Loading,
    Loaded,
}

impl ModelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
        }
    }
}

/// Camera offset used after a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyToSettings {
    pub height_offset: f64,
    pub pitch: f64,
}

impl Default for FlyToSettings {
    fn default() -> Self {
        Self {
            height_offset: FLY_TO_HEIGHT_OFFSET,
            pitch: FLY_TO_PITCH_DEGREES,
        }
    }
}

#[derive(Debug)]
struct PlacedModel {
    entity: Entity,
    file_name: String,
    file_size: usize,
    coordinates: Coordinates,
    nodes: Arc<NodeTable>,
    generation: u64,
}

/// Owns the single model slot and its `Empty -> Loading -> Loaded` lifecycle.
#[derive(Resource, Debug, Default)]
pub struct ModelController {
    ellipsoid: Ellipsoid,
    defaults: Coordinates,
    fly_to: FlyToSettings,
    selected: Option<ModelFile>,
    model: Option<PlacedModel>,
    state: ModelState,
    next_generation: u64,
}

impl ModelController {
    pub fn configure(&mut self, defaults: Coordinates, fly_to: FlyToSettings) {
        self.defaults = defaults;
        self.fly_to = fly_to;
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == ModelState::Loaded
    }

    pub fn default_coordinates(&self) -> Coordinates {
        self.defaults
    }

    #[cfg(test)]
    pub fn selected_file(&self) -> Option<&ModelFile> {
        self.selected.as_ref()
    }

    pub fn model_entity(&self) -> Option<Entity> {
        self.model.as_ref().map(|model| model.entity)
    }

    /// Generation of the model currently in the slot, loading or loaded.
    pub fn current_generation(&self) -> Option<u64> {
        self.model.as_ref().map(|model| model.generation)
    }

    /// Remember a file for the next load. A rejected file keeps the earlier selection.
    pub fn select_file(
        &mut self,
        file_name: String,
        bytes: impl Into<Arc<Vec<u8>>>,
        panels: &mut InfoPanels,
    ) -> Result<(), ViewerError> {
        let file = reported(panels, ModelFile::new(file_name, bytes).map_err(Into::into))?;

        info!("Selected {} ({} bytes)", file.name, file.size());
        panels.show_model(ModelInfoBlock::FileSelected {
            file_name: file.name.clone(),
        });
        self.selected = Some(file);
        Ok(())
    }

    /// Replace whatever is in the slot with the selected file. Returns the load's generation.
    pub fn load<S>(
        &mut self,
        form: CoordinateForm,
        scene: &mut S,
        session: &mut MeasurementSession,
        panels: &mut InfoPanels,
    ) -> Result<u64, ViewerError>
    where
        S: ModelStage + MeasurementCanvas,
    {
        let file = reported(
            panels,
            self.selected.clone().ok_or(UserInputError::NoFileSelected.into()),
        )?;
        let coordinates = reported(panels, form.into_coordinates().map_err(Into::into))?;

        self.clear(scene, session, panels);

        let nodes = NodeTable::parse(&file.bytes).unwrap_or_else(|error| {
            warn!("Node table unavailable for {}: {}", file.name, error);
            NodeTable::default()
        });

        let generation = self.next_generation;
        self.next_generation += 1;

        let nodes = Arc::new(nodes);
        let entity = scene.spawn_model(SpawnRequest {
            file: &file,
            coordinates,
            placement: placement_transform(&coordinates, &self.ellipsoid),
            nodes: nodes.clone(),
            generation,
        });

        info!("Loading {} as generation {}", file.name, generation);
        panels.show_model(ModelInfoBlock::Loading {
            file_name: file.name.clone(),
        });
        self.model = Some(PlacedModel {
            entity,
            file_name: file.name.clone(),
            file_size: file.size(),
            coordinates,
            nodes,
            generation,
        });
        self.state = ModelState::Loading;

        Ok(generation)
    }

    /// Engine callback for a finished load. Returns false for superseded generations.
    pub fn complete_load(
        &mut self,
        generation: u64,
        result: Result<(), String>,
        scene: &mut impl ModelStage,
        panels: &mut InfoPanels,
    ) -> bool {
        let is_current = self.state == ModelState::Loading
            && self.current_generation() == Some(generation);
        if !is_current {
            debug!("Ignoring completion of superseded load {}", generation);
            return false;
        }
        scene.release_model_file(generation);

        match result {
            Ok(()) => {
                let Some(model) = &self.model else {
                    return false;
                };
                self.state = ModelState::Loaded;
                panels.show_model(ModelInfoBlock::Loaded {
                    file_name: model.file_name.clone(),
                    file_size: model.file_size,
                    coordinates: model.coordinates,
                });
                scene.fly_to(&self.arrival_view(&model.coordinates));
                info!("Loaded {}", model.file_name);
            }
            Err(message) => {
                if let Some(model) = self.model.take() {
                    scene.despawn_model(model.entity);
                }
                self.state = ModelState::Empty;
                let error = ViewerError::Engine(message);
                error!("{}", error);
                panels.show_model(ModelInfoBlock::Error(error.panel_message()));
            }
        }
        true
    }

    /// Move the loaded model. Geometry and camera are left alone.
    pub fn reposition(
        &mut self,
        form: CoordinateForm,
        scene: &mut impl ModelStage,
        panels: &mut InfoPanels,
    ) -> Result<(), ViewerError> {
        if !self.is_loaded() {
            return reported(panels, Err(UserInputError::NoModelLoaded.into()));
        }
        let coordinates = reported(panels, form.into_coordinates().map_err(Into::into))?;
        self.apply_position(coordinates, scene, panels);
        Ok(())
    }

    /// Restore default coordinates, moving the model if one is loaded.
    pub fn reset_position(
        &mut self,
        scene: &mut impl ModelStage,
        panels: &mut InfoPanels,
    ) -> Coordinates {
        let defaults = self.defaults;
        if self.is_loaded() {
            self.apply_position(defaults, scene, panels);
        }
        defaults
    }

    /// Empty the slot and any measurement. Valid in every state.
    pub fn clear<S>(&mut self, scene: &mut S, session: &mut MeasurementSession, panels: &mut InfoPanels)
    where
        S: ModelStage + MeasurementCanvas,
    {
        if let Some(model) = self.model.take() {
            scene.despawn_model(model.entity);
            scene.release_model_file(model.generation);
            info!("Removed {}", model.file_name);
        }
        self.state = ModelState::Empty;
        panels.show_model(ModelInfoBlock::NoModel);
        panels.show_measurement(session.clear(scene));
    }

    /// Append details for a clicked part of the loaded model.
    pub fn inspect(&self, node_id: Option<usize>, panels: &mut InfoPanels) {
        let Some(model) = self.model.as_ref().filter(|_| self.is_loaded()) else {
            return;
        };
        panels.append_model(ModelInfoBlock::Element(ElementInfo::describe(
            node_id,
            &model.nodes,
        )));
    }

    fn apply_position(
        &mut self,
        coordinates: Coordinates,
        scene: &mut impl ModelStage,
        panels: &mut InfoPanels,
    ) {
        let Some(model) = self.model.as_mut() else {
            return;
        };
        scene.set_placement(
            model.entity,
            &placement_transform(&coordinates, &self.ellipsoid),
        );
        model.coordinates = coordinates;
        panels.update_position(coordinates);
    }

    fn arrival_view(&self, coordinates: &Coordinates) -> CameraDestination {
        CameraDestination {
            position: Cartographic::from_degrees(
                coordinates.longitude,
                coordinates.latitude,
                coordinates.height + self.fly_to.height_offset,
            ),
            heading: coordinates.heading.to_radians(),
            pitch: self.fly_to.pitch.to_radians(),
            roll: 0.0,
        }
    }
}

/// Show a failed result in the model panel and pass it on.
fn reported<T>(panels: &mut InfoPanels, result: Result<T, ViewerError>) -> Result<T, ViewerError> {
    if let Err(error) = &result {
        warn!("{}", error);
        panels.show_model(ModelInfoBlock::Error(error.panel_message()));
    }
    result
}
