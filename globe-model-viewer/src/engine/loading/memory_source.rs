use std::path::Path;
use std::sync::Arc;

use bevy::asset::io::memory::{Dir, MemoryAssetReader, Value};
use bevy::asset::io::{AssetSource, AssetSourceId};
use bevy::prelude::*;
use constants::viewer_defaults::{MODEL_FILE_EXTENSION, MODEL_SOURCE_ID};

/// In-memory directory behind the `models://` asset source.
///
/// Uploaded model bytes are written here and read back by the glTF loader,
/// so nothing touches the network or the file system.
#[derive(Resource, Clone, Default)]
pub struct ModelMemorySource {
    dir: Dir,
}

impl ModelMemorySource {
    /// Register the source on `app`. Must run before `DefaultPlugins`.
    pub fn register(app: &mut App) -> Self {
        let source = Self::default();
        let dir = source.dir.clone();
        app.register_asset_source(
            AssetSourceId::from(MODEL_SOURCE_ID),
            AssetSource::build().with_reader(move || {
                Box::new(MemoryAssetReader { root: dir.clone() })
            }),
        );
        app.insert_resource(source.clone());
        source
    }

    /// Store bytes under `file_name` and return the asset path that loads them.
    /// The buffer is shared, not copied.
    pub fn insert(&self, file_name: &str, bytes: Arc<Vec<u8>>) -> String {
        self.dir.insert_asset(Path::new(file_name), Value::Vec(bytes));
        model_asset_path(file_name)
    }

    /// Forget a stored file. Returns false if it was already gone.
    pub fn remove(&self, file_name: &str) -> bool {
        self.dir.remove_asset(Path::new(file_name)).is_some()
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.dir.get_asset(Path::new(file_name)).is_some()
    }
}

/// File name a load generation is stored under.
pub fn model_file_name(generation: u64) -> String {
    format!("model-{generation}.{MODEL_FILE_EXTENSION}")
}

pub fn model_asset_path(file_name: &str) -> String {
    format!("{MODEL_SOURCE_ID}://{file_name}")
}
