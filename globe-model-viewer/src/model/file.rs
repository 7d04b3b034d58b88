use std::sync::Arc;

use constants::viewer_defaults::MODEL_FILE_EXTENSION;

use crate::error::UserInputError;

/// A user-selected model file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFile {
    pub name: String,
    pub bytes: Arc<Vec<u8>>,
}

impl ModelFile {
    /// Accept a selection by extension only; the contents are not sniffed.
    pub fn new(
        name: impl Into<String>,
        bytes: impl Into<Arc<Vec<u8>>>,
    ) -> Result<Self, UserInputError> {
        let name = name.into();
        if !has_model_extension(&name) {
            return Err(UserInputError::NotAModelFile { file_name: name });
        }

        Ok(Self {
            name,
            bytes: bytes.into(),
        })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

pub fn has_model_extension(file_name: &str) -> bool {
    file_name
        .to_lowercase()
        .ends_with(&format!(".{MODEL_FILE_EXTENSION}"))
}

/// Human readable size using 1024 steps.
pub fn format_file_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * 1024;

    if bytes < KB {
        format!("{bytes} bytes")
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    }
}
