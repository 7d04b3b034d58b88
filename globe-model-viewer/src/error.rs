use thiserror::Error;

/// Mistakes the user can fix by changing what they selected or typed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserInputError {
    #[error("Please select a valid GLB file.")]
    NotAModelFile { file_name: String },

    #[error("Please select a GLB file to load.")]
    NoFileSelected,

    #[error("No model loaded to update position.")]
    NoModelLoaded,

    #[error("Load a model before measuring.")]
    NothingToMeasure,

    #[error("{field} must be a number.")]
    InvalidCoordinate { field: &'static str },
}

/// Anything that ends up as an error line in the model panel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewerError {
    #[error(transparent)]
    UserInput(#[from] UserInputError),

    /// Bevy rejected or failed to parse the model.
    #[error("Could not load GLB file. {0}")]
    Engine(String),
}

impl ViewerError {
    /// Text shown in the model panel.
    pub fn panel_message(&self) -> String {
        format!("Error: {self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_render_with_prefix() {
        let error = ViewerError::from(UserInputError::NotAModelFile {
            file_name: "notes.txt".into(),
        });
        assert_eq!(error.panel_message(), "Error: Please select a valid GLB file.");

        let error = ViewerError::from(UserInputError::NoModelLoaded);
        assert_eq!(
            error.panel_message(),
            "Error: No model loaded to update position."
        );
    }

    #[test]
    fn test_engine_error_carries_engine_message() {
        let error = ViewerError::Engine("invalid glTF header".into());
        assert_eq!(
            error.panel_message(),
            "Error: Could not load GLB file. invalid glTF header"
        );
    }

    #[test]
    fn test_invalid_coordinate_names_field() {
        let error = UserInputError::InvalidCoordinate { field: "Latitude" };
        assert_eq!(error.to_string(), "Latitude must be a number.");
    }
}
