use bevy::prelude::*;
use html_escape::encode_text;

use crate::engine::geodesy::Cartographic;
use crate::model::coordinates::Coordinates;
use crate::model::file::format_file_size;
use crate::model::inspector::ElementInfo;
use crate::tools::measure::geometry::format_area;
use crate::tools::tool_manager::ToolType;

/// One block of the model panel.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelInfoBlock {
    NoModel,
    FileSelected {
        file_name: String,
    },
    Loading {
        file_name: String,
    },
    Loaded {
        file_name: String,
        file_size: usize,
        coordinates: Coordinates,
    },
    /// Full message, already prefixed with "Error: ".
    Error(String),
    Element(ElementInfo),
}

impl ModelInfoBlock {
    pub fn to_html(&self) -> String {
        match self {
            Self::NoModel => "No model loaded".to_string(),
            Self::FileSelected { file_name } => format!(
                "<p>File selected: {}</p><p>Click \"Load GLB File\" to place it at the specified coordinates.</p>",
                encode_text(file_name)
            ),
            Self::Loading { file_name } => {
                format!("<p>Loading {}...</p>", encode_text(file_name))
            }
            Self::Loaded {
                file_name,
                file_size,
                coordinates,
            } => format!(
                "<p><strong>Loaded GLB Model:</strong> {}</p>\
                 <p><strong>File Size:</strong> {}</p>\
                 <div id=\"positionInfo\">{}</div>\
                 <p>Click on model to view properties.</p>",
                encode_text(file_name),
                format_file_size(*file_size),
                position_html(coordinates)
            ),
            Self::Error(message) => encode_text(message).into_owned(),
            Self::Element(info) => element_html(info),
        }
    }

    pub fn to_plain_text(&self) -> String {
        match self {
            Self::NoModel => "No model loaded".to_string(),
            Self::FileSelected { file_name } => format!(
                "File selected: {file_name}\nClick \"Load GLB File\" to place it at the specified coordinates."
            ),
            Self::Loading { file_name } => format!("Loading {file_name}..."),
            Self::Loaded {
                file_name,
                file_size,
                coordinates,
            } => format!(
                "Loaded GLB Model: {file_name}\nFile Size: {}\n{}\nClick on model to view properties.",
                format_file_size(*file_size),
                position_text(coordinates)
            ),
            Self::Error(message) => message.clone(),
            Self::Element(info) => element_text(info),
        }
    }
}

fn position_html(c: &Coordinates) -> String {
    format!(
        "<p><strong>Position:</strong></p>\
         <ul><li>Longitude: {:.7}°</li><li>Latitude: {:.7}°</li><li>Height: {:.2} m</li></ul>\
         <p><strong>Orientation:</strong></p>\
         <ul><li>Heading: {:.2}°</li><li>Pitch: {:.2}°</li><li>Roll: {:.2}°</li></ul>\
         <p><strong>Scale:</strong> {:.2}</p>",
        c.longitude, c.latitude, c.height, c.heading, c.pitch, c.roll, c.scale
    )
}

fn position_text(c: &Coordinates) -> String {
    format!(
        "Position:\n  Longitude: {:.7}°\n  Latitude: {:.7}°\n  Height: {:.2} m\n\
         Orientation:\n  Heading: {:.2}°\n  Pitch: {:.2}°\n  Roll: {:.2}°\n\
         Scale: {:.2}",
        c.longitude, c.latitude, c.height, c.heading, c.pitch, c.roll, c.scale
    )
}

fn element_lines(info: &ElementInfo) -> Vec<(Option<&'static str>, String)> {
    let Some(node_id) = info.node_id else {
        return vec![(None, "Limited information available for this element".to_string())];
    };

    let mut lines = vec![(Some("Node ID"), node_id.to_string())];
    if let Some(name) = &info.name {
        lines.push((Some("Name"), name.clone()));
    }
    if info.has_position_matrix {
        lines.push((Some("Has Position Matrix"), "Yes".to_string()));
    }
    lines
}

fn element_html(info: &ElementInfo) -> String {
    let items: String = element_lines(info)
        .into_iter()
        .map(|(label, value)| match label {
            Some(label) => format!("<li><strong>{label}:</strong> {}</li>", encode_text(&value)),
            None => format!("<li>{}</li>", encode_text(&value)),
        })
        .collect();
    format!("<h4>GLB Model Element</h4><ul style=\"padding-left: 20px;\">{items}</ul>")
}

fn element_text(info: &ElementInfo) -> String {
    let mut text = String::from("GLB Model Element");
    for (label, value) in element_lines(info) {
        match label {
            Some(label) => text.push_str(&format!("\n  {label}: {value}")),
            None => text.push_str(&format!("\n  {value}")),
        }
    }
    text
}

/// Content of the measurement panel.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MeasurementReadout {
    #[default]
    Prompt,
    Instructions(ToolType),
    Point(Cartographic),
    Distance {
        metres: f64,
    },
    Area {
        square_metres: f64,
    },
}

impl MeasurementReadout {
    pub fn to_html(&self) -> String {
        match self {
            Self::Point(position) => format!(
                "<strong>Point Coordinates:</strong><br>Longitude: {:.7}°<br>Latitude: {:.7}°<br>Height: {:.2} m",
                position.longitude_degrees(),
                position.latitude_degrees(),
                position.height
            ),
            Self::Distance { metres } => format!("<strong>Distance:</strong> {metres:.2} meters"),
            Self::Area { square_metres } => {
                format!("<strong>Area:</strong> {}", format_area(*square_metres))
            }
            Self::Prompt | Self::Instructions(_) => self.to_plain_text(),
        }
    }

    pub fn to_plain_text(&self) -> String {
        match self {
            Self::Prompt => "Select a measurement tool".to_string(),
            Self::Instructions(ToolType::Point) => {
                "Click to place a point and measure coordinates".to_string()
            }
            Self::Instructions(ToolType::Distance) => {
                "Click to start measuring distance. Click again to end.".to_string()
            }
            Self::Instructions(ToolType::Area) => {
                "Click to define area corners. Clear to finish.".to_string()
            }
            Self::Point(position) => format!(
                "Point Coordinates:\nLongitude: {:.7}°\nLatitude: {:.7}°\nHeight: {:.2} m",
                position.longitude_degrees(),
                position.latitude_degrees(),
                position.height
            ),
            Self::Distance { metres } => format!("Distance: {metres:.2} meters"),
            Self::Area { square_metres } => format!("Area: {}", format_area(*square_metres)),
        }
    }
}

/// The two information panels. Change detection on this resource drives
/// both the native UI and the page notifications.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct InfoPanels {
    model: Vec<ModelInfoBlock>,
    measurement: MeasurementReadout,
}

impl Default for InfoPanels {
    fn default() -> Self {
        Self {
            model: vec![ModelInfoBlock::NoModel],
            measurement: MeasurementReadout::Prompt,
        }
    }
}

impl InfoPanels {
    /// Replace the whole model panel.
    pub fn show_model(&mut self, block: ModelInfoBlock) {
        self.model = vec![block];
    }

    /// Add a block below the existing content.
    pub fn append_model(&mut self, block: ModelInfoBlock) {
        self.model.push(block);
    }

    /// Rewrite the position section of a loaded model, keeping appended blocks.
    pub fn update_position(&mut self, new_coordinates: Coordinates) {
        if let Some(ModelInfoBlock::Loaded { coordinates, .. }) = self.model.first_mut() {
            *coordinates = new_coordinates;
        }
    }

    pub fn show_measurement(&mut self, readout: MeasurementReadout) {
        self.measurement = readout;
    }

    pub fn model_blocks(&self) -> &[ModelInfoBlock] {
        &self.model
    }

    pub fn measurement(&self) -> &MeasurementReadout {
        &self.measurement
    }

    pub fn model_html(&self) -> String {
        self.model.iter().map(ModelInfoBlock::to_html).collect()
    }

    pub fn model_text(&self) -> String {
        self.model
            .iter()
            .map(ModelInfoBlock::to_plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loaded_block_lists_position_and_size() {
        let block = ModelInfoBlock::Loaded {
            file_name: "tower.glb".into(),
            file_size: 2048,
            coordinates: Coordinates::default(),
        };
        let html = block.to_html();

        assert!(html.contains("<strong>Loaded GLB Model:</strong> tower.glb"));
        assert!(html.contains("<strong>File Size:</strong> 2.00 KB"));
        assert!(html.contains("Longitude: -71.0349999°"));
        assert!(html.contains("Latitude: 42.2130000°"));
        assert!(html.contains("Height: 0.00 m"));
        assert!(html.contains("<strong>Scale:</strong> 1.00"));
        assert!(html.contains("Click on model to view properties."));
    }

    #[test]
    fn test_file_names_are_escaped() {
        let block = ModelInfoBlock::FileSelected {
            file_name: "<script>.glb".into(),
        };
        let html = block.to_html();
        assert!(html.contains("&lt;script&gt;.glb"));
        assert!(!html.contains("<script>"));
        assert!(block.to_plain_text().starts_with("File selected: <script>.glb"));
    }

    #[test]
    fn test_element_block_with_and_without_node() {
        let named = ModelInfoBlock::Element(ElementInfo {
            node_id: Some(7),
            name: Some("Stair & Rail".into()),
            has_position_matrix: true,
        });
        let html = named.to_html();
        assert!(html.starts_with("<h4>GLB Model Element</h4>"));
        assert!(html.contains("<li><strong>Node ID:</strong> 7</li>"));
        assert!(html.contains("<li><strong>Name:</strong> Stair &amp; Rail</li>"));
        assert!(html.contains("<li><strong>Has Position Matrix:</strong> Yes</li>"));

        let limited = ModelInfoBlock::Element(ElementInfo::default());
        assert!(
            limited
                .to_html()
                .contains("<li>Limited information available for this element</li>")
        );
        assert_eq!(
            limited.to_plain_text(),
            "GLB Model Element\n  Limited information available for this element"
        );
    }

    #[test]
    fn test_appended_blocks_survive_position_update() {
        let mut panels = InfoPanels::default();
        panels.show_model(ModelInfoBlock::Loaded {
            file_name: "a.glb".into(),
            file_size: 10,
            coordinates: Coordinates::default(),
        });
        panels.append_model(ModelInfoBlock::Element(ElementInfo::default()));

        let moved = Coordinates {
            height: 25.0,
            ..Coordinates::default()
        };
        panels.update_position(moved);

        assert_eq!(panels.model_blocks().len(), 2);
        assert!(panels.model_html().contains("Height: 25.00 m"));
        assert!(panels.model_html().contains("GLB Model Element"));
    }

    #[test]
    fn test_position_update_ignored_without_loaded_model() {
        let mut panels = InfoPanels::default();
        panels.update_position(Coordinates::default());
        assert_eq!(panels.model_blocks(), &[ModelInfoBlock::NoModel]);
    }

    #[test]
    fn test_measurement_readouts() {
        assert_eq!(
            MeasurementReadout::Prompt.to_html(),
            "Select a measurement tool"
        );
        assert_eq!(
            MeasurementReadout::Distance { metres: 1234.567 }.to_html(),
            "<strong>Distance:</strong> 1234.57 meters"
        );
        assert_eq!(
            MeasurementReadout::Area {
                square_metres: 20_000.0
            }
            .to_plain_text(),
            "Area: 0.0200 km²"
        );
        let point = MeasurementReadout::Point(Cartographic::from_degrees(10.0, 20.0, 5.0));
        assert!(point.to_html().contains("Longitude: 10.0000000°<br>"));
        assert!(point.to_plain_text().ends_with("Height: 5.00 m"));
    }
}
