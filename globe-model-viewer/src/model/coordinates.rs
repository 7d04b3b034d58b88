use bevy::math::{DMat4, DVec3};
use constants::viewer_defaults::{
    DEFAULT_HEADING, DEFAULT_HEIGHT, DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_PITCH,
    DEFAULT_ROLL, DEFAULT_SCALE,
};
use serde::{Deserialize, Serialize};

use crate::engine::geodesy::{Cartographic, Ellipsoid, HeadingPitchRoll, heading_pitch_roll_quaternion};
use crate::error::UserInputError;

/// Where and how a model is placed. Angles in degrees, height in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
    pub scale: f64,
}

impl Default for Coordinates {
    fn default() -> Self {
        Self {
            longitude: DEFAULT_LONGITUDE,
            latitude: DEFAULT_LATITUDE,
            height: DEFAULT_HEIGHT,
            heading: DEFAULT_HEADING,
            pitch: DEFAULT_PITCH,
            roll: DEFAULT_ROLL,
            scale: DEFAULT_SCALE,
        }
    }
}

impl Coordinates {
    pub fn cartographic(&self) -> Cartographic {
        Cartographic::from_degrees(self.longitude, self.latitude, self.height)
    }

    pub fn heading_pitch_roll(&self) -> HeadingPitchRoll {
        HeadingPitchRoll::from_degrees(self.heading, self.pitch, self.roll)
    }
}

/// Model-to-fixed-frame matrix: translation, then local orientation, then uniform scale.
pub fn placement_transform(coordinates: &Coordinates, ellipsoid: &Ellipsoid) -> DMat4 {
    let position = ellipsoid.cartographic_to_cartesian(&coordinates.cartographic());
    let orientation =
        heading_pitch_roll_quaternion(position, &coordinates.heading_pitch_roll(), ellipsoid);

    DMat4::from_scale_rotation_translation(DVec3::splat(coordinates.scale), orientation, position)
}

/// A raw form value; the page may send numbers or the text typed into an input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(f64),
    Text(String),
}

impl FormValue {
    fn to_finite(&self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

/// The seven placement inputs as submitted, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateForm {
    pub longitude: Option<FormValue>,
    pub latitude: Option<FormValue>,
    pub height: Option<FormValue>,
    pub heading: Option<FormValue>,
    pub pitch: Option<FormValue>,
    pub roll: Option<FormValue>,
    pub scale: Option<FormValue>,
}

impl CoordinateForm {
    pub fn into_coordinates(self) -> Result<Coordinates, UserInputError> {
        Ok(Coordinates {
            longitude: required(self.longitude, "Longitude")?,
            latitude: required(self.latitude, "Latitude")?,
            height: required(self.height, "Height")?,
            heading: required(self.heading, "Heading")?,
            pitch: required(self.pitch, "Pitch")?,
            roll: required(self.roll, "Roll")?,
            scale: required(self.scale, "Scale")?,
        })
    }
}

impl From<Coordinates> for CoordinateForm {
    fn from(coordinates: Coordinates) -> Self {
        Self {
            longitude: Some(FormValue::Number(coordinates.longitude)),
            latitude: Some(FormValue::Number(coordinates.latitude)),
            height: Some(FormValue::Number(coordinates.height)),
            heading: Some(FormValue::Number(coordinates.heading)),
            pitch: Some(FormValue::Number(coordinates.pitch)),
            roll: Some(FormValue::Number(coordinates.roll)),
            scale: Some(FormValue::Number(coordinates.scale)),
        }
    }
}

fn required(value: Option<FormValue>, field: &'static str) -> Result<f64, UserInputError> {
    value
        .as_ref()
        .and_then(FormValue::to_finite)
        .ok_or(UserInputError::InvalidCoordinate { field })
}
