use bevy::math::{DMat4, DVec3};
use bevy::prelude::*;
use constants::coordinate_system::{ENU_TO_LOCAL, GLTF_Y_UP_TO_Z_UP};

use crate::engine::geodesy::{Cartographic, Ellipsoid, east_north_up_to_fixed_frame, mat3_from_rows};

/// Floating origin for the render world.
///
/// Bevy positions are `f32` metres in an east-north-up frame anchored at
/// `anchor`, with x = east, y = up, z = -north. Everything geodetic stays in
/// `f64` Earth-fixed coordinates until it crosses into the scene here.
#[derive(Resource, Debug, Clone)]
pub struct SceneOrigin {
    anchor: Cartographic,
    ellipsoid: Ellipsoid,
    local_to_fixed: DMat4,
    fixed_to_local: DMat4,
}

impl Default for SceneOrigin {
    fn default() -> Self {
        Self::at(Cartographic::default(), Ellipsoid::wgs84())
    }
}

impl SceneOrigin {
    pub fn at(anchor: Cartographic, ellipsoid: Ellipsoid) -> Self {
        let position = ellipsoid.cartographic_to_cartesian(&anchor);
        let enu_to_fixed = east_north_up_to_fixed_frame(position, &ellipsoid);
        let enu_to_local = DMat4::from_mat3(mat3_from_rows(&ENU_TO_LOCAL));

        let local_to_fixed = enu_to_fixed * enu_to_local.inverse();
        Self {
            anchor,
            ellipsoid,
            local_to_fixed,
            fixed_to_local: local_to_fixed.inverse(),
        }
    }

    pub fn anchor(&self) -> Cartographic {
        self.anchor
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    pub fn to_local(&self, fixed: DVec3) -> Vec3 {
        self.fixed_to_local.transform_point3(fixed).as_vec3()
    }

    pub fn to_fixed(&self, local: Vec3) -> DVec3 {
        self.local_to_fixed.transform_point3(local.as_dvec3())
    }

    pub fn direction_to_fixed(&self, local: Vec3) -> DVec3 {
        self.local_to_fixed
            .transform_vector3(local.as_dvec3())
            .normalize()
    }

    pub fn cartographic_to_local(&self, cartographic: &Cartographic) -> Vec3 {
        self.to_local(self.ellipsoid.cartographic_to_cartesian(cartographic))
    }

    /// Render transform for a model placed by a model-to-fixed matrix.
    ///
    /// glTF content is Y-up, so it is turned Z-up before the placement applies.
    pub fn model_transform(&self, placement: &DMat4) -> Transform {
        let gltf_to_model = DMat4::from_mat3(mat3_from_rows(&GLTF_Y_UP_TO_Z_UP));
        let local = self.fixed_to_local * *placement * gltf_to_model;
        Transform::from_matrix(local.as_mat4())
    }
}
