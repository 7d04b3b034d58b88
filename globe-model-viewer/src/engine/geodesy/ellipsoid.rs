use bevy::math::DVec3;
use constants::geodesy::{
    CENTER_TOLERANCE_SQUARED, EPSILON12, WGS84_SEMI_MAJOR_AXIS, WGS84_SEMI_MINOR_AXIS,
};
use serde::{Deserialize, Serialize};

/// Geodetic position. Angles are radians, height is metres above the ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cartographic {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
}

impl Cartographic {
    pub fn new(longitude: f64, latitude: f64, height: f64) -> Self {
        Self {
            longitude,
            latitude,
            height,
        }
    }

    pub fn from_degrees(longitude: f64, latitude: f64, height: f64) -> Self {
        Self::new(longitude.to_radians(), latitude.to_radians(), height)
    }

    pub fn longitude_degrees(&self) -> f64 {
        self.longitude.to_degrees()
    }

    pub fn latitude_degrees(&self) -> f64 {
        self.latitude.to_degrees()
    }
}

/// Triaxial ellipsoid with the reciprocal terms precomputed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    radii: DVec3,
    radii_squared: DVec3,
    one_over_radii: DVec3,
    one_over_radii_squared: DVec3,
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Ellipsoid {
    pub fn new(radii: DVec3) -> Self {
        Self {
            radii,
            radii_squared: radii * radii,
            one_over_radii: DVec3::ONE / radii,
            one_over_radii_squared: DVec3::ONE / (radii * radii),
        }
    }

    pub fn wgs84() -> Self {
        Self::new(DVec3::new(
            WGS84_SEMI_MAJOR_AXIS,
            WGS84_SEMI_MAJOR_AXIS,
            WGS84_SEMI_MINOR_AXIS,
        ))
    }

    pub fn radii(&self) -> DVec3 {
        self.radii
    }

    pub fn one_over_radii(&self) -> DVec3 {
        self.one_over_radii
    }

    /// Outward surface normal at (or above) a Cartesian position.
    pub fn geodetic_surface_normal(&self, position: DVec3) -> DVec3 {
        (position * self.one_over_radii_squared).normalize()
    }

    /// Surface normal for a cartographic position; ignores height.
    pub fn geodetic_surface_normal_cartographic(&self, cartographic: &Cartographic) -> DVec3 {
        let cos_latitude = cartographic.latitude.cos();
        DVec3::new(
            cos_latitude * cartographic.longitude.cos(),
            cos_latitude * cartographic.longitude.sin(),
            cartographic.latitude.sin(),
        )
        .normalize()
    }

    /// Geodetic to Earth-fixed Cartesian.
    pub fn cartographic_to_cartesian(&self, cartographic: &Cartographic) -> DVec3 {
        let n = self.geodetic_surface_normal_cartographic(cartographic);
        let k = self.radii_squared * n;
        let gamma = n.dot(k).sqrt();
        k / gamma + n * cartographic.height
    }

    /// Shorthand for the common degrees-in, metres-out conversion.
    pub fn cartesian_from_degrees(&self, longitude: f64, latitude: f64, height: f64) -> DVec3 {
        self.cartographic_to_cartesian(&Cartographic::from_degrees(longitude, latitude, height))
    }

    /// Project a position onto the surface along the geodetic normal.
    ///
    /// Newton iteration on the scaled-sphere parameter. Returns `None` for
    /// positions too close to the centre to have a unique projection.
    pub fn scale_to_geodetic_surface(&self, position: DVec3) -> Option<DVec3> {
        let DVec3 {
            x: position_x,
            y: position_y,
            z: position_z,
        } = position;
        let one_over_radii = self.one_over_radii;
        let one_over_radii_squared = self.one_over_radii_squared;

        let x2 = position_x * position_x * one_over_radii.x * one_over_radii.x;
        let y2 = position_y * position_y * one_over_radii.y * one_over_radii.y;
        let z2 = position_z * position_z * one_over_radii.z * one_over_radii.z;

        let squared_norm = x2 + y2 + z2;
        let ratio = (1.0 / squared_norm).sqrt();

        // Initial guess: scale the position onto the unit-scaled sphere.
        let intersection = position * ratio;

        if squared_norm < CENTER_TOLERANCE_SQUARED {
            return ratio.is_finite().then_some(intersection);
        }

        let gradient = intersection * one_over_radii_squared * 2.0;

        let mut lambda = ((1.0 - ratio) * position.length()) / (0.5 * gradient.length());
        let mut correction = 0.0;

        let mut x_multiplier = 1.0;
        let mut y_multiplier = 1.0;
        let mut z_multiplier = 1.0;
        loop {
            lambda -= correction;

            x_multiplier = 1.0 / (1.0 + lambda * one_over_radii_squared.x);
            y_multiplier = 1.0 / (1.0 + lambda * one_over_radii_squared.y);
            z_multiplier = 1.0 / (1.0 + lambda * one_over_radii_squared.z);

            let x_multiplier2 = x_multiplier * x_multiplier;
            let y_multiplier2 = y_multiplier * y_multiplier;
            let z_multiplier2 = z_multiplier * z_multiplier;

            let x_multiplier3 = x_multiplier2 * x_multiplier;
            let y_multiplier3 = y_multiplier2 * y_multiplier;
            let z_multiplier3 = z_multiplier2 * z_multiplier;

            let func = x2 * x_multiplier2 + y2 * y_multiplier2 + z2 * z_multiplier2 - 1.0;

            let denominator = x2 * x_multiplier3 * one_over_radii_squared.x
                + y2 * y_multiplier3 * one_over_radii_squared.y
                + z2 * z_multiplier3 * one_over_radii_squared.z;

            let derivative = -2.0 * denominator;
            correction = func / derivative;

            if func.abs() <= EPSILON12 {
                break;
            }
        }

        Some(DVec3::new(
            position_x * x_multiplier,
            position_y * y_multiplier,
            position_z * z_multiplier,
        ))
    }

    /// Earth-fixed Cartesian to geodetic.
    pub fn cartesian_to_cartographic(&self, cartesian: DVec3) -> Option<Cartographic> {
        let surface = self.scale_to_geodetic_surface(cartesian)?;
        let normal = self.geodetic_surface_normal(surface);
        let offset = cartesian - surface;

        let longitude = normal.y.atan2(normal.x);
        let latitude = normal.z.asin();
        let height = offset.dot(cartesian).signum() * offset.length();

        Some(Cartographic::new(longitude, latitude, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    #[test]
    fn test_origin_of_longitude_on_equator() {
        let ellipsoid = Ellipsoid::wgs84();
        let p = ellipsoid.cartesian_from_degrees(0.0, 0.0, 0.0);
        assert!((p.x - WGS84_SEMI_MAJOR_AXIS).abs() < EPSILON, "x = {}", p.x);
        assert!(p.y.abs() < EPSILON);
        assert!(p.z.abs() < EPSILON);
    }

    #[test]
    fn test_north_pole_uses_semi_minor_axis() {
        let ellipsoid = Ellipsoid::wgs84();
        let p = ellipsoid.cartesian_from_degrees(0.0, 90.0, 0.0);
        assert!(p.x.abs() < EPSILON);
        assert!(p.y.abs() < EPSILON);
        assert!((p.z - WGS84_SEMI_MINOR_AXIS).abs() < EPSILON, "z = {}", p.z);
    }

    #[test]
    fn test_height_extends_along_normal() {
        let ellipsoid = Ellipsoid::wgs84();
        let p = ellipsoid.cartesian_from_degrees(90.0, 0.0, 250.0);
        assert!(p.x.abs() < EPSILON);
        assert!((p.y - (WGS84_SEMI_MAJOR_AXIS + 250.0)).abs() < EPSILON);
    }

    #[test]
    fn test_cartesian_round_trip_recovers_default_site() {
        let ellipsoid = Ellipsoid::wgs84();
        let cartesian = ellipsoid.cartesian_from_degrees(-71.0349999, 42.213, 37.5);
        let cartographic = ellipsoid
            .cartesian_to_cartographic(cartesian)
            .expect("site is far from the centre");

        assert!((cartographic.longitude_degrees() + 71.0349999).abs() < 1e-9);
        assert!((cartographic.latitude_degrees() - 42.213).abs() < 1e-9);
        assert!((cartographic.height - 37.5).abs() < 1e-6);
    }

    #[test]
    fn test_points_below_surface_have_negative_height() {
        let ellipsoid = Ellipsoid::wgs84();
        let cartesian = ellipsoid.cartesian_from_degrees(10.0, -20.0, -120.0);
        let cartographic = ellipsoid.cartesian_to_cartographic(cartesian).unwrap();
        assert!((cartographic.height + 120.0).abs() < 1e-6);
    }

    #[test]
    fn test_centre_has_no_cartographic() {
        let ellipsoid = Ellipsoid::wgs84();
        assert!(ellipsoid.cartesian_to_cartographic(DVec3::ZERO).is_none());
    }
}
