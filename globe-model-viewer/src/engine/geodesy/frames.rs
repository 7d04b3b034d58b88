use bevy::math::{DMat4, DQuat, DVec3, DVec4};
use constants::geodesy::EPSILON14;
use serde::{Deserialize, Serialize};

use super::ellipsoid::Ellipsoid;

/// Orientation relative to a local east-north-up frame, in radians.
///
/// Heading turns clockwise seen from above (about -Up), pitch raises the
/// nose (about -North after heading), roll banks about the forward axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeadingPitchRoll {
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl HeadingPitchRoll {
    pub fn new(heading: f64, pitch: f64, roll: f64) -> Self {
        Self {
            heading,
            pitch,
            roll,
        }
    }

    pub fn from_degrees(heading: f64, pitch: f64, roll: f64) -> Self {
        Self::new(heading.to_radians(), pitch.to_radians(), roll.to_radians())
    }

    /// Rotation expressed in the local frame: `Rz(-heading) * Ry(-pitch) * Rx(roll)`.
    pub fn local_quaternion(&self) -> DQuat {
        let roll = DQuat::from_axis_angle(DVec3::X, self.roll);
        let pitch = DQuat::from_axis_angle(DVec3::Y, -self.pitch);
        let heading = DQuat::from_axis_angle(DVec3::Z, -self.heading);
        heading * pitch * roll
    }
}

/// Local frame at `origin` with columns east, north, up and the origin itself.
pub fn east_north_up_to_fixed_frame(origin: DVec3, ellipsoid: &Ellipsoid) -> DMat4 {
    let (east, north, up) = if origin.x.abs() < EPSILON14 && origin.y.abs() < EPSILON14 {
        // On the polar axis east is undefined; pick +Y and flip north/up
        // for the southern hemisphere.
        let sign = if origin.z < 0.0 { -1.0 } else { 1.0 };
        (DVec3::Y, DVec3::NEG_X * sign, DVec3::Z * sign)
    } else {
        let up = ellipsoid.geodetic_surface_normal(origin);
        let east = DVec3::new(-origin.y, origin.x, 0.0).normalize();
        let north = up.cross(east);
        (east, north, up)
    };

    DMat4::from_cols(
        east.extend(0.0),
        north.extend(0.0),
        up.extend(0.0),
        DVec4::new(origin.x, origin.y, origin.z, 1.0),
    )
}

/// Full local-to-fixed transform for an oriented frame at `origin`.
pub fn heading_pitch_roll_to_fixed_frame(
    origin: DVec3,
    hpr: &HeadingPitchRoll,
    ellipsoid: &Ellipsoid,
) -> DMat4 {
    east_north_up_to_fixed_frame(origin, ellipsoid) * DMat4::from_quat(hpr.local_quaternion())
}

/// Fixed-frame orientation of a heading/pitch/roll at `origin`.
pub fn heading_pitch_roll_quaternion(
    origin: DVec3,
    hpr: &HeadingPitchRoll,
    ellipsoid: &Ellipsoid,
) -> DQuat {
    DQuat::from_mat4(&heading_pitch_roll_to_fixed_frame(origin, hpr, ellipsoid)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_vec_eq(actual: DVec3, expected: DVec3) {
        assert!(
            (actual - expected).length() < EPSILON,
            "{actual:?} vs {expected:?}"
        );
    }

    #[test]
    fn test_enu_at_equator_prime_meridian() {
        let ellipsoid = Ellipsoid::wgs84();
        let origin = ellipsoid.cartesian_from_degrees(0.0, 0.0, 0.0);
        let frame = east_north_up_to_fixed_frame(origin, &ellipsoid);

        assert_vec_eq(frame.x_axis.truncate(), DVec3::Y);
        assert_vec_eq(frame.y_axis.truncate(), DVec3::Z);
        assert_vec_eq(frame.z_axis.truncate(), DVec3::X);
        assert_vec_eq(frame.w_axis.truncate(), origin);
    }

    #[test]
    fn test_enu_at_south_pole_is_degenerate_frame() {
        let ellipsoid = Ellipsoid::wgs84();
        let origin = DVec3::new(0.0, 0.0, -6_356_752.0);
        let frame = east_north_up_to_fixed_frame(origin, &ellipsoid);

        assert_vec_eq(frame.x_axis.truncate(), DVec3::Y);
        assert_vec_eq(frame.y_axis.truncate(), DVec3::X);
        assert_vec_eq(frame.z_axis.truncate(), DVec3::NEG_Z);
    }

    #[test]
    fn test_zero_orientation_matches_enu_axes() {
        let ellipsoid = Ellipsoid::wgs84();
        let origin = ellipsoid.cartesian_from_degrees(-71.0349999, 42.213, 0.0);
        let frame = east_north_up_to_fixed_frame(origin, &ellipsoid);
        let q = heading_pitch_roll_quaternion(origin, &HeadingPitchRoll::default(), &ellipsoid);

        assert_vec_eq(q * DVec3::X, frame.x_axis.truncate());
        assert_vec_eq(q * DVec3::Z, frame.z_axis.truncate());
    }

    #[test]
    fn test_heading_turns_clockwise_from_east_to_south() {
        let ellipsoid = Ellipsoid::wgs84();
        let origin = ellipsoid.cartesian_from_degrees(0.0, 0.0, 0.0);
        let hpr = HeadingPitchRoll::from_degrees(90.0, 0.0, 0.0);
        let q = heading_pitch_roll_quaternion(origin, &hpr, &ellipsoid);

        // Local forward (+X, east) ends up pointing south (-Z in ECEF here).
        assert_vec_eq(q * DVec3::X, DVec3::NEG_Z);
    }

    #[test]
    fn test_positive_pitch_raises_forward_axis() {
        let ellipsoid = Ellipsoid::wgs84();
        let origin = ellipsoid.cartesian_from_degrees(0.0, 0.0, 0.0);
        let hpr = HeadingPitchRoll::from_degrees(0.0, 90.0, 0.0);
        let q = heading_pitch_roll_quaternion(origin, &hpr, &ellipsoid);

        // Forward now points up, which is +X in ECEF at this origin.
        assert_vec_eq(q * DVec3::X, DVec3::X);
    }
}
