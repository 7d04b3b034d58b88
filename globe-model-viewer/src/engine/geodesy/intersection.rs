use bevy::math::DVec3;

use super::ellipsoid::Ellipsoid;

/// Parametric range `[start, stop]` along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub stop: f64,
}

impl Interval {
    /// First non-negative parameter inside the range.
    pub fn nearest(&self) -> f64 {
        if self.start > 0.0 { self.start } else { self.stop }
    }
}

/// Intersect a ray with the ellipsoid surface.
///
/// The problem is solved on the unit sphere after scaling by the inverse
/// radii. A ray starting inside the ellipsoid yields `start == 0`.
pub fn ray_ellipsoid(origin: DVec3, direction: DVec3, ellipsoid: &Ellipsoid) -> Option<Interval> {
    let inverse_radii = ellipsoid.one_over_radii();
    let q = inverse_radii * origin;
    let w = inverse_radii * direction;

    let q2 = q.length_squared();
    let qw = q.dot(w);

    if q2 > 1.0 {
        // Outside the ellipsoid.
        if qw >= 0.0 {
            // Looking outward or tangent.
            return None;
        }

        let qw2 = qw * qw;
        let difference = q2 - 1.0;
        let w2 = w.length_squared();
        let product = w2 * difference;

        if qw2 < product {
            // Imaginary roots: miss.
            None
        } else if qw2 > product {
            let discriminant = qw * qw - product;
            let temp = -qw + discriminant.sqrt();
            let root0 = temp / w2;
            let root1 = difference / temp;
            Some(Interval {
                start: root0.min(root1),
                stop: root0.max(root1),
            })
        } else {
            let root = (difference / w2).sqrt();
            Some(Interval {
                start: root,
                stop: root,
            })
        }
    } else if q2 < 1.0 {
        let difference = q2 - 1.0;
        let w2 = w.length_squared();
        let product = w2 * difference;
        let discriminant = qw * qw - product;
        let temp = -qw + discriminant.sqrt();
        Some(Interval {
            start: 0.0,
            stop: temp / w2,
        })
    } else if qw < 0.0 {
        // On the surface and heading inward.
        let w2 = w.length_squared();
        Some(Interval {
            start: 0.0,
            stop: -qw / w2,
        })
    } else {
        None
    }
}
