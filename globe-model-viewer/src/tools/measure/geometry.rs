use bevy::math::DVec3;
use constants::geodesy::AREA_EARTH_RADIUS;

use crate::engine::geodesy::{Cartographic, Ellipsoid};

/// Areas at or above this many square metres are shown in km².
const SQUARE_KILOMETRE_THRESHOLD: f64 = 10_000.0;

pub fn distance(a: DVec3, b: DVec3) -> f64 {
    a.distance(b)
}

pub fn midpoint(a: DVec3, b: DVec3) -> DVec3 {
    (a + b) * 0.5
}

/// Mean of the vertices, not the area centroid.
pub fn centroid(points: &[DVec3]) -> DVec3 {
    if points.is_empty() {
        return DVec3::ZERO;
    }
    points.iter().copied().sum::<DVec3>() / points.len() as f64
}

/// Closed-loop area over geodetic vertices on a sphere of radius 6378137 m.
///
/// Sums `(lon_j - lon_i) * (2 + sin(lat_i) + sin(lat_j))` over consecutive
/// pairs. Inexact for very large polygons.
pub fn polygon_area_cartographic(vertices: &[Cartographic]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for (i, current) in vertices.iter().enumerate() {
        let next = &vertices[(i + 1) % vertices.len()];
        sum += (next.longitude - current.longitude)
            * (2.0 + current.latitude.sin() + next.latitude.sin());
    }

    (sum * AREA_EARTH_RADIUS * AREA_EARTH_RADIUS / 2.0).abs()
}

/// Area of fixed-frame vertices. Points that cannot be projected are skipped.
pub fn polygon_area(points: &[DVec3], ellipsoid: &Ellipsoid) -> f64 {
    let vertices: Vec<Cartographic> = points
        .iter()
        .filter_map(|point| ellipsoid.cartesian_to_cartographic(*point))
        .collect();
    polygon_area_cartographic(&vertices)
}

pub fn format_area(square_metres: f64) -> String {
    if square_metres < SQUARE_KILOMETRE_THRESHOLD {
        format!("{square_metres:.2} m²")
    } else {
        format!("{:.4} km²", square_metres / 1_000_000.0)
    }
}

pub fn format_distance_label(metres: f64) -> String {
    format!("{metres:.2} m")
}

pub fn format_point_label(position: &Cartographic) -> String {
    format!(
        "Lon: {:.7}°\nLat: {:.7}°\nHeight: {:.2}m",
        position.longitude_degrees(),
        position.latitude_degrees(),
        position.height
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equator_square(side_degrees: f64) -> Vec<Cartographic> {
        vec![
            Cartographic::from_degrees(0.0, 0.0, 0.0),
            Cartographic::from_degrees(side_degrees, 0.0, 0.0),
            Cartographic::from_degrees(side_degrees, side_degrees, 0.0),
            Cartographic::from_degrees(0.0, side_degrees, 0.0),
        ]
    }

    fn expected_square_area(side_degrees: f64) -> f64 {
        let side = side_degrees.to_radians();
        AREA_EARTH_RADIUS * AREA_EARTH_RADIUS * side * side.sin()
    }

    #[test]
    fn test_area_of_equator_square_matches_formula() {
        for side in [0.0005, 0.001, 0.01] {
            let area = polygon_area_cartographic(&equator_square(side));
            let expected = expected_square_area(side);
            assert!(
                (area - expected).abs() < 1e-4,
                "side {side}: {area} vs {expected}"
            );
        }
    }

    #[test]
    fn test_area_ignores_winding_direction() {
        let mut square = equator_square(0.001);
        let forward = polygon_area_cartographic(&square);
        square.reverse();
        let backward = polygon_area_cartographic(&square);

        assert!(forward > 0.0);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn test_area_needs_three_vertices() {
        let square = equator_square(0.001);
        assert_eq!(polygon_area_cartographic(&square[..2]), 0.0);
        assert_eq!(polygon_area_cartographic(&[]), 0.0);
    }

    #[test]
    fn test_area_from_cartesian_vertices() {
        let ellipsoid = Ellipsoid::wgs84();
        let points: Vec<DVec3> = equator_square(0.001)
            .iter()
            .map(|vertex| ellipsoid.cartographic_to_cartesian(vertex))
            .collect();

        let area = polygon_area(&points, &ellipsoid);
        let expected = expected_square_area(0.001);
        assert!((area - expected).abs() < 1e-4, "{area} vs {expected}");
    }

    #[test]
    fn test_area_units_switch_at_ten_thousand() {
        assert_eq!(format_area(9_999.99), "9999.99 m²");
        assert_eq!(format_area(10_000.0), "0.0100 km²");
        assert_eq!(format_area(2_345_678.0), "2.3457 km²");
        assert_eq!(format_area(0.0), "0.00 m²");
    }

    #[test]
    fn test_centroid_and_midpoint() {
        let points = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(2.0, 4.0, 0.0),
            DVec3::new(0.0, 4.0, 0.0),
        ];
        assert_eq!(centroid(&points), DVec3::new(1.0, 2.0, 0.0));
        assert_eq!(midpoint(points[0], points[2]), DVec3::new(1.0, 2.0, 0.0));
        assert_eq!(centroid(&[]), DVec3::ZERO);
    }

    #[test]
    fn test_labels() {
        assert_eq!(format_distance_label(12.345), "12.35 m");
        let label = format_point_label(&Cartographic::from_degrees(-71.0349999, 42.213, 3.456));
        assert_eq!(label, "Lon: -71.0349999°\nLat: 42.2130000°\nHeight: 3.46m");
    }
}
