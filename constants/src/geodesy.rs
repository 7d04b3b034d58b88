/// WGS84 semi-major axis in metres.
pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;

/// WGS84 semi-minor axis in metres.
pub const WGS84_SEMI_MINOR_AXIS: f64 = 6_356_752.314_245_179_3;

/// Sphere radius for the polygon area approximation.
pub const AREA_EARTH_RADIUS: f64 = 6_378_137.0;

/// Squared distance (in scaled units) under which a point is treated as the
/// ellipsoid centre and has no geodetic projection.
pub const CENTER_TOLERANCE_SQUARED: f64 = 0.1;

/// Convergence threshold for the geodetic surface Newton iteration.
pub const EPSILON12: f64 = 1.0e-12;

/// Threshold for treating an ENU origin as lying on the polar axis.
pub const EPSILON14: f64 = 1.0e-14;
