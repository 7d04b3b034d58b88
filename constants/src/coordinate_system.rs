/// Coordinate transformation matrix (row-major: [x_new, y_new, z_new])
/// ENU to Bevy local: -90° X rotation (X→X, Z→Y, -Y→Z)
/// East stays X, Up becomes Y, North becomes -Z.
pub const ENU_TO_LOCAL: [[f64; 3]; 3] = [
    [1.0, 0.0, 0.0],  // X = East
    [0.0, 0.0, 1.0],  // Y = Up
    [0.0, -1.0, 0.0], // Z = -North
];

/// glTF content is authored Y-up; placement frames are Z-up.
/// +90° X rotation (row-major): X→X, Y→Z, Z→-Y.
pub const GLTF_Y_UP_TO_Z_UP: [[f64; 3]; 3] = [
    [1.0, 0.0, 0.0],
    [0.0, 0.0, -1.0],
    [0.0, 1.0, 0.0],
];
