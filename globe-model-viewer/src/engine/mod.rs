pub mod camera;
pub mod core;
pub mod geodesy;
pub mod loading;
pub mod picking;
pub mod scene;
