//! Math utilities and types
//!
//! Thin aliases over nalgebra so the projection collaborator and the
//! dispatcher agree on one set of types.

pub use nalgebra::{Matrix4, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 2D point type (screen space, pixels)
pub type Point2 = nalgebra::Point2<f32>;

/// 3D point type (world space)
pub type Point3 = nalgebra::Point3<f32>;

/// World-to-view transform handed to the projector and to every render callback
pub type ViewTransform = Mat4;

/// Math utility functions
pub mod utils {
    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * DEG_TO_RAD
    }

    /// Build a right-handed look-at view transform
    pub fn look_at(eye: &super::Point3, target: &super::Point3, up: &super::Vec3) -> super::Mat4 {
        super::Mat4::look_at_rh(eye, target, up)
    }
}
