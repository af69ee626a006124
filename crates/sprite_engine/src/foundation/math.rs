//! Math utilities and types
//!
//! Provides the 2D math types used by transforms, cameras and physics.
//! All matrices are 3x3 homogeneous matrices operating on column vectors.

pub use nalgebra::{Matrix3, Vector2, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 4D vector type (colors, UV rectangles)
pub type Vec4 = Vector4<f32>;

/// 3x3 homogeneous matrix type
pub type Mat3 = Matrix3<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// Axis-aligned rectangle in world units
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    /// Minimum corner (left, bottom)
    pub min: Vec2,
    /// Maximum corner (right, top)
    pub max: Vec2,
}

impl Bounds {
    /// Create bounds from explicit extents
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    /// Bounds centred on the origin spanning `width` x `height`
    pub fn centered(width: f32, height: f32) -> Self {
        Self::new(-width * 0.5, -height * 0.5, width * 0.5, height * 0.5)
    }

    /// Whether a point lies inside (edges inclusive)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Clamp a point into the rectangle
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x.clamp(self.min.x, self.max.x), point.y.clamp(self.min.y, self.max.y))
    }

    /// Width and height
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = std::f32::consts::TAU;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec2};

    /// Linear interpolation with `t` clamped to `[0, 1]`
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t.clamp(0.0, 1.0)
    }

    /// Wrap an angle into `[0, TAU)`
    pub fn normalize_angle(radians: f32) -> f32 {
        let wrapped = radians.rem_euclid(constants::TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if wrapped >= constants::TAU {
            0.0
        } else {
            wrapped
        }
    }

    /// Vector of the given length pointing along `radians`
    pub fn polar(radians: f32, length: f32) -> Vec2 {
        let (sin, cos) = radians.sin_cos();
        Vec2::new(cos * length, sin * length)
    }

    /// Angle of a vector relative to the positive X axis
    pub fn angle_of(v: Vec2) -> f32 {
        v.y.atan2(v.x)
    }
}

/// Extension trait for building 2D homogeneous matrices
pub trait Mat3Ext {
    /// Translation by `(x, y)`
    fn translation_2d(x: f32, y: f32) -> Mat3;

    /// Counter-clockwise rotation about the origin
    fn rotation_2d(radians: f32) -> Mat3;

    /// Non-uniform scaling about the origin
    fn scaling_2d(sx: f32, sy: f32) -> Mat3;
}

impl Mat3Ext for Mat3 {
    fn translation_2d(x: f32, y: f32) -> Mat3 {
        Mat3::new_translation(&Vec2::new(x, y))
    }

    fn rotation_2d(radians: f32) -> Mat3 {
        Mat3::new_rotation(radians)
    }

    fn scaling_2d(sx: f32, sy: f32) -> Mat3 {
        Mat3::new_nonuniform_scaling(&Vec2::new(sx, sy))
    }
}
