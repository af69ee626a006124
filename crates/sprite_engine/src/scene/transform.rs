//! Cached 2D affine transform
//!
//! A [`Transform`] holds position, rotation and scale plus a lazily recomputed
//! model matrix. Setters only invalidate the cache when the stored value
//! actually changes, so idempotent writes from behaviors cost nothing at draw
//! time.
//!
//! Composition order is `Translate(x, y) * Rotate(angle + angle_offset) * Scale(sx, sy)`,
//! applied to column vectors.

use thiserror::Error;

use crate::foundation::math::{utils, Bounds, Mat3, Mat3Ext, Point2, Vec2};

/// Transform invariant violations
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum TransformError {
    /// Scale was zero or negative without the negative-scale opt-in
    #[error("scale must be > 0 unless negative scale is allowed, got [{sx:.2}, {sy:.2}]")]
    InvalidScale {
        /// Scale on the X axis
        sx: f32,
        /// Scale on the Y axis
        sy: f32,
    },
}

/// Optional clamp ranges enforced when the matrix is requested
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformLimits {
    /// Allowed position rectangle
    pub position: Option<Bounds>,
    /// Allowed scale range as (min, max) per axis
    pub scale: Option<(Vec2, Vec2)>,
    /// Allowed normalized rotation range as (min, max)
    pub rotation: Option<(f32, f32)>,
}

/// Position, rotation and scale with a cached model matrix
///
/// Invariant: when the cache is clean, `cached` equals the matrix the current
/// fields would produce.
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec2,
    scale: Vec2,
    angle: f32,
    angle_offset: f32,
    allow_negative_scale: bool,
    limits: TransformLimits,
    cached: Mat3,
    dirty: bool,
    recomputes: u64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            scale: Vec2::new(1.0, 1.0),
            angle: 0.0,
            angle_offset: 0.0,
            allow_negative_scale: false,
            limits: TransformLimits::default(),
            cached: Mat3::identity(),
            dirty: true,
            recomputes: 0,
        }
    }
}

impl Transform {
    /// Identity transform at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform positioned at `(x, y)`
    pub fn at(x: f32, y: f32) -> Self {
        let mut transform = Self::default();
        transform.set_position(x, y);
        transform
    }

    /// Builder pattern: set scale
    #[must_use]
    pub fn with_scale(mut self, sx: f32, sy: f32) -> Self {
        self.set_scale(sx, sy);
        self
    }

    /// Builder pattern: set rotation
    #[must_use]
    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.set_rotation(radians);
        self
    }

    /// Builder pattern: set the static angle correction
    #[must_use]
    pub fn with_angle_offset(mut self, radians: f32) -> Self {
        self.set_angle_offset(radians);
        self
    }

    /// Builder pattern: allow zero or negative scale (mirrored sprites)
    #[must_use]
    pub fn allowing_negative_scale(mut self) -> Self {
        self.allow_negative_scale = true;
        self
    }

    /// X coordinate
    pub fn x(&self) -> f32 {
        self.position.x
    }

    /// Y coordinate
    pub fn y(&self) -> f32 {
        self.position.y
    }

    /// Position in world units
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Normalized rotation in radians, without the angle offset
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Static angle correction baked into every matrix
    pub fn angle_offset(&self) -> f32 {
        self.angle_offset
    }

    /// Scale factors
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Length of the scale vector, used as a collision radius
    pub fn scale_length(&self) -> f32 {
        self.scale.magnitude()
    }

    /// Configured clamp ranges
    pub fn limits(&self) -> &TransformLimits {
        &self.limits
    }

    /// Whether the next matrix request will recompute
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// How many times the matrix has been recomputed
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    /// Whether zero or negative scale is accepted
    pub fn allows_negative_scale(&self) -> bool {
        self.allow_negative_scale
    }

    /// Move to `(x, y)`
    pub fn set_position(&mut self, x: f32, y: f32) {
        let next = Vec2::new(x, y);
        if next != self.position {
            self.position = next;
            self.dirty = true;
        }
    }

    /// Move by `(dx, dy)`
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.set_position(self.position.x + dx, self.position.y + dy);
    }

    /// Set rotation; the stored angle is normalized into `[0, 2π)`
    pub fn set_rotation(&mut self, radians: f32) {
        let next = utils::normalize_angle(radians);
        if next != self.angle {
            self.angle = next;
            self.dirty = true;
        }
    }

    /// Rotate by `radians`
    pub fn rotate(&mut self, radians: f32) {
        self.set_rotation(self.angle + radians);
    }

    /// Move the rotation a fraction `t` of the way toward `target`
    pub fn rotate_towards(&mut self, target: f32, t: f32) {
        let target = utils::normalize_angle(target);
        self.set_rotation(utils::lerp(self.angle, target, t));
    }

    /// Snap exactly onto `target` when within `epsilon` radians of it
    pub fn snap_rotation_to(&mut self, target: f32, epsilon: f32) {
        let target = utils::normalize_angle(target);
        if (target - self.angle).abs() < epsilon {
            self.set_rotation(target);
        }
    }

    /// Set scale
    ///
    /// # Panics
    /// Panics with [`TransformError::InvalidScale`] when either factor is not
    /// positive and negative scale has not been allowed.
    pub fn set_scale(&mut self, sx: f32, sy: f32) {
        if let Err(err) = self.check_scale(sx, sy) {
            panic!("{err}");
        }
        let next = Vec2::new(sx, sy);
        if next != self.scale {
            self.scale = next;
            self.dirty = true;
        }
    }

    /// Set the static angle correction (e.g. for textures drawn sideways)
    pub fn set_angle_offset(&mut self, radians: f32) {
        if radians != self.angle_offset {
            self.angle_offset = radians;
            self.dirty = true;
        }
    }

    /// Allow or forbid zero and negative scale
    pub fn set_allow_negative_scale(&mut self, allow: bool) {
        if allow != self.allow_negative_scale {
            self.allow_negative_scale = allow;
            // Force the next matrix request to re-validate the scale
            self.dirty = true;
        }
    }

    /// Clamp the position into `bounds` from now on
    pub fn limit_position(&mut self, bounds: Bounds) {
        self.limits.position = Some(bounds);
    }

    /// Clamp each scale axis into `[min, max]` from now on
    pub fn limit_scale(&mut self, min: Vec2, max: Vec2) {
        self.limits.scale = Some((min, max));
    }

    /// Clamp the normalized rotation into `[min, max]` from now on
    pub fn limit_rotation(&mut self, min: f32, max: f32) {
        self.limits.rotation = Some((min, max));
    }

    /// Remove every clamp range
    pub fn clear_limits(&mut self) {
        self.limits = TransformLimits::default();
    }

    /// Stretch between two points, for line and beam sprites
    ///
    /// Position becomes the midpoint, X scale the segment length plus
    /// `thickness`, Y scale `thickness`, and the rotation the segment angle.
    pub fn stretch_between(&mut self, from: Vec2, to: Vec2, thickness: f32) {
        let span = to - from;
        let midpoint = from + span * 0.5;
        self.set_scale(span.magnitude() + thickness, thickness);
        self.set_position(midpoint.x, midpoint.y);
        self.set_rotation(utils::angle_of(span));
    }

    /// Model matrix, recomputed only when something changed
    ///
    /// # Panics
    /// Panics with [`TransformError::InvalidScale`] when the scale invariant
    /// is violated; see [`Transform::try_matrix`] for the non-panicking form.
    pub fn matrix(&mut self) -> Mat3 {
        match self.try_matrix() {
            Ok(matrix) => matrix,
            Err(err) => panic!("{err}"),
        }
    }

    /// Model matrix, reporting an invalid scale instead of panicking
    pub fn try_matrix(&mut self) -> Result<Mat3, TransformError> {
        self.apply_limits();

        if self.dirty {
            self.check_scale(self.scale.x, self.scale.y)?;
            self.cached = Mat3::translation_2d(self.position.x, self.position.y)
                * Mat3::rotation_2d(self.angle + self.angle_offset)
                * Mat3::scaling_2d(self.scale.x, self.scale.y);
            self.dirty = false;
            self.recomputes += 1;
        }

        Ok(self.cached)
    }

    /// Map a point from local space into world space
    pub fn transform_point(&mut self, local: Point2) -> Point2 {
        self.matrix().transform_point(&local)
    }

    fn check_scale(&self, sx: f32, sy: f32) -> Result<(), TransformError> {
        if !self.allow_negative_scale && (sx <= 0.0 || sy <= 0.0) {
            return Err(TransformError::InvalidScale { sx, sy });
        }
        Ok(())
    }

    fn apply_limits(&mut self) {
        let limits = self.limits;

        if let Some(bounds) = limits.position {
            let clamped = bounds.clamp(self.position);
            if clamped != self.position {
                self.position = clamped;
                self.dirty = true;
            }
        }

        if let Some((min, max)) = limits.scale {
            let clamped = Vec2::new(self.scale.x.clamp(min.x, max.x), self.scale.y.clamp(min.y, max.y));
            if clamped != self.scale {
                self.scale = clamped;
                self.dirty = true;
            }
        }

        if let Some((min, max)) = limits.rotation {
            let clamped = self.angle.clamp(min, max);
            if clamped != self.angle {
                self.angle = clamped;
                self.dirty = true;
            }
        }
    }
}
