//! Forward-Euler motion
//!
//! A [`Force`] is a per-second displacement plus an angular rate; applying it
//! for `dt` seconds moves and turns a [`Transform`]. There is no mass model or
//! sub-stepping. [`Velocity`] accumulates accelerations and caps the result,
//! which is what steering input uses.

use crate::foundation::math::{utils, Vec2};
use crate::scene::Transform;

/// Linear and angular motion applied each tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Force {
    /// Direction times magnitude, in world units per second
    pub vector: Vec2,
    /// Radians per second around the entity's own axis
    pub angular_rate: f32,
    /// Optional `(min, max)` bound on the vector length
    pub length_limit: Option<(f32, f32)>,
}

impl Force {
    /// Linear force without rotation
    pub fn new(vector: Vec2) -> Self {
        Self {
            vector,
            ..Self::default()
        }
    }

    /// Force of `magnitude` pointing along `radians`
    pub fn toward(radians: f32, magnitude: f32) -> Self {
        Self::new(utils::polar(radians, magnitude))
    }

    /// Builder pattern: set the angular rate
    #[must_use]
    pub fn with_angular_rate(mut self, radians_per_second: f32) -> Self {
        self.angular_rate = radians_per_second;
        self
    }

    /// Builder pattern: bound the vector length to `[min, max]`
    #[must_use]
    pub fn with_length_limit(mut self, min: f32, max: f32) -> Self {
        self.length_limit = Some((min, max));
        self
    }

    /// The vector after the length limit has been applied
    ///
    /// A zero vector has no direction and is left untouched.
    pub fn effective_vector(&self) -> Vec2 {
        let Some((min, max)) = self.length_limit else {
            return self.vector;
        };

        let length = self.vector.magnitude();
        if length == 0.0 {
            return self.vector;
        }

        let clamped = length.clamp(min, max);
        if clamped == length {
            self.vector
        } else {
            self.vector * (clamped / length)
        }
    }
}

/// Move and turn `transform` by `force` over `dt` seconds
pub fn apply_force(transform: &mut Transform, force: &Force, dt: f32) {
    let step = force.effective_vector() * dt;
    transform.move_by(step.x, step.y);
    if force.angular_rate != 0.0 {
        transform.rotate(force.angular_rate * dt);
    }
}

/// Accumulated velocity with a speed cap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    current: Vec2,
    max_speed: f32,
}

impl Velocity {
    /// At rest, never faster than `max_speed` units per second
    pub fn new(max_speed: f32) -> Self {
        Self {
            current: Vec2::zeros(),
            max_speed,
        }
    }

    /// Current velocity
    pub fn current(&self) -> Vec2 {
        self.current
    }

    /// Speed cap
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Add `acceleration * dt`, then cap the length at the max speed
    pub fn accelerate(&mut self, acceleration: Vec2, dt: f32) {
        let next = self.current + acceleration * dt;
        let speed = next.magnitude();
        self.current = if speed > self.max_speed {
            next * (self.max_speed / speed)
        } else {
            next
        };
    }

    /// Slow down by `deceleration * dt` without reversing direction
    pub fn brake(&mut self, deceleration: f32, dt: f32) {
        let speed = self.current.magnitude();
        if speed == 0.0 {
            return;
        }
        let next = (speed - deceleration * dt).max(0.0);
        self.current *= next / speed;
    }

    /// Stop immediately
    pub fn stop(&mut self) {
        self.current = Vec2::zeros();
    }

    /// Force equivalent of the current velocity
    pub fn as_force(&self) -> Force {
        Force::new(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;
    use approx::assert_relative_eq;

    #[test]
    fn test_apply_force_is_forward_euler() {
        let mut t = Transform::at(1.0, 1.0);
        let force = Force::new(Vec2::new(10.0, 0.0)).with_angular_rate(1.0);
        apply_force(&mut t, &force, 0.5);
        assert_relative_eq!(t.position(), Vec2::new(6.0, 1.0));
        assert_relative_eq!(t.angle(), 0.5);
    }

    #[test]
    fn test_toward_points_along_angle() {
        let force = Force::toward(HALF_PI, 10.0);
        assert_relative_eq!(force.vector, Vec2::new(0.0, 10.0), epsilon = 1e-5);
    }

    #[test]
    fn test_length_limit_clamps_both_ends() {
        let fast = Force::new(Vec2::new(3.0, 4.0)).with_length_limit(1.0, 2.5);
        assert_relative_eq!(fast.effective_vector(), Vec2::new(1.5, 2.0), epsilon = 1e-6);

        let slow = Force::new(Vec2::new(0.3, 0.4)).with_length_limit(1.0, 2.5);
        assert_relative_eq!(slow.effective_vector().magnitude(), 1.0, epsilon = 1e-6);

        let idle = Force::new(Vec2::zeros()).with_length_limit(1.0, 2.5);
        assert_eq!(idle.effective_vector(), Vec2::zeros());
    }

    #[test]
    fn test_zero_force_keeps_cache_valid() {
        let mut t = Transform::at(2.0, 2.0);
        t.matrix();
        apply_force(&mut t, &Force::default(), 0.016);
        assert!(!t.is_dirty());
    }

    #[test]
    fn test_velocity_accumulates_and_caps() {
        let mut velocity = Velocity::new(5.0);
        velocity.accelerate(Vec2::new(4.0, 0.0), 0.5);
        assert_relative_eq!(velocity.current(), Vec2::new(2.0, 0.0));

        velocity.accelerate(Vec2::new(100.0, 0.0), 1.0);
        assert_relative_eq!(velocity.current().magnitude(), 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_velocity_brake_stops_at_zero() {
        let mut velocity = Velocity::new(5.0);
        velocity.accelerate(Vec2::new(0.0, 2.0), 1.0);
        velocity.brake(1.0, 1.0);
        assert_relative_eq!(velocity.current(), Vec2::new(0.0, 1.0));
        velocity.brake(10.0, 1.0);
        assert_eq!(velocity.current(), Vec2::zeros());
    }
}
