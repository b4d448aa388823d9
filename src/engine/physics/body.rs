// Kinematic body with explicit per-tick integration

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::math::approach_zero;

/// Per-tick forces applied by [`KinematicBody::integrate`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integration {
    /// Downward acceleration in units per tick²
    pub gravity: f32,
    /// Horizontal deceleration in units per tick²
    pub friction: f32,
    /// Gravity only acts while airborne
    pub airborne: bool,
    /// False while a held direction (or a velocity override) sustains X velocity
    pub apply_friction: bool,
}

/// Which velocity axes a frame replaced this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overridden {
    pub x: bool,
    pub y: bool,
}

/// Point-mass body moved by explicit per-tick integration.
///
/// Y points up, the position is the character's feet. All quantities are in
/// units per tick so a replay never depends on wall-clock delta time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicBody {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Ticks left during which gravity is suspended
    gravity_ignore_ticks: u32,
}

impl KinematicBody {
    /// Create a body at rest at the given position
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            gravity_ignore_ticks: 0,
        }
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, x: f32, y: f32) -> Self {
        self.velocity = Vec2::new(x, y);
        self
    }

    /// Suspend gravity for the next `ticks` integrations
    pub fn ignore_gravity_for(&mut self, ticks: u32) {
        self.gravity_ignore_ticks = ticks;
    }

    pub fn gravity_ignore_ticks(&self) -> u32 {
        self.gravity_ignore_ticks
    }

    /// Replace velocity on each axis that carries a value.
    /// `None` leaves the axis untouched; `Some(0.0)` stops it.
    pub fn override_velocity(&mut self, x: Option<f32>, y: Option<f32>) -> Overridden {
        if let Some(x) = x {
            self.velocity.x = x;
        }
        if let Some(y) = y {
            self.velocity.y = y;
        }
        Overridden {
            x: x.is_some(),
            y: y.is_some(),
        }
    }

    /// Advance the body by one tick.
    ///
    /// Position moves by the current velocity first, then friction and
    /// gravity update the velocity for the next tick.
    pub fn integrate(&mut self, step: Integration) {
        self.position += self.velocity;

        if step.apply_friction {
            self.velocity.x = approach_zero(self.velocity.x, step.friction);
        }

        if step.airborne {
            if self.gravity_ignore_ticks > 0 {
                self.gravity_ignore_ticks -= 1;
            } else {
                self.velocity.y -= step.gravity;
            }
        }
    }
}
