// Math utilities and helper functions

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in sprite-local pixels (origin at the character's feet)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Mirror the rectangle around the local origin's vertical axis
    pub fn mirrored(&self) -> Self {
        Self {
            x: -(self.x + self.w),
            ..*self
        }
    }
}

/// Move `value` toward zero by `step` without crossing it
pub fn approach_zero(value: f32, step: f32) -> f32 {
    if value > 0.0 {
        (value - step).max(0.0)
    } else if value < 0.0 {
        (value + step).min(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approach_zero_positive() {
        assert_eq!(approach_zero(5.0, 2.0), 3.0);
        assert_eq!(approach_zero(1.0, 2.0), 0.0);
    }

    #[test]
    fn test_approach_zero_negative() {
        assert_eq!(approach_zero(-5.0, 2.0), -3.0);
        assert_eq!(approach_zero(-1.0, 2.0), 0.0);
    }

    #[test]
    fn test_approach_zero_at_rest() {
        assert_eq!(approach_zero(0.0, 2.0), 0.0);
    }

    #[test]
    fn test_rect_mirrored() {
        let rect = Rect::new(10.0, 0.0, 20.0, 40.0);
        let mirrored = rect.mirrored();
        assert_eq!(mirrored.x, -30.0);
        assert_eq!(mirrored.w, 20.0);
        assert_eq!(mirrored.mirrored(), rect);
    }
}
