// Stage bounds: side walls and the ground plane

use serde::{Deserialize, Serialize};

use super::body::KinematicBody;

/// Playfield limits: horizontal walls and the ground plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Leftmost allowed X position
    pub left: f32,
    /// Rightmost allowed X position
    pub right: f32,
    /// Height of the ground plane
    pub ground: f32,
}

/// Result of resolving a body against the stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageContact {
    /// The body touches the ground plane this tick
    pub on_ground: bool,
    /// The body was pushed back inside a wall
    pub hit_wall: bool,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            left: -400.0,
            right: 400.0,
            ground: 0.0,
        }
    }
}

impl Stage {
    /// Create a stage with the given bounds
    pub fn new(left: f32, right: f32, ground: f32) -> Self {
        Self {
            left: left.min(right),
            right: right.max(left),
            ground,
        }
    }

    /// Clamp the body inside the walls and snap it onto the ground plane
    pub fn resolve(&self, body: &mut KinematicBody) -> StageContact {
        let clamped_x = body.position.x.clamp(self.left, self.right);
        let hit_wall = clamped_x != body.position.x;
        body.position.x = clamped_x;

        let on_ground = body.position.y <= self.ground;
        if on_ground {
            body.position.y = self.ground;
            body.velocity.y = 0.0;
        }

        StageContact {
            on_ground,
            hit_wall,
        }
    }
}
