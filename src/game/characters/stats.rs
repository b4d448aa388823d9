// Character stats - movement tuning shared by every character
// Per-character documents override friction and jump height only

/// Movement and physics tuning, in units per tick
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterStats {
    // Movement
    /// Forward walk speed
    pub walk_speed: f32,
    /// Backward walk speed
    pub walk_back_speed: f32,
    /// Forward dash / run speed
    pub dash_speed: f32,
    /// Backdash speed
    pub backdash_speed: f32,
    /// Horizontal speed of a forward or backward jump
    pub jump_forward_speed: f32,
    /// Peak height of a jump
    pub jump_height: f32,

    // Physics
    /// Downward acceleration while airborne
    pub gravity: f32,
    /// Horizontal deceleration while no direction is held
    pub friction: f32,

    // Reactions
    /// Ticks spent downed after a hard knockdown
    pub knockdown_ticks: u32,
}

/// Default tuning
pub const BASE_STATS: CharacterStats = CharacterStats {
    // Movement
    walk_speed: 3.0,
    walk_back_speed: 2.5,
    dash_speed: 7.0,
    backdash_speed: 6.0,
    jump_forward_speed: 3.5,
    jump_height: 90.0,

    // Physics
    gravity: 0.8,
    friction: 0.5,

    // Reactions
    knockdown_ticks: 40,
};

impl Default for CharacterStats {
    fn default() -> Self {
        BASE_STATS
    }
}

impl CharacterStats {
    /// Stats with a document's friction and jump height applied
    pub fn with_overrides(friction: f32, jump_height: f32) -> Self {
        Self {
            friction,
            jump_height,
            ..BASE_STATS
        }
    }

    /// Launch speed that reaches `jump_height` under `gravity`
    pub fn jump_velocity(&self) -> f32 {
        (2.0 * self.gravity * self.jump_height.max(0.0)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_stats() {
        let stats = CharacterStats::default();
        assert_eq!(stats.walk_speed, 3.0);
        assert_eq!(stats.knockdown_ticks, 40);
    }

    #[test]
    fn test_overrides_keep_base_tuning() {
        let stats = CharacterStats::with_overrides(1.25, 120.0);
        assert_eq!(stats.friction, 1.25);
        assert_eq!(stats.jump_height, 120.0);
        assert_eq!(stats.dash_speed, BASE_STATS.dash_speed);
    }

    #[test]
    fn test_jump_velocity() {
        let stats = CharacterStats {
            gravity: 2.0,
            jump_height: 25.0,
            ..BASE_STATS
        };
        assert_relative_eq!(stats.jump_velocity(), 10.0);
    }

    #[test]
    fn test_negative_jump_height_does_not_launch() {
        let stats = CharacterStats::with_overrides(0.5, -10.0);
        assert_eq!(stats.jump_velocity(), 0.0);
    }
}
