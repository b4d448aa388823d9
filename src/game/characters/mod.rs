// Character system
//
// This module contains everything related to playable characters:
// - Character documents and the fighter roster
// - Movement tuning
// - State flags, the state machine and the motion command library
// - Frame-data animations and playback

pub mod animation;
pub mod character;
pub mod moves;
pub mod registry;
pub mod state;
pub mod stats;

// Re-export commonly used types
pub use animation::{Animation, AnimationPlayer, AnimationSet, FrameData};
pub use character::{Character, CharacterError, CharacterManager, FighterId};
pub use state::{State, StateMachine};
pub use stats::CharacterStats;
