// Input handling system
//
// This module turns the raw per-tick device mask into the values the
// simulation consumes, and recognizes motion inputs in the recorded history.
//
// ## Architecture
//
// - `game_input`: the 8-bit per-tick input (SOCD resolution, numpad notation)
// - `buffer`: bounded, insertion-ordered input history
// - `motion`: motion patterns and the backward-scanning detector
//
// ## Usage Example
//
// ```rust
// use rusted_fighter::engine::input::{GameInput, InputHistory, MotionPattern};
//
// const DASH: MotionPattern = MotionPattern::new(
//     "66",
//     &[GameInput::RIGHT, GameInput::NONE, GameInput::RIGHT],
//     10,
//     &[GameInput::LEFT, GameInput::DOWN, GameInput::UP],
// );
//
// let mut history = InputHistory::new();
// for token in ["6", "5", "6"] {
//     history.push(token.parse().unwrap());
// }
// assert!(DASH.detect(&history));
// ```

pub mod buffer;
pub mod game_input;
pub mod motion;

// Re-export commonly used types
pub use buffer::{InputHistory, MAX_HISTORY_SIZE};
pub use game_input::{GameInput, InputParseError};
pub use motion::MotionPattern;
