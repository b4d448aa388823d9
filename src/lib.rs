//! Deterministic per-tick simulation core for a 2D fighting game.
//!
//! Characters are driven one tick at a time by [`game::CharacterSim::step`]:
//! input is recorded and interpreted into state flags, state selects an
//! animation, authored frame data drives velocity, and a simple kinematic
//! body keeps the character inside the stage.

pub mod core;
pub mod engine;
pub mod game;
