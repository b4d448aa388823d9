// Deterministic kinematics: per-tick integration and stage bounds

pub mod body;
mod world;

pub use body::{Integration, KinematicBody, Overridden};
pub use world::{Stage, StageContact};
