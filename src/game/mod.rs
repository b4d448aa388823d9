// Game rules: characters and the per-tick simulation that drives them

pub mod characters;
pub mod replay;
pub mod simulation;

pub use simulation::{CharacterSim, Facing, SimEvent, Snapshot, TickReport};
