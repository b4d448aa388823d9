// Engine modules: assets, input, physics

pub mod assets;
pub mod input;
pub mod physics;
