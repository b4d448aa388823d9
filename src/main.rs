use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use rusted_fighter::engine::physics::Stage;
use rusted_fighter::game::characters::{registry, Character};
use rusted_fighter::game::replay::parse_script;
use rusted_fighter::game::{CharacterSim, Facing};

/// Replay an input script against a character and print every tick
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Character document (JSON)
    #[arg(short, long)]
    character: PathBuf,

    /// Input script, one numpad token per line
    #[arg(short, long)]
    inputs: PathBuf,

    /// Direction the character faces
    #[arg(short, long, value_enum, default_value_t = Side::Right)]
    facing: Side,

    /// Starting X position
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    x: f32,

    /// Named composite state to start in (e.g. "crouch")
    #[arg(long)]
    start: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Right,
    Left,
}

impl From<Side> for Facing {
    fn from(side: Side) -> Self {
        match side {
            Side::Right => Facing::Right,
            Side::Left => Facing::Left,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let character = Character::load(&args.character)
        .with_context(|| format!("loading character {}", args.character.display()))?;
    let script = std::fs::read_to_string(&args.inputs)
        .with_context(|| format!("reading input script {}", args.inputs.display()))?;
    let inputs = parse_script(&script)
        .with_context(|| format!("parsing input script {}", args.inputs.display()))?;

    let mut sim = CharacterSim::new(Arc::new(character), Stage::default(), args.x);
    sim.set_facing(args.facing.into());
    if let Some(name) = &args.start {
        let state = registry::composite(name)
            .with_context(|| format!("unknown composite state '{}'", name))?;
        sim.set_state(state);
    }

    info!(
        "Replaying {} ticks for '{}'",
        inputs.len(),
        sim.character().name
    );

    for input in inputs {
        let report = sim.step(input);
        let line = serde_json::json!({
            "input": input.to_string(),
            "snapshot": sim.snapshot(),
            "events": report.events,
        });
        println!("{}", line);
    }

    info!("Replay finished after {} ticks", sim.tick());
    Ok(())
}
