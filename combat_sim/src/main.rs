//! combat_sim - Headless duel simulator for combat_core

mod simulation;

use clap::Parser;
use combat_core::config::{
    default_combat_config, default_npc_definitions, default_spells, load_combat_config,
    load_npc_definitions, load_spells,
};
use combat_core::World;
use simulation::{Duel, SimError};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Run a scripted duel through the tick scheduler")]
struct Args {
    /// Seed for every roll
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Ticks to simulate
    #[arg(short, long, default_value_t = 500)]
    ticks: u64,

    /// Directory holding combat.toml, npcs.toml and spells.toml
    #[arg(short, long)]
    config_dir: Option<PathBuf>,
}

fn load_world(config_dir: Option<&Path>, seed: u64) -> Result<World, SimError> {
    let Some(dir) = config_dir else {
        return Ok(World::new(
            default_combat_config(),
            default_spells(),
            default_npc_definitions(),
            seed,
        ));
    };
    info!(dir = %dir.display(), "loading configuration");
    Ok(World::new(
        load_combat_config(&dir.join("combat.toml"))?,
        load_spells(&dir.join("spells.toml"))?,
        load_npc_definitions(&dir.join("npcs.toml"))?,
        seed,
    ))
}

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let world = load_world(args.config_dir.as_deref(), args.seed)?;
    let mut duel = Duel::standard(world)?;

    info!(seed = args.seed, ticks = args.ticks, "starting duel");
    let report = duel.run(args.ticks);
    print!("{report}");
    Ok(())
}
