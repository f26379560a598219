//! Tactical Strike headless runner
//!
//! Plays a run with the autopilot and reports the final HUD.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tactical_strike::sim::{
    GamePhase, TickInput, WeaponId, choose_weapon, is_run_over, start_run, tick,
};
use tactical_strike::{Difficulty, RunConfig};

#[derive(Parser, Debug)]
#[command(name = "tactical-strike")]
#[command(about = "Run the combat simulation headless with the autopilot")]
struct Cli {
    /// JSON run configuration (missing fields take defaults)
    #[arg(long)]
    config: Option<PathBuf>,
    /// RNG seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,
    /// Difficulty preset: easy, normal or hard
    #[arg(long)]
    difficulty: Option<String>,
    /// Starting weapon
    #[arg(long)]
    weapon: Option<String>,
    /// Maximum frames to simulate
    #[arg(long, default_value_t = 18_000)]
    frames: u32,
    /// Print the final HUD as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn load_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            RunConfig::from_json(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => RunConfig::default(),
    };

    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(name) = &cli.difficulty {
        config.difficulty =
            Difficulty::from_name(name).ok_or_else(|| anyhow!("unknown difficulty '{name}'"))?;
    }
    if let Some(name) = &cli.weapon {
        config.starting_weapon =
            WeaponId::from_name(name).ok_or_else(|| anyhow!("unknown weapon '{name}'"))?;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let mut state = start_run(config);
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    let mut picks = WeaponId::ALL.iter().copied().cycle();

    for _ in 0..cli.frames {
        tick(&mut state, &input);
        if state.phase == GamePhase::Armory {
            let weapon = picks.next().unwrap_or(WeaponId::Assault);
            choose_weapon(&mut state, weapon);
        }
        if is_run_over(&state) {
            break;
        }
    }

    let hud = state.hud();
    if cli.json {
        let text = serde_json::to_string_pretty(&hud).context("failed to serialize HUD")?;
        println!("{text}");
    } else {
        println!(
            "{:?} after {} ticks: level {}, {} kills, {} currency, {:.0}/{:.0} health, {} {}/{}+{}",
            hud.phase,
            state.time_ticks,
            hud.level,
            hud.kills,
            hud.currency,
            hud.health,
            hud.max_health,
            hud.weapon.as_str(),
            hud.ammo,
            hud.max_ammo,
            hud.reserve_ammo
        );
    }
    Ok(())
}
