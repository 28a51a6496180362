//! Headless runner: loads a scenario file, steps it, and reports the outcome.

mod telemetry;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use skirmish_core::{Event, Scenario, ScenarioHandles, Simulation};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "skirmish-run")]
#[command(about = "Run a skirmish scenario headlessly and report the outcome")]
struct Cli {
    /// Scenario JSON file
    scenario: PathBuf,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Print every event to stdout as JSON
    #[arg(long)]
    events: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level, cli.json_logs)?;

    let scenario = Scenario::load(&cli.scenario)
        .with_context(|| format!("loading {}", cli.scenario.display()))?;
    let (mut sim, handles) = scenario.build().context("building scenario")?;
    info!(
        path = %cli.scenario.display(),
        seed = sim.seed(),
        ticks = cli.ticks,
        "running scenario"
    );

    let mut kills = 0usize;
    for _ in 0..cli.ticks {
        let tick = sim.tick();
        scenario.step_scripted(&mut sim, &handles);
        for event in sim.events() {
            debug!(tick, ?event, "event");
            if matches!(event, Event::EnemyKilled { .. }) {
                kills += 1;
            }
            if cli.events {
                let line = serde_json::json!({ "tick": tick, "event": event });
                println!("{line}");
            }
        }
    }

    info!(tick = sim.tick(), time = sim.time(), kills, "scenario finished");
    report(&sim, &handles);
    Ok(())
}

/// Prints one summary line per enemy and one for the player.
fn report(sim: &Simulation, handles: &ScenarioHandles) {
    let arena = sim.arena();
    for id in &handles.enemies {
        match arena.get(*id).and_then(|e| e.as_enemy()) {
            Some(enemy) => println!(
                "enemy {id}: state={} health={} alive={}",
                enemy.brain.state, enemy.vitals.health, enemy.vitals.alive
            ),
            None => warn!(enemy = %id, "enemy missing at end of run"),
        }
    }

    if let Some(player) = handles.player {
        let weapon = arena
            .get(player)
            .and_then(|e| e.as_player())
            .and_then(|p| p.weapon.as_ref());
        match weapon {
            Some(weapon) => println!(
                "player {player}: weapon={} ammo={}/{}",
                weapon.spec().name,
                weapon.ammo(),
                weapon.spec().capacity
            ),
            None => println!("player {player}: unarmed"),
        }
    }
}
