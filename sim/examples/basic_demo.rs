//! Basic demonstration of the Monster Merge Arena simulation.
//!
//! Run with: cargo run --example basic_demo
//! Set RUST_LOG=mma_sim=debug to see strikes, merges and spawns.

use mma_sim::logging::init_tracing;
use mma_sim::{events_to_json, MonsterType, SimConfig, SimEvent, SimWorld};

fn main() {
    init_tracing("mma_sim=info");
    println!("=== Monster Merge Arena - Simulation Demo ===\n");

    let config = SimConfig {
        rng_seed: Some(2024),
        base_spawn_interval: 2.0,
        ..Default::default()
    };
    let mut sim = SimWorld::with_config(config).unwrap();

    // Two extra fire monsters right next to each other: they merge on the first frame.
    sim.request_create_player_monster(200.0, 200.0, MonsterType::Fire, 1).unwrap();
    sim.request_create_player_monster(215.0, 205.0, MonsterType::Fire, 1).unwrap();

    sim.subscribe(|event: &SimEvent| -> anyhow::Result<()> {
        match event {
            SimEvent::MonstersMerged { kind, level, .. } => {
                println!("  * merged into a level {} {}", level, kind.as_str());
            }
            SimEvent::MonsterDied { was_player, .. } => {
                println!("  * a {} monster died", if *was_player { "player" } else { "enemy" });
            }
            _ => {}
        }
        Ok(())
    });

    println!("Initial state:");
    print_snapshot(&mut sim);

    // Run 10 seconds at 60 fps, steering the first player monster around.
    println!("\nRunning simulation for 600 frames (10 seconds at 60 fps)...\n");
    let mut last_events = Vec::new();
    for frame in 1..=600u32 {
        if frame % 120 == 1 {
            if let Some(&lead) = sim.player_entities().first() {
                let angle = frame as f32 * 0.01;
                sim.request_player_move(lead, angle.cos() * 80.0, angle.sin() * 80.0);
            }
        }

        let events = sim.advance_frame(frame as f64 * 1000.0 / 60.0).unwrap();
        if !events.is_empty() {
            last_events = events;
        }

        if frame % 120 == 0 {
            println!("--- Frame {} (t={:.1}s) ---", sim.current_tick(), sim.current_time());
            print_snapshot(&mut sim);
        }
    }

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty().unwrap());
    println!("\nLast events: {}", events_to_json(&last_events).unwrap());
}

fn print_snapshot(sim: &mut SimWorld) {
    let snapshot = sim.snapshot();

    println!("  Players:");
    for monster in snapshot.monsters.iter().filter(|m| m.is_player) {
        println!(
            "    #{}: {} L{} pos=({:.1}, {:.1}) hp={:.0}/{:.0}",
            monster.id, monster.kind.as_str(), monster.level, monster.x, monster.y, monster.health, monster.health_max
        );
    }

    println!("  Enemies:");
    for monster in snapshot.monsters.iter().filter(|m| !m.is_player) {
        println!(
            "    #{}: {} L{} pos=({:.1}, {:.1}) hp={:.0}/{:.0} [{:?}]",
            monster.id,
            monster.kind.as_str(),
            monster.level,
            monster.x,
            monster.y,
            monster.health,
            monster.health_max,
            monster.ai_state.unwrap_or_default()
        );
    }
}
