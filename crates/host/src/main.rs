//! Headless battle host.
//!
//! Loads a battle configuration and map, assembles a [`Battle`] with logging
//! collaborators and drives it on its own tick loop for a fixed duration while
//! a short scripted skirmish plays out.
//!
//! # Environment
//!
//! - `BATTLE_DATA_DIR`: content directory (default `data`)
//! - `BATTLE_MAP`: map name under `maps/` (default `rio`)
//! - `BATTLE_DURATION_SECS`: how long to run (default 10)
//! - `BATTLE_SEED`: overrides the configured seed
//! - `RUST_LOG`: log filter (default `info`)
//!
//! ```bash
//! RUST_LOG=debug cargo run -p battle-host
//! ```

mod config;
mod sinks;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use battle_content::ContentFactory;
use battle_core::{ActorId, EffectKind, ObserverId, PickupKind, Position, TeamId};
use battle_runtime::{Battle, BattleActor, Event, Roster, Topic};

use config::HostConfig;
use sinks::{LoggingBuilder, LoggingConnection, LoggingImpacts, LoggingRewards};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    setup_logging();

    let host = HostConfig::from_env();
    let factory = ContentFactory::new(&host.data_dir);
    let mut battle_config = factory
        .load_config()
        .with_context(|| format!("loading config from {}", host.data_dir.display()))?;
    if host.seed.is_some() {
        battle_config.seed = host.seed;
    }
    let placements = factory
        .load_placements(&host.map)
        .with_context(|| format!("loading map {}", host.map))?;

    tracing::info!(map = %host.map, seed = ?battle_config.seed, "starting battle");

    let roster = Arc::new(Roster::new());
    let red = roster.insert(BattleActor::new(ActorId(1), Some(TeamId(0)), Position::ORIGIN));
    let blue = roster.insert(BattleActor::new(
        ActorId(2),
        Some(TeamId(1)),
        Position::new(40.0, 0.0, 0.0),
    ));

    let battle = Arc::new(
        Battle::builder()
            .config(battle_config)
            .placements(placements)
            .representation_builder(Arc::new(LoggingBuilder::default()))
            .actors(roster.clone())
            .rewards(Arc::new(LoggingRewards))
            .impacts(Arc::new(LoggingImpacts))
            .build()?,
    );

    let reporters: Vec<_> = battle
        .events()
        .subscribe_multiple(&[Topic::Pickup, Topic::Effect, Topic::Mine])
        .into_iter()
        .map(|(topic, events)| tokio::spawn(report_events(topic, events)))
        .collect();

    for (observer, actor) in [(1, red.id()), (2, blue.id())] {
        let id = ObserverId(observer);
        battle
            .connect(id, Some(actor), Arc::new(LoggingConnection::new(id)))
            .await;
    }

    battle.start().await;
    if let Some(module) = battle.backhit_defence_module(blue.id()) {
        battle.install_module(module).await;
    }
    let main_loop = Arc::clone(&battle).spawn();

    skirmish(&battle, &red, &blue).await;
    tokio::time::sleep(host.duration).await;

    main_loop.shutdown().await?;
    for reporter in reporters {
        reporter.abort();
    }

    tracing::info!(
        golds_dropped = battle.pickups().golds_dropped(),
        mines_left = battle.minefield().len(),
        "battle finished"
    );
    Ok(())
}

/// A few scripted moves that touch every kind of transient object.
async fn skirmish(battle: &Battle, red: &BattleActor, blue: &BattleActor) {
    battle.force_drop(PickupKind::Gold, red.id()).await;

    if battle
        .activate_effect(red.id(), EffectKind::Mine)
        .await
        .is_some()
    {
        blue.set_position(Position::new(1.0, 0.0, 1.0));
    }

    battle.activate_effect(blue.id(), EffectKind::Kamikadze).await;
    if let Some(emp) = battle.activate_effect(red.id(), EffectKind::Emp).await
        && let Some(handle) = emp.handle().await
    {
        battle.apply_emp_targets(red.id(), handle, &[blue.id()]).await;
    }
}

/// Logs every event of `topic` until the bus closes.
async fn report_events(topic: Topic, mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(Event::Pickup(event)) => tracing::info!(target: "host::events", ?event, "pickup"),
            Ok(Event::Effect(event)) => tracing::info!(target: "host::events", ?event, "effect"),
            Ok(Event::Mine(event)) => tracing::info!(target: "host::events", ?event, "mine"),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(target: "host::events", ?topic, skipped, "event reporter lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn setup_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
