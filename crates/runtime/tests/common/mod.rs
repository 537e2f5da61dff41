//! In-memory collaborators shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use battle_core::{
    ActorId, BattleConfig, Handle, ObserverId, PickupKind, Placement, PlacementTable, Position,
    SplashProfile, TeamId,
};
use battle_runtime::{
    Battle, BattleActor, ImpactSink, ObserverConnection, PickupRewards, Representation,
    RepresentationBuilder, Roster,
};

/// Hands out sequential handles and remembers what it built.
#[derive(Default)]
pub struct CountingBuilder {
    next: AtomicU64,
    built: Mutex<Vec<(Handle, Representation)>>,
}

impl CountingBuilder {
    pub fn built(&self) -> Vec<(Handle, Representation)> {
        self.built.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepresentationBuilder for CountingBuilder {
    async fn build(&self, representation: Representation) -> Handle {
        let handle = Handle::new(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        self.built.lock().unwrap().push((handle, representation));
        handle
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Share(Vec<Handle>),
    Unshare(Vec<Handle>),
}

/// Client stand-in that mirrors what it has been told to display.
#[derive(Default)]
pub struct RecordingConnection {
    calls: Mutex<Vec<Call>>,
    shown: Mutex<HashSet<Handle>>,
}

impl RecordingConnection {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sees(&self, handle: Handle) -> bool {
        self.shown.lock().unwrap().contains(&handle)
    }

    pub fn shown(&self) -> HashSet<Handle> {
        self.shown.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObserverConnection for RecordingConnection {
    async fn share(&self, handles: &[Handle]) {
        let mut shown = self.shown.lock().unwrap();
        for handle in handles {
            assert!(shown.insert(*handle), "{handle} shared twice");
        }
        self.calls.lock().unwrap().push(Call::Share(handles.to_vec()));
    }

    async fn unshare(&self, handles: &[Handle]) {
        let mut shown = self.shown.lock().unwrap();
        for handle in handles {
            assert!(shown.remove(handle), "{handle} unshared while hidden");
        }
        self.calls.lock().unwrap().push(Call::Unshare(handles.to_vec()));
    }
}

#[derive(Default)]
pub struct RecordingRewards {
    granted: Mutex<Vec<(PickupKind, ActorId)>>,
}

impl RecordingRewards {
    pub fn granted(&self) -> Vec<(PickupKind, ActorId)> {
        self.granted.lock().unwrap().clone()
    }
}

#[async_trait]
impl PickupRewards for RecordingRewards {
    async fn grant(&self, kind: PickupKind, actor: ActorId) {
        self.granted.lock().unwrap().push((kind, actor));
    }
}

#[derive(Default)]
pub struct RecordingImpacts {
    splashes: Mutex<Vec<(ActorId, Position, SplashProfile)>>,
}

impl RecordingImpacts {
    pub fn splashes(&self) -> Vec<(ActorId, Position, SplashProfile)> {
        self.splashes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImpactSink for RecordingImpacts {
    async fn splash(&self, source: ActorId, center: Position, profile: &SplashProfile) {
        self.splashes
            .lock()
            .unwrap()
            .push((source, center, profile.clone()));
    }
}

pub struct Harness {
    pub battle: Arc<Battle>,
    pub roster: Arc<Roster>,
    pub builder: Arc<CountingBuilder>,
    pub rewards: Arc<RecordingRewards>,
    pub impacts: Arc<RecordingImpacts>,
}

impl Harness {
    pub fn new(config: BattleConfig, placements: PlacementTable) -> Self {
        let roster = Arc::new(Roster::new());
        let builder = Arc::new(CountingBuilder::default());
        let rewards = Arc::new(RecordingRewards::default());
        let impacts = Arc::new(RecordingImpacts::default());

        let battle = Battle::builder()
            .config(config)
            .placements(placements)
            .representation_builder(builder.clone())
            .actors(roster.clone())
            .rewards(rewards.clone())
            .impacts(impacts.clone())
            .build()
            .expect("battle should build");

        Self {
            battle: Arc::new(battle),
            roster,
            builder,
            rewards,
            impacts,
        }
    }

    pub fn spawn_actor(&self, id: u32, team: u8, position: Position) -> Arc<BattleActor> {
        self.roster
            .insert(BattleActor::new(ActorId(id), Some(TeamId(team)), position))
    }

    /// Connects an observer controlling `actor` and returns its client.
    pub async fn connect(&self, id: u64, actor: Option<u32>) -> Arc<RecordingConnection> {
        let connection = Arc::new(RecordingConnection::default());
        self.battle
            .connect(ObserverId(id), actor.map(ActorId), connection.clone())
            .await;
        connection
    }
}

/// Deterministic configuration: fixed seed and no initial spawn delay.
pub fn config() -> BattleConfig {
    let mut config = BattleConfig::default();
    config.seed = Some(7);
    config.pickups.initial_delay_max_ms = 0;
    config
}

pub fn placements(entries: &[(PickupKind, (f32, f32, f32))]) -> PlacementTable {
    let mut table = PlacementTable::new();
    for (kind, position) in entries {
        table.extend(*kind, [Placement::new(Position::from(*position), false)]);
    }
    table
}

/// Lets spawned tasks run without advancing the paused clock.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
