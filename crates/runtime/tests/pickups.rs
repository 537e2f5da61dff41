mod common;

use std::sync::Arc;
use std::time::Duration;

use battle_core::{ActorId, EffectKind, Handle, PickupKind, Position, TimedState};
use battle_runtime::{Battle, CappedIntervalPolicy, Event, PickupEvent, Topic};
use common::{Harness, config, placements, settle};

/// One repair box with no initial delay: present after the first tick,
/// cooling down after it is taken, present again once the cooldown ends.
#[tokio::test(start_paused = true)]
async fn repair_pickup_spawns_is_taken_and_respawns() {
    let h = Harness::new(config(), placements(&[(PickupKind::Repair, (5.0, 0.0, 5.0))]));
    h.spawn_actor(1, 0, Position::ORIGIN);
    let client = h.connect(1, Some(1)).await;

    h.battle.start().await;
    h.battle.tick().await;

    let pickup = Arc::clone(&h.battle.pickups().pickups()[0]);
    assert_eq!(pickup.state().await, TimedState::Active);
    let region = pickup.region().await.expect("supply region is exposed");
    let entity = pickup.entity().await.expect("present pickup has an entity");
    assert!(client.sees(region));
    assert!(client.sees(entity));

    assert!(h.battle.take(entity, ActorId(1)).await);
    match pickup.state().await {
        TimedState::Cooldown(remaining) => assert!(remaining > Duration::ZERO),
        other => panic!("expected cooldown after take, got {other:?}"),
    }
    assert_eq!(pickup.entity().await, None);
    assert!(!client.sees(entity));
    assert!(client.sees(region));
    assert_eq!(h.rewards.granted(), vec![(PickupKind::Repair, ActorId(1))]);

    let respawn = Duration::from_millis(h.battle.config().pickups.respawn_cooldown_ms);
    tokio::time::sleep(respawn + Duration::from_secs(1)).await;

    assert_eq!(pickup.state().await, TimedState::Active);
    let respawned = pickup.entity().await.expect("respawned pickup has an entity");
    assert_ne!(respawned, entity);
    assert!(client.sees(respawned));
}

#[tokio::test(start_paused = true)]
async fn taking_an_absent_pickup_is_ignored() {
    let h = Harness::new(config(), placements(&[(PickupKind::Repair, (0.0, 0.0, 0.0))]));
    h.spawn_actor(1, 0, Position::ORIGIN);

    let pickup = Arc::clone(&h.battle.pickups().pickups()[0]);
    assert!(!h.battle.pickups().take(&pickup, ActorId(1)).await);
    assert!(!h.battle.take(Handle::new(999), ActorId(1)).await);

    assert_eq!(pickup.state().await, TimedState::Idle);
    assert!(h.rewards.granted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn dead_or_unknown_actors_cannot_take() {
    let h = Harness::new(config(), placements(&[(PickupKind::Repair, (0.0, 0.0, 0.0))]));
    let actor = h.spawn_actor(1, 0, Position::ORIGIN);
    assert!(h.battle.force_drop(PickupKind::Repair, ActorId(1)).await);

    let pickup = Arc::clone(&h.battle.pickups().pickups()[0]);
    assert!(!h.battle.pickups().take(&pickup, ActorId(42)).await);

    actor.set_alive(false);
    assert!(!h.battle.pickups().take(&pickup, ActorId(1)).await);
    assert!(pickup.is_present().await);
}

#[tokio::test(start_paused = true)]
async fn initial_delay_stays_below_the_configured_bound() {
    let mut config = config();
    config.pickups.initial_delay_max_ms = 60_000;
    let h = Harness::new(
        config,
        placements(&[
            (PickupKind::Repair, (0.0, 0.0, 0.0)),
            (PickupKind::Armor, (1.0, 0.0, 0.0)),
            (PickupKind::Speed, (2.0, 0.0, 0.0)),
            (PickupKind::Gold, (3.0, 0.0, 0.0)),
        ]),
    );

    h.battle.start().await;
    for pickup in h.battle.pickups().pickups() {
        let state = pickup.state().await;
        if pickup.kind() == PickupKind::Gold {
            assert_eq!(state, TimedState::Idle);
            assert_eq!(pickup.region().await, None);
        } else {
            assert!(state.is_cooldown(), "{:?} is {state:?}", pickup.kind());
            assert!(pickup.region().await.is_some());
        }
    }

    tokio::time::sleep(Duration::from_secs(60)).await;
    h.battle.tick().await;
    for pickup in h.battle.pickups().pickups() {
        assert_eq!(pickup.is_present().await, pickup.kind().is_supply());
    }
}

#[tokio::test(start_paused = true)]
async fn force_drop_needs_an_eligible_pickup() {
    let h = Harness::new(config(), placements(&[(PickupKind::Repair, (0.0, 0.0, 0.0))]));

    assert!(!h.battle.force_drop(PickupKind::Armor, ActorId(1)).await);

    assert!(h.battle.force_drop(PickupKind::Repair, ActorId(1)).await);
    let pickup = &h.battle.pickups().pickups()[0];
    assert!(pickup.is_present().await);

    let built = h.builder.built().len();
    assert!(!h.battle.force_drop(PickupKind::Repair, ActorId(1)).await);
    assert_eq!(h.builder.built().len(), built);
    assert_eq!(h.battle.pickups().golds_dropped(), 0);
}

#[tokio::test(start_paused = true)]
async fn force_drop_spawns_exactly_one_candidate() {
    let h = Harness::new(
        config(),
        placements(&[
            (PickupKind::Damage, (0.0, 0.0, 0.0)),
            (PickupKind::Damage, (10.0, 0.0, 0.0)),
            (PickupKind::Damage, (20.0, 0.0, 0.0)),
        ]),
    );

    for expected in 1..=3 {
        assert!(h.battle.force_drop(PickupKind::Damage, ActorId(1)).await);
        let mut present = 0;
        for pickup in h.battle.pickups().pickups() {
            if pickup.is_present().await {
                present += 1;
            }
        }
        assert_eq!(present, expected);
    }
    assert!(!h.battle.force_drop(PickupKind::Damage, ActorId(1)).await);
}

#[tokio::test(start_paused = true)]
async fn gold_counter_counts_successful_drops_only() {
    let h = Harness::new(
        config(),
        placements(&[
            (PickupKind::Gold, (0.0, 0.0, 0.0)),
            (PickupKind::Gold, (10.0, 0.0, 0.0)),
        ]),
    );
    let pickups = h.battle.pickups();

    assert!(h.battle.force_drop(PickupKind::Gold, ActorId(1)).await);
    assert_eq!(pickups.golds_dropped(), 1);
    assert!(h.battle.force_drop(PickupKind::Gold, ActorId(1)).await);
    assert_eq!(pickups.golds_dropped(), 2);
    assert!(!h.battle.force_drop(PickupKind::Gold, ActorId(1)).await);
    assert_eq!(pickups.golds_dropped(), 2);
}

#[tokio::test(start_paused = true)]
async fn gold_policy_blocks_without_counting() {
    let roster = Arc::new(battle_runtime::Roster::new());
    let builder = Arc::new(common::CountingBuilder::default());
    let battle = Battle::builder()
        .config(config())
        .placements(placements(&[
            (PickupKind::Gold, (0.0, 0.0, 0.0)),
            (PickupKind::Gold, (10.0, 0.0, 0.0)),
        ]))
        .representation_builder(builder)
        .actors(roster)
        .rewards(Arc::new(common::RecordingRewards::default()))
        .impacts(Arc::new(common::RecordingImpacts::default()))
        .gold_policy(Arc::new(CappedIntervalPolicy::new(
            None,
            Duration::from_secs(30),
        )))
        .build()
        .expect("battle should build");

    assert!(battle.force_drop(PickupKind::Gold, ActorId(1)).await);
    assert!(!battle.force_drop(PickupKind::Gold, ActorId(1)).await);
    assert_eq!(battle.pickups().golds_dropped(), 1);

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(battle.force_drop(PickupKind::Gold, ActorId(1)).await);
    assert_eq!(battle.pickups().golds_dropped(), 2);
}

/// Gold reveals its zone only while present and never respawns by itself.
#[tokio::test(start_paused = true)]
async fn taken_gold_disappears_until_the_next_drop() {
    let h = Harness::new(config(), placements(&[(PickupKind::Gold, (3.0, 0.0, 3.0))]));
    h.spawn_actor(1, 0, Position::ORIGIN);
    let client = h.connect(1, Some(1)).await;

    assert!(h.battle.force_drop(PickupKind::Gold, ActorId(1)).await);
    let pickup = Arc::clone(&h.battle.pickups().pickups()[0]);
    let region = pickup.region().await.expect("gold zone revealed with the drop");
    let entity = pickup.entity().await.expect("gold box present");
    assert!(client.sees(region) && client.sees(entity));

    assert!(h.battle.take(entity, ActorId(1)).await);
    assert_eq!(pickup.state().await, TimedState::Idle);
    assert!(client.shown().is_empty());

    let late = h.connect(2, None).await;
    assert!(late.shown().is_empty());

    tokio::time::sleep(Duration::from_secs(120)).await;
    h.battle.tick().await;
    assert_eq!(pickup.state().await, TimedState::Idle);

    assert!(h.battle.force_drop(PickupKind::Gold, ActorId(1)).await);
    assert!(client.sees(region));
    assert!(late.sees(region));
}

#[tokio::test(start_paused = true)]
async fn boost_pickups_grant_one_prolonged_effect() {
    let h = Harness::new(
        config(),
        placements(&[
            (PickupKind::Armor, (0.0, 0.0, 0.0)),
            (PickupKind::Armor, (10.0, 0.0, 0.0)),
        ]),
    );
    let actor = h.spawn_actor(1, 0, Position::ORIGIN);
    let boost = Duration::from_millis(h.battle.config().pickups.boost_duration_ms);

    h.battle.start().await;
    h.battle.tick().await;

    let pickups = h.battle.pickups().pickups();
    let first = pickups[0].entity().await.expect("first armor present");
    assert!(h.battle.take(first, ActorId(1)).await);
    let effect = actor
        .effects()
        .find(EffectKind::ArmorBoost)
        .expect("armor boost applied");

    tokio::time::sleep(boost / 2).await;
    let second = pickups[1].entity().await.expect("second armor present");
    assert!(h.battle.take(second, ActorId(1)).await);
    assert_eq!(actor.effects().count(EffectKind::ArmorBoost), 1);

    tokio::time::sleep(boost / 2 + Duration::from_secs(1)).await;
    assert!(effect.is_active().await, "prolonged boost outlives the first window");

    tokio::time::sleep(boost).await;
    assert!(!effect.is_active().await);
    assert!(actor.effects().is_empty());
}

#[tokio::test(start_paused = true)]
async fn find_by_handle_only_matches_present_boxes() {
    let h = Harness::new(config(), placements(&[(PickupKind::Speed, (0.0, 0.0, 0.0))]));
    assert!(h.battle.force_drop(PickupKind::Speed, ActorId(1)).await);

    let pickup = &h.battle.pickups().pickups()[0];
    let entity = pickup.entity().await.expect("present");
    let region = pickup.region().await.expect("region");

    let found = h.battle.pickups().find_by_handle(entity).await.expect("found");
    assert_eq!(found.index(), pickup.index());
    assert!(h.battle.pickups().find_by_handle(region).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn arena_order_is_reproducible_for_a_seed() {
    let table = placements(&[
        (PickupKind::Repair, (0.0, 0.0, 0.0)),
        (PickupKind::Armor, (1.0, 0.0, 0.0)),
        (PickupKind::Damage, (2.0, 0.0, 0.0)),
        (PickupKind::Speed, (3.0, 0.0, 0.0)),
        (PickupKind::Gold, (4.0, 0.0, 0.0)),
        (PickupKind::Repair, (5.0, 0.0, 0.0)),
    ]);
    let first = Harness::new(config(), table.clone());
    let second = Harness::new(config(), table);

    let order = |h: &Harness| {
        h.battle
            .pickups()
            .pickups()
            .iter()
            .map(|p| (p.kind(), p.position().x as i32))
            .collect::<Vec<_>>()
    };
    assert_eq!(order(&first), order(&second));

    for (index, pickup) in first.battle.pickups().pickups().iter().enumerate() {
        assert_eq!(pickup.index(), index);
    }
}

#[tokio::test(start_paused = true)]
async fn spawns_are_published() {
    let h = Harness::new(config(), placements(&[(PickupKind::Repair, (0.0, 0.0, 0.0))]));
    let mut events = h.battle.subscribe(Topic::Pickup);

    assert!(h.battle.force_drop(PickupKind::Repair, ActorId(3)).await);
    settle().await;

    let event = events.try_recv().expect("spawn event");
    assert!(matches!(
        event,
        Event::Pickup(PickupEvent::Spawned {
            kind: PickupKind::Repair,
            forced: true,
            ..
        })
    ));
}
