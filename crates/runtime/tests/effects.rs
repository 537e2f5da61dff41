mod common;

use std::time::Duration;

use battle_core::{ActorId, EffectKind, Handle, PlacementTable, Position, TimedState};
use battle_runtime::{EffectEvent, Event, Topic};
use common::{Harness, config, settle};

fn harness() -> Harness {
    Harness::new(config(), PlacementTable::new())
}

#[tokio::test(start_paused = true)]
async fn exclusive_effect_activates_once() {
    let h = harness();
    let actor = h.spawn_actor(1, 0, Position::ORIGIN);

    let first = h
        .battle
        .create_effect(ActorId(1), EffectKind::Kamikadze)
        .expect("live actor");
    let second = h
        .battle
        .create_effect(ActorId(1), EffectKind::Kamikadze)
        .expect("live actor");

    assert!(first.activate().await);
    assert!(!first.activate().await);
    assert!(!second.activate().await);

    assert_eq!(actor.effects().count(EffectKind::Kamikadze), 1);
    assert!(first.is_active().await);
    assert!(!second.is_active().await);
    assert_eq!(second.handle().await, None);
}

/// A cancel that races the activation animation still lands once the grace
/// window is over.
#[tokio::test(start_paused = true)]
async fn deactivation_in_grace_window_is_deferred() {
    let h = harness();
    let actor = h.spawn_actor(1, 0, Position::ORIGIN);
    let owner = h.connect(1, Some(1)).await;
    let grace = h.battle.config().kamikadze.grace_window();

    let effect = h
        .battle
        .activate_effect(ActorId(1), EffectKind::Kamikadze)
        .await
        .expect("activated");
    let handle = effect.handle().await.expect("active effect has a handle");
    assert!(effect.state().await.is_cooldown());
    assert!(!effect.can_be_deactivated().await);

    assert!(!effect.deactivate().await);
    assert!(effect.is_deactivation_pending().await);
    assert!(effect.is_active().await);
    assert!(owner.sees(handle));

    tokio::time::sleep(grace + Duration::from_millis(100)).await;

    assert_eq!(effect.state().await, TimedState::Idle);
    assert_eq!(effect.handle().await, None);
    assert!(actor.effects().is_empty());
    assert!(!owner.sees(handle));
}

#[tokio::test(start_paused = true)]
async fn deactivation_after_grace_is_immediate() {
    let h = harness();
    h.spawn_actor(1, 0, Position::ORIGIN);
    let grace = h.battle.config().kamikadze.grace_window();

    let effect = h
        .battle
        .activate_effect(ActorId(1), EffectKind::Kamikadze)
        .await
        .expect("activated");
    tokio::time::sleep(grace + Duration::from_millis(100)).await;

    assert!(effect.can_be_deactivated().await);
    assert!(effect.deactivate().await);
    assert!(!effect.is_active().await);
    assert!(!effect.deactivate().await);
}

#[tokio::test(start_paused = true)]
async fn safety_window_always_expires_kamikadze() {
    let h = harness();
    let actor = h.spawn_actor(1, 0, Position::ORIGIN);
    let safety = h.battle.config().kamikadze.safety_window();

    let effect = h
        .battle
        .activate_effect(ActorId(1), EffectKind::Kamikadze)
        .await
        .expect("activated");

    tokio::time::sleep(safety - Duration::from_millis(100)).await;
    assert!(effect.is_active().await);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!effect.is_active().await);
    assert!(actor.effects().is_empty());
}

#[tokio::test(start_paused = true)]
async fn granted_duration_cannot_outlive_the_safety_window() {
    let h = harness();
    let actor = h.spawn_actor(1, 0, Position::ORIGIN);
    let safety = h.battle.config().kamikadze.safety_window();

    let effect = h
        .battle
        .activate_effect(ActorId(1), EffectKind::Kamikadze)
        .await
        .expect("activated");

    tokio::time::sleep(safety / 2).await;
    assert!(!effect.prolong(Duration::from_secs(3600)).await);

    tokio::time::sleep(safety).await;
    assert_eq!(effect.state().await, TimedState::Idle);
    assert!(actor.effects().is_empty());
}

#[tokio::test(start_paused = true)]
async fn boosts_can_be_prolonged() {
    let h = harness();
    h.spawn_actor(1, 0, Position::ORIGIN);

    let boost = h
        .battle
        .activate_effect(ActorId(1), EffectKind::SpeedBoost)
        .await
        .expect("activated");
    let lifetime = boost.remaining().await.expect("boost expires");

    tokio::time::sleep(lifetime / 2).await;
    assert!(boost.prolong(lifetime).await);

    tokio::time::sleep(lifetime * 3 / 4).await;
    assert!(boost.is_active().await);

    tokio::time::sleep(lifetime / 2).await;
    assert!(!boost.is_active().await);
}

#[tokio::test(start_paused = true)]
async fn emp_override_ignores_the_grace_window() {
    let h = harness();
    h.spawn_actor(1, 0, Position::ORIGIN);

    let effect = h
        .battle
        .activate_effect(ActorId(1), EffectKind::Kamikadze)
        .await
        .expect("activated");
    assert!(effect.state().await.is_cooldown());

    assert!(effect.deactivate_by_emp().await);
    assert_eq!(effect.state().await, TimedState::Idle);

    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(effect.state().await, TimedState::Idle);
    assert!(!effect.deactivate_by_emp().await);
}

#[tokio::test(start_paused = true)]
async fn kamikadze_is_shown_to_its_owner_only() {
    let h = harness();
    h.spawn_actor(1, 0, Position::ORIGIN);
    h.spawn_actor(2, 1, Position::ORIGIN);
    let owner = h.connect(1, Some(1)).await;
    let enemy = h.connect(2, Some(2)).await;

    let effect = h
        .battle
        .activate_effect(ActorId(1), EffectKind::Kamikadze)
        .await
        .expect("activated");
    let handle = effect.handle().await.expect("handle");

    assert!(owner.sees(handle));
    assert!(!enemy.sees(handle));

    let spectator = h.connect(3, None).await;
    let second_screen = h.connect(4, Some(1)).await;
    assert!(!spectator.sees(handle));
    assert!(second_screen.sees(handle));
}

#[tokio::test(start_paused = true)]
async fn kamikadze_detonates_at_the_owner() {
    let h = harness();
    let actor = h.spawn_actor(1, 0, Position::new(4.0, 0.0, 2.0));

    let effect = h
        .battle
        .activate_effect(ActorId(1), EffectKind::Kamikadze)
        .await
        .expect("activated");
    assert!(effect.detonate().await);

    let splashes = h.impacts.splashes();
    assert_eq!(splashes.len(), 1);
    assert_eq!(splashes[0].0, ActorId(1));
    assert_eq!(splashes[0].1, actor.position());
    assert_eq!(splashes[0].2, h.battle.config().kamikadze.splash);
}

#[tokio::test(start_paused = true)]
async fn backhit_defence_module_never_stacks() {
    let h = harness();
    let actor = h.spawn_actor(1, 0, Position::ORIGIN);
    let module = h
        .battle
        .backhit_defence_module(ActorId(1))
        .expect("live actor");
    assert_eq!(module.multiplier(), h.battle.config().backhit_defence.multiplier);

    h.battle.install_module(module.clone()).await;
    for _ in 0..3 {
        h.battle.tick().await;
    }
    assert_eq!(actor.effects().count(EffectKind::BackhitDefence), 1);

    let effect = actor
        .effects()
        .find(EffectKind::BackhitDefence)
        .expect("asserted");
    assert!(effect.deactivate_by_emp().await);
    assert!(actor.effects().is_empty());

    h.battle.tick().await;
    assert_eq!(actor.effects().count(EffectKind::BackhitDefence), 1);

    actor.set_alive(false);
    actor
        .effects()
        .find(EffectKind::BackhitDefence)
        .expect("still registered")
        .deactivate()
        .await;
    h.battle.tick().await;
    assert!(actor.effects().is_empty());
}

#[tokio::test(start_paused = true)]
async fn emp_targets_strip_sensitive_effects() {
    let h = harness();
    h.spawn_actor(1, 0, Position::ORIGIN);
    let target = h.spawn_actor(2, 1, Position::new(5.0, 0.0, 0.0));
    let bystander = h.spawn_actor(3, 1, Position::new(6.0, 0.0, 0.0));

    let emp = h
        .battle
        .activate_effect(ActorId(1), EffectKind::Emp)
        .await
        .expect("emp activated");
    let emp_handle = emp.handle().await.expect("handle");

    h.battle
        .activate_effect(ActorId(2), EffectKind::Kamikadze)
        .await
        .expect("kamikadze");
    h.battle
        .activate_effect(ActorId(2), EffectKind::SpeedBoost)
        .await
        .expect("boost");
    h.battle
        .activate_effect(ActorId(2), EffectKind::Mine)
        .await
        .expect("mine");
    h.battle
        .activate_effect(ActorId(3), EffectKind::DamageBoost)
        .await
        .expect("boost");

    let mut events = h.battle.subscribe(Topic::Effect);
    assert!(
        h.battle
            .apply_emp_targets(ActorId(1), emp_handle, &[ActorId(2), ActorId(99)])
            .await
    );

    assert_eq!(target.effects().len(), 1);
    assert!(target.effects().contains(EffectKind::Mine));
    assert_eq!(bystander.effects().len(), 1);

    settle().await;
    let mut applied = None;
    while let Ok(event) = events.try_recv() {
        if let Event::Effect(EffectEvent::EmpApplied {
            targets, stripped, ..
        }) = event
        {
            applied = Some((targets, stripped));
        }
    }
    assert_eq!(applied, Some((vec![ActorId(2)], 2)));
}

#[tokio::test(start_paused = true)]
async fn stale_emp_targets_are_dropped() {
    let h = harness();
    h.spawn_actor(1, 0, Position::ORIGIN);
    let target = h.spawn_actor(2, 1, Position::ORIGIN);
    h.battle
        .activate_effect(ActorId(2), EffectKind::ArmorBoost)
        .await
        .expect("boost");

    assert!(
        !h.battle
            .apply_emp_targets(ActorId(1), Handle::new(12345), &[ActorId(2)])
            .await
    );

    let emp = h
        .battle
        .activate_effect(ActorId(1), EffectKind::Emp)
        .await
        .expect("emp");
    let emp_handle = emp.handle().await.expect("handle");
    let duration = h.battle.config().emp.duration();
    tokio::time::sleep(duration + Duration::from_millis(100)).await;

    assert!(
        !h.battle
            .apply_emp_targets(ActorId(1), emp_handle, &[ActorId(2)])
            .await
    );
    assert_eq!(target.effects().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn dead_actors_get_no_new_effects() {
    let h = harness();
    let actor = h.spawn_actor(1, 0, Position::ORIGIN);
    actor.set_alive(false);

    assert!(h.battle.create_effect(ActorId(1), EffectKind::Emp).is_none());
    assert!(h.battle.create_effect(ActorId(9), EffectKind::Emp).is_none());
}
