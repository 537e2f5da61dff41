//! Generic three-state machine shared by pickups and combat effects.
//!
//! The machine does not own a lock. It lives inside its owner's state slot and
//! is mutated only while that slot is locked, which serializes `set_state`.
//! Entering `Cooldown` schedules a wake-up on the owner carrying the
//! generation at scheduling time. Every `set_state` bumps the generation, so a
//! wake-up from a superseded state sees a stale stamp and does nothing.

use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use battle_core::TimedState;

use crate::scheduler::Scheduler;

/// Monotonic stamp identifying one `set_state` call on one machine.
pub type Generation = u64;

/// Stand-in deadline for durations that overflow the clock, roughly 30 years.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + after`, saturating to a far-future deadline instead of panicking.
pub(crate) fn deadline_after(after: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(after).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Owner of a [`TimedStateMachine`], notified when a cooldown runs out.
#[async_trait]
pub trait CooldownTarget: Send + Sync + 'static {
    /// Called once per scheduled cooldown. Implementations must lock their
    /// state, check [`TimedStateMachine::is_current`] and only then apply the
    /// transition.
    async fn cooldown_elapsed(self: Arc<Self>, generation: Generation);
}

#[derive(Clone, Copy, Debug)]
enum Phase {
    Idle,
    Cooldown { deadline: Instant },
    Active,
}

pub struct TimedStateMachine<T: CooldownTarget> {
    phase: Phase,
    generation: Generation,
    scheduler: Scheduler,
    target: Weak<T>,
}

impl<T: CooldownTarget> TimedStateMachine<T> {
    pub fn new(scheduler: Scheduler, target: Weak<T>) -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
            scheduler,
            target,
        }
    }

    /// Current state. `Cooldown` carries the time left until the deadline.
    pub fn state(&self) -> TimedState {
        match self.phase {
            Phase::Idle => TimedState::Idle,
            Phase::Cooldown { deadline } => {
                TimedState::Cooldown(deadline.saturating_duration_since(Instant::now()))
            }
            Phase::Active => TimedState::Active,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    /// Whether a cooldown has reached its deadline but has not been promoted yet.
    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.phase, Phase::Cooldown { deadline } if deadline <= now)
    }

    /// Replaces the state and invalidates any pending wake-up.
    ///
    /// Returns the generation of the new state.
    pub fn set_state(&mut self, next: TimedState) -> Generation {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;

        self.phase = match next {
            TimedState::Idle => Phase::Idle,
            TimedState::Active => Phase::Active,
            TimedState::Cooldown(duration) => {
                self.schedule_wake(duration, generation);
                Phase::Cooldown {
                    deadline: deadline_after(duration),
                }
            }
        };

        generation
    }

    fn schedule_wake(&self, duration: Duration, generation: Generation) {
        let target = self.target.clone();
        self.scheduler.schedule(duration, async move {
            if let Some(target) = target.upgrade() {
                target.cooldown_elapsed(generation).await;
            }
        });
    }
}
