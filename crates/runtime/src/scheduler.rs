//! Deferred execution on the battle's tokio runtime.
//!
//! Every timed transition in the engine goes through [`Scheduler::schedule`].
//! Scheduled tasks are fire-and-forget: there is no cancellation handle.
//! Callers invalidate stale work with generation stamps instead.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle as RuntimeHandle;

use crate::api::{BattleError, Result};

/// Cloneable handle that spawns battle tasks on a captured tokio runtime.
#[derive(Clone, Debug)]
pub struct Scheduler {
    runtime: RuntimeHandle,
}

impl Scheduler {
    /// Captures the runtime the caller is currently executing on.
    pub fn current() -> Result<Self> {
        RuntimeHandle::try_current()
            .map(Self::from_handle)
            .map_err(BattleError::NoRuntime)
    }

    pub fn from_handle(runtime: RuntimeHandle) -> Self {
        Self { runtime }
    }

    /// Runs `task` in the background without waiting for it.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.runtime.spawn(task);
    }

    /// Runs `task` once after `delay` has elapsed.
    pub fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
    }
}
