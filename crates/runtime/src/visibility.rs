//! Per-observer visible sets.
//!
//! Each [`Observer`] remembers which handles its client currently sees and
//! forwards only the difference to its connection. The set lock is held across
//! the connection call, so two share/unshare batches for the same observer are
//! applied in the order they acquired the lock and never interleave.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;
use tracing::debug;

use battle_core::{ActorId, Handle, ObserverId};

use crate::api::ObserverConnection;

/// A connected participant and its visible set.
pub struct Observer {
    id: ObserverId,
    actor: Option<ActorId>,
    connection: Arc<dyn ObserverConnection>,
    visible: Mutex<HashSet<Handle>>,
}

impl Observer {
    /// `actor` is the vehicle this observer controls, if any. Spectators pass `None`.
    pub fn new(
        id: ObserverId,
        actor: Option<ActorId>,
        connection: Arc<dyn ObserverConnection>,
    ) -> Self {
        Self {
            id,
            actor,
            connection,
            visible: Mutex::new(HashSet::new()),
        }
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    pub fn actor(&self) -> Option<ActorId> {
        self.actor
    }

    /// Exposes every handle not yet visible. Returns how many were sent.
    pub async fn share(&self, handles: &[Handle]) -> usize {
        let mut visible = self.visible.lock().await;
        let fresh = distinct(handles, |h| !visible.contains(h));
        if fresh.is_empty() {
            return 0;
        }

        self.connection.share(&fresh).await;
        visible.extend(fresh.iter().copied());
        debug!(target: "battle::visibility", observer = %self.id, count = fresh.len(), "shared");
        fresh.len()
    }

    /// Revokes every handle currently visible. Returns how many were sent.
    pub async fn unshare(&self, handles: &[Handle]) -> usize {
        let mut visible = self.visible.lock().await;
        let shared = distinct(handles, |h| visible.contains(h));
        if shared.is_empty() {
            return 0;
        }

        self.connection.unshare(&shared).await;
        for handle in &shared {
            visible.remove(handle);
        }
        debug!(target: "battle::visibility", observer = %self.id, count = shared.len(), "unshared");
        shared.len()
    }

    pub async fn is_visible(&self, handle: Handle) -> bool {
        self.visible.lock().await.contains(&handle)
    }

    /// Snapshot of the visible set, sorted.
    pub async fn visible(&self) -> Vec<Handle> {
        let mut handles: Vec<_> = self.visible.lock().await.iter().copied().collect();
        handles.sort();
        handles
    }
}

fn distinct(handles: &[Handle], mut keep: impl FnMut(&Handle) -> bool) -> Vec<Handle> {
    let mut seen = HashSet::with_capacity(handles.len());
    handles
        .iter()
        .copied()
        .filter(|h| keep(h) && seen.insert(*h))
        .collect()
}

/// Observers currently connected to a battle.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: RwLock<HashMap<ObserverId, Arc<Observer>>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer`, returning the entry it replaced.
    pub fn insert(&self, observer: Arc<Observer>) -> Option<Arc<Observer>> {
        self.write().insert(observer.id(), observer)
    }

    pub fn remove(&self, id: ObserverId) -> Option<Arc<Observer>> {
        self.write().remove(&id)
    }

    pub fn get(&self, id: ObserverId) -> Option<Arc<Observer>> {
        self.read().get(&id).cloned()
    }

    /// Snapshot of all observers, ordered by id.
    pub fn all(&self) -> Vec<Arc<Observer>> {
        let mut observers: Vec<_> = self.read().values().cloned().collect();
        observers.sort_by_key(|o| o.id());
        observers
    }

    /// Observers controlling `actor`.
    pub fn controlling(&self, actor: ActorId) -> Vec<Arc<Observer>> {
        self.all()
            .into_iter()
            .filter(|o| o.actor() == Some(actor))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Shares `handles` with every observer, one observer at a time.
    pub async fn share_all(&self, handles: &[Handle]) {
        for observer in self.all() {
            observer.share(handles).await;
        }
    }

    pub async fn unshare_all(&self, handles: &[Handle]) {
        for observer in self.all() {
            observer.unshare(handles).await;
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<ObserverId, Arc<Observer>>> {
        self.observers.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<ObserverId, Arc<Observer>>> {
        self.observers.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
