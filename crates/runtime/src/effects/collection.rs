use std::sync::{Arc, Mutex, MutexGuard};

use battle_core::EffectKind;

use super::Effect;

/// Effects currently registered on one actor.
///
/// Exclusivity is checked here with a linear scan; an actor rarely carries
/// more than a handful of effects.
#[derive(Default)]
pub struct EffectCollection {
    effects: Mutex<Vec<Arc<Effect>>>,
}

impl EffectCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `effect` unless it is already present or an exclusive effect
    /// of the same kind is live.
    pub fn try_insert(&self, effect: &Arc<Effect>) -> bool {
        let mut effects = self.lock();
        let conflict = effects.iter().any(|existing| {
            Arc::ptr_eq(existing, effect)
                || (effect.kind().is_exclusive() && existing.kind() == effect.kind())
        });
        if conflict {
            return false;
        }
        effects.push(Arc::clone(effect));
        true
    }

    pub fn remove(&self, effect: &Effect) -> bool {
        let mut effects = self.lock();
        let before = effects.len();
        effects.retain(|existing| !std::ptr::eq(Arc::as_ptr(existing), effect));
        effects.len() != before
    }

    /// First registered effect of `kind`.
    pub fn find(&self, kind: EffectKind) -> Option<Arc<Effect>> {
        self.lock().iter().find(|e| e.kind() == kind).cloned()
    }

    pub fn contains(&self, kind: EffectKind) -> bool {
        self.lock().iter().any(|e| e.kind() == kind)
    }

    pub fn count(&self, kind: EffectKind) -> usize {
        self.lock().iter().filter(|e| e.kind() == kind).count()
    }

    pub fn snapshot(&self) -> Vec<Arc<Effect>> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Effect>>> {
        self.effects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
