//! Deployed mines of one battle.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use battle_core::{ActorId, Mine, MineKey};

use crate::actors::BattleActor;

/// Mines currently on the field, keyed by owner and index.
#[derive(Default)]
pub struct Minefield {
    mines: RwLock<BTreeMap<MineKey, Arc<Mine>>>,
}

impl Minefield {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if a mine with the same key is already registered.
    pub fn insert(&self, mine: Arc<Mine>) -> bool {
        let mut mines = self.mines.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let key = mine.key();
        if mines.contains_key(&key) {
            return false;
        }
        mines.insert(key, mine);
        true
    }

    pub fn remove(&self, key: MineKey) -> Option<Arc<Mine>> {
        self.mines
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&key)
    }

    pub fn get(&self, key: MineKey) -> Option<Arc<Mine>> {
        self.mines
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.mines
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tests every untriggered mine against `actors`.
    ///
    /// Each mine fires for at most one actor. Returns the mines that fired in
    /// this pass together with the actor that set them off.
    pub fn evaluate(&self, actors: &[Arc<BattleActor>]) -> Vec<(MineKey, ActorId)> {
        let snapshot: Vec<_> = self
            .mines
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|mine| !mine.is_triggered())
            .cloned()
            .collect();

        let mut fired = Vec::new();
        for mine in snapshot {
            if let Some(actor) = actors
                .iter()
                .find(|actor| mine.try_trigger(&actor.tag(), actor.position()))
            {
                fired.push((mine.key(), actor.id()));
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{ActorTag, MineBinding, Position, TeamId};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Fixed {
        owner: ActorTag,
        index: u32,
        explosions: AtomicU32,
    }

    impl MineBinding for Fixed {
        fn owner(&self) -> ActorTag {
            self.owner
        }

        fn position(&self) -> Position {
            Position::ORIGIN
        }

        fn triggering_area(&self) -> f32 {
            3.0
        }

        fn index(&self) -> u32 {
            self.index
        }

        fn explode(&self) {
            self.explosions.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn mine(owner: u32, index: u32) -> (Arc<Fixed>, Arc<Mine>) {
        let binding = Arc::new(Fixed {
            owner: ActorTag::new(ActorId(owner), Some(TeamId(0))),
            index,
            explosions: AtomicU32::new(0),
        });
        (binding.clone(), Arc::new(Mine::new(binding)))
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let field = Minefield::new();
        assert!(field.insert(mine(1, 0).1));
        assert!(!field.insert(mine(1, 0).1));
        assert!(field.insert(mine(1, 1).1));
        assert_eq!(field.len(), 2);
    }

    #[test]
    fn each_mine_fires_once_for_the_first_enemy_in_range() {
        let field = Minefield::new();
        let (binding, armed) = mine(1, 0);
        field.insert(armed);

        let ally = Arc::new(BattleActor::new(ActorId(2), Some(TeamId(0)), Position::ORIGIN));
        let far = Arc::new(BattleActor::new(
            ActorId(3),
            Some(TeamId(1)),
            Position::new(10.0, 0.0, 0.0),
        ));
        let near = Arc::new(BattleActor::new(
            ActorId(4),
            Some(TeamId(1)),
            Position::new(1.0, 0.0, 1.0),
        ));
        let other = Arc::new(BattleActor::new(ActorId(5), Some(TeamId(1)), Position::ORIGIN));
        let actors = vec![ally, far, near, other];

        let fired = field.evaluate(&actors);
        assert_eq!(
            fired,
            vec![(MineKey { owner: ActorId(1), index: 0 }, ActorId(4))]
        );
        assert!(field.evaluate(&actors).is_empty());
        assert_eq!(binding.explosions.load(Ordering::SeqCst), 1);
    }
}
