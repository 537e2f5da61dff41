//! Combat effect kinds.

use strum::{Display, EnumIter, IntoStaticStr};

/// Closed set of combat effects an actor can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectKind {
    /// Self-detonating area effect with a hard safety expiry.
    Kamikadze,
    /// One deployed mine. Several may coexist per actor.
    Mine,
    /// Always-on damage reduction against hits from behind.
    BackhitDefence,
    /// Electromagnetic pulse that strips effects from targets.
    Emp,
    ArmorBoost,
    DamageBoost,
    SpeedBoost,
}

impl EffectKind {
    /// At most one live instance of an exclusive kind may exist per actor.
    pub const fn is_exclusive(self) -> bool {
        !matches!(self, EffectKind::Mine)
    }

    /// Whether an EMP strike forcibly ends this effect.
    pub const fn is_emp_sensitive(self) -> bool {
        matches!(
            self,
            EffectKind::Kamikadze
                | EffectKind::BackhitDefence
                | EffectKind::ArmorBoost
                | EffectKind::DamageBoost
                | EffectKind::SpeedBoost
        )
    }

    /// Only visible to the owner's own observer.
    pub const fn is_owner_only(self) -> bool {
        matches!(self, EffectKind::Kamikadze)
    }
}
