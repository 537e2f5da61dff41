//! Actor-bound combat effects.
//!
//! Every effect kind shares one lifecycle implemented by [`Effect`]; the kind
//! specific parts (grace window, lifetime, splash, mine deployment) are chosen
//! by matching on its [`EffectSpec`].

mod collection;
mod effect;
mod link;
mod splash;

pub use collection::EffectCollection;
pub use effect::{Effect, EffectSpec};
pub use splash::SplashHandler;
