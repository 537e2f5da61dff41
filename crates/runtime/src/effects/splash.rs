use battle_core::{ActorId, Position, SplashProfile};

use crate::api::ImpactSink;

/// Area damage handler attached to an active detonating effect.
#[derive(Clone, Debug, PartialEq)]
pub struct SplashHandler {
    profile: SplashProfile,
}

impl SplashHandler {
    pub fn new(profile: SplashProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &SplashProfile {
        &self.profile
    }

    pub async fn detonate(&self, source: ActorId, center: Position, sink: &dyn ImpactSink) {
        sink.splash(source, center, &self.profile).await;
    }
}
