//! Unified error types surfaced by the battle API.
//!
//! Only battle assembly can fail. Once a battle is running, stale or invalid
//! requests are absorbed by the engine and reported as `false` or ignored.
use thiserror::Error;

use battle_core::SetupError;

pub type Result<T> = std::result::Result<T, BattleError>;

#[derive(Debug, Error)]
pub enum BattleError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("battle requires {0} to be configured before building")]
    MissingCollaborator(&'static str),

    #[error("battle must be built from within a tokio runtime")]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),

    #[error("battle loop join failed")]
    LoopJoin(#[source] tokio::task::JoinError),
}
