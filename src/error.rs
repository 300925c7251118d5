//! Error types for the engine

use thiserror::Error;

use crate::engine::assets::AssetKind;

/// Asset lookup and loader misuse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Asset still loading: {0}")]
    NotReady(String),

    #[error("Asset {key} is not a {expected:?}")]
    WrongKind { key: String, expected: AssetKind },

    #[error("Asset queued twice: {0}")]
    DuplicateKey(String),

    #[error("Cannot queue {0}: loading already started")]
    LoadAlreadyStarted(String),

    #[error("Asset loading already started")]
    AlreadyLoading,
}

/// World lifecycle errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("World has not been initialized with a surface")]
    NotInitialized,

    #[error("World is already initialized")]
    AlreadyInitialized,

    #[error("Frame loop is already running")]
    AlreadyRunning,

    #[error("World is not running")]
    NotRunning,
}
