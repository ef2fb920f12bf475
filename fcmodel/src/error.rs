use std::io;
use thiserror::Error;

/// Failures loading a [`World`](crate::World) registry.
#[derive(Error, Debug)]
pub enum WorldError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid world file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons a [`TradeRoute`](crate::TradeRoute) is not usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Trade route has no name")]
    MissingName,
    #[error("Trade route '{name}' needs at least 2 stops, has {count}")]
    TooFewStops { name: String, count: usize },
    #[error("Stop {index} of trade route '{name}' has no location")]
    StopWithoutLocation { name: String, index: usize },
}
