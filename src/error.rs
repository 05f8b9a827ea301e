use thiserror::Error;

use crate::opendota::StatsError;
use crate::roster::RosterError;
use crate::store::StoreError;

/// Process level failures. Anything surfacing here before the watch loop
/// starts aborts the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    #[error("OpenDota error: {0}")]
    Stats(#[from] StatsError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Discord error: {0}")]
    Discord(Box<serenity::Error>),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::Discord(Box::new(err))
    }
}
