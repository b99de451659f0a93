use thiserror::Error;

use crate::model::election::{Action, OngoingAction, Status};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed configuration: {0}")]
    MalformedConfiguration(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Network(#[from] reqwest::Error),
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },
    #[error("No proxy is known for {0}")]
    MissingProxy(String),
    #[error("Action {action} is not allowed while the election is {status}")]
    IllegalAction { action: Action, status: Status },
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Another action is already in progress: {0:?}")]
    ActionInFlight(OngoingAction),
    #[error("No such answer: {0}")]
    UnknownAnswer(String),
    #[error("Ballot is not valid and cannot be submitted")]
    InvalidBallot,
    #[error("Encoded ballot is {size} bytes but at most {max} are allowed")]
    BallotTooLarge { size: usize, max: usize },
    #[error(transparent)]
    Config(#[from] figment::Error),
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedConfiguration(reason.into())
    }

    /// Does this error come from the network boundary rather than a local check?
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Backend { .. })
    }
}
