use reqwest::StatusCode;
use thiserror::Error;

use crate::snapshot::{ActionIndex, ActionReply, Snapshot};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("upstream error {status}")]
    Upstream { status: StatusCode },
    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

// Port between the view-sync controller and whatever serves the game.
pub trait GameBackend {
    fn fetch_state(&self) -> Result<Snapshot, ClientError>;
    fn button_action(&self, index: ActionIndex) -> Result<ActionReply, ClientError>;
    fn start_over(&self) -> Result<ActionReply, ClientError>;
    fn exit_game(&self) -> Result<ActionReply, ClientError>;
}
