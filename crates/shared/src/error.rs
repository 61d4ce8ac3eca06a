use thiserror::Error;

/// Everything that can go wrong between issuing a request and producing a
/// terminal action. Each kind ends up as the `Error` status message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("failed to decode response body: {0}")]
    Decode(String),
    #[error("Network response was not ok (status {status})")]
    Status { status: u16 },
    #[error("Status code not recognized: {status}")]
    UnrecognizedStatus { status: u16 },
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },
}

impl SyncError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(value: serde_json::Error) -> Self {
        Self::decode(value)
    }
}
