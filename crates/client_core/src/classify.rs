//! Turning a finished exchange into the terminal action for the store.
//!
//! Kept apart from the transport so each rule can be exercised with plain
//! values.

use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    protocol::{Payload, ResponseEnvelope},
    SyncError,
};
use state_store::Action;

use crate::transport::TransportResponse;

/// What a successful PUT status says happened on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Created,
    Updated,
}

impl PutOutcome {
    pub fn from_status(status: u16) -> Result<Self, SyncError> {
        match status {
            200 => Ok(Self::Created),
            201 => Ok(Self::Updated),
            status => Err(SyncError::UnrecognizedStatus { status }),
        }
    }
}

/// Rejects non-2xx responses, then pulls `Data` out of the envelope.
pub fn response_data(response: &TransportResponse) -> Result<Value, SyncError> {
    if !response.is_success() {
        return Err(SyncError::Status {
            status: response.status,
        });
    }
    let envelope: ResponseEnvelope = response.json()?;
    Ok(envelope.data)
}

fn decode<D: DeserializeOwned>(data: Value) -> Result<D, SyncError> {
    Ok(serde_json::from_value(data)?)
}

pub fn classify_fetch<T: DeserializeOwned>(data: Value) -> Result<Action<T>, SyncError> {
    Ok(Action::Success(decode(data)?))
}

pub fn classify_create<T: DeserializeOwned>(
    data: Value,
    append_as_list: bool,
) -> Result<Action<T>, SyncError> {
    if append_as_list {
        Ok(Action::AddItems(decode(data)?))
    } else {
        Ok(Action::AddItem(decode(data)?))
    }
}

pub fn classify_put<T: DeserializeOwned>(status: u16, data: Value) -> Result<Action<T>, SyncError> {
    let outcome = PutOutcome::from_status(status)?;
    Ok(match (outcome, Payload::of(&data)) {
        (PutOutcome::Created, Payload::Single) => Action::AddItem(decode(data)?),
        (PutOutcome::Created, Payload::List) => Action::AddItems(decode(data)?),
        (PutOutcome::Updated, Payload::Single) => Action::UpdateItem(decode(data)?),
        (PutOutcome::Updated, Payload::List) => Action::UpdateItems(decode(data)?),
    })
}

/// The server echoes the deleted identifier as `Data`.
pub fn classify_remove<T>(identifier_field: &str, data: Value) -> Action<T> {
    Action::remove(identifier_field, data)
}
