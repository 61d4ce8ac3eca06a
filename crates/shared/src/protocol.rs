use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body shape every successful response shares: `{ "Data": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseEnvelope<D = Value> {
    #[serde(rename = "Data")]
    pub data: D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the `Data` field, used when a response may carry either one
/// record or a list of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Single,
    List,
}

impl Payload {
    pub fn of(data: &Value) -> Self {
        if data.is_array() {
            Self::List
        } else {
            Self::Single
        }
    }
}
