use std::sync::Arc;

use serde::{ser::SerializeStruct, Serialize, Serializer};
use serde_json::{Map, Value};

/// Identifier field used when the caller does not name one.
pub const DEFAULT_IDENTIFIER_FIELD: &str = "id";

/// An element of a mirrored resource collection.
///
/// `field` exposes attributes for identifier matching and `merge` produces
/// the shallow merge of `self` with a partial update from the server.
pub trait Record: Clone + Send + Sync + 'static {
    fn field(&self, name: &str) -> Option<Value>;

    fn merge(&self, patch: &Self) -> Self;

    fn has_field_value(&self, name: &str, value: &Value) -> bool {
        self.field(name)
            .is_some_and(|field| identifiers_match(&field, value))
    }
}

/// Identifier equality. Numbers compare by numeric value, so `1` and `1.0`
/// name the same item; every other pairing is strict JSON equality and a
/// number never equals a string.
pub fn identifiers_match(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => {
            if let (Some(l), Some(r)) = (l.as_i64(), r.as_i64()) {
                return l == r;
            }
            if let (Some(l), Some(r)) = (l.as_u64(), r.as_u64()) {
                return l == r;
            }
            matches!((l.as_f64(), r.as_f64()), (Some(l), Some(r)) if l == r)
        }
        _ => left == right,
    }
}

impl Record for Value {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn merge(&self, patch: &Self) -> Self {
        match (self, patch) {
            (Value::Object(current), Value::Object(update)) => {
                Value::Object(current.merge(update))
            }
            _ => patch.clone(),
        }
    }
}

impl Record for Map<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn merge(&self, patch: &Self) -> Self {
        let mut merged = self.clone();
        for (key, value) in patch {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResourceStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl ResourceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error(_) => "error",
        }
    }
}

/// Snapshot of a mirrored collection.
///
/// `items` is shared and never written through; every transition builds a
/// fresh slice, so a snapshot handed out earlier keeps its contents.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    pub status: ResourceStatus,
    pub items: Arc<[T]>,
}

impl<T> ResourceState<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            status: ResourceStatus::Idle,
            items: items.into(),
        }
    }

    pub fn with_items(status: ResourceStatus, items: impl Into<Arc<[T]>>) -> Self {
        Self {
            status,
            items: items.into(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == ResourceStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, ResourceStatus::Error(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            ResourceStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Serialize> Serialize for ResourceState<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResourceState", 3)?;
        state.serialize_field("status", self.status.label())?;
        state.serialize_field("items", &*self.items)?;
        state.serialize_field("error_message", &self.error_message())?;
        state.end()
    }
}
