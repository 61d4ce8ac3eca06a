use serde_json::Value;

/// Every transition the reducer knows about. The set is closed; there is no
/// catch-all arm anywhere that could swallow an unknown transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<T> {
    /// A request cycle started.
    Init,
    /// Authoritative full collection from the server.
    Success(Vec<T>),
    Failure(String),
    AddItem(T),
    AddItems(Vec<T>),
    UpdateItem(T),
    UpdateItems(Vec<T>),
    /// Drop every element whose `field` equals `value`.
    RemoveItem { field: String, value: Value },
}

impl<T> Action<T> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Success(_) => "success",
            Self::Failure(_) => "failure",
            Self::AddItem(_) => "add_item",
            Self::AddItems(_) => "add_items",
            Self::UpdateItem(_) => "update_item",
            Self::UpdateItems(_) => "update_items",
            Self::RemoveItem { .. } => "remove_item",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Init)
    }

    pub fn remove(field: impl Into<String>, value: Value) -> Self {
        Self::RemoveItem {
            field: field.into(),
            value,
        }
    }
}
