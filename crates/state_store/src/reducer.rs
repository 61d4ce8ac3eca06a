use serde::Deserialize;
use shared::{domain::DEFAULT_IDENTIFIER_FIELD, Record, ResourceState, ResourceStatus};
use tracing::warn;

use crate::action::Action;

/// How an update payload is folded into the element it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Fields present in the update overwrite, the rest are kept.
    #[default]
    Shallow,
    /// The update replaces the element wholesale.
    Replace,
}

impl std::str::FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shallow" => Ok(Self::Shallow),
            "replace" => Ok(Self::Replace),
            other => Err(format!("unknown merge strategy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducerConfig {
    pub identifier_field: String,
    pub merge: MergeStrategy,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            identifier_field: DEFAULT_IDENTIFIER_FIELD.into(),
            merge: MergeStrategy::default(),
        }
    }
}

impl ReducerConfig {
    pub fn new(identifier_field: impl Into<String>, merge: MergeStrategy) -> Self {
        Self {
            identifier_field: identifier_field.into(),
            merge,
        }
    }
}

/// Computes the state that follows `action`. Never touches `state.items`;
/// whenever the collection changes a new slice is built.
pub fn reduce<T: Record>(
    state: &ResourceState<T>,
    action: Action<T>,
    config: &ReducerConfig,
) -> ResourceState<T> {
    match action {
        Action::Init => ResourceState::with_items(ResourceStatus::Loading, state.items.clone()),
        Action::Success(items) => ResourceState::with_items(ResourceStatus::Success, items),
        Action::Failure(message) => {
            ResourceState::with_items(ResourceStatus::Error(message), Vec::new())
        }
        Action::AddItem(item) => appended(state, vec![item], config),
        Action::AddItems(items) => appended(state, items, config),
        Action::UpdateItem(patch) => {
            if !has_match(&state.items, &patch, config) {
                warn!(
                    identifier_field = %config.identifier_field,
                    "store: update_item matched no element, collection unchanged"
                );
            }
            updated(state, std::slice::from_ref(&patch), config)
        }
        Action::UpdateItems(patches) => updated(state, &patches, config),
        Action::RemoveItem { field, value } => {
            let items: Vec<T> = state
                .items
                .iter()
                .filter(|item| !item.has_field_value(&field, &value))
                .cloned()
                .collect();
            ResourceState::with_items(ResourceStatus::Success, items)
        }
    }
}

fn appended<T: Record>(
    state: &ResourceState<T>,
    additions: Vec<T>,
    config: &ReducerConfig,
) -> ResourceState<T> {
    for addition in &additions {
        if has_match(&state.items, addition, config) {
            warn!(
                identifier_field = %config.identifier_field,
                "store: appended element shares an identifier with an existing one"
            );
        }
    }

    let mut items = Vec::with_capacity(state.items.len() + additions.len());
    items.extend(state.items.iter().cloned());
    items.extend(additions);
    ResourceState::with_items(ResourceStatus::Success, items)
}

fn updated<T: Record>(
    state: &ResourceState<T>,
    patches: &[T],
    config: &ReducerConfig,
) -> ResourceState<T> {
    let field = config.identifier_field.as_str();
    let mut items = state.items.to_vec();
    for patch in patches {
        let Some(id) = patch.field(field) else {
            continue;
        };
        for item in items.iter_mut().filter(|item| item.has_field_value(field, &id)) {
            *item = match config.merge {
                MergeStrategy::Shallow => item.merge(patch),
                MergeStrategy::Replace => patch.clone(),
            };
        }
    }
    ResourceState::with_items(ResourceStatus::Success, items)
}

fn has_match<T: Record>(items: &[T], candidate: &T, config: &ReducerConfig) -> bool {
    let field = config.identifier_field.as_str();
    candidate
        .field(field)
        .is_some_and(|id| items.iter().any(|item| item.has_field_value(field, &id)))
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
