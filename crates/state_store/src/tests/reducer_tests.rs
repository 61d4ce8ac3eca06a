use serde_json::{json, Value};
use shared::{Record, ResourceState, ResourceStatus};

use super::*;

fn state_of(items: Vec<Value>) -> ResourceState<Value> {
    ResourceState::new(items)
}

fn run(state: &ResourceState<Value>, action: Action<Value>) -> ResourceState<Value> {
    reduce(state, action, &ReducerConfig::default())
}

#[test]
fn init_enters_loading_and_keeps_items() {
    let state = state_of(vec![json!({"id": 1})]);
    let next = run(&state, Action::Init);
    assert_eq!(next.status, ResourceStatus::Loading);
    assert_eq!(&*next.items, &[json!({"id": 1})]);
}

#[test]
fn init_clears_previous_error() {
    let failed = run(&state_of(vec![]), Action::Failure("down".into()));
    let next = run(&failed, Action::Init);
    assert_eq!(next.status, ResourceStatus::Loading);
    assert_eq!(next.error_message(), None);
}

#[test]
fn fetch_scenario_loading_then_success() {
    let state = state_of(vec![]);
    let loading = run(&state, Action::Init);
    assert!(loading.is_loading());

    let done = run(&loading, Action::Success(vec![json!({"id": 1, "name": "a"})]));
    assert_eq!(done.status, ResourceStatus::Success);
    assert_eq!(&*done.items, &[json!({"id": 1, "name": "a"})]);
}

#[test]
fn failure_clears_items_and_records_message() {
    let state = state_of(vec![json!({"id": 1}), json!({"id": 2})]);
    let next = run(&state, Action::Failure("Network response was not ok".into()));
    assert!(next.is_empty());
    assert_eq!(next.error_message(), Some("Network response was not ok"));
}

#[test]
fn add_item_appends_at_the_end() {
    let state = state_of(vec![json!({"id": 1})]);
    let next = run(&state, Action::AddItem(json!({"id": 2})));
    assert_eq!(&*next.items, &[json!({"id": 1}), json!({"id": 2})]);
    assert_eq!(next.status, ResourceStatus::Success);
}

#[test]
fn add_items_appends_without_dedup() {
    let state = state_of(vec![json!({"id": 1})]);
    let next = run(
        &state,
        Action::AddItems(vec![json!({"id": 2}), json!({"id": 3})]),
    );
    assert_eq!(next.len(), 3);
    assert_eq!(next.items[2], json!({"id": 3}));
}

#[test]
fn update_item_merges_matching_element() {
    let state = state_of(vec![
        json!({"id": 1, "name": "a", "done": false}),
        json!({"id": 2, "name": "z"}),
    ]);
    let next = run(&state, Action::UpdateItem(json!({"id": 1, "name": "b"})));
    assert_eq!(
        &*next.items,
        &[
            json!({"id": 1, "name": "b", "done": false}),
            json!({"id": 2, "name": "z"}),
        ]
    );
}

#[test]
fn update_item_without_match_leaves_items_alone() {
    let state = state_of(vec![json!({"id": 1, "name": "a"})]);
    let next = run(&state, Action::UpdateItem(json!({"id": 2, "name": "z"})));
    assert_eq!(&*next.items, &[json!({"id": 1, "name": "a"})]);
    assert_eq!(next.status, ResourceStatus::Success);
}

#[test]
fn update_items_drops_unmatched_entries() {
    let state = state_of(vec![json!({"id": 1, "n": 0}), json!({"id": 2, "n": 0})]);
    let next = run(
        &state,
        Action::UpdateItems(vec![json!({"id": 2, "n": 5}), json!({"id": 9, "n": 9})]),
    );
    assert_eq!(
        &*next.items,
        &[json!({"id": 1, "n": 0}), json!({"id": 2, "n": 5})]
    );
}

#[test]
fn replace_strategy_discards_old_fields() {
    let config = ReducerConfig::new("id", MergeStrategy::Replace);
    let state = state_of(vec![json!({"id": 1, "name": "a", "extra": true})]);
    let next = reduce(&state, Action::UpdateItem(json!({"id": 1, "name": "b"})), &config);
    assert_eq!(&*next.items, &[json!({"id": 1, "name": "b"})]);
}

#[test]
fn custom_identifier_field_is_used_for_matching() {
    let config = ReducerConfig::new("uuid", MergeStrategy::Shallow);
    let state = state_of(vec![json!({"uuid": "a", "id": 1, "v": 1})]);
    let missed = reduce(&state, Action::UpdateItem(json!({"id": 1, "v": 2})), &config);
    assert_eq!(missed.items[0]["v"], json!(1));

    let hit = reduce(&state, Action::UpdateItem(json!({"uuid": "a", "v": 3})), &config);
    assert_eq!(hit.items[0]["v"], json!(3));
}

#[test]
fn remove_scenario_drops_echoed_identifier() {
    let state = state_of(vec![json!({"id": 1}), json!({"id": 2})]);
    let next = run(&state, Action::remove("id", json!(1)));
    assert_eq!(&*next.items, &[json!({"id": 2})]);
}

#[test]
fn remove_drops_every_match_and_ignores_type_mismatch() {
    let state = state_of(vec![
        json!({"tag": "x"}),
        json!({"tag": "y"}),
        json!({"tag": "x"}),
        json!({"tag": 1}),
    ]);
    let next = run(&state, Action::remove("tag", json!("x")));
    assert_eq!(&*next.items, &[json!({"tag": "y"}), json!({"tag": 1})]);

    let untouched = run(&state, Action::remove("tag", json!("1")));
    assert_eq!(untouched.len(), 4);
}

#[test]
fn integral_float_identifiers_match_integer_ids() {
    let float_one: Value = serde_json::from_str("1.0").expect("number");
    let state = state_of(vec![json!({"id": 1, "name": "a"}), json!({"id": 2})]);

    let removed = run(&state, Action::remove("id", float_one.clone()));
    assert_eq!(&*removed.items, &[json!({"id": 2})]);

    let patch: Value = serde_json::from_str(r#"{"id": 1.0, "name": "b"}"#).expect("patch");
    let updated = run(&state, Action::UpdateItems(vec![patch]));
    assert_eq!(updated.items[0]["name"], json!("b"));
    assert_eq!(updated.len(), 2);

    let untouched = run(&state, Action::remove("id", json!("1")));
    assert_eq!(untouched.len(), 2);
}

#[test]
fn transitions_never_write_through_previous_snapshot() {
    let state = state_of(vec![json!({"id": 1, "name": "a"})]);
    let before = state.items.clone();
    let _ = run(&state, Action::UpdateItem(json!({"id": 1, "name": "b"})));
    let _ = run(&state, Action::remove("id", json!(1)));
    assert_eq!(&*before, &[json!({"id": 1, "name": "a"})]);
    assert_eq!(&*state.items, &[json!({"id": 1, "name": "a"})]);
}

#[derive(Debug, Clone, PartialEq)]
struct Todo {
    id: u32,
    title: String,
    done: Option<bool>,
}

impl Record for Todo {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(json!(self.id)),
            "title" => Some(json!(self.title)),
            _ => None,
        }
    }

    fn merge(&self, patch: &Self) -> Self {
        Self {
            id: self.id,
            title: patch.title.clone(),
            done: patch.done.or(self.done),
        }
    }
}

#[test]
fn typed_records_use_their_own_merge() {
    let state = ResourceState::new(vec![Todo {
        id: 4,
        title: "write".into(),
        done: Some(false),
    }]);
    let next = reduce(
        &state,
        Action::UpdateItem(Todo {
            id: 4,
            title: "write more".into(),
            done: None,
        }),
        &ReducerConfig::default(),
    );
    assert_eq!(
        next.items[0],
        Todo {
            id: 4,
            title: "write more".into(),
            done: Some(false),
        }
    );
}
