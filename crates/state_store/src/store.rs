use std::fmt;

use serde::Deserialize;
use shared::{Record, ResourceState};
use tracing::{debug, warn};

use crate::{
    action::Action,
    reducer::{reduce, ReducerConfig},
};

/// Position of a request cycle in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sequence(pub u64);

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What to do with a terminal action that arrives after a newer cycle has
/// already been reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// Discard it.
    #[default]
    #[serde(alias = "latest-issued")]
    LatestIssued,
    /// Apply everything in arrival order; the last response to land wins.
    Arrival,
}

impl std::str::FromStr for OrderingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "latest_issued" => Ok(Self::LatestIssued),
            "arrival" => Ok(Self::Arrival),
            other => Err(format!("unknown ordering policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    Stale { latest: Sequence },
}

/// Live state of one mirrored collection plus the bookkeeping needed to
/// order concurrent request cycles.
#[derive(Debug)]
pub struct Store<T> {
    state: ResourceState<T>,
    config: ReducerConfig,
    ordering: OrderingPolicy,
    issued: u64,
    latest_applied: Option<Sequence>,
}

impl<T: Record> Store<T> {
    pub fn new(initial: Vec<T>, config: ReducerConfig, ordering: OrderingPolicy) -> Self {
        Self {
            state: ResourceState::new(initial),
            config,
            ordering,
            issued: 0,
            latest_applied: None,
        }
    }

    pub fn state(&self) -> &ResourceState<T> {
        &self.state
    }

    /// Starts a request cycle: issues its sequence and moves to `Loading`.
    pub fn begin(&mut self) -> Sequence {
        self.issued += 1;
        let seq = Sequence(self.issued);
        self.state = reduce(&self.state, Action::Init, &self.config);
        debug!(seq = seq.0, "store: cycle started");
        seq
    }

    /// Reconciles the terminal action of cycle `seq`. Only terminal actions
    /// take part in ordering; `Init` is reduced as-is.
    pub fn apply(&mut self, seq: Sequence, action: Action<T>) -> Applied {
        if !action.is_terminal() {
            self.state = reduce(&self.state, action, &self.config);
            return Applied::Applied;
        }

        if self.ordering == OrderingPolicy::LatestIssued {
            if let Some(latest) = self.latest_applied {
                if seq < latest {
                    warn!(
                        seq = seq.0,
                        latest = latest.0,
                        action = action.kind(),
                        "store: dropping stale response"
                    );
                    return Applied::Stale { latest };
                }
            }
        }

        debug!(seq = seq.0, action = action.kind(), "store: applying");
        self.state = reduce(&self.state, action, &self.config);
        self.latest_applied = Some(self.latest_applied.map_or(seq, |latest| latest.max(seq)));
        Applied::Applied
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
