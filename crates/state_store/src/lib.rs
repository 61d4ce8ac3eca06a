//! Pure state transitions for a mirrored resource collection.
//!
//! [`reduce`] maps a state and an [`Action`] to the next state without any
//! I/O. [`Store`] owns the live state on behalf of a client and tags each
//! request cycle with a [`Sequence`] so late responses cannot clobber newer
//! results.

pub mod action;
pub mod reducer;
pub mod store;

pub use action::Action;
pub use reducer::{reduce, MergeStrategy, ReducerConfig};
pub use store::{Applied, OrderingPolicy, Sequence, Store};
