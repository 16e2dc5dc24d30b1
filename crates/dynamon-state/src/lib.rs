//! Synchronized UI state for Dynamon.
//!
//! A UI issues intent [`Action`]s and later absorbs authoritative
//! [`ResponseAction`]s. Both travel as a [`Message`] and are folded by
//! [`reduce`] into a single [`DynamonState`] snapshot.
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod reducer;
pub mod state;
pub mod store;

pub use action::{Action, ActionType, Message, ResponseAction, actions, responses};
pub use reducer::{RESERVED_PREFIX, Reduction, reduce};
pub use state::DynamonState;
pub use store::Store;
