//! Saved program lists: collection state, CRUD and membership toggling

pub mod manager;
pub mod membership;
pub mod validation;

pub use manager::{ListCollection, ListDraft, ListService};
pub use membership::{Toggle, ToggleOutcome};
