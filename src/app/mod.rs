//! Application layer between the domain modules and the terminal UI
//!
//! Front-ends send [`Command`]s; [`AppService`] applies them to
//! [`AppState`] and reports background results as [`AppEvent`]s.

pub mod commands;
pub mod events;
pub mod router;
pub mod service;
pub mod state;

pub use commands::Command;
pub use events::AppEvent;
pub use router::Route;
pub use service::AppService;
pub use state::{AppState, CatalogPane, DialogField, ListDialog, Modal};
