//! studywat: terminal client for the Studywat study-abroad platform
//!
//! This library provides:
//! - Session handling with Google sign-in and token refresh
//! - Typed wrappers for the Studywat REST backend
//! - The program catalog with filters, paging and saved lists
//! - The study-advisor chat, streamed or batched
//! - A ratatui terminal UI and one-shot CLI commands

pub mod api;
pub mod app;
pub mod catalog;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod lists;
pub mod models;
pub mod notify;
pub mod profile;
pub mod session;
pub mod tui;

pub use config::Config;
pub use error::{ApiError, ApiResult};
