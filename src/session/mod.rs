//! Signed-in user, tokens and their persistence

pub mod hooks;
pub mod storage;
pub mod store;

pub use hooks::{HookId, SessionHooks};
pub use storage::{DurableStorage, FileStorage, MemoryStorage};
pub use store::SessionStore;
