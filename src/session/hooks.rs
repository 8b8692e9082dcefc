//! Session lifecycle subscriptions
//!
//! Views that hold per-user state (the chat transcript, cached lists)
//! register a hook here and are told when the session ends. The session
//! store only knows about this registry, never about the views themselves.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Handle returned by [`SessionHooks::on_logout`]; pass it back to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HookId(u64);

type Hook = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct SessionHooks {
    next_id: AtomicU64,
    logout: Mutex<BTreeMap<HookId, Hook>>,
}

impl std::fmt::Debug for SessionHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHooks")
            .field("logout_hooks", &self.len())
            .finish()
    }
}

impl SessionHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback run every time the session is cleared
    pub fn on_logout<F>(&self, hook: F) -> HookId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = HookId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut hooks = self.logout.lock().unwrap_or_else(|e| e.into_inner());
        hooks.insert(id, Arc::new(hook));
        id
    }

    /// Returns false if the hook was already gone
    pub fn unregister(&self, id: HookId) -> bool {
        let mut hooks = self.logout.lock().unwrap_or_else(|e| e.into_inner());
        hooks.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.logout.lock().map(|h| h.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every logout hook in registration order
    pub(crate) fn fire_logout(&self) {
        // Snapshot so a hook may (un)register without deadlocking
        let hooks: Vec<Hook> = {
            let hooks = self.logout.lock().unwrap_or_else(|e| e.into_inner());
            hooks.values().cloned().collect()
        };
        tracing::debug!("Running {} logout hook(s)", hooks.len());
        for hook in hooks {
            hook();
        }
    }
}
