//! Transient user-facing notifications (toasts)
//!
//! Mutating operations report success or failure here; the TUI shows the
//! newest live one in the flash bar and the CLI prints it.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub created_at: Instant,
}

/// Bounded queue of toasts with a shared time-to-live
#[derive(Debug, Clone)]
pub struct Notifications {
    toasts: VecDeque<Toast>,
    ttl: Duration,
}

impl Notifications {
    /// Older toasts are dropped past this many
    const CAPACITY: usize = 8;

    pub fn new(ttl: Duration) -> Self {
        Self {
            toasts: VecDeque::new(),
            ttl,
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Success, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Error, message.into());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(ToastKind::Info, message.into());
    }

    fn push(&mut self, kind: ToastKind, message: String) {
        match kind {
            ToastKind::Error => tracing::warn!("toast: {}", message),
            _ => tracing::debug!("toast: {}", message),
        }
        self.toasts.push_back(Toast {
            kind,
            message,
            created_at: Instant::now(),
        });
        while self.toasts.len() > Self::CAPACITY {
            self.toasts.pop_front();
        }
    }

    /// Newest toast that has not expired at `now`
    pub fn current(&self, now: Instant) -> Option<&Toast> {
        self.toasts
            .iter()
            .rev()
            .find(|t| now.saturating_duration_since(t.created_at) < self.ttl)
    }

    /// Drop expired toasts
    pub fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.toasts
            .retain(|t| now.saturating_duration_since(t.created_at) < ttl);
    }

    /// Take every pending toast, oldest first (CLI output)
    pub fn drain(&mut self) -> Vec<Toast> {
        self.toasts.drain(..).collect()
    }

    pub fn last(&self) -> Option<&Toast> {
        self.toasts.back()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}
