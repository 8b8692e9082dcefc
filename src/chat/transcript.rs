//! Process-wide chat transcript
//!
//! Survives navigation between views so history is fetched at most once per
//! session, and is wiped when the session ends.

use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::orchestrator::{HistoryEntry, HistoryTurn};
use crate::models::{Alert, ChatMessage};
use crate::session::{HookId, SessionHooks};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HistoryState {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Default)]
struct Inner {
    messages: Vec<ChatMessage>,
    history: HistoryState,
    /// A reply is in flight; sending is disabled
    pending: bool,
    next_id: u64,
    /// Bumped by `clear`; work started under an older epoch is discarded
    epoch: Epoch,
}

impl Inner {
    fn push(&mut self, text: String, is_user: bool, alert: Vec<Alert>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.messages.push(ChatMessage {
            id,
            text,
            is_user,
            timestamp: Utc::now(),
            alert,
        });
        id
    }

    fn find_mut(&mut self, id: u64) -> Option<&mut ChatMessage> {
        self.messages.iter_mut().rev().find(|m| m.id == id)
    }
}

/// Session generation of the transcript. Async work records the epoch it
/// started under and its results only land while that epoch is current.
pub type Epoch = u64;

/// Cheaply cloneable handle; all clones see the same transcript
#[derive(Debug, Clone, Default)]
pub struct SharedTranscript {
    inner: Arc<Mutex<Inner>>,
}

impl SharedTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of every message in order
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().messages.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn history_state(&self) -> HistoryState {
        self.lock().history.clone()
    }

    pub fn epoch(&self) -> Epoch {
        self.lock().epoch
    }

    /// `Some` only the first time the chat view needs its history: nothing
    /// cached and no load attempted. Claims the load for the returned epoch.
    pub fn claim_history_load(&self) -> Option<Epoch> {
        let mut inner = self.lock();
        let needed = inner.messages.is_empty()
            && matches!(inner.history, HistoryState::NotLoaded | HistoryState::Failed(_));
        if !needed {
            return None;
        }
        inner.history = HistoryState::Loading;
        Some(inner.epoch)
    }

    /// Install fetched history. Messages sent meanwhile stay after it.
    /// Returns false, changing nothing, if the transcript was cleared since
    /// the load was claimed.
    pub fn set_history(&self, epoch: Epoch, entries: Vec<HistoryEntry>) -> bool {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            return false;
        }
        let live = std::mem::take(&mut inner.messages);
        for entry in entries {
            inner.next_id += 1;
            let id = inner.next_id;
            inner.messages.push(ChatMessage {
                id,
                text: entry.content,
                is_user: entry.role == "user",
                timestamp: entry.timestamp.unwrap_or_else(Utc::now),
                alert: entry.alert,
            });
        }
        inner.messages.extend(live);
        inner.history = HistoryState::Loaded;
        true
    }

    pub fn history_failed(&self, epoch: Epoch, message: impl Into<String>) {
        let mut inner = self.lock();
        if inner.epoch == epoch {
            inner.history = HistoryState::Failed(message.into());
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    /// Mark a reply in flight; `None` if one already is
    pub fn try_begin_send(&self) -> Option<Epoch> {
        let mut inner = self.lock();
        if inner.pending {
            return None;
        }
        inner.pending = true;
        Some(inner.epoch)
    }

    /// Finish the turn started under `epoch`. A turn from before a clear
    /// leaves the current session's pending flag alone.
    pub fn end_send(&self, epoch: Epoch) {
        let mut inner = self.lock();
        if inner.epoch == epoch {
            inner.pending = false;
        }
    }

    pub fn push_user(&self, text: impl Into<String>) -> u64 {
        self.lock().push(text.into(), true, Vec::new())
    }

    /// Append a reply for the turn started under `epoch`; `None` if the
    /// transcript was cleared since
    pub fn push_assistant(
        &self,
        epoch: Epoch,
        text: impl Into<String>,
        alert: Vec<Alert>,
    ) -> Option<u64> {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            return None;
        }
        Some(inner.push(text.into(), false, alert))
    }

    /// Grow a streaming assistant message
    pub fn append(&self, epoch: Epoch, id: u64, fragment: &str) {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            return;
        }
        if let Some(message) = inner.find_mut(id) {
            message.text.push_str(fragment);
        }
    }

    pub fn set_alert(&self, id: u64, alert: Vec<Alert>) {
        if let Some(message) = self.lock().find_mut(id) {
            message.alert = alert;
        }
    }

    /// Prior exchanges in the orchestrator's request format
    pub fn history_for_request(&self) -> Vec<HistoryTurn> {
        self.lock()
            .messages
            .iter()
            .filter(|m| !m.text.is_empty())
            .map(|m| HistoryTurn {
                role: if m.is_user { "user" } else { "assistant" }.to_string(),
                content: m.text.clone(),
            })
            .collect()
    }

    /// Forget everything, including whether history was loaded
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.messages.clear();
        inner.history = HistoryState::NotLoaded;
        inner.pending = false;
        inner.epoch += 1;
    }

    /// Empty the transcript but treat the (now empty) server log as loaded
    pub fn clear_loaded(&self, epoch: Epoch) {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            return;
        }
        inner.messages.clear();
        inner.history = HistoryState::Loaded;
    }

    /// Wipe this transcript whenever the session ends
    pub fn clear_on_logout(&self, hooks: &SessionHooks) -> HookId {
        let transcript = self.clone();
        hooks.on_logout(move || transcript.clear())
    }
}
