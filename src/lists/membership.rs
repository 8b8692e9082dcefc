//! Optimistic add/remove of a program in a saved list
//!
//! The local list changes first, then the whole new `program_ids` array is
//! sent. A failed request puts the previous array back.

use crate::error::ApiResult;
use crate::models::{ProgramList, UpdateProgramList};
use crate::notify::Notifications;

use super::manager::{ListCollection, ListService};

pub const ADDED: &str = "Added to list";
pub const REMOVED: &str = "Removed from list";
pub const TOGGLE_FAILED: &str = "Failed to update list";

/// An applied-but-unconfirmed membership change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toggle {
    pub list_id: String,
    pub program_id: String,
    pub previous: Vec<String>,
    pub next: Vec<String>,
    /// True if the program was in the list before the toggle
    pub removed: bool,
}

impl Toggle {
    /// Request body: title and emoji unchanged, full new id array
    pub fn request(&self, list: &ProgramList) -> UpdateProgramList {
        UpdateProgramList {
            title: Some(list.title.clone()),
            emoji: Some(list.emoji.clone()),
            program_ids: Some(self.next.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    /// The caller may drop the program from a list-mode view
    Removed,
    RolledBack,
}

impl ListCollection {
    /// Apply the toggle locally. `None` if the list is unknown or already
    /// has an update in flight.
    pub fn begin_toggle(&mut self, list_id: &str, program_id: &str) -> Option<Toggle> {
        if self.updating.contains(list_id) {
            tracing::debug!("List {} is already updating", list_id);
            return None;
        }
        let list = self.get_mut(list_id)?;
        let previous = list.program_ids.clone();
        let removed = list.contains(program_id);
        let next: Vec<String> = if removed {
            previous.iter().filter(|id| *id != program_id).cloned().collect()
        } else {
            previous
                .iter()
                .cloned()
                .chain(std::iter::once(program_id.to_string()))
                .collect()
        };
        list.program_ids = next.clone();
        self.updating.insert(list_id.to_string());

        Some(Toggle {
            list_id: list_id.to_string(),
            program_id: program_id.to_string(),
            previous,
            next,
            removed,
        })
    }

    /// Settle a toggle with the backend's answer
    pub fn finish_toggle(
        &mut self,
        toggle: &Toggle,
        result: ApiResult<ProgramList>,
        notes: &mut Notifications,
    ) -> ToggleOutcome {
        self.updating.remove(&toggle.list_id);
        match result {
            Ok(updated) => {
                self.replace(updated);
                if toggle.removed {
                    notes.success(REMOVED);
                    ToggleOutcome::Removed
                } else {
                    notes.success(ADDED);
                    ToggleOutcome::Added
                }
            }
            Err(e) => {
                tracing::warn!("Membership update for list {} failed: {}", toggle.list_id, e);
                if let Some(list) = self.get_mut(&toggle.list_id) {
                    list.program_ids = toggle.previous.clone();
                }
                notes.error(TOGGLE_FAILED);
                ToggleOutcome::RolledBack
            }
        }
    }
}

impl ListService {
    /// Send a begun toggle
    pub async fn send_toggle(&self, toggle: &Toggle, list: &ProgramList) -> ApiResult<ProgramList> {
        self.api().update(&toggle.list_id, &toggle.request(list)).await
    }

    /// Begin, send and settle in one go. `None` if the toggle was refused.
    pub async fn toggle_membership(
        &self,
        lists: &mut ListCollection,
        list_id: &str,
        program_id: &str,
        notes: &mut Notifications,
    ) -> Option<ToggleOutcome> {
        let toggle = lists.begin_toggle(list_id, program_id)?;
        let list = lists.get(list_id)?.clone();
        let result = self.send_toggle(&toggle, &list).await;
        Some(lists.finish_toggle(&toggle, result, notes))
    }
}
