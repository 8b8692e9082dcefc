//! The signed-in user's saved lists and the operations on them

use std::collections::HashSet;

use crate::api::program_lists::ProgramListsApi;
use crate::catalog::Load;
use crate::error::ApiResult;
use crate::models::{CreateProgramList, ProgramList, UpdateProgramList};
use crate::notify::Notifications;

use super::validation::{emoji_or_default, validate_title};

pub const CREATED: &str = "List created successfully";
pub const CREATE_FAILED: &str = "Failed to create list. Please try again.";
pub const UPDATED: &str = "List updated successfully";
pub const UPDATE_FAILED: &str = "Failed to update list. Please try again.";
pub const DELETED: &str = "List deleted successfully";
pub const DELETE_FAILED: &str = "Failed to delete list. Please try again.";

/// Title and emoji as typed into the create/edit dialog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDraft {
    pub title: String,
    pub emoji: Option<String>,
}

impl ListDraft {
    pub fn new(title: impl Into<String>, emoji: Option<String>) -> Self {
        Self {
            title: title.into(),
            emoji,
        }
    }

    /// Prefill for editing an existing list
    pub fn from_list(list: &ProgramList) -> Self {
        Self {
            title: list.title.clone(),
            emoji: Some(list.emoji.clone()),
        }
    }
}

/// Local copy of the user's lists
#[derive(Debug, Clone)]
pub struct ListCollection {
    lists: Vec<ProgramList>,
    load: Load,
    /// Lists with a membership update in flight
    pub(super) updating: HashSet<String>,
    pending_delete: Option<String>,
}

impl Default for ListCollection {
    fn default() -> Self {
        Self {
            lists: Vec::new(),
            load: Load::Idle,
            updating: HashSet::new(),
            pending_delete: None,
        }
    }
}

impl ListCollection {
    pub fn lists(&self) -> &[ProgramList] {
        &self.lists
    }

    pub fn get(&self, id: &str) -> Option<&ProgramList> {
        self.lists.iter().find(|l| l.id == id)
    }

    pub(super) fn get_mut(&mut self, id: &str) -> Option<&mut ProgramList> {
        self.lists.iter_mut().find(|l| l.id == id)
    }

    pub fn load(&self) -> &Load {
        &self.load
    }

    pub fn is_updating(&self, id: &str) -> bool {
        self.updating.contains(id)
    }

    pub fn begin_load(&mut self) {
        self.load = Load::Loading;
    }

    pub fn apply_loaded(&mut self, result: ApiResult<Vec<ProgramList>>) {
        match result {
            Ok(lists) => {
                self.lists = lists;
                self.load = Load::Idle;
            }
            Err(e) => {
                tracing::warn!("Loading lists failed: {}", e);
                // The pane shows the error instead of whatever was held before
                self.lists.clear();
                self.load = Load::Failed(format!("Could not load your lists: {}", e));
            }
        }
    }

    /// Swap in the server's copy of one list
    pub fn replace(&mut self, list: ProgramList) {
        match self.get_mut(&list.id) {
            Some(existing) => *existing = list,
            None => self.lists.push(list),
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.lists.retain(|l| l.id != id);
    }

    pub fn clear(&mut self) {
        *self = ListCollection::default();
    }

    // -- delete confirmation ----------------------------------------------

    /// First step of a delete; nothing is sent until confirmed
    pub fn request_delete(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.pending_delete = Some(id.to_string());
        true
    }

    pub fn pending_delete(&self) -> Option<&ProgramList> {
        self.pending_delete.as_deref().and_then(|id| self.get(id))
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Id to delete, consuming the confirmation
    pub fn confirm_delete(&mut self) -> Option<String> {
        self.pending_delete.take()
    }
}

/// Network side of list management
#[derive(Debug, Clone)]
pub struct ListService {
    api: ProgramListsApi,
}

impl ListService {
    pub fn new(api: ProgramListsApi) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ProgramListsApi {
        &self.api
    }

    pub async fn load(&self, user_id: &str) -> ApiResult<Vec<ProgramList>> {
        self.api.list_by_user(user_id).await
    }

    /// Validates before sending; an invalid title never reaches the backend
    pub async fn create(
        &self,
        user_id: &str,
        draft: &ListDraft,
        program_ids: Vec<String>,
    ) -> ApiResult<ProgramList> {
        let title = validate_title(&draft.title)?;
        let request = CreateProgramList {
            title,
            emoji: emoji_or_default(draft.emoji.as_deref()),
            user_id: user_id.to_string(),
            program_ids,
        };
        let created = self.api.create(&request).await?;
        tracing::info!("Created list {} ({})", created.id, created.title);
        Ok(created)
    }

    /// Rename/re-emoji, resending the list's current program ids
    pub async fn edit(&self, list: &ProgramList, draft: &ListDraft) -> ApiResult<ProgramList> {
        let title = validate_title(&draft.title)?;
        let request = UpdateProgramList {
            title: Some(title),
            emoji: Some(emoji_or_default(draft.emoji.as_deref())),
            program_ids: Some(list.program_ids.clone()),
        };
        self.api.update(&list.id, &request).await
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.api.delete(id).await?;
        tracing::info!("Deleted list {}", id);
        Ok(())
    }
}

/// Toast for a finished create/edit/delete
pub fn report<T>(
    notes: &mut Notifications,
    result: &ApiResult<T>,
    success: &'static str,
    failure: &'static str,
) {
    match result {
        Ok(_) => notes.success(success),
        // Invalid input is shown inline by the dialog, not as a toast
        Err(crate::error::ApiError::Validation(_)) => {}
        Err(_) => notes.error(failure),
    }
}
