//! Application State
//!
//! Everything the renderer draws. Owned by [`AppService`](super::AppService)
//! and only mutated on the render loop's task; background work reports back
//! through [`AppEvent`](super::AppEvent).

use std::time::Duration;

use crate::catalog::options::{all_fields, RANKING_OPTIONS, TYPE_OPTIONS};
use crate::catalog::{CatalogState, FilterKind};
use crate::chat::{DeepLinkSlot, SharedTranscript};
use crate::lists::validation::DEFAULT_EMOJI;
use crate::lists::{ListCollection, ListDraft};
use crate::models::{Program, ProgramList, User};
use crate::notify::Notifications;
use crate::profile::ProfileData;

use super::router::Route;

/// Page sizes offered by the catalog, cycled in order
pub const PAGE_SIZES: [usize; 3] = [10, 20, 50];

/// Which catalog pane has the selection cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogPane {
    #[default]
    Programs,
    Lists,
}

impl CatalogPane {
    pub fn next(self) -> Self {
        match self {
            Self::Programs => Self::Lists,
            Self::Lists => Self::Programs,
        }
    }
}

/// Cursor inside the filter picker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPicker {
    /// Index into [`FilterKind::ALL`]
    pub group: usize,
    pub cursor: usize,
}

impl FilterPicker {
    pub fn kind(&self) -> FilterKind {
        FilterKind::ALL[self.group % FilterKind::ALL.len()]
    }

    pub fn move_group(&mut self, delta: isize) {
        let len = FilterKind::ALL.len() as isize;
        self.group = (self.group as isize + delta).rem_euclid(len) as usize;
        self.cursor = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogField {
    #[default]
    Title,
    Emoji,
}

/// Create or edit form for a saved list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDialog {
    /// `None` when creating
    pub editing: Option<String>,
    pub title: String,
    pub emoji: String,
    pub field: DialogField,
    pub error: Option<String>,
    pub saving: bool,
}

impl ListDialog {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn edit(list: &ProgramList) -> Self {
        Self {
            editing: Some(list.id.clone()),
            title: list.title.clone(),
            emoji: list.emoji.clone(),
            ..Self::default()
        }
    }

    pub fn draft(&self) -> ListDraft {
        let emoji = Some(self.emoji.trim())
            .filter(|e| !e.is_empty())
            .map(str::to_string);
        ListDraft::new(self.title.clone(), emoji)
    }

    pub fn emoji_preview(&self) -> &str {
        match self.emoji.trim() {
            "" => DEFAULT_EMOJI,
            emoji => emoji,
        }
    }

    pub fn field_mut(&mut self) -> &mut String {
        match self.field {
            DialogField::Title => &mut self.title,
            DialogField::Emoji => &mut self.emoji,
        }
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            DialogField::Title => DialogField::Emoji,
            DialogField::Emoji => DialogField::Title,
        };
    }
}

/// List picker for one program card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipPicker {
    pub program_id: String,
    pub program_name: String,
    pub cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Help,
    Filters(FilterPicker),
    ListDialog(ListDialog),
    ConfirmDelete,
    Membership(MembershipPicker),
}

/// Option lists that come from the backend
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub countries: Vec<String>,
    pub names: Vec<String>,
    pub loaded: bool,
}

impl FilterOptions {
    /// `(label, value)` pairs offered for one filter
    pub fn options(&self, kind: FilterKind) -> Vec<(String, String)> {
        let dynamic = |values: &[String]| -> Vec<(String, String)> {
            values.iter().map(|v| (v.clone(), v.clone())).collect()
        };
        match kind {
            FilterKind::Country => dynamic(&self.countries),
            FilterKind::Institution => dynamic(&self.names),
            FilterKind::Type => TYPE_OPTIONS
                .iter()
                .map(|o| (o.label.to_string(), o.value.to_string()))
                .collect(),
            FilterKind::Ranking => RANKING_OPTIONS
                .iter()
                .map(|o| (o.label.to_string(), o.value.to_string()))
                .collect(),
            FilterKind::Field => all_fields()
                .map(|o| (o.label.to_string(), o.value.to_string()))
                .collect(),
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub should_quit: bool,
    pub route: Route,
    /// Route asked for before the guard redirected to sign-in
    pub wanted_route: Route,
    pub user: Option<User>,
    /// Bumped whenever a session ends; results tagged with an older value
    /// belong to the previous user and are dropped
    pub session_epoch: u64,
    /// Stored session is still being validated
    pub restoring: bool,
    pub modal: Option<Modal>,

    /// Text field of the current screen (sign-in credential or chat message)
    pub input: String,
    pub login_pending: bool,
    pub login_error: Option<String>,

    pub catalog: CatalogState,
    pub catalog_pane: CatalogPane,
    pub program_cursor: usize,
    pub list_cursor: usize,
    pub filter_options: FilterOptions,
    pub lists: ListCollection,

    pub transcript: SharedTranscript,
    pub deep_link: DeepLinkSlot,
    /// Lines scrolled up from the bottom of the chat
    pub chat_scroll: u16,

    pub profile: ProfileData,
    pub profile_requested: bool,
    pub trait_cursor: usize,

    pub notifications: Notifications,
    /// Animation frame of the working indicator
    pub frame: u8,
}

impl AppState {
    pub fn new(
        catalog: CatalogState,
        transcript: SharedTranscript,
        toast_ttl: Duration,
        route: Route,
    ) -> Self {
        Self {
            should_quit: false,
            route: Route::Login,
            wanted_route: route,
            user: None,
            session_epoch: 0,
            restoring: true,
            modal: None,
            input: String::new(),
            login_pending: false,
            login_error: None,
            catalog,
            catalog_pane: CatalogPane::default(),
            program_cursor: 0,
            list_cursor: 0,
            filter_options: FilterOptions::default(),
            lists: ListCollection::default(),
            transcript,
            deep_link: DeepLinkSlot::default(),
            chat_scroll: 0,
            profile: ProfileData::default(),
            profile_requested: false,
            trait_cursor: 0,
            notifications: Notifications::new(toast_ttl),
            frame: 0,
        }
    }

    pub fn signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn selected_program(&self) -> Option<&Program> {
        self.catalog.visible().get(self.program_cursor)
    }

    pub fn selected_list(&self) -> Option<&ProgramList> {
        self.lists.lists().get(self.list_cursor)
    }

    /// Something is loading or a reply is streaming
    pub fn is_working(&self) -> bool {
        self.restoring
            || self.login_pending
            || self.catalog.is_loading()
            || self.transcript.is_pending()
    }

    /// Keep cursors inside their (possibly shrunken) collections
    pub fn clamp_cursors(&mut self) {
        let programs = self.catalog.visible().len();
        self.program_cursor = self.program_cursor.min(programs.saturating_sub(1));
        let lists = self.lists.lists().len();
        self.list_cursor = self.list_cursor.min(lists.saturating_sub(1));
        let traits = self.profile.traits.loaded().map(Vec::len).unwrap_or(0);
        self.trait_cursor = self.trait_cursor.min(traits.saturating_sub(1));
    }

    /// Drop everything that belongs to the signed-out user
    pub fn reset_user_data(&mut self) {
        self.user = None;
        self.session_epoch += 1;
        self.lists.clear();
        self.profile = ProfileData::default();
        self.profile_requested = false;
        self.deep_link.clear();
        self.modal = None;
        self.input.clear();
        self.chat_scroll = 0;
        self.list_cursor = 0;
        self.trait_cursor = 0;
    }
}
