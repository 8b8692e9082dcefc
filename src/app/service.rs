//! Application Service - Business logic behind the terminal UI
//!
//! Applies [`Command`]s to [`AppState`], starts backend calls on the tokio
//! runtime and folds their [`AppEvent`] results back into the state. Nothing
//! here touches the terminal.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::api::Backend;
use crate::catalog::{CatalogQuery, CatalogState, Fetch, Load};
use crate::chat::{ChatDeepLink, ChatSession, SharedTranscript};
use crate::config::Config;
use crate::error::ApiError;
use crate::lists::manager::{
    report, CREATED, CREATE_FAILED, DELETED, DELETE_FAILED, UPDATED, UPDATE_FAILED,
};
use crate::lists::validation::{is_submittable, MAX_TITLE_LEN};
use crate::lists::{ListService, ToggleOutcome};
use crate::models::SortOrder;
use crate::profile::ProfileLoader;
use crate::session::{HookId, SessionStore};

use super::commands::Command;
use super::events::AppEvent;
use super::router::Route;
use super::state::{
    AppState, CatalogPane, FilterPicker, ListDialog, MembershipPicker, Modal, PAGE_SIZES,
};

/// Step of the cost window keys, in MYR
const COST_STEP: i64 = 1_000;

/// Chat input that clears the server-side conversation instead of sending
const CLEAR_COMMAND: &str = "/clear";

pub struct AppService {
    config: Config,
    session: Arc<SessionStore>,
    backend: Backend,
    lists: ListService,
    chat: ChatSession,
    profile: ProfileLoader,
    state: AppState,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    hooks: Vec<HookId>,
    /// The user asked to sign out, as opposed to the session expiring
    logging_out: bool,
}

impl std::fmt::Debug for AppService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppService")
            .field("route", &self.state.route)
            .field("session", &self.session)
            .field("chat_mode", &self.chat.mode())
            .finish()
    }
}

impl AppService {
    pub fn new(
        config: Config,
        session: Arc<SessionStore>,
        backend: Backend,
        route: Route,
        query: CatalogQuery,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let transcript = SharedTranscript::new();
        let chat = ChatSession::new(
            backend.orchestrator.clone(),
            transcript.clone(),
            config.chat.mode,
        );

        let hooks = session.hooks();
        let ended_tx = event_tx.clone();
        let registered = vec![
            transcript.clear_on_logout(hooks),
            hooks.on_logout(move || {
                let _ = ended_tx.send(AppEvent::SessionEnded);
            }),
        ];

        let state = AppState::new(
            CatalogState::from_query(query),
            transcript,
            Duration::from_secs(config.ui.toast_ttl_secs),
            route,
        );

        Self {
            lists: ListService::new(backend.program_lists.clone()),
            profile: ProfileLoader::new(backend.profile.clone()),
            config,
            session,
            backend,
            chat,
            state,
            event_tx,
            hooks: registered,
            logging_out: false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Validate the stored session and fetch the public filter options
    pub fn start(&mut self) {
        let session = self.session.clone();
        self.spawn(async move { AppEvent::SessionRestored(session.restore().await) });

        let institutions = self.backend.institutions.clone();
        self.spawn(async move {
            let (countries, names) = tokio::join!(institutions.countries(), institutions.names());
            AppEvent::FilterOptionsLoaded { countries, names }
        });
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let _ = event_tx.send(task.await);
        });
    }

    /// Time-driven work: toast expiry, the working animation and deep links
    pub fn tick(&mut self, now: Instant) {
        self.state.notifications.prune(now);
        if self.state.is_working() {
            self.state.frame = self.state.frame.wrapping_add(1);
        }
        // A due link waits while a reply is still streaming
        if self.state.route == Route::Chat && !self.state.transcript.is_pending() {
            if let Some(question) = self.state.deep_link.take_due(now) {
                self.state.input.clear();
                self.send_chat(question);
            }
        }
    }

    // =====================================================================
    // Commands
    // =====================================================================

    pub fn handle_command(&mut self, command: Command) {
        match command {
            // Application
            Command::Quit => self.state.should_quit = true,
            Command::Navigate(route) => self.navigate(route),
            Command::ToggleHelp => {
                self.state.modal = match self.state.modal {
                    Some(Modal::Help) => None,
                    _ => Some(Modal::Help),
                };
            }
            Command::Back => self.back(),

            // Text input
            Command::InsertChar(c) => self.insert_char(c),
            Command::DeleteChar => {
                if let Some(Modal::ListDialog(dialog)) = &mut self.state.modal {
                    dialog.field_mut().pop();
                } else {
                    self.state.input.pop();
                }
            }
            Command::ClearInput => self.state.input.clear(),
            Command::Submit => self.submit(),

            // Session
            Command::Logout => self.logout(),

            // Selection
            Command::SelectPrevious => self.move_selection(-1),
            Command::SelectNext => self.move_selection(1),
            Command::FocusNext => {
                if let Some(Modal::ListDialog(dialog)) = &mut self.state.modal {
                    dialog.next_field();
                } else {
                    self.state.catalog_pane = self.state.catalog_pane.next();
                }
            }
            Command::Activate => self.activate(),

            // Catalog
            Command::OpenFilters => self.state.modal = Some(Modal::Filters(FilterPicker::default())),
            Command::FilterGroup(delta) => {
                if let Some(Modal::Filters(picker)) = &mut self.state.modal {
                    picker.move_group(delta);
                }
            }
            Command::ToggleFilterOption => self.toggle_filter_option(),
            Command::ResetFilters => {
                let fetch = self.state.catalog.reset_filters();
                self.run_fetch(Some(fetch));
            }
            Command::NextPage => {
                let fetch = self.state.catalog.set_page(self.state.catalog.page() + 1);
                self.run_fetch(fetch);
            }
            Command::PreviousPage => {
                let page = self.state.catalog.page().saturating_sub(1).max(1);
                let fetch = self.state.catalog.set_page(page);
                self.run_fetch(fetch);
            }
            Command::CyclePageSize => {
                let current = self.state.catalog.page_size();
                let next = PAGE_SIZES
                    .iter()
                    .find(|size| **size > current)
                    .copied()
                    .unwrap_or(PAGE_SIZES[0]);
                let fetch = self.state.catalog.set_page_size(next);
                self.run_fetch(fetch);
            }
            Command::CycleSort => {
                let next = match self.state.catalog.sort() {
                    None => Some(SortOrder::Az),
                    Some(SortOrder::Az) => Some(SortOrder::Za),
                    Some(SortOrder::Za) => None,
                };
                let fetch = self.state.catalog.set_sort(next);
                self.run_fetch(fetch);
            }
            Command::CopyLink => {
                let link = self.state.catalog.query().to_query_string();
                tracing::info!("Catalog link: {}", link);
                self.state.notifications.info(format!("Link: {}", link));
            }
            Command::AdjustCostMin(delta) => self.adjust_cost(delta, 0),
            Command::AdjustCostMax(delta) => self.adjust_cost(0, delta),

            // Saved lists
            Command::NewList => {
                self.state.modal = Some(Modal::ListDialog(ListDialog::create()));
            }
            Command::EditList => {
                if let Some(list) = self.state.selected_list() {
                    self.state.modal = Some(Modal::ListDialog(ListDialog::edit(list)));
                }
            }
            Command::DeleteList => {
                let id = self.state.selected_list().map(|l| l.id.clone());
                if let Some(id) = id {
                    if self.state.lists.request_delete(&id) {
                        self.state.modal = Some(Modal::ConfirmDelete);
                    }
                }
            }
            Command::ConfirmDelete => self.confirm_delete(),
            Command::OpenMembership => self.open_membership(),
            Command::ExitList => {
                if self.state.catalog.active_list().is_some() {
                    let fetch = self.state.catalog.exit_list();
                    self.run_fetch(Some(fetch));
                }
            }

            // Chat
            Command::ClearHistory => self.clear_history(),
            Command::ScrollUp => {
                self.state.chat_scroll = self.state.chat_scroll.saturating_add(3);
            }
            Command::ScrollDown => {
                self.state.chat_scroll = self.state.chat_scroll.saturating_sub(3);
            }

            // Profile
            Command::AskAboutTrait => self.ask_about_trait(),
            Command::ReloadProfile => {
                self.state.profile_requested = false;
                self.load_profile();
            }
        }
        self.state.clamp_cursors();
    }

    fn navigate(&mut self, route: Route) {
        let resolved = route.resolve(self.state.signed_in());
        if resolved == Route::Login && route != Route::Login {
            self.state.wanted_route = route;
        }
        if self.state.route == Route::Chat && resolved != Route::Chat {
            // A deep link only fires if the user stays on the chat
            self.state.deep_link.clear();
        }
        if resolved != self.state.route {
            self.state.input.clear();
        }
        self.state.route = resolved;
        self.state.modal = None;
        tracing::debug!("Navigated to {:?}", resolved);

        match resolved {
            Route::Catalog => {
                let fetch = self.state.catalog.refresh();
                self.run_fetch(fetch);
                if matches!(self.state.lists.load(), Load::Failed(_)) {
                    self.load_lists();
                }
            }
            Route::Chat => {
                if let Some(preview) = self.state.deep_link.preview() {
                    self.state.input = preview;
                }
                let chat = self.chat.clone();
                self.spawn(async move { AppEvent::HistoryLoaded(chat.load_history().await) });
            }
            Route::Profile => self.load_profile(),
            Route::Login | Route::Settings => {}
        }
    }

    fn back(&mut self) {
        match self.state.modal.take() {
            Some(Modal::ConfirmDelete) => self.state.lists.cancel_delete(),
            Some(_) => {}
            None => match self.state.route {
                Route::Catalog if self.state.catalog.active_list().is_some() => {
                    self.handle_command(Command::ExitList)
                }
                Route::Chat | Route::Login => self.state.input.clear(),
                _ => {}
            },
        }
    }

    fn insert_char(&mut self, c: char) {
        if let Some(Modal::ListDialog(dialog)) = &mut self.state.modal {
            let field = dialog.field_mut();
            if field.chars().count() < MAX_TITLE_LEN {
                field.push(c);
            }
            dialog.error = None;
            return;
        }
        self.state.input.push(c);
    }

    fn submit(&mut self) {
        match self.state.modal {
            Some(Modal::ListDialog(_)) => return self.save_list_dialog(),
            Some(_) => return self.activate(),
            None => {}
        }
        match self.state.route {
            Route::Login => self.login(),
            Route::Chat => {
                let message = self.state.input.trim().to_string();
                if message == CLEAR_COMMAND {
                    self.state.input.clear();
                    self.clear_history();
                } else if !message.is_empty() && !self.state.transcript.is_pending() {
                    self.state.input.clear();
                    self.send_chat(message);
                }
            }
            _ => self.activate(),
        }
    }

    fn activate(&mut self) {
        match self.state.modal {
            Some(Modal::Filters(_)) => return self.toggle_filter_option(),
            Some(Modal::Membership(_)) => return self.toggle_membership(),
            Some(Modal::ConfirmDelete) => return self.confirm_delete(),
            Some(Modal::ListDialog(_)) => return self.save_list_dialog(),
            Some(Modal::Help) => {
                self.state.modal = None;
                return;
            }
            None => {}
        }
        match self.state.route {
            Route::Catalog => match self.state.catalog_pane {
                CatalogPane::Lists => self.open_selected_list(),
                CatalogPane::Programs => self.open_membership(),
            },
            Route::Profile => self.ask_about_trait(),
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let step = |cursor: &mut usize, len: usize| {
            if len == 0 {
                *cursor = 0;
            } else {
                *cursor = (*cursor as isize + delta).clamp(0, len as isize - 1) as usize;
            }
        };

        match &mut self.state.modal {
            Some(Modal::Filters(picker)) => {
                let len = self.state.filter_options.options(picker.kind()).len();
                step(&mut picker.cursor, len);
                return;
            }
            Some(Modal::Membership(picker)) => {
                step(&mut picker.cursor, self.state.lists.lists().len());
                return;
            }
            Some(_) => return,
            None => {}
        }

        match self.state.route {
            Route::Catalog => match self.state.catalog_pane {
                CatalogPane::Programs => {
                    let len = self.state.catalog.visible().len();
                    step(&mut self.state.program_cursor, len);
                }
                CatalogPane::Lists => {
                    let len = self.state.lists.lists().len();
                    step(&mut self.state.list_cursor, len);
                }
            },
            Route::Profile => {
                let len = self.state.profile.traits.loaded().map(Vec::len).unwrap_or(0);
                step(&mut self.state.trait_cursor, len);
            }
            Route::Chat => {
                if delta < 0 {
                    self.handle_command(Command::ScrollUp);
                } else {
                    self.handle_command(Command::ScrollDown);
                }
            }
            _ => {}
        }
    }

    // ---------------------------------------------------------------------
    // Session
    // ---------------------------------------------------------------------

    fn login(&mut self) {
        if self.state.login_pending {
            return;
        }
        let credential = self.state.input.trim().to_string();
        if credential.is_empty() {
            self.state.login_error = Some("Paste a Google ID token to sign in".to_string());
            return;
        }
        self.state.login_pending = true;
        self.state.login_error = None;
        let session = self.session.clone();
        self.spawn(async move { AppEvent::LoggedIn(session.login(&credential).await) });
    }

    fn logout(&mut self) {
        if !self.state.signed_in() {
            return;
        }
        self.logging_out = true;
        let session = self.session.clone();
        // The logout hook reports back with `SessionEnded`
        tokio::spawn(async move { session.logout().await });
    }

    // ---------------------------------------------------------------------
    // Catalog
    // ---------------------------------------------------------------------

    fn run_fetch(&mut self, fetch: Option<Fetch>) {
        self.state.program_cursor = 0;
        let Some(fetch) = fetch else {
            return;
        };
        match fetch {
            Fetch::Search { seq, filter } => {
                let api = self.backend.programs.clone();
                self.spawn(async move {
                    AppEvent::SearchLoaded {
                        seq,
                        result: api.list(&filter).await,
                    }
                });
            }
            Fetch::ByIds { seq, ids } => {
                let api = self.backend.programs.clone();
                self.spawn(async move {
                    AppEvent::ListProgramsLoaded {
                        seq,
                        result: api.by_ids(&ids).await,
                    }
                });
            }
        }
    }

    fn toggle_filter_option(&mut self) {
        let Some(Modal::Filters(picker)) = &self.state.modal else {
            return;
        };
        let kind = picker.kind();
        let options = self.state.filter_options.options(kind);
        let Some((_, value)) = options.get(picker.cursor) else {
            return;
        };
        let fetch = self.state.catalog.toggle_filter_value(kind, value);
        self.run_fetch(Some(fetch));
    }

    fn adjust_cost(&mut self, min_delta: i64, max_delta: i64) {
        let (min, max) = self.state.catalog.cost_range();
        let bounds = (self.config.catalog.cost_min, self.config.catalog.cost_max);
        let shift = |value: u64, delta: i64| -> u64 {
            let shifted = value as i64 + delta * COST_STEP;
            (shifted.max(0) as u64).clamp(bounds.0, bounds.1)
        };
        self.state
            .catalog
            .set_cost_range(shift(min, min_delta), shift(max, max_delta));
    }

    // ---------------------------------------------------------------------
    // Saved lists
    // ---------------------------------------------------------------------

    fn load_lists(&mut self) {
        let Some(user) = self.state.user.clone() else {
            return;
        };
        self.state.lists.begin_load();
        let lists = self.lists.clone();
        let session_epoch = self.state.session_epoch;
        self.spawn(async move {
            AppEvent::ListsLoaded {
                session_epoch,
                result: lists.load(&user.id).await,
            }
        });
    }

    fn open_selected_list(&mut self) {
        let Some(list) = self.state.selected_list().cloned() else {
            return;
        };
        self.state.catalog_pane = CatalogPane::Programs;
        let fetch = self.state.catalog.enter_list(list);
        self.run_fetch(fetch);
    }

    fn save_list_dialog(&mut self) {
        let Some(Modal::ListDialog(dialog)) = &mut self.state.modal else {
            return;
        };
        if dialog.saving {
            return;
        }
        if !is_submittable(&dialog.title) {
            dialog.error = Some("Title is required".to_string());
            return;
        }
        let Some(user) = self.state.user.clone() else {
            return;
        };
        let draft = dialog.draft();
        let editing = dialog.editing.clone();
        dialog.saving = true;
        dialog.error = None;

        let lists = self.lists.clone();
        match editing {
            None => self.spawn(async move {
                AppEvent::ListCreated(lists.create(&user.id, &draft, Vec::new()).await)
            }),
            Some(id) => {
                let Some(list) = self.state.lists.get(&id).cloned() else {
                    self.state.modal = None;
                    return;
                };
                self.spawn(async move { AppEvent::ListEdited(lists.edit(&list, &draft).await) });
            }
        }
    }

    fn confirm_delete(&mut self) {
        self.state.modal = None;
        let Some(id) = self.state.lists.confirm_delete() else {
            return;
        };
        let lists = self.lists.clone();
        self.spawn(async move {
            let result = lists.delete(&id).await;
            AppEvent::ListDeleted { id, result }
        });
    }

    fn open_membership(&mut self) {
        let Some(program) = self.state.selected_program() else {
            return;
        };
        if self.state.lists.lists().is_empty() {
            self.state
                .notifications
                .info("Create a list first (press n in the lists pane)");
            return;
        }
        self.state.modal = Some(Modal::Membership(MembershipPicker {
            program_id: program.id.clone(),
            program_name: program.program_name.clone(),
            cursor: 0,
        }));
    }

    fn toggle_membership(&mut self) {
        let Some(Modal::Membership(picker)) = &self.state.modal else {
            return;
        };
        let program_id = picker.program_id.clone();
        let Some(list_id) = self
            .state
            .lists
            .lists()
            .get(picker.cursor)
            .map(|l| l.id.clone())
        else {
            return;
        };

        let Some(toggle) = self.state.lists.begin_toggle(&list_id, &program_id) else {
            return;
        };
        let Some(list) = self.state.lists.get(&list_id).cloned() else {
            return;
        };
        self.state.catalog.active_list_ids_changed(&list);

        let lists = self.lists.clone();
        self.spawn(async move {
            let result = lists.send_toggle(&toggle, &list).await;
            AppEvent::MembershipUpdated { toggle, result }
        });
    }

    // ---------------------------------------------------------------------
    // Chat
    // ---------------------------------------------------------------------

    fn send_chat(&mut self, message: String) {
        self.state.chat_scroll = 0;
        let chat = self.chat.clone();
        let event_tx = self.event_tx.clone();
        let session_epoch = self.state.session_epoch;
        tokio::spawn(async move {
            let progress_tx = event_tx.clone();
            let result = chat
                .send(&message, move |progress| {
                    let _ = progress_tx.send(AppEvent::ChatProgress(progress));
                })
                .await;
            let _ = event_tx.send(AppEvent::ChatFinished {
                session_epoch,
                result,
            });
        });
    }

    fn clear_history(&mut self) {
        let chat = self.chat.clone();
        self.spawn(async move { AppEvent::HistoryCleared(chat.clear_history().await) });
    }

    // ---------------------------------------------------------------------
    // Profile
    // ---------------------------------------------------------------------

    fn load_profile(&mut self) {
        if self.state.profile_requested {
            return;
        }
        let Some(user) = self.state.user.clone() else {
            return;
        };
        self.state.profile_requested = true;
        self.state.profile = Default::default();
        let loader = self.profile.clone();
        let session_epoch = self.state.session_epoch;
        self.spawn(async move {
            AppEvent::ProfileLoaded {
                session_epoch,
                data: loader.load(&user.id).await,
            }
        });
    }

    fn ask_about_trait(&mut self) {
        let Some(traits) = self.state.profile.traits.loaded() else {
            return;
        };
        let Some(selected) = traits.get(self.state.trait_cursor) else {
            return;
        };
        let link = ChatDeepLink::new(selected.trait_key.clone(), selected.label.clone());
        let delay = Duration::from_millis(self.config.chat.deep_link_delay_ms);
        self.state.deep_link.arm(link, delay);
        self.navigate(Route::Chat);
    }

    // =====================================================================
    // Events
    // =====================================================================

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SessionRestored(user) => {
                self.state.restoring = false;
                match user {
                    Some(user) => {
                        self.state.user = Some(user);
                        self.load_lists();
                        let wanted = self.state.wanted_route;
                        self.navigate(wanted);
                    }
                    None => self.navigate(Route::Login),
                }
            }
            AppEvent::LoggedIn(result) => {
                self.state.login_pending = false;
                match result {
                    Ok(user) => {
                        self.state
                            .notifications
                            .success(format!("Welcome, {}", user.name));
                        self.state.user = Some(user);
                        self.state.input.clear();
                        self.load_lists();
                        let wanted = self.state.wanted_route;
                        self.navigate(wanted);
                    }
                    Err(e) => {
                        self.state.login_error = Some(match e {
                            ApiError::Validation(message) => message,
                            other => format!("Sign-in failed: {}", other),
                        });
                    }
                }
            }
            AppEvent::SessionEnded => {
                let voluntary = std::mem::take(&mut self.logging_out);
                let was_route = self.state.route;
                self.state.reset_user_data();
                if voluntary {
                    self.state.notifications.info("Signed out");
                    self.state.wanted_route = Route::Catalog;
                } else {
                    self.state
                        .notifications
                        .error("Your session has expired. Please sign in again.");
                    self.state.wanted_route = was_route;
                }
                self.navigate(Route::Login);
            }

            AppEvent::SearchLoaded { seq, result } => {
                self.state.catalog.apply_search(seq, result);
            }
            AppEvent::ListProgramsLoaded { seq, result } => {
                self.state.catalog.apply_by_ids(seq, result);
            }
            AppEvent::FilterOptionsLoaded { countries, names } => {
                match countries {
                    Ok(countries) => self.state.filter_options.countries = countries,
                    Err(e) => tracing::warn!("Loading countries failed: {}", e),
                }
                match names {
                    Ok(names) => self.state.filter_options.names = names,
                    Err(e) => tracing::warn!("Loading institution names failed: {}", e),
                }
                self.state.filter_options.loaded = true;
            }

            AppEvent::ListsLoaded {
                session_epoch,
                result,
            } => {
                if self.is_current_session(session_epoch) {
                    self.state.lists.apply_loaded(result);
                }
            }
            AppEvent::ListCreated(result) => {
                report(&mut self.state.notifications, &result, CREATED, CREATE_FAILED);
                match result {
                    Ok(_) => {
                        self.state.modal = None;
                        self.load_lists();
                    }
                    Err(e) => self.dialog_failed(e),
                }
            }
            AppEvent::ListEdited(result) => {
                report(&mut self.state.notifications, &result, UPDATED, UPDATE_FAILED);
                match result {
                    Ok(updated) => {
                        self.state.modal = None;
                        let fetch = self.state.catalog.list_updated(&updated);
                        self.state.lists.replace(updated);
                        self.run_fetch(fetch);
                    }
                    Err(e) => self.dialog_failed(e),
                }
            }
            AppEvent::ListDeleted { id, result } => {
                report(&mut self.state.notifications, &result, DELETED, DELETE_FAILED);
                if result.is_ok() {
                    self.state.lists.remove(&id);
                    let fetch = self.state.catalog.list_deleted(&id);
                    self.run_fetch(fetch);
                }
            }
            AppEvent::MembershipUpdated { toggle, result } => {
                let outcome = self.state.lists.finish_toggle(
                    &toggle,
                    result,
                    &mut self.state.notifications,
                );
                if let Some(list) = self.state.lists.get(&toggle.list_id) {
                    self.state.catalog.active_list_ids_changed(list);
                }
                let viewing_list = self
                    .state
                    .catalog
                    .active_list()
                    .is_some_and(|l| l.id == toggle.list_id);
                if outcome == ToggleOutcome::Removed && viewing_list {
                    self.state.catalog.drop_program(&toggle.program_id);
                }
            }

            AppEvent::HistoryLoaded(result) => {
                if let Err(e) = result {
                    tracing::warn!("Chat history unavailable: {}", e);
                }
            }
            AppEvent::HistoryCleared(result) => match result {
                Ok(()) => self.state.notifications.info("Conversation cleared"),
                Err(e) => self
                    .state
                    .notifications
                    .error(format!("Could not clear the conversation: {}", e)),
            },
            AppEvent::ChatProgress(_) => self.state.chat_scroll = 0,
            AppEvent::ChatFinished {
                session_epoch,
                result,
            } => match result {
                Ok(_) | Err(ApiError::Validation(_)) => {}
                Err(_) if !self.is_current_session(session_epoch) => {}
                Err(e) => self
                    .state
                    .notifications
                    .error(format!("The advisor could not reply: {}", e)),
            },

            AppEvent::ProfileLoaded {
                session_epoch,
                data,
            } => {
                if self.is_current_session(session_epoch) {
                    self.state.profile = data;
                }
            }
        }
        self.state.clamp_cursors();
    }

    /// Results requested by a user who has since signed out are stale
    fn is_current_session(&self, session_epoch: u64) -> bool {
        let current = session_epoch == self.state.session_epoch && self.state.signed_in();
        if !current {
            tracing::debug!("Dropping result from an ended session");
        }
        current
    }

    /// Keep the dialog open and say why
    fn dialog_failed(&mut self, error: ApiError) {
        if let Some(Modal::ListDialog(dialog)) = &mut self.state.modal {
            dialog.saving = false;
            if let ApiError::Validation(message) = error {
                dialog.error = Some(message);
            }
        }
    }
}

impl Drop for AppService {
    fn drop(&mut self) {
        for id in self.hooks.drain(..) {
            self.session.hooks().unregister(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::models::{ProgramList, User};
    use crate::profile::{ProfileData, Section};
    use crate::session::{MemoryStorage, SessionHooks};

    fn user() -> User {
        User {
            id: "u1".to_string(),
            name: "Aisyah".to_string(),
            email: "aisyah@example.com".to_string(),
            avatar: String::new(),
        }
    }

    fn list(id: &str, owner: &str) -> ProgramList {
        ProgramList {
            id: id.to_string(),
            title: "Shortlist".to_string(),
            emoji: "🎓".to_string(),
            user_id: Some(owner.to_string()),
            program_ids: vec!["p1".to_string()],
            created_at: None,
            updated_at: None,
        }
    }

    fn service() -> (AppService, mpsc::UnboundedReceiver<AppEvent>) {
        let mut config = Config::default();
        config.api.base_url = "http://127.0.0.1:9".to_string();
        let client = ApiClient::new(&config.api);
        let session = Arc::new(SessionStore::new(
            Backend::auth(&client),
            Arc::new(MemoryStorage::new()),
            Arc::new(SessionHooks::new()),
        ));
        let backend = Backend::new(&client, session.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        let service = AppService::new(
            config,
            session,
            backend,
            Route::Chat,
            CatalogQuery::default(),
            tx,
        );
        (service, rx)
    }

    #[tokio::test]
    async fn test_guard_remembers_wanted_route() {
        let (mut service, _rx) = service();
        service.handle_command(Command::Navigate(Route::Profile));
        assert_eq!(service.state().route, Route::Login);
        assert_eq!(service.state().wanted_route, Route::Profile);

        service.handle_event(AppEvent::SessionRestored(Some(user())));
        assert_eq!(service.state().route, Route::Profile);
        assert!(!service.state().restoring);
    }

    #[tokio::test]
    async fn test_session_end_returns_to_login_and_wipes_user_data() {
        let (mut service, _rx) = service();
        service.handle_event(AppEvent::SessionRestored(Some(user())));
        service.state().transcript.push_user("hello");

        service.handle_event(AppEvent::SessionEnded);
        assert_eq!(service.state().route, Route::Login);
        assert!(service.state().user.is_none());
        assert!(service.state().lists.lists().is_empty());
    }

    #[tokio::test]
    async fn test_blank_list_title_never_leaves_the_dialog() {
        let (mut service, mut rx) = service();
        service.handle_event(AppEvent::SessionRestored(Some(user())));
        while rx.try_recv().is_ok() {}

        service.handle_command(Command::NewList);
        service.handle_command(Command::InsertChar(' '));
        service.handle_command(Command::Submit);

        match &service.state().modal {
            Some(Modal::ListDialog(dialog)) => {
                assert!(!dialog.saving);
                assert!(dialog.error.is_some());
            }
            other => panic!("dialog closed: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_toggle_rolls_back() {
        let (mut service, _rx) = service();
        service.handle_event(AppEvent::SessionRestored(Some(user())));
        let session_epoch = service.state().session_epoch;
        service.handle_event(AppEvent::ListsLoaded {
            session_epoch,
            result: Ok(vec![list("l1", "u1")]),
        });

        let toggle = service
            .state_mut()
            .lists
            .begin_toggle("l1", "p2")
            .expect("toggle");
        service.handle_event(AppEvent::MembershipUpdated {
            toggle,
            result: Err(ApiError::Network("offline".to_string())),
        });

        let list = service.state().lists.get("l1").expect("list");
        assert_eq!(list.program_ids, vec!["p1"]);
        assert!(!service.state().lists.is_updating("l1"));
    }

    #[tokio::test]
    async fn test_deep_link_fires_once_on_chat() {
        let (mut service, _rx) = service();
        service.handle_event(AppEvent::SessionRestored(Some(user())));
        service.state_mut().deep_link.arm(
            ChatDeepLink::new("goal", "Become an engineer"),
            Duration::from_millis(0),
        );
        service.handle_command(Command::Navigate(Route::Chat));
        assert!(service.state().input.contains("Become an engineer"));

        service.tick(Instant::now() + Duration::from_millis(10));
        assert!(!service.state().deep_link.is_armed());
        assert!(service.state().input.is_empty());
    }

    #[tokio::test]
    async fn test_deep_link_waits_for_pending_reply() {
        let (mut service, _rx) = service();
        service.handle_event(AppEvent::SessionRestored(Some(user())));
        service.handle_command(Command::Navigate(Route::Chat));
        let turn = service.state().transcript.try_begin_send().expect("idle");
        service.state_mut().deep_link.arm(
            ChatDeepLink::new("goal", "Become an engineer"),
            Duration::from_millis(0),
        );

        service.tick(Instant::now() + Duration::from_millis(10));
        assert!(service.state().deep_link.is_armed());

        service.state().transcript.end_send(turn);
        service.tick(Instant::now() + Duration::from_millis(20));
        assert!(!service.state().deep_link.is_armed());
    }

    fn other_user() -> User {
        User {
            id: "u2".to_string(),
            name: "Ben".to_string(),
            email: "ben@example.com".to_string(),
            avatar: String::new(),
        }
    }

    #[tokio::test]
    async fn test_lists_from_previous_user_are_dropped() {
        let (mut service, _rx) = service();
        service.handle_event(AppEvent::SessionRestored(Some(user())));
        let first_session = service.state().session_epoch;
        service.handle_event(AppEvent::SessionEnded);

        // The first user's request resolves after they signed out
        service.handle_event(AppEvent::ListsLoaded {
            session_epoch: first_session,
            result: Ok(vec![list("l1", "u1")]),
        });
        assert!(service.state().lists.lists().is_empty());

        service.handle_event(AppEvent::LoggedIn(Ok(other_user())));
        service.handle_event(AppEvent::ListsLoaded {
            session_epoch: first_session,
            result: Ok(vec![list("l1", "u1")]),
        });
        assert!(service.state().lists.lists().is_empty());

        let current = service.state().session_epoch;
        service.handle_event(AppEvent::ListsLoaded {
            session_epoch: current,
            result: Err(ApiError::Network("offline".to_string())),
        });
        assert!(service.state().lists.lists().is_empty());
        assert!(matches!(service.state().lists.load(), Load::Failed(_)));
    }

    #[tokio::test]
    async fn test_failed_reload_clears_held_lists() {
        let (mut service, _rx) = service();
        service.handle_event(AppEvent::SessionRestored(Some(user())));
        let session_epoch = service.state().session_epoch;
        service.handle_event(AppEvent::ListsLoaded {
            session_epoch,
            result: Ok(vec![list("l1", "u1")]),
        });
        assert_eq!(service.state().lists.lists().len(), 1);

        service.handle_event(AppEvent::ListsLoaded {
            session_epoch,
            result: Err(ApiError::ServiceError("down".to_string())),
        });
        assert!(service.state().lists.lists().is_empty());
    }

    #[tokio::test]
    async fn test_profile_and_chat_errors_from_previous_user_are_dropped() {
        let (mut service, _rx) = service();
        service.handle_event(AppEvent::SessionRestored(Some(user())));
        let first_session = service.state().session_epoch;
        service.handle_event(AppEvent::SessionEnded);
        service.handle_event(AppEvent::LoggedIn(Ok(other_user())));
        let last_toast = |s: &AppService| s.state().notifications.last().map(|t| t.message.clone());
        let before = last_toast(&service);

        service.handle_event(AppEvent::ProfileLoaded {
            session_epoch: first_session,
            data: ProfileData {
                traits: Section::Loaded(Vec::new()),
                recommendations: Section::Failed("Failed".to_string()),
            },
        });
        service.handle_event(AppEvent::ChatFinished {
            session_epoch: first_session,
            result: Err(ApiError::Unauthorized("ended".to_string())),
        });

        assert_eq!(service.state().profile, ProfileData::default());
        assert_eq!(last_toast(&service), before);
    }
}
