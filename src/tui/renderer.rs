//! TUI Renderer - Draws [`AppState`] and turns key presses into [`Command`]s
//!
//! Business logic lives in [`AppService`](crate::app::AppService); this
//! module only reads state.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Terminal;
use std::time::{Duration, Instant};

use crate::app::{AppState, Command, Modal, Route};

use super::theme::Theme;
use super::views::{CatalogView, ChatView, LoginView, ProfileView, SettingsView};
use super::widgets::{
    ConfirmModal, FilterModal, FlashBar, FlashBarState, Header, HelpModal, ListDialogModal,
    MembershipModal, Sidebar,
};

const SIDEBAR_WIDTH: u16 = 24;

pub struct TuiRenderer<B: Backend> {
    terminal: Terminal<B>,
    theme: Theme,
}

impl<B: Backend> TuiRenderer<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self {
            terminal,
            theme: Theme::default(),
        }
    }

    /// Get reference to terminal (for testing)
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn into_terminal(self) -> Terminal<B> {
        self.terminal
    }

    pub fn render(&mut self, state: &AppState) -> Result<()> {
        let theme = &self.theme;
        let now = Instant::now();

        self.terminal.draw(|frame| {
            let area = frame.area();

            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(40)])
                .split(area);

            frame.render_widget(
                Sidebar::new(state.route, theme).signed_in(state.signed_in()),
                columns[0],
            );

            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Min(5),
                    Constraint::Length(1),
                ])
                .split(columns[1]);

            frame.render_widget(
                Header::new(state.route, theme).user(state.user.as_ref()),
                rows[0],
            );

            match state.route {
                Route::Login => frame.render_widget(LoginView::new(state, theme), rows[1]),
                Route::Catalog => frame.render_widget(CatalogView::new(state, theme), rows[1]),
                Route::Chat => frame.render_widget(ChatView::new(state, theme), rows[1]),
                Route::Profile => frame.render_widget(ProfileView::new(state, theme), rows[1]),
                Route::Settings => frame.render_widget(SettingsView::new(theme), rows[1]),
            }

            let flash_state = if state.is_working() {
                FlashBarState::Working
            } else {
                FlashBarState::Idle
            };
            frame.render_widget(
                FlashBar::new(theme)
                    .toast(state.notifications.current(now))
                    .state(flash_state)
                    .frame(state.frame),
                rows[2],
            );

            match &state.modal {
                Some(Modal::Help) => frame.render_widget(HelpModal::new(theme), area),
                Some(Modal::Filters(picker)) => frame.render_widget(
                    FilterModal::new(
                        picker,
                        &state.filter_options,
                        state.catalog.filters(),
                        theme,
                    ),
                    area,
                ),
                Some(Modal::ListDialog(dialog)) => {
                    frame.render_widget(ListDialogModal::new(dialog, theme), area)
                }
                Some(Modal::ConfirmDelete) => {
                    if let Some(list) = state.lists.pending_delete() {
                        frame.render_widget(
                            ConfirmModal::delete_list(&list.title, &list.emoji, theme),
                            area,
                        );
                    }
                }
                Some(Modal::Membership(picker)) => frame.render_widget(
                    MembershipModal::new(picker, &state.lists, theme),
                    area,
                ),
                None => {}
            }
        })?;

        Ok(())
    }

    pub fn poll_input(&mut self, state: &AppState, timeout: Duration) -> Result<Option<Command>> {
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Release {
                    return Ok(key_to_command(key, state));
                }
            }
        }
        Ok(None)
    }
}

/// Whether printable keys go into a text field
fn is_text_context(state: &AppState) -> bool {
    match &state.modal {
        Some(Modal::ListDialog(_)) => true,
        Some(_) => false,
        None => matches!(state.route, Route::Login | Route::Chat),
    }
}

/// Map a key press to a command for the current screen
pub fn key_to_command(key: KeyEvent, state: &AppState) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys first
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return Some(Command::Quit),
        KeyCode::Char('l') if ctrl => return Some(Command::Logout),
        KeyCode::Char('u') if ctrl => return Some(Command::ClearInput),
        KeyCode::F(n @ 1..=4) => return Some(Command::Navigate(Route::NAV[n as usize - 1])),
        KeyCode::Esc => return Some(Command::Back),
        _ if ctrl => return None,
        _ => {}
    }

    match &state.modal {
        Some(Modal::Help) => {
            return match key.code {
                KeyCode::Char('?') | KeyCode::Enter => Some(Command::ToggleHelp),
                _ => None,
            }
        }
        Some(Modal::Filters(_)) => {
            return match key.code {
                KeyCode::Left => Some(Command::FilterGroup(-1)),
                KeyCode::Right | KeyCode::Tab => Some(Command::FilterGroup(1)),
                KeyCode::Up | KeyCode::Char('k') => Some(Command::SelectPrevious),
                KeyCode::Down | KeyCode::Char('j') => Some(Command::SelectNext),
                KeyCode::Char(' ') | KeyCode::Enter => Some(Command::ToggleFilterOption),
                KeyCode::Char('r') => Some(Command::ResetFilters),
                _ => None,
            }
        }
        Some(Modal::Membership(_)) => {
            return match key.code {
                KeyCode::Up | KeyCode::Char('k') => Some(Command::SelectPrevious),
                KeyCode::Down | KeyCode::Char('j') => Some(Command::SelectNext),
                KeyCode::Char(' ') | KeyCode::Enter => Some(Command::Activate),
                _ => None,
            }
        }
        Some(Modal::ConfirmDelete) => {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Enter => Some(Command::ConfirmDelete),
                KeyCode::Char('n') => Some(Command::Back),
                _ => None,
            }
        }
        Some(Modal::ListDialog(_)) | None => {}
    }

    if is_text_context(state) {
        return match key.code {
            KeyCode::Enter => Some(Command::Submit),
            KeyCode::Backspace => Some(Command::DeleteChar),
            KeyCode::Tab => Some(Command::FocusNext),
            KeyCode::Up | KeyCode::PageUp if state.route == Route::Chat => Some(Command::ScrollUp),
            KeyCode::Down | KeyCode::PageDown if state.route == Route::Chat => {
                Some(Command::ScrollDown)
            }
            KeyCode::Char(c) => Some(Command::InsertChar(c)),
            _ => None,
        };
    }

    // Screen keys
    match key.code {
        KeyCode::Char('?') => return Some(Command::ToggleHelp),
        KeyCode::Char(n @ '1'..='4') => {
            let index = n as usize - '1' as usize;
            return Some(Command::Navigate(Route::NAV[index]));
        }
        KeyCode::Up | KeyCode::Char('k') => return Some(Command::SelectPrevious),
        KeyCode::Down | KeyCode::Char('j') => return Some(Command::SelectNext),
        KeyCode::Enter => return Some(Command::Activate),
        _ => {}
    }

    match state.route {
        Route::Catalog => match key.code {
            KeyCode::Tab => Some(Command::FocusNext),
            KeyCode::Char('f') => Some(Command::OpenFilters),
            KeyCode::Char('r') => Some(Command::ResetFilters),
            KeyCode::Char(']') | KeyCode::PageDown => Some(Command::NextPage),
            KeyCode::Char('[') | KeyCode::PageUp => Some(Command::PreviousPage),
            KeyCode::Char('+') => Some(Command::CyclePageSize),
            KeyCode::Char('s') => Some(Command::CycleSort),
            KeyCode::Char('y') => Some(Command::CopyLink),
            KeyCode::Char('<') => Some(Command::AdjustCostMin(-1)),
            KeyCode::Char('>') => Some(Command::AdjustCostMin(1)),
            KeyCode::Char(',') => Some(Command::AdjustCostMax(-1)),
            KeyCode::Char('.') => Some(Command::AdjustCostMax(1)),
            KeyCode::Char('n') => Some(Command::NewList),
            KeyCode::Char('e') => Some(Command::EditList),
            KeyCode::Char('d') => Some(Command::DeleteList),
            KeyCode::Char('a') => Some(Command::OpenMembership),
            KeyCode::Char('x') => Some(Command::ExitList),
            _ => None,
        },
        Route::Profile => match key.code {
            KeyCode::Char('R') | KeyCode::Char('r') => Some(Command::ReloadProfile),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ListDialog;
    use crate::catalog::CatalogState;
    use crate::chat::SharedTranscript;
    use crate::models::User;
    use ratatui::backend::TestBackend;

    fn state(route: Route) -> AppState {
        let mut state = AppState::new(
            CatalogState::default(),
            SharedTranscript::new(),
            Duration::from_secs(3),
            route,
        );
        state.restoring = false;
        state.user = Some(User {
            id: "u1".to_string(),
            name: "Aisha".to_string(),
            email: "aisha@example.com".to_string(),
            avatar: String::new(),
        });
        state.route = route;
        state
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_global_keys() {
        let state = state(Route::Chat);
        assert_eq!(
            key_to_command(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &state),
            Some(Command::Quit)
        );
        assert_eq!(
            key_to_command(key(KeyCode::F(3)), &state),
            Some(Command::Navigate(Route::Profile))
        );
        assert_eq!(key_to_command(key(KeyCode::Esc), &state), Some(Command::Back));
    }

    #[test]
    fn test_chat_keys_type_text() {
        let state = state(Route::Chat);
        assert_eq!(
            key_to_command(key(KeyCode::Char('f')), &state),
            Some(Command::InsertChar('f'))
        );
        assert_eq!(
            key_to_command(key(KeyCode::Char('2')), &state),
            Some(Command::InsertChar('2'))
        );
        assert_eq!(key_to_command(key(KeyCode::Enter), &state), Some(Command::Submit));
        assert_eq!(key_to_command(key(KeyCode::Up), &state), Some(Command::ScrollUp));
    }

    #[test]
    fn test_catalog_keys() {
        let state = state(Route::Catalog);
        assert_eq!(
            key_to_command(key(KeyCode::Char('f')), &state),
            Some(Command::OpenFilters)
        );
        assert_eq!(
            key_to_command(key(KeyCode::Char(']')), &state),
            Some(Command::NextPage)
        );
        assert_eq!(
            key_to_command(key(KeyCode::Char('2')), &state),
            Some(Command::Navigate(Route::Chat))
        );
        assert_eq!(
            key_to_command(KeyEvent::new(KeyCode::Char('>'), KeyModifiers::SHIFT), &state),
            Some(Command::AdjustCostMin(1))
        );
    }

    #[test]
    fn test_list_dialog_captures_letters() {
        let mut state = state(Route::Catalog);
        state.modal = Some(Modal::ListDialog(ListDialog::create()));
        assert_eq!(
            key_to_command(key(KeyCode::Char('f')), &state),
            Some(Command::InsertChar('f'))
        );
        assert_eq!(key_to_command(key(KeyCode::Tab), &state), Some(Command::FocusNext));
    }

    #[test]
    fn test_confirm_delete_keys() {
        let mut state = state(Route::Catalog);
        state.modal = Some(Modal::ConfirmDelete);
        assert_eq!(
            key_to_command(key(KeyCode::Char('y')), &state),
            Some(Command::ConfirmDelete)
        );
        assert_eq!(key_to_command(key(KeyCode::Char('n')), &state), Some(Command::Back));
        assert_eq!(key_to_command(key(KeyCode::Char('d')), &state), None);
    }

    #[test]
    fn test_render_every_route() {
        for route in [
            Route::Login,
            Route::Catalog,
            Route::Chat,
            Route::Profile,
            Route::Settings,
        ] {
            let terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
            let mut renderer = TuiRenderer::new(terminal);
            let mut state = state(route);
            state.modal = Some(Modal::Help);
            renderer.render(&state).unwrap();

            let text: String = renderer
                .terminal()
                .backend()
                .buffer()
                .content()
                .iter()
                .map(|c| c.symbol())
                .collect();
            assert!(text.contains(route.title()), "{:?}", route);
            assert!(text.contains("Keyboard Shortcuts"));
        }
    }
}
