//! Login View - Google credential entry

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::app::AppState;
use crate::tui::theme::Theme;
use crate::tui::widgets::modal::centered_rect;
use crate::tui::widgets::InputWidget;

pub struct LoginView<'a> {
    state: &'a AppState,
    theme: &'a Theme,
}

impl<'a> LoginView<'a> {
    pub fn new(state: &'a AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    fn status(&self) -> Line<'static> {
        if self.state.restoring {
            Line::from(Span::styled(
                "Restoring your session...",
                Style::default().fg(self.theme.text_muted),
            ))
        } else if self.state.login_pending {
            Line::from(Span::styled(
                "Signing in...",
                Style::default().fg(self.theme.cyan),
            ))
        } else if let Some(error) = &self.state.login_error {
            Line::from(Span::styled(error.clone(), Style::default().fg(self.theme.red)))
        } else {
            Line::from(Span::styled(
                "Enter to sign in",
                Style::default().fg(self.theme.text_muted),
            ))
        }
    }
}

impl Widget for LoginView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let panel = centered_rect(area, 70, 60);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(panel);

        let intro = vec![
            Line::from(Span::styled(
                "🎓 Sign in to Studywat",
                Style::default()
                    .fg(self.theme.text_primary)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Paste the Google ID token from the web sign-in page. You can also run \
                 `studywat login --credential <token>` once and start the UI signed in.",
                Style::default().fg(self.theme.text_secondary),
            )),
        ];
        Paragraph::new(intro)
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        // The credential is a bearer secret; never echo it
        let masked = "•".repeat(self.state.input.chars().count());
        InputWidget::new(&masked, self.theme)
            .title(" Google credential ")
            .placeholder("eyJhbGciOi...")
            .focused(!self.state.restoring)
            .disabled(self.state.restoring || self.state.login_pending)
            .render(chunks[1], buf);

        Paragraph::new(self.status()).render(chunks[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::app::Route;
    use crate::catalog::CatalogState;
    use crate::chat::SharedTranscript;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn test_credential_is_masked() {
        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::default();
        let mut state = AppState::new(
            CatalogState::default(),
            SharedTranscript::new(),
            Duration::from_secs(3),
            Route::Catalog,
        );
        state.restoring = false;
        state.input = "secret-token".to_string();
        state.login_error = Some("Sign-in failed".to_string());

        terminal
            .draw(|f| f.render_widget(LoginView::new(&state, &theme), f.area()))
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(!text.contains("secret-token"));
        assert!(text.contains("••••"));
        assert!(text.contains("Sign-in failed"));
    }
}
