//! Terminal UI for `studywat tui`
//!
//! [`TuiRenderer`] draws [`AppState`](crate::app::AppState) with the widgets
//! and views in this module; [`TuiController`] runs the loop that feeds key
//! presses and background results into [`AppService`].

mod controller;
mod renderer;
pub mod theme;
pub mod views;
pub mod widgets;

pub use controller::TuiController;
pub use renderer::{key_to_command, TuiRenderer};
pub use theme::Theme;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::stdout;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::app::{AppEvent, AppService};

/// Take over the terminal and run the UI until the user quits
pub async fn run(
    service: AppService,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    tick_rate: Duration,
) -> Result<()> {
    if !crossterm::tty::IsTty::is_tty(&stdout()) {
        anyhow::bail!("The studywat UI requires a real terminal (TTY).");
    }

    enable_raw_mode().context("Failed to enable terminal raw mode")?;
    let mut out = stdout();
    if let Err(err) = execute!(out, EnterAlternateScreen) {
        disable_raw_mode().ok();
        return Err(err).context("Failed to enter alternate screen");
    }

    let backend = CrosstermBackend::new(out);
    let mut terminal = match Terminal::new(backend) {
        Ok(terminal) => terminal,
        Err(err) => {
            disable_raw_mode().ok();
            execute!(stdout(), LeaveAlternateScreen).ok();
            return Err(err).context("Failed to create terminal backend");
        }
    };
    terminal.clear().ok();

    let renderer = TuiRenderer::new(terminal);
    let mut controller = TuiController::new(service, renderer, event_rx, tick_rate);
    let result = controller.run().await;

    // Restore the terminal whether or not the loop failed
    let mut terminal = controller.into_terminal();
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}
