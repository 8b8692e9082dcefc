//! TUI Controller - Orchestrates AppService and TuiRenderer
//!
//! The controller owns both the business logic (AppService) and the UI
//! (TuiRenderer), coordinating between them via Commands and AppEvents.

use anyhow::Result;
use ratatui::backend::Backend;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::app::{AppEvent, AppService, Command};

use super::renderer::TuiRenderer;

/// Input poll timeout while a reply is streaming
const STREAMING_POLL: Duration = Duration::from_millis(2);

pub struct TuiController<B: Backend> {
    service: AppService,
    renderer: TuiRenderer<B>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    tick_rate: Duration,
    last_tick: Instant,
}

impl<B: Backend> TuiController<B> {
    pub fn new(
        service: AppService,
        renderer: TuiRenderer<B>,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        tick_rate: Duration,
    ) -> Self {
        Self {
            service,
            renderer,
            event_rx,
            tick_rate,
            last_tick: Instant::now(),
        }
    }

    /// Run the main event loop until the user quits
    pub async fn run(&mut self) -> Result<()> {
        self.service.start();

        loop {
            // 1. Render current state
            self.renderer.render(self.service.state())?;

            // 2. Poll for user input
            let timeout = if self.service.state().transcript.is_pending() {
                STREAMING_POLL
            } else {
                self.tick_rate
            };
            if let Some(command) = self.renderer.poll_input(self.service.state(), timeout)? {
                // Typed characters may be a credential
                if !matches!(command, Command::InsertChar(_)) {
                    tracing::debug!(?command, "command");
                }
                self.service.handle_command(command);
            }

            // 3. Fold in results of finished background work
            self.drain_events();

            // 4. Toasts, animation frames and pending deep links
            if self.last_tick.elapsed() >= self.tick_rate {
                self.service.tick(Instant::now());
                self.last_tick = Instant::now();
            }

            if self.service.state().should_quit {
                break;
            }

            // Let spawned tasks make progress between frames
            tokio::task::yield_now().await;
        }

        Ok(())
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.service.handle_event(event);
        }
    }

    pub fn service(&self) -> &AppService {
        &self.service
    }

    /// Hand the terminal back for teardown
    pub fn into_terminal(self) -> ratatui::Terminal<B> {
        self.renderer.into_terminal()
    }
}
