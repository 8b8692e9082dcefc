//! Sending chat turns and loading history against the orchestrator

use futures::StreamExt;
use std::time::Duration;
use tokio::time::timeout;

use super::stream::StreamAccumulator;
use super::transcript::{Epoch, SharedTranscript};
use crate::api::orchestrator::{OrchestratorApi, TurnRequest};
use crate::config::ChatMode;
use crate::error::{ApiError, ApiResult};
use crate::models::Alert;

/// Abort a streamed reply after this long without any bytes
const STREAM_CHUNK_TIMEOUT: Duration = Duration::from_secs(60);

/// Progress of one turn, for redrawing while it streams
#[derive(Debug, Clone, PartialEq)]
pub enum ChatProgress {
    /// The user's message was appended
    Sent,
    /// Alerts for the reply are known
    Alert(Vec<Alert>),
    /// More reply text arrived
    Delta(String),
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    api: OrchestratorApi,
    transcript: SharedTranscript,
    mode: ChatMode,
}

impl ChatSession {
    pub fn new(api: OrchestratorApi, transcript: SharedTranscript, mode: ChatMode) -> Self {
        Self {
            api,
            transcript,
            mode,
        }
    }

    pub fn transcript(&self) -> &SharedTranscript {
        &self.transcript
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    /// Fetch the conversation log unless it is already cached.
    /// Returns whether a fetch happened.
    pub async fn load_history(&self) -> ApiResult<bool> {
        let Some(epoch) = self.transcript.claim_history_load() else {
            return Ok(false);
        };
        match self.api.history().await {
            Ok(entries) => {
                let count = entries.len();
                if self.transcript.set_history(epoch, entries) {
                    tracing::debug!("Loaded {} chat history entries", count);
                } else {
                    tracing::debug!("Session ended during history load; discarded");
                }
                Ok(true)
            }
            Err(e) => {
                self.transcript
                    .history_failed(epoch, format!("Could not load your conversation: {}", e));
                Err(e)
            }
        }
    }

    /// Delete the server-side log and empty the transcript
    pub async fn clear_history(&self) -> ApiResult<()> {
        let epoch = self.transcript.epoch();
        self.api.clear_history().await?;
        self.transcript.clear_loaded(epoch);
        tracing::info!("Chat history cleared");
        Ok(())
    }

    /// Send one user message and collect the reply.
    ///
    /// The user message is appended before the request goes out. Only one
    /// turn may be in flight; a second call fails with a validation error.
    /// `progress` is called as the transcript changes.
    pub async fn send<F>(&self, message: &str, mut progress: F) -> ApiResult<String>
    where
        F: FnMut(ChatProgress) + Send,
    {
        let message = message.trim();
        if message.is_empty() {
            return Err(ApiError::Validation("Message is empty".to_string()));
        }
        let Some(epoch) = self.transcript.try_begin_send() else {
            return Err(ApiError::Validation(
                "Wait for the current reply to finish".to_string(),
            ));
        };

        let request = TurnRequest {
            message: message.to_string(),
            conversation_history: self.transcript.history_for_request(),
        };
        self.transcript.push_user(message);
        progress(ChatProgress::Sent);

        let result = match self.mode {
            ChatMode::Batch => self.send_batch(epoch, &request, &mut progress).await,
            ChatMode::Stream => self.send_stream(epoch, &request, &mut progress).await,
        };
        self.transcript.end_send(epoch);

        if let Err(e) = &result {
            tracing::warn!("Chat turn failed: {}", e);
        }
        result
    }

    async fn send_batch<F>(
        &self,
        epoch: Epoch,
        request: &TurnRequest,
        progress: &mut F,
    ) -> ApiResult<String>
    where
        F: FnMut(ChatProgress) + Send,
    {
        let reply = self.api.turn(request).await?;
        if self
            .transcript
            .push_assistant(epoch, reply.next_turn.clone(), reply.alert.clone())
            .is_none()
        {
            return Err(session_ended());
        }
        if !reply.alert.is_empty() {
            progress(ChatProgress::Alert(reply.alert));
        }
        progress(ChatProgress::Delta(reply.next_turn.clone()));
        Ok(reply.next_turn)
    }

    async fn send_stream<F>(
        &self,
        epoch: Epoch,
        request: &TurnRequest,
        progress: &mut F,
    ) -> ApiResult<String>
    where
        F: FnMut(ChatProgress) + Send,
    {
        let mut chunks = self.api.stream_turn(request).await?;
        let mut acc = StreamAccumulator::new();
        let mut message_id: Option<u64> = None;

        loop {
            let chunk = match timeout(STREAM_CHUNK_TIMEOUT, chunks.next()).await {
                Ok(Some(chunk)) => chunk?,
                Ok(None) => break,
                Err(_) => {
                    return Err(ApiError::Network(format!(
                        "No reply from the advisor for {} seconds",
                        STREAM_CHUNK_TIMEOUT.as_secs()
                    )))
                }
            };

            if self.transcript.epoch() != epoch {
                return Err(session_ended());
            }
            let was_header = !acc.header_done();
            let delta = acc.push_bytes(&chunk);

            if was_header && acc.header_done() {
                let id = self
                    .transcript
                    .push_assistant(epoch, "", acc.alert().to_vec())
                    .ok_or_else(session_ended)?;
                message_id = Some(id);
                if !acc.alert().is_empty() {
                    progress(ChatProgress::Alert(acc.alert().to_vec()));
                }
            }
            if let (Some(id), false) = (message_id, delta.is_empty()) {
                self.transcript.append(epoch, id, &delta);
                progress(ChatProgress::Delta(delta));
            }
        }

        let (text, alert) = acc.finish();
        match message_id {
            Some(id) => {
                // `finish` may have flushed a trailing partial sequence
                let shown = self
                    .transcript
                    .messages()
                    .iter()
                    .find(|m| m.id == id)
                    .map(|m| m.text.len())
                    .unwrap_or(0);
                if text.len() > shown {
                    self.transcript.append(epoch, id, &text[shown..]);
                }
            }
            None => {
                self.transcript
                    .push_assistant(epoch, text.clone(), alert)
                    .ok_or_else(session_ended)?;
            }
        }
        Ok(text)
    }
}

/// The transcript was cleared by a logout while the reply was in flight
fn session_ended() -> ApiError {
    ApiError::Unauthorized("Session ended before the reply arrived".to_string())
}
