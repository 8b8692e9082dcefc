//! `/api/v1/orchestrator` endpoints (bearer): chat history and turns

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::client::{ApiClient, Auth, Query};
use crate::error::{ApiError, ApiResult};
use crate::models::{de_opt_timestamp, Alert};

/// One prior exchange as the orchestrator expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnRequest {
    pub message: String,
    pub conversation_history: Vec<HistoryTurn>,
}

/// Stored conversation entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "de_opt_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub alert: Vec<Alert>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    conversations: Vec<HistoryEntry>,
}

/// Batch-mode reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TurnReply {
    pub next_turn: String,
    #[serde(default)]
    pub alert: Vec<Alert>,
}

/// Raw body chunks of a streamed turn, in arrival order
pub type ChunkStream = BoxStream<'static, ApiResult<Vec<u8>>>;

#[derive(Debug, Clone)]
pub struct OrchestratorApi {
    client: ApiClient,
}

impl OrchestratorApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn history(&self) -> ApiResult<Vec<HistoryEntry>> {
        let response: HistoryResponse = self
            .client
            .get_json("/api/v1/orchestrator/history", &Query::new(), Auth::Bearer)
            .await?;
        Ok(response.conversations)
    }

    /// Wipe the server-side conversation log
    pub async fn clear_history(&self) -> ApiResult<()> {
        self.client
            .send_empty(Method::DELETE, "/api/v1/orchestrator/history", Auth::Bearer)
            .await
    }

    pub async fn turn(&self, request: &TurnRequest) -> ApiResult<TurnReply> {
        self.client
            .send_json(
                Method::POST,
                "/api/v1/orchestrator/turn",
                request,
                Auth::Bearer,
            )
            .await
    }

    /// Start a streamed turn. The first chunk carries `{"alert": [...]}`;
    /// everything after it is reply text.
    pub async fn stream_turn(&self, request: &TurnRequest) -> ApiResult<ChunkStream> {
        let response = self
            .client
            .open_stream("/api/v1/orchestrator/stream-turn", request, Auth::Bearer)
            .await?;
        Ok(response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(ApiError::from_network_error)
            })
            .boxed())
    }
}
