//! `/api/v1/program-lists` endpoints (bearer)

use reqwest::Method;

use super::client::{ApiClient, Auth};
use crate::error::ApiResult;
use crate::models::{CreateProgramList, ProgramList, UpdateProgramList};

/// Saved program collections. Updates replace `program_ids` wholesale; the
/// backend has no incremental add/remove.
#[derive(Debug, Clone)]
pub struct ProgramListsApi {
    client: ApiClient,
}

impl ProgramListsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_by_user(&self, user_id: &str) -> ApiResult<Vec<ProgramList>> {
        let query = vec![("user_id".to_string(), user_id.to_string())];
        self.client
            .get_json("/api/v1/program-lists", &query, Auth::Bearer)
            .await
    }

    pub async fn get(&self, id: &str) -> ApiResult<ProgramList> {
        self.client
            .get_json(&format!("/api/v1/program-lists/{}", id), &Vec::new(), Auth::Bearer)
            .await
    }

    pub async fn create(&self, data: &CreateProgramList) -> ApiResult<ProgramList> {
        self.client
            .send_json(Method::POST, "/api/v1/program-lists", data, Auth::Bearer)
            .await
    }

    pub async fn update(&self, id: &str, data: &UpdateProgramList) -> ApiResult<ProgramList> {
        self.client
            .send_json(
                Method::PUT,
                &format!("/api/v1/program-lists/{}", id),
                data,
                Auth::Bearer,
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client
            .send_empty(
                Method::DELETE,
                &format!("/api/v1/program-lists/{}", id),
                Auth::Bearer,
            )
            .await
    }
}
