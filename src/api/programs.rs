//! `/api/v1/programs` endpoints (public)

use reqwest::Method;

use super::client::{ApiClient, Auth, Query};
use crate::error::ApiResult;
use crate::models::{Paginated, Program, SortOrder};

/// Backend search filter. Only `institution_name` is multi-valued; it is
/// sent as repeated `institution_name=` keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramFilter {
    pub field_of_study: Option<String>,
    pub institution_country: Option<String>,
    pub institution_type: Option<String>,
    pub institution_name: Vec<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub sort: Option<SortOrder>,
}

impl ProgramFilter {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        let mut push = |key: &str, value: &str| {
            if !value.is_empty() {
                query.push((key.to_string(), value.to_string()));
            }
        };

        if let Some(v) = &self.field_of_study {
            push("field_of_study", v);
        }
        if let Some(v) = &self.institution_country {
            push("institution_country", v);
        }
        if let Some(v) = &self.institution_type {
            push("institution_type", v);
        }
        for name in &self.institution_name {
            push("institution_name", name);
        }
        if let Some(page) = self.page {
            push("page", &page.to_string());
        }
        if let Some(limit) = self.limit {
            push("limit", &limit.to_string());
        }
        if let Some(sort) = self.sort {
            push("sort", sort.as_str());
        }
        query
    }
}

#[derive(Debug, Clone)]
pub struct ProgramsApi {
    client: ApiClient,
}

impl ProgramsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &ProgramFilter) -> ApiResult<Paginated<Program>> {
        tracing::debug!("Listing programs: {:?}", filter);
        self.client
            .get_json("/api/v1/programs/", &filter.to_query(), Auth::None)
            .await
    }

    /// Batch lookup; an empty id list never touches the network
    pub async fn by_ids(&self, ids: &[String]) -> ApiResult<Vec<Program>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.client
            .send_json(Method::POST, "/api/v1/programs/by-ids", ids, Auth::None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_institution_names_repeat() {
        let filter = ProgramFilter {
            institution_country: Some("Malaysia".into()),
            institution_name: vec!["Uni A".into(), "Uni B".into()],
            page: Some(2),
            limit: Some(10),
            sort: Some(SortOrder::Za),
            ..Default::default()
        };
        let query = filter.to_query();
        assert_eq!(
            query,
            vec![
                ("institution_country".to_string(), "Malaysia".to_string()),
                ("institution_name".to_string(), "Uni A".to_string()),
                ("institution_name".to_string(), "Uni B".to_string()),
                ("page".to_string(), "2".to_string()),
                ("limit".to_string(), "10".to_string()),
                ("sort".to_string(), "za".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_filter_sends_nothing() {
        assert!(ProgramFilter::default().to_query().is_empty());
    }

    #[tokio::test]
    async fn test_by_ids_empty_skips_network() {
        let api = ProgramsApi::new(ApiClient::new(&crate::config::ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
        }));
        assert!(api.by_ids(&[]).await.unwrap().is_empty());
    }
}
