//! `/api/v1/institutions` endpoints (public), used for filter options

use super::client::{ApiClient, Auth, Query};
use crate::error::ApiResult;
use crate::models::Institution;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstitutionFilter {
    pub country: Option<String>,
    pub kind: Option<String>,
    pub name: Option<String>,
}

impl InstitutionFilter {
    fn to_query(&self) -> Query {
        [
            ("country", &self.country),
            ("type", &self.kind),
            ("name", &self.name),
        ]
        .into_iter()
        .filter_map(|(k, v)| {
            v.as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (k.to_string(), v.to_string()))
        })
        .collect()
    }
}

#[derive(Debug, Clone)]
pub struct InstitutionsApi {
    client: ApiClient,
}

impl InstitutionsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &InstitutionFilter) -> ApiResult<Vec<Institution>> {
        self.client
            .get_json("/api/v1/institutions/", &filter.to_query(), Auth::None)
            .await
    }

    /// Distinct countries, blanks removed
    pub async fn countries(&self) -> ApiResult<Vec<String>> {
        let raw: Vec<Option<String>> = self
            .client
            .get_json("/api/v1/institutions/countries/", &Query::new(), Auth::None)
            .await?;
        Ok(non_blank(raw))
    }

    /// Distinct institution names, blanks removed
    pub async fn names(&self) -> ApiResult<Vec<String>> {
        let raw: Vec<Option<String>> = self
            .client
            .get_json("/api/v1/institutions/names/", &Query::new(), Auth::None)
            .await?;
        Ok(non_blank(raw))
    }
}

fn non_blank(raw: Vec<Option<String>>) -> Vec<String> {
    raw.into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank_drops_empty_entries() {
        let raw = vec![Some("Malaysia".into()), None, Some("  ".into()), Some("UK".into())];
        assert_eq!(non_blank(raw), vec!["Malaysia", "UK"]);
    }

    #[test]
    fn test_filter_uses_backend_keys() {
        let filter = InstitutionFilter {
            country: Some("Malaysia".into()),
            kind: Some("Private".into()),
            name: Some(String::new()),
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("country".to_string(), "Malaysia".to_string()),
                ("type".to_string(), "Private".to_string()),
            ]
        );
    }
}
