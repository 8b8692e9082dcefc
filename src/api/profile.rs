//! Profile traits and course recommendations

use serde::Deserialize;

use super::client::{ApiClient, Auth, Query};
use crate::error::ApiResult;
use crate::models::{CourseSuggestion, Trait};

#[derive(Debug, Deserialize)]
struct RecommendationsResponse {
    #[serde(default)]
    recommendations: Vec<RawRecommendation>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRecommendation {
    #[serde(default)]
    course: String,
    #[serde(default)]
    course_fit: Option<f64>,
    #[serde(default)]
    matched_traits: Vec<String>,
    #[serde(default)]
    reason: Option<String>,
}

impl From<RawRecommendation> for CourseSuggestion {
    fn from(raw: RawRecommendation) -> Self {
        let fit = raw
            .course_fit
            .map(|f| f.round().clamp(1.0, 3.0) as u8)
            .unwrap_or(3);
        CourseSuggestion {
            name: raw.course,
            fit,
            matched_traits: raw.matched_traits,
            reason: raw.reason.filter(|r| !r.trim().is_empty()),
        }
    }
}

/// Suggestions plus the backend's note when it has none yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    pub suggestions: Vec<CourseSuggestion>,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProfileApi {
    client: ApiClient,
}

impl ProfileApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn traits(&self) -> ApiResult<Vec<Trait>> {
        self.client
            .get_json("/api/v1/profile/traits", &Query::new(), Auth::Bearer)
            .await
    }

    /// 404 means the user has no profile yet
    pub async fn recommendations(&self, user_id: &str) -> ApiResult<Recommendations> {
        let raw: RecommendationsResponse = self
            .client
            .get_json(
                &format!("/api/v1/recommendations/{}", user_id),
                &Query::new(),
                Auth::None,
            )
            .await?;
        Ok(Recommendations {
            suggestions: raw.recommendations.into_iter().map(Into::into).collect(),
            message: raw.message,
        })
    }
}
