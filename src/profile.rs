//! Profile view data: inferred traits and course suggestions
//!
//! The two sections load side by side and fail independently.

use crate::api::profile::{ProfileApi, Recommendations};
use crate::error::ApiResult;
use crate::models::Trait;

/// Loading state of one independently fetched section
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Section<T> {
    #[default]
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Section<T> {
    pub fn from_result(result: ApiResult<T>, what: &str) -> Self {
        match result {
            Ok(value) => Section::Loaded(value),
            Err(e) => {
                tracing::warn!("Loading {} failed: {}", what, e);
                Section::Failed(format!("Failed to load {}", what))
            }
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Section::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileData {
    pub traits: Section<Vec<Trait>>,
    pub recommendations: Section<Recommendations>,
}

#[derive(Debug, Clone)]
pub struct ProfileLoader {
    api: ProfileApi,
}

impl ProfileLoader {
    pub fn new(api: ProfileApi) -> Self {
        Self { api }
    }

    /// Fetch both sections concurrently
    pub async fn load(&self, user_id: &str) -> ProfileData {
        let (traits, recommendations) =
            tokio::join!(self.api.traits(), self.api.recommendations(user_id));
        ProfileData {
            traits: Section::from_result(traits, "traits"),
            recommendations: Section::from_result(recommendations, "recommendations"),
        }
    }
}

/// `learning_style` -> `LEARNING STYLE`
pub fn format_trait(key: &str) -> String {
    key.replace('_', " ").to_uppercase()
}

/// Icon and accent colour of a known trait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraitStyle {
    pub icon: &'static str,
    pub color: (u8, u8, u8),
}

pub fn trait_style(key: &str) -> Option<TraitStyle> {
    let (icon, color) = match key {
        "goal" => ("🎯", (0x80, 0x8F, 0x85)),
        "academic_strengths" => ("🎓", (0x2B, 0x59, 0xC3)),
        "learning_style" => ("🧠", (0x00, 0x4F, 0x2D)),
        "motivation" => ("⚡", (0xC8, 0x9F, 0xA3)),
        "decision_driver" => ("🧭", (0x4C, 0x57, 0x60)),
        "financial_need_level" => ("🐷", (0x86, 0xBB, 0xD8)),
        "geographic_openness" => ("🌏", (0x89, 0x63, 0xBA)),
        "brand_affinity" => ("📣", (0x8C, 0x2F, 0x39)),
        "personality_orientation" => ("🧩", (0xFC, 0xAA, 0x67)),
        _ => return None,
    };
    Some(TraitStyle { icon, color })
}

/// How strongly a suggested course matches; 1 is the strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FitTier {
    Strong = 1,
    Good = 2,
    Fair = 3,
}

impl FitTier {
    /// Out-of-range values count as the weakest tier
    pub fn from_fit(fit: u8) -> Self {
        match fit {
            0 | 1 => FitTier::Strong,
            2 => FitTier::Good,
            _ => FitTier::Fair,
        }
    }

    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            FitTier::Strong => (0x88, 0x64, 0x8d),
            FitTier::Good => (0xbb, 0xa7, 0xbe),
            FitTier::Fair => (0xee, 0xe9, 0xef),
        }
    }

    /// Light pills need dark text
    pub fn text_color(&self) -> (u8, u8, u8) {
        match self {
            FitTier::Fair => (0x7c, 0x4a, 0x99),
            _ => (0xff, 0xff, 0xff),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FitTier::Strong => "Strong fit",
            FitTier::Good => "Good fit",
            FitTier::Fair => "Fair fit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_format_trait() {
        assert_eq!(format_trait("financial_need_level"), "FINANCIAL NEED LEVEL");
        assert_eq!(format_trait("goal"), "GOAL");
    }

    #[test]
    fn test_known_traits_have_style() {
        for key in [
            "goal",
            "academic_strengths",
            "learning_style",
            "motivation",
            "decision_driver",
            "financial_need_level",
            "geographic_openness",
            "brand_affinity",
            "personality_orientation",
        ] {
            assert!(trait_style(key).is_some(), "{key}");
        }
        assert!(trait_style("unknown").is_none());
    }

    #[test]
    fn test_fit_tiers_are_ordered() {
        assert_eq!(FitTier::from_fit(1), FitTier::Strong);
        assert_eq!(FitTier::from_fit(2), FitTier::Good);
        assert_eq!(FitTier::from_fit(9), FitTier::Fair);
        assert!(FitTier::Strong < FitTier::Fair);
        assert_eq!(FitTier::Strong.color(), (0x88, 0x64, 0x8d));
    }

    #[test]
    fn test_sections_fail_independently() {
        let traits: Section<Vec<Trait>> = Section::from_result(Ok(vec![]), "traits");
        let recs: Section<Recommendations> =
            Section::from_result(Err(ApiError::NotFound("Profile not found".into())), "recommendations");
        let data = ProfileData {
            traits,
            recommendations: recs,
        };
        assert!(data.traits.loaded().is_some());
        assert_eq!(
            data.recommendations,
            Section::Failed("Failed to load recommendations".to_string())
        );
    }
}
