//! Data model shared by the API wrappers, the view state and the TUI
//!
//! All records arrive here already normalized by `api::normalize`: the
//! backend's `_id` spelling has been folded into `id`, so view code only ever
//! sees one identity field.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Signed-in user, cached client-side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: String,
}

/// Access/refresh token pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub institution_name: String,
    #[serde(default)]
    pub institution_country: String,
    #[serde(default)]
    pub institution_type: String,
    #[serde(default)]
    pub world_rank: Option<u32>,
    #[serde(default)]
    pub malaysia_rank: Option<u32>,
    #[serde(default, deserialize_with = "de_string_ids")]
    pub program_ids: Vec<String>,
}

/// Fee breakdown. Only the three well-known components feed the cost
/// estimate; anything else the backend sends is kept in `other`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fees {
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub registration_fee: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub resource_fee: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub tuition_fee: Option<f64>,
    #[serde(flatten)]
    pub other: HashMap<String, Value>,
}

pub const DEFAULT_INTAKES: &str = "Jan, Sep";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    #[serde(default)]
    pub program_name: String,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub intakes: Option<Vec<String>>,
    #[serde(default)]
    pub program_duration_years: Option<f64>,
    #[serde(default)]
    pub internship: Option<String>,
    #[serde(default)]
    pub program_type: Option<String>,
    #[serde(default)]
    pub fees: Option<Fees>,
    #[serde(default)]
    pub institution: Option<Institution>,
    /// Entry requirements, course content and other loosely shaped fields
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Program {
    pub fn institution_name(&self) -> &str {
        self.institution
            .as_ref()
            .map(|i| i.institution_name.as_str())
            .unwrap_or("")
    }

    /// Intake months for display, `Jan, Sep` when the backend has none
    pub fn intakes_label(&self) -> String {
        match &self.intakes {
            Some(intakes) if !intakes.is_empty() => intakes.join(", "),
            _ => DEFAULT_INTAKES.to_string(),
        }
    }
}

/// Alphabetical order by institution name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Az,
    Za,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Az => "az",
            SortOrder::Za => "za",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Az => "A → Z",
            SortOrder::Za => "Z → A",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "az" => Some(SortOrder::Az),
            "za" => Some(SortOrder::Za),
            _ => None,
        }
    }
}

/// One page of catalog results
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: usize,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default)]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramList {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "de_string_ids")]
    pub program_ids: Vec<String>,
    #[serde(default, deserialize_with = "de_opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_opt_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgramList {
    /// Membership test; ids are always compared as strings
    pub fn contains(&self, program_id: &str) -> bool {
        self.program_ids.iter().any(|id| id == program_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateProgramList {
    pub title: String,
    pub emoji: String,
    pub user_id: String,
    pub program_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateProgramList {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_ids: Option<Vec<String>>,
}

/// Psychometric/academic attribute inferred by the profile service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trait {
    #[serde(rename = "trait")]
    pub trait_key: String,
    pub label: String,
    #[serde(default)]
    pub label_description: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourseSuggestion {
    pub name: String,
    /// 1 = best fit .. 3 = lowest fit
    pub fit: u8,
    pub matched_traits: Vec<String>,
    pub reason: Option<String>,
}

/// Side-channel notice attached to an assistant turn (e.g. profile updated)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
    pub alert: Vec<Alert>,
}

// ---------------------------------------------------------------------------
// Lenient field decoders
// ---------------------------------------------------------------------------

/// Accepts a list of strings or numbers and yields strings
fn de_string_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect())
}

/// Accepts numbers, numeric strings or null
fn de_opt_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.replace(',', "").trim().parse().ok(),
        _ => None,
    })
}

pub(crate) fn de_opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Parse RFC 3339 or the backend's naive UTC `isoformat()` output
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
