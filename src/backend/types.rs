use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::history::{self, HistoryEntry};

/// Explanation depth preset sent with every explain request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Student,
    Enthusiast,
    Expert,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Student, Level::Enthusiast, Level::Expert];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Student => "student",
            Level::Enthusiast => "enthusiast",
            Level::Expert => "expert",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::Student => "Student",
            Level::Enthusiast => "Enthusiast",
            Level::Expert => "Expert",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == value)
    }
}

/// Display language for generated explanations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Mr,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Hi, Language::Mr];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Mr => "mr",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Mr => "Marathi",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|language| language.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Positive,
    Negative,
}

#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ExplainRequest<'a> {
    pub term: &'a str,
    pub level: Level,
    pub language: Language,
}

/// Body of a completed explain call.
///
/// The generator reports its own failures inside a 200 response through
/// `error`; callers must check it before trusting `explanation`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExplainResponse {
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default, alias = "related_terms")]
    pub relative_terms: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(skip)]
    pub raw: Value,
}

impl ExplainResponse {
    pub fn from_value(raw: Value) -> serde_json::Result<Self> {
        let mut parsed: ExplainResponse = serde_json::from_value(raw.clone())?;
        parsed.raw = raw;
        Ok(parsed)
    }
}

#[derive(Debug, Serialize)]
pub struct FeedbackRequest<'a> {
    pub term: &'a str,
    pub rating: Rating,
    pub reason: &'a str,
    pub explanation: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SaveRequest<'a> {
    pub term: &'a str,
    pub explanation: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SavedExplanation {
    pub term: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub saved_at: Option<String>,
}

/// Account record as listed by `/admin/users`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUser {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "history::deserialize_entries")]
    pub search_history: Vec<HistoryEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub saved_items: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub feedback: Vec<FeedbackItem>,
}

impl AdminUser {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }

    pub fn role_label(&self) -> &str {
        self.role.as_deref().unwrap_or("user")
    }
}

pub const GUEST_EMAIL: &str = "guest";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackItem {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl FeedbackItem {
    pub fn is_guest(&self) -> bool {
        self.user_email == GUEST_EMAIL
    }

    pub fn rating(&self) -> Option<Rating> {
        match self.rating.as_str() {
            "positive" => Some(Rating::Positive),
            "negative" => Some(Rating::Negative),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
