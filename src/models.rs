use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Metadata the backend attaches to an uploaded file.
#[derive(Deserialize, Clone, PartialEq, Debug, Default)]
#[serde(default)]
pub struct FileData {
    pub filename: String,
    pub size: u64,
    pub extension: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub preview_url: Option<String>,
}

impl FileData {
    pub fn is_image(&self) -> bool {
        self.kind == "image"
    }
}

/// One stored message as returned by the history endpoint.
#[derive(Deserialize, Clone, PartialEq, Debug)]
pub struct HistoryMessage {
    #[serde(rename = "type")]
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub file_data: Option<FileData>,
}

/// Remaining message allowance; the backend sends `-1` for unlimited.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(from = "i64", into = "i64")]
pub enum QuotaState {
    #[default]
    Unlimited,
    Remaining(u32),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum QuotaTier {
    Unlimited,
    Normal,
    Low,
    Exhausted,
}

impl QuotaState {
    pub const UNLIMITED_SENTINEL: i64 = -1;
    pub const LOW_THRESHOLD: u32 = 5;

    pub fn tier(&self) -> QuotaTier {
        match *self {
            QuotaState::Unlimited => QuotaTier::Unlimited,
            QuotaState::Remaining(0) => QuotaTier::Exhausted,
            QuotaState::Remaining(n) if n <= Self::LOW_THRESHOLD => QuotaTier::Low,
            QuotaState::Remaining(_) => QuotaTier::Normal,
        }
    }

    pub fn label(&self) -> String {
        match self {
            QuotaState::Unlimited => "Unlimited".to_string(),
            QuotaState::Remaining(n) => n.to_string(),
        }
    }
}

impl QuotaTier {
    pub fn css_class(&self) -> &'static str {
        match self {
            QuotaTier::Unlimited => "text-success",
            QuotaTier::Normal => "text-muted",
            QuotaTier::Low => "text-warning",
            QuotaTier::Exhausted => "text-danger",
        }
    }
}

impl From<i64> for QuotaState {
    fn from(raw: i64) -> Self {
        if raw == Self::UNLIMITED_SENTINEL {
            QuotaState::Unlimited
        } else {
            QuotaState::Remaining(raw.clamp(0, u32::MAX as i64) as u32)
        }
    }
}

impl From<QuotaState> for i64 {
    fn from(quota: QuotaState) -> Self {
        match quota {
            QuotaState::Unlimited => QuotaState::UNLIMITED_SENTINEL,
            QuotaState::Remaining(n) => n as i64,
        }
    }
}

/// Stored in local storage as `dark` or `light`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn parse(raw: &str) -> Option<Theme> {
        match raw {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Icon class and tooltip of the theme toggle. Always names the theme a
/// click would switch to.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ThemeHint {
    pub icon: &'static str,
    pub title: &'static str,
}

impl From<Theme> for ThemeHint {
    fn from(current: Theme) -> Self {
        match current {
            Theme::Dark => ThemeHint { icon: "fas fa-sun", title: "Switch to Light Theme" },
            Theme::Light => ThemeHint { icon: "fas fa-moon", title: "Switch to Dark Theme" },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct ModelOption {
    pub id: String,
    pub label: String,
}

// API DTOs
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SendMessageRequest {
    pub message: String,
    pub model: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ReplyResponse {
    pub response: String,
    #[serde(default)]
    pub messages_remaining: QuotaState,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub results: String,
    #[serde(default)]
    pub messages_remaining: QuotaState,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct UploadResponse {
    pub response: String,
    #[serde(default)]
    pub file_info: Option<FileData>,
    #[serde(default)]
    pub messages_remaining: QuotaState,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct HistoryResponse {
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
    #[serde(default)]
    pub messages_remaining: QuotaState,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ModelPreference {
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}
