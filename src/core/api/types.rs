use serde::{Deserialize, Serialize};

/// Hard ceiling for post content, enforced client-side before dispatch.
pub const MAX_POST_LEN: usize = 280;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TweetStatus {
    Pending,
    Approved,
    Rejected,
    Posted,
}

impl TweetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TweetStatus::Pending => "pending",
            TweetStatus::Approved => "approved",
            TweetStatus::Rejected => "rejected",
            TweetStatus::Posted => "posted",
        }
    }
}

/// A generated draft post awaiting (or past) human review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tweet {
    pub id: i64,
    pub topic: String,
    pub content: String,
    pub status: TweetStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Informative,
    Witty,
    Professional,
    Casual,
    Provocative,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Informative,
        Tone::Witty,
        Tone::Professional,
        Tone::Casual,
        Tone::Provocative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Informative => "informative",
            Tone::Witty => "witty",
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Provocative => "provocative",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "informative" => Some(Tone::Informative),
            "witty" => Some(Tone::Witty),
            "professional" => Some(Tone::Professional),
            "casual" => Some(Tone::Casual),
            "provocative" => Some(Tone::Provocative),
            _ => None,
        }
    }
}

/// A scraping topic. Older backend rows store a bare name string where newer
/// ones store the full object; both wire shapes normalize into this struct at
/// the deserialization boundary so views never branch on shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TopicWire")]
pub struct Topic {
    pub name: String,
    pub subreddits: Vec<String>,
    pub tone: Tone,
    pub hashtags: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TopicWire {
    Full {
        name: String,
        #[serde(default)]
        subreddits: Vec<String>,
        #[serde(default)]
        tone: Tone,
        #[serde(default)]
        hashtags: Vec<String>,
    },
    Name(String),
}

impl From<TopicWire> for Topic {
    fn from(wire: TopicWire) -> Self {
        match wire {
            TopicWire::Full { name, subreddits, tone, hashtags } => {
                Topic { name, subreddits, tone, hashtags }
            }
            TopicWire::Name(name) => Topic {
                name,
                subreddits: Vec::new(),
                tone: Tone::default(),
                hashtags: Vec::new(),
            },
        }
    }
}

/// Transient job status reported by `GET /scrape/status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScrapeStatus {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub scraped: u64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DashboardStats {
    pub pending: u64,
    pub posted: u64,
    pub total_generated: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    pub topics_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthGrant {
    pub token: String,
    pub user_id: i64,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub telegram_chat_id: Option<i64>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `POST /scrape` acknowledgment. `status` is `"started"` for a fresh job and
/// `"already_running"` when one was in flight; both mean a job is live.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeAck {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateOutcome {
    pub generated: u64,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionAck {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAck {
    pub status: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// `GET /settings` view. Secret values never cross the wire; only the
/// per-secret `*_set` flags do.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsView {
    #[serde(default)]
    pub reddit_client_id: Option<String>,
    #[serde(default)]
    pub reddit_client_secret_set: bool,
    #[serde(default)]
    pub twitter_api_key: Option<String>,
    #[serde(default)]
    pub twitter_api_secret_set: bool,
    #[serde(default)]
    pub twitter_access_token: Option<String>,
    #[serde(default)]
    pub twitter_access_token_secret_set: bool,
    #[serde(default)]
    pub telegram_chat_id: Option<i64>,
}

/// Sparse `PUT /settings` body: only fields the user actually filled in are
/// serialized, never empty-string placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reddit_client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reddit_client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_api_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_access_token_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<i64>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.reddit_client_id.is_none()
            && self.reddit_client_secret.is_none()
            && self.twitter_api_key.is_none()
            && self.twitter_api_secret.is_none()
            && self.twitter_access_token.is_none()
            && self.twitter_access_token_secret.is_none()
            && self.telegram_chat_id.is_none()
    }
}

// Envelope shapes for list endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct TopicList {
    pub topics: Vec<Topic>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TweetList {
    pub tweets: Vec<Tweet>,
}
