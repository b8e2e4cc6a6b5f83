mod actions;
mod events;
mod forms;
mod ui;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;

use crate::core::api::ApiClient;
use crate::core::api::types::{DashboardStats, Tone, Tweet};
use crate::core::poller::ScrapePoller;
use crate::core::session::Session;
use crate::core::settings::SecretFlags;

use forms::TextField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Auth,
    Deck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tab {
    Dashboard,
    Topics,
    History,
    Settings,
}

impl Tab {
    pub(crate) const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Topics, Tab::History, Tab::Settings];

    pub(crate) fn title(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Topics => "Topics",
            Tab::History => "History",
            Tab::Settings => "Settings",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BannerKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub(crate) struct Banner {
    pub text: String,
    pub kind: BannerKind,
}

impl Banner {
    fn info(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: BannerKind::Info }
    }

    fn success(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: BannerKind::Success }
    }

    fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: BannerKind::Error }
    }
}

/// Login / registration gate.
pub(crate) struct AuthForm {
    pub register_mode: bool,
    pub email: TextField,
    pub password: TextField,
    pub telegram_chat_id: TextField,
    pub focus: usize,
    pub error: Option<String>,
    pub busy: bool,
}

impl AuthForm {
    fn new() -> Self {
        Self {
            register_mode: false,
            email: TextField::new(),
            password: TextField::masked(),
            telegram_chat_id: TextField::new(),
            focus: 0,
            error: None,
            busy: false,
        }
    }

    fn field_count(&self) -> usize {
        if self.register_mode { 3 } else { 2 }
    }

    fn focused_field(&mut self) -> &mut TextField {
        match self.focus {
            0 => &mut self.email,
            1 => &mut self.password,
            _ => &mut self.telegram_chat_id,
        }
    }
}

/// Add-topic form; `focus == None` means the topic list has the keyboard.
pub(crate) struct TopicForm {
    pub name: TextField,
    pub subreddits: TextField,
    pub tone_idx: usize,
    pub hashtags: TextField,
    pub focus: Option<usize>,
    pub error: Option<String>,
    pub busy: bool,
}

impl TopicForm {
    fn new() -> Self {
        Self {
            name: TextField::new(),
            subreddits: TextField::new(),
            tone_idx: 0,
            hashtags: TextField::new(),
            focus: Some(0),
            error: None,
            busy: false,
        }
    }

    pub(crate) fn tone(&self) -> Tone {
        Tone::ALL[self.tone_idx % Tone::ALL.len()]
    }

    fn reset(&mut self) {
        self.name.clear();
        self.subreddits.clear();
        self.hashtags.clear();
        self.tone_idx = 0;
        self.error = None;
    }
}

pub(crate) const SETTINGS_FIELDS: [&str; 7] = [
    "Reddit client ID",
    "Reddit client secret",
    "Twitter API key",
    "Twitter API secret",
    "Twitter access token",
    "Twitter access token secret",
    "Telegram chat ID",
];

/// Credential settings tab. Secret inputs (indices 1, 3, 5) are masked and
/// never repopulated from the backend.
pub(crate) struct SettingsTab {
    pub fields: [TextField; 7],
    pub flags: SecretFlags,
    pub focus: usize,
    pub banner: Option<Banner>,
    pub busy: bool,
}

impl SettingsTab {
    fn new() -> Self {
        let fields = [
            TextField::new(),
            TextField::masked(),
            TextField::new(),
            TextField::masked(),
            TextField::new(),
            TextField::masked(),
            TextField::new(),
        ];
        Self { fields, flags: SecretFlags::default(), focus: 0, banner: None, busy: false }
    }

    pub(crate) fn is_secret(index: usize) -> bool {
        matches!(index, 1 | 3 | 5)
    }

    pub(crate) fn flag_for(&self, index: usize) -> Option<bool> {
        match index {
            1 => Some(self.flags.reddit_client_secret),
            3 => Some(self.flags.twitter_api_secret),
            5 => Some(self.flags.twitter_access_token_secret),
            _ => None,
        }
    }
}

/// Inline editor for one pending tweet (second phase of the edit action).
pub(crate) struct EditDraft {
    pub tweet_id: i64,
    pub field: TextField,
}

pub(crate) struct DeckApp {
    pub client: Arc<ApiClient>,
    pub session: Arc<Session>,
    session_expired: Arc<AtomicBool>,

    pub screen: Screen,
    pub tab: Tab,
    pub should_quit: bool,
    mounted: bool,

    pub auth: AuthForm,

    // Dashboard view
    pub stats: DashboardStats,
    pub topics_count: u64,
    pub tweets: Vec<Tweet>,
    pub selected: usize,
    pub busy_item: Option<i64>,
    pub item_errors: HashMap<i64, String>,
    pub edit: Option<EditDraft>,
    pub banner: Option<Banner>,
    pub generating: bool,
    pub poller: ScrapePoller,

    // Topics view
    pub topics: Vec<crate::core::api::types::Topic>,
    pub topic_selected: usize,
    pub topic_form: TopicForm,

    // History view
    pub history: Vec<Tweet>,
    pub history_offset: usize,

    // Settings view
    pub settings: SettingsTab,
}

impl DeckApp {
    pub(crate) fn new(
        client: Arc<ApiClient>,
        session: Arc<Session>,
        session_expired: Arc<AtomicBool>,
    ) -> Self {
        let screen = if session.is_logged_in() { Screen::Deck } else { Screen::Auth };
        let poller = ScrapePoller::new(client.clone());
        Self {
            client,
            session,
            session_expired,
            screen,
            tab: Tab::Dashboard,
            should_quit: false,
            mounted: false,
            auth: AuthForm::new(),
            stats: DashboardStats::default(),
            topics_count: 0,
            tweets: Vec::new(),
            selected: 0,
            busy_item: None,
            item_errors: HashMap::new(),
            edit: None,
            banner: None,
            generating: false,
            poller,
            topics: Vec::new(),
            topic_selected: 0,
            topic_form: TopicForm::new(),
            history: Vec::new(),
            history_offset: 0,
            settings: SettingsTab::new(),
        }
    }

    pub(crate) fn selected_tweet_id(&self) -> Option<i64> {
        self.tweets.get(self.selected).map(|t| t.id)
    }

    fn take_session_expired(&self) -> bool {
        self.session_expired.swap(false, Ordering::SeqCst)
    }
}

/// TUI entry point: wires the 401 hook and runs the event loop to completion.
pub async fn run(client: Arc<ApiClient>, session: Arc<Session>) -> Result<()> {
    let expired = Arc::new(AtomicBool::new(false));
    {
        let flag = expired.clone();
        session.on_unauthorized(move || {
            flag.store(true, Ordering::SeqCst);
        });
    }
    let mut app = DeckApp::new(client, session, expired);
    app.run_tui().await
}
