pub mod types;

use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::core::session::Session;
use self::types::{
    ActionAck, AuthGrant, DashboardSnapshot, GenerateOutcome, MAX_POST_LEN, ScrapeAck,
    ScrapeStatus, SettingsPatch, SettingsView, Topic, TopicList, Tweet, TweetList, UpdateAck,
    UserProfile,
};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api";

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 anywhere: the session has already been expired by the time this
    /// surfaces; the operation is aborted.
    #[error("Unauthorized")]
    Unauthorized,
    /// Non-2xx with a message body; shown to the user verbatim.
    #[error("{0}")]
    Rejected(String),
    /// The request failed before a response arrived.
    #[error("network error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

/// Typed client for the draft-post backend. Attaches the session's bearer
/// token to every request and funnels every 401 through `Session::expire`.
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(session: Arc<Session>) -> Self {
        let base = std::env::var("DRAFTDECK_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self::with_base(base, session)
    }

    pub fn with_base(base: impl Into<String>, session: Arc<Session>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let req = match self.session.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        };

        let res = req.send().await?;
        let status = res.status();

        if status == StatusCode::UNAUTHORIZED {
            self.session.expire();
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let detail = res
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("detail")
                        .and_then(|d| d.as_str())
                        .map(|d| d.to_string())
                })
                .unwrap_or_else(|| format!("Request failed: {}", status.as_u16()));
            debug!("request rejected ({}): {}", status, detail);
            return Err(ApiError::Rejected(detail));
        }

        Ok(res.json::<T>().await?)
    }

    // Auth

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        telegram_chat_id: Option<i64>,
    ) -> Result<AuthGrant, ApiError> {
        let mut body = serde_json::json!({ "email": email, "password": password });
        if let Some(chat_id) = telegram_chat_id {
            body["telegram_chat_id"] = chat_id.into();
        }
        self.send(self.http.post(self.url("/register")).json(&body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.send(self.http.post(self.url("/login")).json(&body)).await
    }

    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.send(self.http.get(self.url("/me"))).await
    }

    // Topics

    pub async fn topics(&self) -> Result<Vec<Topic>, ApiError> {
        let list: TopicList = self.send(self.http.get(self.url("/topics"))).await?;
        Ok(list.topics)
    }

    pub async fn add_topic(&self, topic: &Topic) -> Result<Vec<Topic>, ApiError> {
        let list: TopicList = self
            .send(self.http.post(self.url("/topics")).json(topic))
            .await?;
        Ok(list.topics)
    }

    pub async fn remove_topic(&self, name: &str) -> Result<Vec<Topic>, ApiError> {
        let path = format!("/topics/{}", urlencoding::encode(name));
        let list: TopicList = self.send(self.http.delete(self.url(&path))).await?;
        Ok(list.topics)
    }

    // Tweets

    pub async fn pending_tweets(&self) -> Result<Vec<Tweet>, ApiError> {
        let list: TweetList = self.send(self.http.get(self.url("/tweets/pending"))).await?;
        Ok(list.tweets)
    }

    pub async fn tweet_history(&self, limit: u32) -> Result<Vec<Tweet>, ApiError> {
        let path = format!("/tweets/history?limit={limit}");
        let list: TweetList = self.send(self.http.get(self.url(&path))).await?;
        Ok(list.tweets)
    }

    pub async fn approve_tweet(&self, id: i64) -> Result<ActionAck, ApiError> {
        self.send(self.http.post(self.url(&format!("/tweets/{id}/approve")))).await
    }

    pub async fn reject_tweet(&self, id: i64) -> Result<ActionAck, ApiError> {
        self.send(self.http.post(self.url(&format!("/tweets/{id}/reject")))).await
    }

    pub async fn edit_tweet(&self, id: i64, content: &str) -> Result<ActionAck, ApiError> {
        if content.chars().count() > MAX_POST_LEN {
            return Err(ApiError::Rejected(format!(
                "Content exceeds {MAX_POST_LEN} characters"
            )));
        }
        let body = serde_json::json!({ "content": content });
        self.send(
            self.http
                .post(self.url(&format!("/tweets/{id}/edit")))
                .json(&body),
        )
        .await
    }

    // Dashboard & pipeline

    pub async fn dashboard(&self) -> Result<DashboardSnapshot, ApiError> {
        self.send(self.http.get(self.url("/dashboard"))).await
    }

    pub async fn trigger_generation(&self) -> Result<GenerateOutcome, ApiError> {
        self.send(self.http.post(self.url("/generate"))).await
    }

    pub async fn trigger_scrape(&self) -> Result<ScrapeAck, ApiError> {
        self.send(self.http.post(self.url("/scrape"))).await
    }

    pub async fn scrape_status(&self) -> Result<ScrapeStatus, ApiError> {
        self.send(self.http.get(self.url("/scrape/status"))).await
    }

    // Settings

    pub async fn settings(&self) -> Result<SettingsView, ApiError> {
        self.send(self.http.get(self.url("/settings"))).await
    }

    pub async fn update_settings(&self, patch: &SettingsPatch) -> Result<UpdateAck, ApiError> {
        self.send(self.http.put(self.url("/settings")).json(patch)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{delete, get, put};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend");
        });
        format!("http://{addr}/api")
    }

    fn client_with(base: String, token: Option<&str>) -> ApiClient {
        let session = Arc::new(Session::in_memory());
        if let Some(token) = token {
            session.store(token);
        }
        ApiClient::with_base(base, session)
    }

    #[tokio::test]
    async fn bearer_token_is_attached_when_present() {
        let app = Router::new().route(
            "/api/me",
            get(|headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                if auth == "Bearer t0k3n" {
                    (
                        StatusCode::OK,
                        axum::Json(serde_json::json!({
                            "id": 1, "email": "a@b.c", "telegram_chat_id": null,
                            "topics": [], "active": true, "created_at": null
                        })),
                    )
                } else {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        axum::Json(serde_json::json!({"detail": format!("bad auth: {auth}")})),
                    )
                }
            }),
        );
        let client = client_with(serve(app).await, Some("t0k3n"));
        let profile = client.me().await.expect("authorized request");
        assert_eq!(profile.email, "a@b.c");
    }

    #[tokio::test]
    async fn unauthorized_clears_session_and_fires_hook() {
        let app = Router::new().route(
            "/api/tweets/pending",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(serde_json::json!({"detail": "Invalid or expired token"})),
                )
            }),
        );
        let client = client_with(serve(app).await, Some("stale"));

        let redirected = Arc::new(AtomicBool::new(false));
        let observed = redirected.clone();
        client.session().on_unauthorized(move || {
            observed.store(true, Ordering::SeqCst);
        });

        let err = client.pending_tweets().await.expect_err("401 must abort");
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(!client.session().is_logged_in(), "token must be cleared");
        assert!(redirected.load(Ordering::SeqCst), "hook must fire");
    }

    #[tokio::test]
    async fn rejection_surfaces_detail_message() {
        let app = Router::new().route(
            "/api/scrape",
            axum::routing::post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    axum::Json(serde_json::json!({
                        "detail": "No topics configured. Add topics first."
                    })),
                )
            }),
        );
        let client = client_with(serve(app).await, Some("t0k3n"));
        let err = client.trigger_scrape().await.expect_err("400 must reject");
        match err {
            ApiError::Rejected(msg) => assert_eq!(msg, "No topics configured. Add topics first."),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejection_without_json_body_falls_back_to_status() {
        let app = Router::new().route(
            "/api/dashboard",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream died") }),
        );
        let client = client_with(serve(app).await, Some("t0k3n"));
        let err = client.dashboard().await.expect_err("502 must reject");
        match err {
            ApiError::Rejected(msg) => assert_eq!(msg, "Request failed: 502"),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sparse_settings_update_sends_only_set_fields() {
        let captured: Arc<Mutex<Option<serde_json::Value>>> = Arc::new(Mutex::new(None));
        let sink = captured.clone();
        let app = Router::new().route(
            "/api/settings",
            put(move |body: axum::Json<serde_json::Value>| {
                let sink = sink.clone();
                async move {
                    *sink.lock().unwrap() = Some(body.0);
                    axum::Json(serde_json::json!({
                        "status": "updated", "fields": ["telegram_chat_id"]
                    }))
                }
            }),
        );
        let client = client_with(serve(app).await, Some("t0k3n"));

        let patch = SettingsPatch {
            telegram_chat_id: Some(42),
            ..SettingsPatch::default()
        };
        let ack = client.update_settings(&patch).await.expect("update");
        assert_eq!(ack.fields, vec!["telegram_chat_id"]);

        let body = captured.lock().unwrap().take().expect("body captured");
        assert_eq!(body, serde_json::json!({"telegram_chat_id": 42}));
    }

    #[tokio::test]
    async fn remove_topic_url_encodes_the_name() {
        let captured: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let sink = captured.clone();
        let app = Router::new().route(
            "/api/topics/{name}",
            delete(move |Path(name): Path<String>| {
                let sink = sink.clone();
                async move {
                    *sink.lock().unwrap() = Some(name);
                    axum::Json(serde_json::json!({"topics": []}))
                }
            }),
        );
        let client = client_with(serve(app).await, Some("t0k3n"));

        let topics = client.remove_topic("AI & Robotics").await.expect("remove");
        assert!(topics.is_empty());
        assert_eq!(
            captured.lock().unwrap().take().as_deref(),
            Some("AI & Robotics"),
            "server must see the decoded original name"
        );
    }

    #[tokio::test]
    async fn edit_rejects_oversized_content_before_dispatch() {
        // Unroutable base: reaching the network would fail with Transport.
        let client = client_with("http://127.0.0.1:9/api".to_string(), Some("t0k3n"));
        let oversized = "x".repeat(MAX_POST_LEN + 1);
        let err = client.edit_tweet(1, &oversized).await.expect_err("too long");
        assert!(matches!(err, ApiError::Rejected(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn transport_failure_maps_to_transport_error() {
        let client = client_with("http://127.0.0.1:9/api".to_string(), Some("t0k3n"));
        let err = client.scrape_status().await.expect_err("unreachable");
        assert!(err.is_transport(), "got {err:?}");
    }

    #[tokio::test]
    async fn mixed_topic_shapes_normalize_through_the_client() {
        let app = Router::new().route(
            "/api/topics",
            get(|| async {
                axum::Json(serde_json::json!({
                    "topics": ["legacy", {"name": "Rust", "subreddits": ["rust"], "tone": "witty", "hashtags": []}]
                }))
            }),
        );
        let client = client_with(serve(app).await, Some("t0k3n"));
        let topics = client.topics().await.expect("topics");
        assert_eq!(topics[0].name, "legacy");
        assert_eq!(topics[1].subreddits, vec!["rust"]);
    }
}
