use tracing::debug;

use crate::core::api::ApiError;
use crate::core::api::types::MAX_POST_LEN;
use crate::core::settings::SettingsForm;
use crate::core::topics::draft_topic;

use super::forms::TextField;
use super::{Banner, DeckApp, EditDraft, Screen, Tab};

impl DeckApp {
    // Auth

    pub(super) async fn submit_auth(&mut self) {
        if self.auth.busy {
            return;
        }
        let email = self.auth.email.value.trim().to_string();
        let password = self.auth.password.value.clone();

        if email.is_empty() {
            self.auth.error = Some("Email is required".to_string());
            return;
        }
        if self.auth.register_mode && password.chars().count() < 6 {
            self.auth.error = Some("Password must be at least 6 characters".to_string());
            return;
        }
        let telegram_chat_id = if self.auth.register_mode {
            let raw = self.auth.telegram_chat_id.value.trim().to_string();
            if raw.is_empty() {
                None
            } else {
                match raw.parse::<i64>() {
                    Ok(id) => Some(id),
                    Err(_) => {
                        self.auth.error = Some("Telegram chat ID must be a number".to_string());
                        return;
                    }
                }
            }
        } else {
            None
        };

        self.auth.busy = true;
        self.auth.error = None;
        let grant = if self.auth.register_mode {
            self.client.register(&email, &password, telegram_chat_id).await
        } else {
            self.client.login(&email, &password).await
        };
        self.auth.busy = false;

        match grant {
            Ok(grant) => {
                self.session.store(&grant.token);
                self.auth.password.clear();
                self.screen = Screen::Deck;
                self.tab = Tab::Dashboard;
                self.enter_deck().await;
            }
            Err(err) => {
                self.auth.error = Some(err.to_string());
            }
        }
    }

    pub(super) fn logout(&mut self) {
        self.poller.cancel();
        self.session.clear();
        self.screen = Screen::Auth;
        self.auth = super::AuthForm::new();
        self.tweets.clear();
        self.history.clear();
        self.topics.clear();
        self.banner = None;
        self.edit = None;
        self.item_errors.clear();
    }

    pub(super) fn expire_to_login(&mut self) {
        self.logout();
        self.auth.error = Some("Session expired. Please log in again.".to_string());
    }

    // Mount / navigation

    /// First render of the deck: fetch dashboard data and adopt any scrape
    /// job the backend already has in flight.
    pub(super) async fn enter_deck(&mut self) {
        self.reload_dashboard().await;
        if let Some(message) = self.poller.discover().await {
            self.banner = Some(Banner::info(message));
        }
    }

    pub(super) async fn switch_tab(&mut self, tab: Tab) {
        if self.tab == tab {
            return;
        }
        self.tab = tab;
        match tab {
            Tab::Dashboard => {
                self.reload_dashboard().await;
                if !self.poller.is_active()
                    && let Some(message) = self.poller.discover().await
                {
                    self.banner = Some(Banner::info(message));
                }
            }
            Tab::Topics => self.load_topics().await,
            Tab::History => self.load_history().await,
            Tab::Settings => self.load_settings().await,
        }
    }

    // Dashboard

    /// Invalidate-and-refetch of everything the dashboard shows.
    pub(super) async fn reload_dashboard(&mut self) {
        let (snapshot, pending) =
            tokio::join!(self.client.dashboard(), self.client.pending_tweets());
        match snapshot {
            Ok(snapshot) => {
                self.stats = snapshot.stats;
                self.topics_count = snapshot.topics_count;
            }
            Err(err) => self.surface_error(err),
        }
        match pending {
            Ok(tweets) => {
                self.tweets = tweets;
                if self.selected >= self.tweets.len() {
                    self.selected = self.tweets.len().saturating_sub(1);
                }
            }
            Err(err) => self.surface_error(err),
        }
    }

    pub(super) async fn trigger_scrape(&mut self) {
        if self.poller.is_active() {
            return;
        }
        self.banner = None;
        match self.poller.start().await {
            Ok(message) => self.banner = Some(Banner::info(message)),
            Err(ApiError::Unauthorized) => {}
            Err(err) => self.banner = Some(Banner::error(format!("Error: {err}"))),
        }
    }

    pub(super) async fn trigger_generate(&mut self) {
        if self.generating || self.poller.is_active() {
            return;
        }
        self.generating = true;
        self.banner = None;
        match self.client.trigger_generation().await {
            Ok(outcome) => {
                self.banner = Some(Banner::success(outcome.message));
                self.reload_dashboard().await;
            }
            Err(ApiError::Unauthorized) => {}
            Err(err) => self.banner = Some(Banner::error(format!("Error: {err}"))),
        }
        self.generating = false;
    }

    pub(super) async fn approve_selected(&mut self) {
        let Some(id) = self.selected_tweet_id() else { return };
        if self.busy_item.is_some() {
            return;
        }
        self.busy_item = Some(id);
        self.item_errors.remove(&id);
        match self.client.approve_tweet(id).await {
            Ok(_) => self.reload_dashboard().await,
            Err(ApiError::Unauthorized) => {}
            Err(err) => {
                self.item_errors.insert(id, err.to_string());
            }
        }
        self.busy_item = None;
    }

    pub(super) async fn reject_selected(&mut self) {
        let Some(id) = self.selected_tweet_id() else { return };
        if self.busy_item.is_some() {
            return;
        }
        self.busy_item = Some(id);
        self.item_errors.remove(&id);
        match self.client.reject_tweet(id).await {
            Ok(_) => self.reload_dashboard().await,
            Err(ApiError::Unauthorized) => {}
            Err(err) => {
                self.item_errors.insert(id, err.to_string());
            }
        }
        self.busy_item = None;
    }

    /// Two-phase edit: the first activation opens the inline editor with the
    /// current content; the second submits it. `cancel_edit` discards.
    pub(super) async fn toggle_edit(&mut self) {
        match self.edit.take() {
            None => {
                let Some(tweet) = self.tweets.get(self.selected) else { return };
                let mut field = TextField::limited(MAX_POST_LEN);
                field.set(tweet.content.clone());
                self.edit = Some(EditDraft { tweet_id: tweet.id, field });
            }
            Some(draft) => {
                self.submit_edit(draft).await;
            }
        }
    }

    async fn submit_edit(&mut self, draft: EditDraft) {
        if self.busy_item.is_some() {
            self.edit = Some(draft);
            return;
        }
        let id = draft.tweet_id;
        self.busy_item = Some(id);
        self.item_errors.remove(&id);
        match self.client.edit_tweet(id, &draft.field.value).await {
            Ok(_) => {
                // Editor closes only on success.
                self.reload_dashboard().await;
            }
            Err(ApiError::Unauthorized) => {}
            Err(err) => {
                self.item_errors.insert(id, err.to_string());
                self.edit = Some(draft);
            }
        }
        self.busy_item = None;
    }

    pub(super) fn cancel_edit(&mut self) {
        // Local-only: drops the draft, original content is untouched.
        self.edit = None;
    }

    // Topics

    pub(super) async fn load_topics(&mut self) {
        match self.client.topics().await {
            Ok(topics) => {
                self.topics = topics;
                if self.topic_selected >= self.topics.len() {
                    self.topic_selected = self.topics.len().saturating_sub(1);
                }
            }
            Err(err) => self.surface_error(err),
        }
    }

    pub(super) async fn submit_topic(&mut self) {
        if self.topic_form.busy {
            return;
        }
        let draft = match draft_topic(
            &self.topic_form.name.value,
            &self.topic_form.subreddits.value,
            self.topic_form.tone(),
            &self.topic_form.hashtags.value,
        ) {
            Ok(draft) => draft,
            Err(err) => {
                self.topic_form.error = Some(err.to_string());
                return;
            }
        };

        self.topic_form.busy = true;
        self.topic_form.error = None;
        match self.client.add_topic(&draft).await {
            Ok(topics) => {
                self.topics = topics;
                self.topic_form.reset();
            }
            Err(ApiError::Unauthorized) => {}
            Err(err) => self.topic_form.error = Some(err.to_string()),
        }
        self.topic_form.busy = false;
    }

    pub(super) async fn remove_selected_topic(&mut self) {
        if self.topic_form.busy {
            return;
        }
        let Some(topic) = self.topics.get(self.topic_selected) else { return };
        let name = topic.name.clone();

        self.topic_form.busy = true;
        match self.client.remove_topic(&name).await {
            Ok(topics) => {
                self.topics = topics;
                if self.topic_selected >= self.topics.len() {
                    self.topic_selected = self.topics.len().saturating_sub(1);
                }
            }
            Err(ApiError::Unauthorized) => {}
            Err(err) => self.topic_form.error = Some(err.to_string()),
        }
        self.topic_form.busy = false;
    }

    // History

    pub(super) async fn load_history(&mut self) {
        match self.client.tweet_history(50).await {
            Ok(history) => {
                self.history = history;
                self.history_offset = 0;
            }
            Err(err) => self.surface_error(err),
        }
    }

    // Settings

    pub(super) async fn load_settings(&mut self) {
        match self.client.settings().await {
            Ok(view) => {
                let (form, flags) = SettingsForm::hydrate(&view);
                self.settings.fields[0].set(form.reddit_client_id);
                self.settings.fields[1].clear();
                self.settings.fields[2].set(form.twitter_api_key);
                self.settings.fields[3].clear();
                self.settings.fields[4].set(form.twitter_access_token);
                self.settings.fields[5].clear();
                self.settings.fields[6].set(form.telegram_chat_id);
                self.settings.flags = flags;
                self.settings.banner = None;
            }
            Err(err) => self.surface_error(err),
        }
    }

    pub(super) async fn save_settings(&mut self) {
        if self.settings.busy {
            return;
        }
        let mut form = SettingsForm {
            reddit_client_id: self.settings.fields[0].value.clone(),
            reddit_client_secret: self.settings.fields[1].value.clone(),
            twitter_api_key: self.settings.fields[2].value.clone(),
            twitter_api_secret: self.settings.fields[3].value.clone(),
            twitter_access_token: self.settings.fields[4].value.clone(),
            twitter_access_token_secret: self.settings.fields[5].value.clone(),
            telegram_chat_id: self.settings.fields[6].value.clone(),
        };
        let patch = match form.to_patch() {
            Ok(patch) => patch,
            Err(err) => {
                self.settings.banner = Some(Banner::error(err.to_string()));
                return;
            }
        };
        if patch.is_empty() {
            self.settings.banner = Some(Banner::info("Nothing to update"));
            return;
        }

        self.settings.busy = true;
        match self.client.update_settings(&patch).await {
            Ok(ack) => {
                form.apply_saved(&mut self.settings.flags);
                self.settings.fields[1].clear();
                self.settings.fields[3].clear();
                self.settings.fields[5].clear();
                self.settings.banner =
                    Some(Banner::success(format!("Settings updated: {}", ack.fields.join(", "))));
            }
            Err(ApiError::Unauthorized) => {}
            Err(err) => self.settings.banner = Some(Banner::error(err.to_string())),
        }
        self.settings.busy = false;
    }

    // Shared

    fn surface_error(&mut self, err: ApiError) {
        match err {
            // The 401 hook already queued the return to the login screen.
            ApiError::Unauthorized => debug!("request aborted by session expiry"),
            other => self.banner = Some(Banner::error(other.to_string())),
        }
    }
}
