//! Credential settings form: sparse updates and secret redaction.

use anyhow::{Result, bail};

use crate::core::api::types::{SettingsPatch, SettingsView};

/// Editable text fields of the settings form. Secret fields start blank and
/// are cleared again after every successful save; the stored values are
/// represented only by [`SecretFlags`].
#[derive(Debug, Clone, Default)]
pub struct SettingsForm {
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub twitter_api_key: String,
    pub twitter_api_secret: String,
    pub twitter_access_token: String,
    pub twitter_access_token_secret: String,
    pub telegram_chat_id: String,
}

/// Which secrets the backend currently has on file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecretFlags {
    pub reddit_client_secret: bool,
    pub twitter_api_secret: bool,
    pub twitter_access_token_secret: bool,
}

impl SettingsForm {
    /// Populate the form from a fetched view. Secret inputs stay blank.
    pub fn hydrate(view: &SettingsView) -> (Self, SecretFlags) {
        let form = Self {
            reddit_client_id: view.reddit_client_id.clone().unwrap_or_default(),
            twitter_api_key: view.twitter_api_key.clone().unwrap_or_default(),
            twitter_access_token: view.twitter_access_token.clone().unwrap_or_default(),
            telegram_chat_id: view.telegram_chat_id.map(|id| id.to_string()).unwrap_or_default(),
            ..Self::default()
        };
        let flags = SecretFlags {
            reddit_client_secret: view.reddit_client_secret_set,
            twitter_api_secret: view.twitter_api_secret_set,
            twitter_access_token_secret: view.twitter_access_token_secret_set,
        };
        (form, flags)
    }

    /// Build the sparse update body: only non-empty fields are included, and
    /// the Telegram chat id must parse as an integer before dispatch.
    pub fn to_patch(&self) -> Result<SettingsPatch> {
        fn set(value: &str) -> Option<String> {
            let trimmed = value.trim();
            if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
        }

        let telegram_chat_id = match set(&self.telegram_chat_id) {
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => bail!("Telegram chat ID must be a number"),
            },
            None => None,
        };

        Ok(SettingsPatch {
            reddit_client_id: set(&self.reddit_client_id),
            reddit_client_secret: set(&self.reddit_client_secret),
            twitter_api_key: set(&self.twitter_api_key),
            twitter_api_secret: set(&self.twitter_api_secret),
            twitter_access_token: set(&self.twitter_access_token),
            twitter_access_token_secret: set(&self.twitter_access_token_secret),
            telegram_chat_id,
        })
    }

    /// After a successful save: flip the `is set` flag for every secret that
    /// was just submitted and clear those inputs so the values are never
    /// redisplayed. Plain fields keep their contents.
    pub fn apply_saved(&mut self, flags: &mut SecretFlags) {
        if !self.reddit_client_secret.trim().is_empty() {
            flags.reddit_client_secret = true;
            self.reddit_client_secret.clear();
        }
        if !self.twitter_api_secret.trim().is_empty() {
            flags.twitter_api_secret = true;
            self.twitter_api_secret.clear();
        }
        if !self.twitter_access_token_secret.trim().is_empty() {
            flags.twitter_access_token_secret = true;
            self.twitter_access_token_secret.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_populated_fields_reach_the_patch() {
        let form = SettingsForm {
            telegram_chat_id: "42".to_string(),
            ..SettingsForm::default()
        };
        let patch = form.to_patch().unwrap();
        assert_eq!(patch.telegram_chat_id, Some(42));
        assert_eq!(patch.reddit_client_id, None);
        assert_eq!(patch.reddit_client_secret, None);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({"telegram_chat_id": 42})
        );
    }

    #[test]
    fn blank_and_whitespace_fields_are_omitted_not_empty() {
        let form = SettingsForm {
            reddit_client_id: "  ".to_string(),
            twitter_api_key: "key-123".to_string(),
            ..SettingsForm::default()
        };
        let patch = form.to_patch().unwrap();
        assert!(patch.reddit_client_id.is_none(), "whitespace is not a value");
        assert_eq!(patch.twitter_api_key.as_deref(), Some("key-123"));
    }

    #[test]
    fn non_numeric_chat_id_is_rejected_client_side() {
        let form = SettingsForm {
            telegram_chat_id: "not-a-number".to_string(),
            ..SettingsForm::default()
        };
        assert!(form.to_patch().is_err());
    }

    #[test]
    fn saving_a_secret_sets_flag_and_clears_input() {
        let mut form = SettingsForm {
            reddit_client_secret: "hunter2".to_string(),
            twitter_api_key: "key-123".to_string(),
            ..SettingsForm::default()
        };
        let mut flags = SecretFlags::default();

        form.apply_saved(&mut flags);

        assert!(flags.reddit_client_secret);
        assert!(!flags.twitter_api_secret, "untouched secrets keep their flag");
        assert_eq!(form.reddit_client_secret, "", "secret input must be cleared");
        assert_eq!(form.twitter_api_key, "key-123", "plain fields survive");
    }

    #[test]
    fn hydrate_never_populates_secret_inputs() {
        let view = SettingsView {
            reddit_client_id: Some("client-id".to_string()),
            reddit_client_secret_set: true,
            twitter_access_token: Some("token".to_string()),
            twitter_access_token_secret_set: false,
            telegram_chat_id: Some(7),
            ..SettingsView::default()
        };
        let (form, flags) = SettingsForm::hydrate(&view);
        assert_eq!(form.reddit_client_id, "client-id");
        assert_eq!(form.reddit_client_secret, "");
        assert_eq!(form.telegram_chat_id, "7");
        assert!(flags.reddit_client_secret);
        assert!(!flags.twitter_access_token_secret);
    }
}
