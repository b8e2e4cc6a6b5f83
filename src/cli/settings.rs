use anyhow::{Result, bail};
use console::style;

use crate::core::api::ApiClient;
use crate::core::settings::SettingsForm;
use crate::core::terminal::{print_status, print_success};

use super::flag_value;

fn set_marker(set: bool) -> console::StyledObject<&'static str> {
    if set { style("[set]").green() } else { style("[not set]").dim() }
}

pub(crate) async fn run(client: &ApiClient, args: &[String]) -> Result<()> {
    match args.first().map(String::as_str) {
        None | Some("show") => show(client).await,
        Some("set") => set(client, &args[1..]).await,
        Some(other) => bail!("Unknown settings subcommand: {other}. Use show or set."),
    }
}

async fn show(client: &ApiClient) -> Result<()> {
    let view = client.settings().await?;
    print_status("Reddit client ID", view.reddit_client_id.as_deref().unwrap_or("-"));
    println!(
        "  Reddit client secret        {}",
        set_marker(view.reddit_client_secret_set)
    );
    print_status("Twitter API key", view.twitter_api_key.as_deref().unwrap_or("-"));
    println!(
        "  Twitter API secret          {}",
        set_marker(view.twitter_api_secret_set)
    );
    print_status(
        "Twitter access token",
        view.twitter_access_token.as_deref().unwrap_or("-"),
    );
    println!(
        "  Twitter access token secret {}",
        set_marker(view.twitter_access_token_secret_set)
    );
    print_status(
        "Telegram chat ID",
        &view
            .telegram_chat_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string()),
    );
    Ok(())
}

async fn set(client: &ApiClient, args: &[String]) -> Result<()> {
    let form = SettingsForm {
        reddit_client_id: flag_value(args, &["--reddit-client-id"]).unwrap_or_default(),
        reddit_client_secret: flag_value(args, &["--reddit-client-secret"]).unwrap_or_default(),
        twitter_api_key: flag_value(args, &["--twitter-api-key"]).unwrap_or_default(),
        twitter_api_secret: flag_value(args, &["--twitter-api-secret"]).unwrap_or_default(),
        twitter_access_token: flag_value(args, &["--twitter-access-token"]).unwrap_or_default(),
        twitter_access_token_secret: flag_value(args, &["--twitter-access-token-secret"])
            .unwrap_or_default(),
        telegram_chat_id: flag_value(args, &["--telegram-chat-id"]).unwrap_or_default(),
    };

    let patch = form.to_patch()?;
    if patch.is_empty() {
        bail!(
            "Nothing to update. Pass at least one of --reddit-client-id, --reddit-client-secret, \
             --twitter-api-key, --twitter-api-secret, --twitter-access-token, \
             --twitter-access-token-secret, --telegram-chat-id"
        );
    }

    let ack = client.update_settings(&patch).await?;
    print_success(&format!("Settings updated: {}", ack.fields.join(", ")));
    Ok(())
}
