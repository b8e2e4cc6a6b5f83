use anyhow::{Result, bail};

use crate::core::api::ApiClient;
use crate::core::session::Session;
use crate::core::terminal::{print_info, print_status, print_success};

use super::{flag_value, positionals};

fn prompt_password(confirm: bool) -> Result<String> {
    let mut prompt = inquire::Password::new("Password:");
    if !confirm {
        prompt = prompt.without_confirmation();
    }
    Ok(prompt.prompt()?)
}

pub(crate) async fn login(client: &ApiClient, args: &[String]) -> Result<()> {
    let Some(email) = positionals(args).first().map(|s| s.to_string()) else {
        bail!("Usage: draftdeck login <email> [--password <pw>]");
    };
    let password = match flag_value(args, &["--password", "-p"]) {
        Some(password) => password,
        None => prompt_password(false)?,
    };

    let grant = client.login(&email, &password).await?;
    client.session().store(&grant.token);
    print_success(&format!("Logged in as {}", grant.email));
    Ok(())
}

pub(crate) async fn register(client: &ApiClient, args: &[String]) -> Result<()> {
    let Some(email) = positionals(args).first().map(|s| s.to_string()) else {
        bail!("Usage: draftdeck register <email> [--telegram-chat-id <id>] [--password <pw>]");
    };
    let telegram_chat_id = match flag_value(args, &["--telegram-chat-id"]) {
        Some(raw) => match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => bail!("Telegram chat ID must be a number"),
        },
        None => None,
    };
    let password = match flag_value(args, &["--password", "-p"]) {
        Some(password) => password,
        None => prompt_password(true)?,
    };
    if password.chars().count() < 6 {
        bail!("Password must be at least 6 characters");
    }

    let grant = client.register(&email, &password, telegram_chat_id).await?;
    client.session().store(&grant.token);
    print_success(&format!("Account created for {}", grant.email));
    Ok(())
}

pub(crate) fn logout(session: &Session) -> Result<()> {
    session.clear();
    print_info("Logged out.");
    Ok(())
}

pub(crate) async fn whoami(client: &ApiClient) -> Result<()> {
    let me = client.me().await?;
    print_status("Email", &me.email);
    print_status("Topics", &me.topics.len().to_string());
    print_status("Active", if me.active { "yes" } else { "no" });
    if let Some(chat_id) = me.telegram_chat_id {
        print_status("Telegram chat", &chat_id.to_string());
    }
    if let Some(created) = &me.created_at {
        print_status("Member since", created);
    }
    Ok(())
}
