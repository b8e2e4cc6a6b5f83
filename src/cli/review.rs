use anyhow::{Result, bail};
use console::style;

use crate::core::api::ApiClient;
use crate::core::api::types::{Tweet, TweetStatus};
use crate::core::terminal::print_success;

use super::{flag_value, positionals};

fn styled_status(status: TweetStatus) -> console::StyledObject<&'static str> {
    let text = status.as_str();
    match status {
        TweetStatus::Pending => style(text).yellow(),
        TweetStatus::Approved => style(text).green(),
        TweetStatus::Rejected => style(text).red(),
        TweetStatus::Posted => style(text).blue(),
    }
}

fn print_tweets(tweets: &[Tweet]) {
    if tweets.is_empty() {
        println!("  {}", style("(none)").dim());
        return;
    }
    for tweet in tweets {
        println!(
            "  {} {} {} {}",
            style(format!("#{}", tweet.id)).dim(),
            style(format!("[{}]", tweet.topic)).magenta(),
            styled_status(tweet.status),
            style(tweet.created_at.as_deref().unwrap_or("")).dim(),
        );
        println!("    {}", tweet.content);
    }
}

pub(crate) async fn pending(client: &ApiClient) -> Result<()> {
    let tweets = client.pending_tweets().await?;
    println!("{}", style(format!("Pending review ({})", tweets.len())).bold());
    print_tweets(&tweets);
    Ok(())
}

pub(crate) async fn history(client: &ApiClient, args: &[String]) -> Result<()> {
    let limit = match flag_value(args, &["--limit", "-n"]) {
        Some(raw) => match raw.parse::<u32>() {
            Ok(limit) => limit,
            Err(_) => bail!("--limit must be a number"),
        },
        None => 50,
    };
    let tweets = client.tweet_history(limit).await?;
    println!("{}", style(format!("History ({})", tweets.len())).bold());
    print_tweets(&tweets);
    Ok(())
}

fn parse_id(args: &[String], usage: &str) -> Result<i64> {
    match positionals(args).first().and_then(|raw| raw.parse::<i64>().ok()) {
        Some(id) => Ok(id),
        None => bail!("Usage: {usage}"),
    }
}

pub(crate) async fn approve(client: &ApiClient, args: &[String]) -> Result<()> {
    let id = parse_id(args, "draftdeck approve <id>")?;
    let ack = client.approve_tweet(id).await?;
    print_success(&format!("Draft #{id} {}", ack.status));
    Ok(())
}

pub(crate) async fn reject(client: &ApiClient, args: &[String]) -> Result<()> {
    let id = parse_id(args, "draftdeck reject <id>")?;
    let ack = client.reject_tweet(id).await?;
    print_success(&format!("Draft #{id} {}", ack.status));
    Ok(())
}

pub(crate) async fn edit(client: &ApiClient, args: &[String]) -> Result<()> {
    let positional = positionals(args);
    let (Some(raw_id), Some(content)) = (positional.first(), positional.get(1)) else {
        bail!("Usage: draftdeck edit <id> \"<content>\"");
    };
    let Ok(id) = raw_id.parse::<i64>() else {
        bail!("Usage: draftdeck edit <id> \"<content>\"");
    };
    let ack = client.edit_tweet(id, content).await?;
    print_success(&format!("Draft #{id} {}", ack.status));
    Ok(())
}
