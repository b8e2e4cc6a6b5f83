use anyhow::{Result, bail};
use console::style;

use crate::core::api::ApiClient;
use crate::core::api::types::{Tone, Topic};
use crate::core::terminal::print_success;
use crate::core::topics::draft_topic;

use super::{flag_value, positionals};

fn print_topics(topics: &[Topic]) {
    if topics.is_empty() {
        println!("  {}", style("(none)").dim());
        return;
    }
    for topic in topics {
        let mut details = vec![topic.tone.as_str().to_string()];
        if !topic.subreddits.is_empty() {
            details.push(
                topic
                    .subreddits
                    .iter()
                    .map(|s| format!("r/{s}"))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }
        if !topic.hashtags.is_empty() {
            details.push(topic.hashtags.join(", "));
        }
        println!(
            "  {} {}",
            style(&topic.name).bold(),
            style(format!("({})", details.join(" · "))).dim()
        );
    }
}

pub(crate) async fn run(client: &ApiClient, args: &[String]) -> Result<()> {
    match args.first().map(String::as_str) {
        None | Some("list") => {
            let topics = client.topics().await?;
            println!("{}", style(format!("Topics ({})", topics.len())).bold());
            print_topics(&topics);
            Ok(())
        }
        Some("add") => {
            let rest = &args[1..];
            let Some(name) = positionals(rest).first().map(|s| s.to_string()) else {
                bail!("Usage: draftdeck topics add <name> [--subreddits a,b] [--tone t] [--hashtags x,y]");
            };
            let tone = match flag_value(rest, &["--tone"]) {
                Some(raw) => match Tone::from_name(&raw) {
                    Some(tone) => tone,
                    None => bail!(
                        "Unknown tone '{raw}'. Choose one of: informative, witty, professional, casual, provocative"
                    ),
                },
                None => Tone::default(),
            };
            let subreddits = flag_value(rest, &["--subreddits"]).unwrap_or_default();
            let hashtags = flag_value(rest, &["--hashtags"]).unwrap_or_default();

            let draft = draft_topic(&name, &subreddits, tone, &hashtags)?;
            let topics = client.add_topic(&draft).await?;
            print_success(&format!("Topic '{name}' added"));
            print_topics(&topics);
            Ok(())
        }
        Some("remove") => {
            let rest = &args[1..];
            let Some(name) = positionals(rest).first().map(|s| s.to_string()) else {
                bail!("Usage: draftdeck topics remove <name>");
            };
            let topics = client.remove_topic(&name).await?;
            print_success(&format!("Topic '{name}' removed"));
            print_topics(&topics);
            Ok(())
        }
        Some(other) => bail!("Unknown topics subcommand: {other}. Use list, add or remove."),
    }
}
