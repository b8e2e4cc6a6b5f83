mod auth;
mod pipeline;
mod review;
mod settings;
mod topics;

use std::sync::Arc;

use anyhow::Result;
use console::style;

use crate::core::api::ApiClient;
use crate::core::session::Session;
use crate::core::terminal::{self, GuideSection};
use crate::interfaces;

fn print_help() {
    terminal::print_banner();

    GuideSection::new("Core")
        .command("tui", "Open the interactive review deck (default)")
        .command("status", "Dashboard snapshot and scrape state")
        .print();

    GuideSection::new("Account")
        .command("login", "Sign in: login <email> [--password <pw>]")
        .command("register", "Create account: register <email> [--telegram-chat-id <id>]")
        .command("logout", "Drop the stored session token")
        .command("whoami", "Show the signed-in profile")
        .print();

    GuideSection::new("Pipeline")
        .command("scrape", "Trigger a scrape job [--watch to follow it]")
        .command("generate", "Generate drafts from scraped content")
        .command("topics", "Manage topics: list | add <name> | remove <name>")
        .print();

    GuideSection::new("Review")
        .command("pending", "List drafts awaiting review")
        .command("history", "List past drafts [--limit <n>]")
        .command("approve", "Approve a draft: approve <id>")
        .command("reject", "Reject a draft: reject <id>")
        .command("edit", "Rewrite a draft: edit <id> <content>")
        .print();

    GuideSection::new("Setup")
        .command("settings", "Credentials: show | set [--reddit-client-id <v> ...]")
        .print();

    println!(
        "\n {} {} <command> [args]\n",
        style("Usage:").bold(),
        style("draftdeck").green()
    );
}

/// Value of the first matching `--flag <value>` pair.
pub(crate) fn flag_value(args: &[String], names: &[&str]) -> Option<String> {
    let mut i = 0;
    while i < args.len() {
        if names.contains(&args[i].as_str()) {
            return args.get(i + 1).cloned();
        }
        i += 1;
    }
    None
}

pub(crate) fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// Arguments that are neither flags nor flag values.
pub(crate) fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i].starts_with("--") || args[i].starts_with('-') && args[i].len() == 2 {
            i += 2;
        } else {
            out.push(args[i].as_str());
            i += 1;
        }
    }
    out
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("tui");
    let rest = if args.is_empty() { &args[..] } else { &args[1..] };

    crate::logging::init(command == "tui");

    let session = Arc::new(match Session::default_path() {
        Some(path) => Session::load(path),
        None => Session::in_memory(),
    });
    let client = Arc::new(ApiClient::new(session.clone()));

    match command {
        "tui" => {
            interfaces::tui::run(client, session).await?;
            terminal::print_goodbye();
            Ok(())
        }
        "login" => auth::login(&client, rest).await,
        "register" => auth::register(&client, rest).await,
        "logout" => auth::logout(&session),
        "whoami" => auth::whoami(&client).await,
        "topics" => topics::run(&client, rest).await,
        "pending" => review::pending(&client).await,
        "history" => review::history(&client, rest).await,
        "approve" => review::approve(&client, rest).await,
        "reject" => review::reject(&client, rest).await,
        "edit" => review::edit(&client, rest).await,
        "scrape" => pipeline::scrape(&client, rest).await,
        "generate" => pipeline::generate(&client).await,
        "status" => pipeline::status(&client).await,
        "settings" => settings::run(&client, rest).await,
        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        other => {
            print_help();
            anyhow::bail!("Unknown command: {other}")
        }
    }
}
