use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};

use crate::core::api::ApiClient;
use crate::core::poller::{PollerUpdate, ScrapePoller};
use crate::core::terminal::{print_info, print_status, print_success, print_warn};

use super::has_flag;

pub(crate) async fn scrape(client: &Arc<ApiClient>, args: &[String]) -> Result<()> {
    if !has_flag(args, "--watch") {
        let ack = client.trigger_scrape().await?;
        print_info(&ack.message);
        print_status("Tip", "run `draftdeck scrape --watch` to follow progress");
        return Ok(());
    }

    let mut poller = ScrapePoller::new(client.clone());
    let message = poller.start().await?;
    print_info(&message);

    loop {
        tokio::time::sleep(Duration::from_millis(250)).await;
        for update in poller.pump() {
            match update {
                PollerUpdate::Progress { message } => print_status("scrape", &message),
                PollerUpdate::Settled { message, scraped } => {
                    if scraped > 0 {
                        print_success(&message);
                    } else {
                        print_warn(&message);
                    }
                    // Completion reconciliation: show the refreshed numbers.
                    let snapshot = client.dashboard().await?;
                    print_status("Pending", &snapshot.stats.pending.to_string());
                    print_status("Total generated", &snapshot.stats.total_generated.to_string());
                    poller.reconciled();
                    return Ok(());
                }
                PollerUpdate::Aborted => {
                    bail!("Lost contact with the scrape job; trigger it again to retry")
                }
            }
        }
    }
}

pub(crate) async fn generate(client: &ApiClient) -> Result<()> {
    let outcome = client.trigger_generation().await?;
    print_success(&outcome.message);
    print_status("Generated", &outcome.generated.to_string());
    Ok(())
}

pub(crate) async fn status(client: &ApiClient) -> Result<()> {
    let snapshot = client.dashboard().await?;
    print_status("Pending", &snapshot.stats.pending.to_string());
    print_status("Posted", &snapshot.stats.posted.to_string());
    print_status("Total generated", &snapshot.stats.total_generated.to_string());
    print_status("Topics", &snapshot.topics_count.to_string());

    let scrape = client.scrape_status().await?;
    if scrape.running {
        print_info(&format!("Scrape running: {}", scrape.message));
    } else if !scrape.message.is_empty() {
        print_status("Last scrape", &scrape.message);
    }
    Ok(())
}
