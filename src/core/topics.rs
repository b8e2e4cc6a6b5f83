//! Topic form input: comma-separated free text into canonical lists.

use anyhow::{Result, bail};

use crate::core::api::types::{Tone, Topic};

/// Split comma-separated input, trimming entries and dropping empties.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Subreddit lists additionally shed a leading `r/` so users can paste
/// either `rust` or `r/rust`.
pub fn parse_subreddits(raw: &str) -> Vec<String> {
    parse_list(raw)
        .into_iter()
        .map(|entry| entry.trim_start_matches("r/").to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Assemble a topic from raw form fields, validating before any request is
/// dispatched. Name uniqueness stays backend-enforced.
pub fn draft_topic(name: &str, subreddits: &str, tone: Tone, hashtags: &str) -> Result<Topic> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Topic name is required");
    }
    Ok(Topic {
        name: name.to_string(),
        subreddits: parse_subreddits(subreddits),
        tone,
        hashtags: parse_list(hashtags),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_list_is_trimmed_and_filtered() {
        assert_eq!(
            parse_list("MachineLearning, LocalLLaMA"),
            vec!["MachineLearning", "LocalLLaMA"]
        );
        assert_eq!(parse_list(" a ,, b ,  "), vec!["a", "b"]);
        assert!(parse_list("").is_empty());
        assert!(parse_list(" , ,").is_empty());
    }

    #[test]
    fn subreddit_prefix_is_stripped() {
        assert_eq!(
            parse_subreddits("r/rust, programming, r/LocalLLaMA"),
            vec!["rust", "programming", "LocalLLaMA"]
        );
        assert!(parse_subreddits("r/, ,").is_empty());
    }

    #[test]
    fn draft_builds_canonical_topic() {
        let topic = draft_topic(
            " AI ",
            "MachineLearning, LocalLLaMA",
            Tone::Witty,
            "#AI, #ML",
        )
        .unwrap();
        assert_eq!(topic.name, "AI");
        assert_eq!(topic.subreddits, vec!["MachineLearning", "LocalLLaMA"]);
        assert_eq!(topic.tone, Tone::Witty);
        assert_eq!(topic.hashtags, vec!["#AI", "#ML"]);
    }

    #[test]
    fn empty_name_is_rejected_before_dispatch() {
        assert!(draft_topic("  ", "rust", Tone::Informative, "").is_err());
    }
}
