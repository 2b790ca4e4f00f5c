//! Claude API integration for the daily log analyzer.
//!
//! Provides the two remote operations of the categorization contract:
//! - Batch classification of entries into life categories
//! - Free-form coaching advice over the categorized day
//!
//! Both are all-or-nothing: any transport or shape problem is a single
//! error, never a partially applied result. Falling back to the local
//! classifier on error is the caller's job.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dlog_core::{Category, Entry};

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const CLASSIFY_MAX_TOKENS: u32 = 1024;
const CLASSIFY_TEMPERATURE: f32 = 0.0;
const ADVICE_MAX_TOKENS: u32 = 1500;
const ADVICE_TEMPERATURE: f32 = 0.7;

/// LLM client errors.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Lifecycle of an advice request, observable by the rendering layer.
///
/// Advice is independent of classification and statistics: a failure here
/// is shown inline and never invalidates the computed dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AdviceState {
    #[default]
    NotStarted,
    Pending,
    Ready(String),
    Failed(String),
}

/// Claude API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client with the given API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();

        if api_key.is_empty() {
            return Err(LlmError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(LlmError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(LlmError::ClientBuild)?;

        Ok(Self { http, api_key })
    }

    /// Classifies entries into categories, in input order.
    ///
    /// The response must be a single JSON array of category labels with
    /// exactly one label per input entry; anything else is a total
    /// failure, after which the caller falls back to local rules.
    pub async fn classify(
        &self,
        model: &str,
        entries: &[&Entry],
    ) -> Result<Vec<Category>, LlmError> {
        let prompt = build_classify_prompt(entries);
        let text = self
            .send_message(model, prompt, CLASSIFY_MAX_TOKENS, CLASSIFY_TEMPERATURE)
            .await?;
        parse_labels(&text, entries.len())
    }

    /// Generates free-form coaching advice over the categorized day.
    ///
    /// Returns markdown text. Never triggers classification fallback.
    pub async fn advise(&self, model: &str, entries: &[&Entry]) -> Result<String, LlmError> {
        let prompt = build_advice_prompt(entries);
        let text = self
            .send_message(model, prompt, ADVICE_MAX_TOKENS, ADVICE_TEMPERATURE)
            .await?;
        Ok(text.trim().to_string())
    }

    async fn send_message(
        &self,
        model: &str,
        prompt: String,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let request = MessageRequest {
            model: model.to_string(),
            max_tokens,
            temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(&body).unwrap_or_else(|| LlmError::Api {
                message: format!("status {status}: {body}"),
            }));
        }

        let payload: MessageResponse = serde_json::from_str(&body)
            .map_err(|err| LlmError::InvalidResponse(err.to_string()))?;
        extract_text(payload.content)
    }
}

#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
}

fn extract_text(blocks: Vec<ContentBlock>) -> Result<String, LlmError> {
    let mut pieces = Vec::new();
    for block in blocks {
        let ContentBlock::Text { text } = block;
        pieces.push(text);
    }
    if pieces.is_empty() {
        return Err(LlmError::InvalidResponse(
            "missing text content".to_string(),
        ));
    }
    Ok(pieces.join("\n"))
}

fn parse_api_error(body: &str) -> Option<LlmError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| LlmError::Api {
            message: payload.error.message,
        })
}

fn build_classify_prompt(entries: &[&Entry]) -> String {
    let mut lines = Vec::new();
    lines.push(
        "You are a life-log classifier. Assign each activity below to exactly one category."
            .to_string(),
    );
    lines.push(format!(
        "Categories: {}.",
        Category::ALL
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ")
    ));
    lines.push("Rules:".to_string());
    lines.push("- Activities between 00:00 and 07:00 are resting unless clearly not.".to_string());
    lines.push("- Naps and sleep are resting regardless of time.".to_string());
    lines.push("- Meetings, tasks, and anything job-related is work.".to_string());
    lines.push("- Studying, reading, and skill practice is development.".to_string());
    lines.push(
        "Return ONLY a JSON array of category strings, one per activity, same order. \
         No other text."
            .to_string(),
    );
    lines.push(String::new());
    for entry in entries {
        lines.push(format!("[{}] {}", entry.start, entry.content));
    }
    lines.join("\n")
}

fn build_advice_prompt(entries: &[&Entry]) -> String {
    let mut lines = Vec::new();
    lines.push(
        "You are a supportive productivity coach reviewing one day of a personal activity log."
            .to_string(),
    );
    lines.push(
        "Write short markdown advice: what went well, what to adjust, one concrete suggestion \
         for tomorrow."
            .to_string(),
    );
    lines.push(String::new());
    lines.push("The day (time range, category, activity, immersion 0-5):".to_string());
    for entry in entries {
        lines.push(format!(
            "{} ~ {} [{}] {} (immersion {})",
            entry.start, entry.end, entry.category, entry.content, entry.immersion
        ));
    }
    lines.join("\n")
}

/// Parses the classification response: a JSON array of known labels whose
/// length exactly matches the entry count.
fn parse_labels(text: &str, expected: usize) -> Result<Vec<Category>, LlmError> {
    let labels: Vec<String> = serde_json::from_str(text.trim())
        .map_err(|err| LlmError::InvalidResponse(format!("not a JSON array: {err}")))?;

    if labels.len() != expected {
        return Err(LlmError::InvalidResponse(format!(
            "expected {expected} labels, got {}",
            labels.len()
        )));
    }

    labels
        .iter()
        .map(|label| {
            label
                .parse()
                .map_err(|err: dlog_core::UnknownCategory| LlmError::InvalidResponse(err.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlog_core::ClockTime;

    fn entry(start: &str, end: &str, content: &str, immersion: u32) -> Entry {
        Entry::new(
            1,
            start.parse::<ClockTime>().unwrap(),
            end.parse::<ClockTime>().unwrap(),
            content.to_string(),
            immersion,
        )
    }

    #[test]
    fn client_rejects_empty_api_key() {
        assert!(matches!(
            Client::new(""),
            Err(LlmError::InvalidApiKey { .. })
        ));
    }

    #[test]
    fn client_rejects_whitespace_api_key() {
        assert!(matches!(
            Client::new("   "),
            Err(LlmError::InvalidApiKey { .. })
        ));
    }

    #[test]
    fn client_accepts_valid_api_key() {
        assert!(Client::new("sk-ant-api03-valid-key").is_ok());
    }

    #[test]
    fn client_debug_redacts_api_key() {
        let client = Client::new("secret-key").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn classify_prompt_lists_entries_in_order() {
        let a = entry("09:00", "10:00", "閱讀", 3);
        let b = entry("10:00", "11:30", "開會", 2);
        let prompt = build_classify_prompt(&[&a, &b]);

        assert!(prompt.contains("[09:00] 閱讀"));
        assert!(prompt.contains("[10:00] 開會"));
        let first = prompt.find("[09:00]").unwrap();
        let second = prompt.find("[10:00]").unwrap();
        assert!(first < second);
    }

    #[test]
    fn classify_prompt_enumerates_all_labels() {
        let a = entry("09:00", "10:00", "閱讀", 3);
        let prompt = build_classify_prompt(&[&a]);
        for category in Category::ALL {
            assert!(prompt.contains(category.label()), "missing {category}");
        }
    }

    #[test]
    fn advice_prompt_includes_category_and_immersion() {
        let a = entry("09:00", "10:00", "閱讀", 3);
        let prompt = build_advice_prompt(&[&a]);
        assert!(prompt.contains("09:00 ~ 10:00 [routine] 閱讀 (immersion 3)"));
    }

    #[test]
    fn parse_labels_accepts_matching_array() {
        let labels = parse_labels(r#"["development","work"]"#, 2).unwrap();
        assert_eq!(labels, vec![Category::Development, Category::Work]);
    }

    #[test]
    fn parse_labels_rejects_wrong_length() {
        let err = parse_labels(r#"["development"]"#, 2).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn parse_labels_rejects_unknown_label() {
        let err = parse_labels(r#"["development","gaming"]"#, 2).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn parse_labels_rejects_non_array() {
        let err = parse_labels("development, work", 2).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn advice_state_default_is_not_started() {
        assert_eq!(AdviceState::default(), AdviceState::NotStarted);
    }
}
