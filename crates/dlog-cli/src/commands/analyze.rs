//! Analyze command: parse → classify → snapshot → render.
//!
//! Classification is awaited to completion (remote success or local
//! fallback) before any statistic is computed. Advice is spawned before
//! rendering so it overlaps with output, and its failure is shown inline
//! without touching the dashboard.

use std::path::Path;

use anyhow::{Context, Result};

use dlog_core::{ClassificationMode, Entry, LogSession};
use dlog_llm::{AdviceState, Client};

use crate::config::Config;
use crate::credential::ApiKeyStore;
use crate::report;

pub fn run(file: &Path, offline: bool, json: bool, want_advice: bool, config: &Config) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let mut session = LogSession::from_text(&raw)
        .context("expected entries like '- 09:00 ~ 10:00 閱讀 ❚❚❚'")?;

    let client = if offline {
        None
    } else {
        match resolve_api_key(config) {
            Some(key) => Client::new(key)
                .inspect_err(|err| tracing::warn!(%err, "could not create LLM client"))
                .ok(),
            None => {
                tracing::warn!("no API key configured; using local classification");
                None
            }
        }
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    runtime.block_on(analyze(&mut session, client.as_ref(), json, want_advice, config))
}

async fn analyze(
    session: &mut LogSession,
    client: Option<&Client>,
    json: bool,
    want_advice: bool,
    config: &Config,
) -> Result<()> {
    // Classification must finish, one way or the other, before statistics.
    let mode = match client {
        Some(client) => classify_with_fallback(session, client, &config.model).await,
        None => {
            session.classify_local();
            ClassificationMode::LocalFallback
        }
    };

    let snapshot = session.snapshot(&config.analysis());

    // Kick off advice before rendering; it resolves after the dashboard.
    let mut advice_state = AdviceState::NotStarted;
    let advice_task = if want_advice {
        if let Some(client) = client {
            let client = client.clone();
            let model = config.model.clone();
            let entries: Vec<Entry> = session.user_entries().cloned().collect();
            advice_state = AdviceState::Pending;
            Some(tokio::spawn(async move {
                let refs: Vec<&Entry> = entries.iter().collect();
                client.advise(&model, &refs).await
            }))
        } else {
            advice_state = AdviceState::Failed(
                "advice needs an API key; run 'dlog key set <KEY>'".to_string(),
            );
            None
        }
    } else {
        None
    };

    if json {
        if let Some(task) = advice_task {
            advice_state = match task.await {
                Ok(Ok(text)) => AdviceState::Ready(text),
                Ok(Err(err)) => AdviceState::Failed(err.to_string()),
                Err(err) => AdviceState::Failed(err.to_string()),
            };
        }
        let (advice, advice_error) = match advice_state {
            AdviceState::Ready(text) => (Some(text), None),
            AdviceState::Failed(reason) => (None, Some(reason)),
            AdviceState::NotStarted | AdviceState::Pending => (None, None),
        };
        let document = report::build_json_report(session, &snapshot, mode, advice, advice_error);
        println!(
            "{}",
            serde_json::to_string_pretty(&document).context("failed to serialize report")?
        );
        return Ok(());
    }

    print!("{}", report::format_report(session, &snapshot, mode));

    if want_advice {
        println!();
        println!("ADVICE");
        println!("──────");
        if advice_state == AdviceState::Pending {
            println!("  (generating...)");
        }
        if let Some(task) = advice_task {
            advice_state = match task.await {
                Ok(Ok(text)) => AdviceState::Ready(text),
                Ok(Err(err)) => AdviceState::Failed(err.to_string()),
                Err(err) => AdviceState::Failed(err.to_string()),
            };
        }
        match advice_state {
            AdviceState::Ready(text) => println!("{text}"),
            AdviceState::Failed(reason) => println!("  advice unavailable: {reason}"),
            AdviceState::NotStarted | AdviceState::Pending => {}
        }
    }

    Ok(())
}

/// Attempts remote classification; any failure degrades to local rules.
///
/// Partial application never happens: either every user entry gets its
/// remote label, or all of them go through the local classifier.
async fn classify_with_fallback(
    session: &mut LogSession,
    client: &Client,
    model: &str,
) -> ClassificationMode {
    let labels = {
        let entries: Vec<&Entry> = session.user_entries().collect();
        client.classify(model, &entries).await
    };

    match labels {
        Ok(labels) => match session.apply_remote_labels(&labels) {
            Ok(()) => ClassificationMode::Remote,
            Err(err) => {
                tracing::warn!(%err, "remote labels rejected; falling back to local rules");
                session.classify_local();
                ClassificationMode::LocalFallback
            }
        },
        Err(err) => {
            tracing::warn!(%err, "remote classification failed; falling back to local rules");
            session.classify_local();
            ClassificationMode::LocalFallback
        }
    }
}

/// Explicit key wins over the stored credential.
fn resolve_api_key(config: &Config) -> Option<String> {
    if let Some(key) = config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
    {
        return Some(key.to_string());
    }
    ApiKeyStore::default_location().and_then(|store| store.load())
}
