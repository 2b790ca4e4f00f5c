//! API key management command.

use anyhow::{Context, Result, bail};

use crate::cli::KeyAction;
use crate::credential::ApiKeyStore;

pub fn run(action: &KeyAction) -> Result<()> {
    let store =
        ApiKeyStore::default_location().context("could not determine config directory")?;

    match action {
        KeyAction::Set { key } => {
            if store.save(key) {
                println!("API key saved to {}", store.path().display());
            } else {
                bail!("failed to save API key");
            }
        }
        KeyAction::Show => match store.load() {
            Some(key) => println!("{}", mask(&key)),
            None => println!("No API key stored."),
        },
        KeyAction::Clear => {
            if store.clear() {
                println!("API key cleared.");
            } else {
                bail!("failed to clear API key");
            }
        }
    }

    Ok(())
}

/// Shows only a short prefix of the key.
fn mask(key: &str) -> String {
    let prefix: String = key.chars().take(8).collect();
    if key.chars().count() <= 8 {
        "********".to_string()
    } else {
        format!("{prefix}...")
    }
}
