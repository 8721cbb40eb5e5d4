//! Interactive stdin input: the overwrite confirmation and form field entry.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use async_trait::async_trait;
use idcapture_core::ConfirmationPrompt;
use tracing::warn;

/// Asks the overwrite question on the terminal. Anything but yes declines.
pub struct TerminalPrompt;

#[async_trait]
impl ConfirmationPrompt for TerminalPrompt {
    async fn confirm(&self, message: &str) -> bool {
        match read_line(&format!("{message} [y/N] ")).await {
            Ok(Some(answer)) => parse_answer(&answer),
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Could not read confirmation; treating as no");
                false
            }
        }
    }
}

/// `y`/`yes` (any case) accepts; everything else, including empty input, declines.
pub fn parse_answer(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Print `label` and read one line from stdin. `None` on end of input.
pub async fn read_line(label: &str) -> Result<Option<String>> {
    let label = label.to_string();
    tokio::task::spawn_blocking(move || -> Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{label}")?;
        stdout.flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    })
    .await
    .context("stdin reader task failed")?
}
