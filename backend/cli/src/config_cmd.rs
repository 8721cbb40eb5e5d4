//! `idcapture config show|check`.

use std::path::Path;

use anyhow::{Context, Result};
use idcapture_config::{redact, validate, IdCaptureConfig, ValidationReport};

use crate::terminal_output::{note_error, note_info, note_success, note_warn, render_table};

/// Print the effective config with secrets masked.
pub fn show(config: &IdCaptureConfig, path: &Path) -> Result<()> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    note_info(&format!("Effective config (file: {})", path.display()));
    println!("{}", serde_json::to_string_pretty(&redact(&value))?);
    Ok(())
}

fn report_rows(report: &ValidationReport) -> Vec<Vec<String>> {
    report
        .errors
        .iter()
        .map(|e| ("error", e))
        .chain(report.warnings.iter().map(|w| ("warning", w)))
        .map(|(level, item)| vec![level.to_string(), item.path.clone(), item.message.clone()])
        .collect()
}

/// Validate the config and print the report. Returns whether it is usable.
pub fn check(config: &IdCaptureConfig) -> bool {
    let report = validate(config);
    let rows = report_rows(&report);
    if !rows.is_empty() {
        print!("{}", render_table(&["Level", "Path", "Message"], &rows));
    }

    if report.is_valid() {
        if report.warnings.is_empty() {
            note_success("Config is valid.");
        } else {
            note_warn(&format!("Config is valid with {} warning(s).", report.warnings.len()));
        }
        true
    } else {
        note_error(&format!("Config has {} error(s).", report.errors.len()));
        false
    }
}

#[cfg(test)]
mod tests {
    use idcapture_config::{apply_all_defaults, BackendKind};

    use super::*;

    #[test]
    fn errors_are_listed_before_warnings() {
        let mut config = apply_all_defaults(IdCaptureConfig::default());
        config.logging.level = Some("loud".into());
        config.backend.kind = BackendKind::Remote;

        let rows = report_rows(&validate(&config));
        assert_eq!(rows[0][0], "error");
        assert_eq!(rows.last().unwrap()[0], "warning");
        assert!(rows.iter().any(|r| r[1] == "backend.endpointUrl"));
        assert!(!check(&config));
    }
}
