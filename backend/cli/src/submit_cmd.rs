//! `idcapture submit` (one-shot) and `idcapture form` (interactive loop).

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use idcapture_config::IdCaptureConfig;
use idcapture_core::{FormController, IdCaptureError, ProcessState, StatusListener};
use idcapture_media::load_image;
use logging::{EventLogger, SubmissionEvent};
use uuid::Uuid;

use crate::components::{build_form, ensure_valid, OverwritePolicy};
use crate::prompt::read_line;
use crate::terminal_output::{note_error, note_info, note_status, note_warn};

/// Prints every status transition and records it in the submission log.
fn status_listener(session_id: String) -> StatusListener {
    Arc::new(move |state: ProcessState, message: &str| {
        note_status(state, message);
        EventLogger::log_event(
            &session_id,
            SubmissionEvent::StatusChanged {
                status: state.to_string(),
                message: message.to_string(),
            },
        );
    })
}

/// Submit the form once and log the outcome. The listener has already shown it.
async fn run_submission(form: &mut FormController, session_id: &str) -> Result<(), IdCaptureError> {
    if let Some(image) = form.image() {
        EventLogger::log_event(
            session_id,
            SubmissionEvent::Started {
                employee_id: form.employee_id().to_uppercase(),
                file_name: image.file_name.clone(),
                mime_type: image.mime_type.clone(),
            },
        );
    }

    match form.submit().await {
        Ok(saved) => {
            EventLogger::log_event(
                session_id,
                SubmissionEvent::Completed {
                    is_update: saved.is_update,
                    message: saved.message,
                },
            );
            Ok(())
        }
        Err(e) => {
            EventLogger::log_event(session_id, SubmissionEvent::Failed { error_msg: e.to_string() });
            Err(e)
        }
    }
}

/// One submission from command-line arguments.
pub async fn run(
    config: &IdCaptureConfig,
    employee_id: &str,
    image_path: &Path,
    policy: OverwritePolicy,
) -> Result<(), IdCaptureError> {
    if let Err(e) = ensure_valid(config) {
        note_error(&e.to_string());
        return Err(e);
    }

    let session_id = Uuid::new_v4().to_string();
    let mut form = build_form(config, policy, status_listener(session_id.clone()));

    form.set_employee_id(employee_id);
    if let Some(hint) = form.id_error() {
        note_warn(hint);
    }

    match load_image(image_path).await {
        Ok(image) => form.attach_image(image),
        Err(e) => note_warn(&format!("{e:#}")),
    }

    run_submission(&mut form, &session_id).await
}

/// Interactive loop: identifier, then image path, then submit. Empty identifier quits.
pub async fn run_interactive(config: &IdCaptureConfig, policy: OverwritePolicy) -> Result<()> {
    ensure_valid(config)?;

    let session_id = Uuid::new_v4().to_string();
    let mut form = build_form(config, policy, status_listener(session_id.clone()));
    note_info("Enter an employee ID and a document photo. Leave the ID empty to quit.");

    loop {
        let Some(raw_id) = read_line("Employee ID: ").await? else {
            break;
        };
        let raw_id = raw_id.trim();
        if raw_id.is_empty() {
            break;
        }
        form.set_employee_id(raw_id);
        if let Some(hint) = form.id_error() {
            note_warn(hint);
            continue;
        }

        let Some(path) = read_line("Image path (png/jpg/jpeg): ").await? else {
            break;
        };
        match load_image(Path::new(path.trim())).await {
            Ok(image) => form.attach_image(image),
            Err(e) => {
                note_error(&format!("{e:#}"));
                continue;
            }
        }

        if !form.can_submit() {
            continue;
        }
        if run_submission(&mut form, &session_id).await.is_ok() && form.reset_after_success().await {
            note_info("Form cleared.");
        }
    }

    Ok(())
}
