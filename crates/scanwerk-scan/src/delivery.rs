// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Delivery of finished PDFs.
//
// Delivery runs after the PDF is safely on disk. A failing transport is
// reported as `DeliveryOutcome::Failed` rather than an error, so the scan
// itself still counts as done and the file stays in the work directory.
// Only a missing recipient for mail is an error, since that is known before
// anything is sent.

use std::path::Path;

use scanwerk_core::config::DeliveryMethod;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::DeliveryOutcome;
use tracing::{info, warn};

use crate::runner::{CommandRunner, ToolCommand};

/// Check that `method` can be carried out for `recipient` at all.
pub fn check_delivery(method: &DeliveryMethod, recipient: Option<&str>) -> Result<()> {
    match method {
        DeliveryMethod::Mail { .. } if recipient.is_none_or(|r| r.trim().is_empty()) => {
            Err(ScanwerkError::NoRecipient)
        }
        _ => Ok(()),
    }
}

/// Send `pdf` the way `method` says.
pub fn deliver<R: CommandRunner>(
    runner: &R,
    method: &DeliveryMethod,
    pdf: &Path,
    recipient: Option<&str>,
) -> Result<DeliveryOutcome> {
    check_delivery(method, recipient)?;

    let (destination, steps) = match method {
        DeliveryMethod::None => return Ok(DeliveryOutcome::Kept),
        DeliveryMethod::RemoteCopy { destination } => (
            destination.clone(),
            vec![ToolCommand::new("scp").arg(pdf.display().to_string()).arg(destination)],
        ),
        DeliveryMethod::Mail {
            subject,
            body,
            relay,
        } => {
            let recipient = recipient.unwrap_or_default().trim();
            (recipient.to_string(), mail_commands(pdf, recipient, subject, body, relay.as_deref()))
        }
    };

    for step in &steps {
        if let Err(reason) = run_step(runner, step) {
            warn!(method = method.label(), %reason, "delivery failed, PDF kept");
            return Ok(DeliveryOutcome::Failed {
                method: method.label().to_string(),
                reason,
            });
        }
    }

    info!(method = method.label(), destination, "PDF delivered");
    Ok(DeliveryOutcome::Delivered {
        method: method.label().to_string(),
        destination,
    })
}

fn run_step<R: CommandRunner>(runner: &R, step: &ToolCommand) -> std::result::Result<(), String> {
    match runner.output(step) {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => Err(format!(
            "{} exited with {:?}: {}",
            step.program,
            out.status.code,
            out.stderr.trim()
        )),
        Err(e) => Err(e.to_string()),
    }
}

/// Commands that mail `pdf`, either locally or by way of `relay`.
fn mail_commands(
    pdf: &Path,
    recipient: &str,
    subject: &str,
    body: &str,
    relay: Option<&str>,
) -> Vec<ToolCommand> {
    let Some(relay) = relay else {
        return vec![
            ToolCommand::new("mail")
                .args(["-s", subject, "-A"])
                .arg(pdf.display().to_string())
                .arg(recipient)
                .stdin(body),
        ];
    };

    // scp to `relay:` lands the file in the remote home directory.
    let remote_name = pdf
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| pdf.display().to_string());
    let remote_mail = format!(
        "mail -s {} -A {} {}",
        shell_quote(subject),
        shell_quote(&remote_name),
        shell_quote(recipient)
    );
    vec![
        ToolCommand::new("scp")
            .arg(pdf.display().to_string())
            .arg(format!("{relay}:")),
        ToolCommand::new("ssh").args([relay, remote_mail.as_str()]).stdin(body),
    ]
}

/// Single-quote `s` for a POSIX shell.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
