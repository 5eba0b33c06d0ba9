// src/pipeline/workflow.rs
//
// Complaint state machine:
//
//   submitted → assigned → in-progress → pending-verification → resolved
//
// `escalated` is reachable from every non-terminal state. `resolved` and
// `escalated` are terminal. Verification may bounce a complaint back to
// in-progress.

use chrono::{DateTime, Utc};

use crate::error::{IntakeError, Result};
use crate::models::{Attachment, Complaint, Status, StatusUpdate};

use super::escalation;

pub const MANUAL_ESCALATION_REASON: &str = "Escalated manually";

pub fn can_transition(from: Status, to: Status) -> bool {
    use Status::*;
    match (from, to) {
        (Resolved | Escalated, _) => false,
        (_, Escalated) => true,
        (Submitted, Assigned) => true,
        (Assigned, InProgress) => true,
        (InProgress, PendingVerification | Resolved) => true,
        (PendingVerification, Resolved | InProgress) => true,
        _ => false,
    }
}

/// Resolving needs remarks and at least one image uploaded with the
/// resolution itself. Earlier uploads do not count as proof.
fn validate_resolution(update: &StatusUpdate) -> Result<()> {
    let remarks = update.remarks.as_deref().map(str::trim).unwrap_or("");
    if remarks.is_empty() {
        return Err(IntakeError::Validation(
            "completion remarks are required to resolve a complaint".into(),
        ));
    }
    if !update.attachments.iter().any(Attachment::is_image) {
        return Err(IntakeError::Validation(
            "an image proof of completion is required to resolve a complaint".into(),
        ));
    }
    Ok(())
}

/// Apply a status update, returning the updated complaint. The input is
/// untouched on error.
pub fn apply(complaint: &Complaint, update: StatusUpdate, now: DateTime<Utc>) -> Result<Complaint> {
    let from = complaint.status;
    let to = update.status;

    if !can_transition(from, to) {
        return Err(IntakeError::InvalidTransition { from, to });
    }
    if to == Status::Assigned && complaint.assigned_to.is_none() {
        return Err(IntakeError::Validation(
            "an assignee is required; assign the complaint instead".into(),
        ));
    }
    if to == Status::Resolved {
        validate_resolution(&update)?;
    }

    let author = update.author.unwrap_or_else(|| "system".to_string());
    let mut next = complaint.clone();

    if let Some(text) = update.note.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        next.push_note(text, author.as_str(), now);
    }
    next.attachments.extend(update.attachments);

    match to {
        Status::Escalated => {
            let reason = update
                .remarks
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| MANUAL_ESCALATION_REASON.to_string());
            return Ok(escalation::escalate(next, &reason, &author, now));
        }
        Status::Assigned => {
            next.assigned_at.get_or_insert(now);
        }
        Status::InProgress => {
            next.started_at.get_or_insert(now);
        }
        Status::Resolved => {
            next.completed_at = Some(now);
            next.completion_remarks = update.remarks;
        }
        Status::Submitted | Status::PendingVerification => {}
    }

    next.status = to;
    Ok(next)
}

/// Hand the complaint to `manager_id`. Allowed from any non-terminal
/// state; returns the updated complaint and the previous assignee.
pub fn assign(
    complaint: &Complaint,
    manager_id: &str,
    author: &str,
    now: DateTime<Utc>,
) -> Result<(Complaint, Option<String>)> {
    if complaint.status.is_terminal() {
        return Err(IntakeError::InvalidTransition {
            from: complaint.status,
            to: Status::Assigned,
        });
    }

    let mut next = complaint.clone();
    let previous = next.assigned_to.replace(manager_id.to_string());
    next.status = Status::Assigned;
    next.assigned_at = Some(now);
    next.started_at = None;

    let text = match &previous {
        Some(prev) if prev != manager_id => format!("Reassigned from {prev} to {manager_id}"),
        _ => format!("Assigned to {manager_id}"),
    };
    next.push_note(text, author, now);

    Ok((next, previous))
}
