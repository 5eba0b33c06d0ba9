// src/pipeline/escalation.rs

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::models::{Category, Complaint, Status};

pub const MAX_OPEN_AGE_HOURS: i64 = 24;
pub const MAX_ASSIGNED_HOURS: i64 = 4;

pub const AUTO_ESCALATION_REASON: &str = "Auto-escalated based on criteria";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationTrigger {
    UrgentLanguage,
    IncidentAccident,
    OpenTooLong,
    AssignedTooLong,
}

impl fmt::Display for EscalationTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EscalationTrigger::UrgentLanguage => "description mentions an emergency",
            EscalationTrigger::IncidentAccident => "incident reports an accident",
            EscalationTrigger::OpenTooLong => "open for more than 24 hours",
            EscalationTrigger::AssignedTooLong => "assigned for more than 4 hours",
        };
        f.write_str(s)
    }
}

/// First escalation criterion the complaint meets at `now`, if any.
/// Status is not consulted beyond the assigned-too-long rule; callers
/// decide whether terminal complaints are eligible.
pub fn evaluate(complaint: &Complaint, now: DateTime<Utc>) -> Option<EscalationTrigger> {
    let description = complaint.description.to_lowercase();

    if description.contains("emergency") || description.contains("urgent") {
        return Some(EscalationTrigger::UrgentLanguage);
    }
    if complaint.category == Category::Incident && description.contains("accident") {
        return Some(EscalationTrigger::IncidentAccident);
    }
    if now - complaint.submitted_at > Duration::hours(MAX_OPEN_AGE_HOURS) {
        return Some(EscalationTrigger::OpenTooLong);
    }
    if complaint.status == Status::Assigned {
        let since = complaint.assigned_at.unwrap_or(complaint.submitted_at);
        if now - since > Duration::hours(MAX_ASSIGNED_HOURS) {
            return Some(EscalationTrigger::AssignedTooLong);
        }
    }
    None
}

pub fn should_escalate(complaint: &Complaint, now: DateTime<Utc>) -> bool {
    evaluate(complaint, now).is_some()
}

/// Mark the complaint escalated and record why. Terminal complaints are
/// returned unchanged.
pub fn escalate(
    mut complaint: Complaint,
    reason: &str,
    author: &str,
    now: DateTime<Utc>,
) -> Complaint {
    if complaint.status.is_terminal() {
        return complaint;
    }
    complaint.status = Status::Escalated;
    complaint.escalated_at = Some(now);
    complaint.escalation_reason = Some(reason.to_string());
    complaint.push_note(reason, author, now);
    complaint
}
