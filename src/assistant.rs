// src/assistant.rs
//
// Chat-style intake: one message in, one reply out. Complaint messages are
// filed through the service; tracking messages look complaints up by id.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{IntakeError, Result};
use crate::models::{Complaint, NewComplaint};
use crate::pipeline::{classify_intent, Intent};
use crate::service::ComplaintService;

static COMPLAINT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bIALA\d{7}\b").expect("complaint id pattern"));

const RECENT_LIMIT: usize = 3;

const HELP_TEXT: &str = "I can help you with:\n\
• Filing complaints for civic issues\n\
• Tracking existing complaints\n\
• Providing status updates\n\n\
Just describe your issue and I'll categorize and log it automatically.";

const GENERAL_REPLIES: [&str; 3] = [
    "I understand you have a concern. Could you please specify what type of civic issue you'd like to report?",
    "I'm here to help with civic complaints. What specific problem are you facing?",
    "Please describe the civic issue you'd like to report, and I'll help categorize and log it for you.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplyKind {
    Filed,
    Tracking,
    Help,
    General,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub kind: ReplyKind,
    pub message: String,
    pub complaints: Vec<Complaint>,
}

impl Reply {
    fn text(kind: ReplyKind, message: impl Into<String>) -> Self {
        Reply { kind, message: message.into(), complaints: Vec::new() }
    }
}

pub fn extract_complaint_id(text: &str) -> Option<String> {
    COMPLAINT_ID_RE.find(text).map(|m| m.as_str().to_uppercase())
}

pub async fn respond(service: &ComplaintService, message: &str, sender: Option<String>) -> Result<Reply> {
    match classify_intent(message) {
        Intent::Complaint(category) => {
            let complaint = service
                .submit(NewComplaint {
                    category: Some(category),
                    description: message.to_string(),
                    submitted_by: sender,
                    ..NewComplaint::default()
                })
                .await?;
            let message = format!(
                "I've received your {} complaint and automatically categorized it.\n\n\
                 Complaint ID: {}\nStatus: {}\n\n\
                 You'll receive updates on the progress.",
                category.display_name(),
                complaint.id,
                complaint.status,
            );
            Ok(Reply { kind: ReplyKind::Filed, message, complaints: vec![complaint] })
        }
        Intent::Tracking => track(service, message, sender.as_deref()).await,
        Intent::Help => Ok(Reply::text(ReplyKind::Help, HELP_TEXT)),
        Intent::GeneralInquiry => {
            let pick = message.chars().count() % GENERAL_REPLIES.len();
            Ok(Reply::text(ReplyKind::General, GENERAL_REPLIES[pick]))
        }
    }
}

async fn track(service: &ComplaintService, message: &str, sender: Option<&str>) -> Result<Reply> {
    if let Some(id) = extract_complaint_id(message) {
        return match service.get(&id).await {
            Ok(c) => Ok(Reply {
                kind: ReplyKind::Tracking,
                message: format!(
                    "Complaint {} status: {}. Submitted: {}",
                    c.id,
                    c.status,
                    c.submitted_at.format("%Y-%m-%d")
                ),
                complaints: vec![c],
            }),
            Err(IntakeError::NotFound { .. }) => Ok(Reply::text(
                ReplyKind::Tracking,
                format!("I couldn't find complaint {id}. Please check the ID and try again."),
            )),
            Err(e) => Err(e),
        };
    }

    // without an id, only the sender's own complaints are listed
    let Some(sender) = sender else {
        return Ok(Reply::text(
            ReplyKind::Tracking,
            "Please share your complaint ID (for example IALA1234567) so I can look it up.",
        ));
    };

    let recent = service.recent_by(sender, RECENT_LIMIT).await?;
    if recent.is_empty() {
        return Ok(Reply::text(
            ReplyKind::Tracking,
            "You don't have any complaints yet. How can I help you file one?",
        ));
    }

    let mut message = String::from("Here are your recent complaints:\n");
    for c in &recent {
        message.push_str(&format!("\n{}: {} - {}", c.id, c.category, c.status));
    }
    Ok(Reply { kind: ReplyKind::Tracking, message, complaints: recent })
}
