// src/models/mod.rs

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ───────────────────────────────────────
// Enumerations
// ───────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    StreetLight,
    Pothole,
    Garbage,
    WaterSupply,
    Drainage,
    Cctv,
    Incident,
    Fogging,
    GreenBelt,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::StreetLight => "street-light",
            Category::Pothole => "pothole",
            Category::Garbage => "garbage",
            Category::WaterSupply => "water-supply",
            Category::Drainage => "drainage",
            Category::Cctv => "cctv",
            Category::Incident => "incident",
            Category::Fogging => "fogging",
            Category::GreenBelt => "green-belt",
        }
    }

    /// Human-readable name used in assistant replies.
    pub fn display_name(self) -> &'static str {
        match self {
            Category::StreetLight => "Street Light",
            Category::Pothole => "Road Pothole",
            Category::Garbage => "Garbage Collection",
            Category::WaterSupply => "Water Supply",
            Category::Drainage => "Drainage",
            Category::Cctv => "CCTV",
            Category::Incident => "Incident",
            Category::Fogging => "Fogging",
            Category::GreenBelt => "Green Belt",
        }
    }

    /// Department responsible for this category. Incidents have no owning
    /// department and are never auto-routed.
    pub fn department(self) -> Option<Department> {
        match self {
            Category::StreetLight => Some(Department::Electrical),
            Category::Pothole => Some(Department::RoadMaintenance),
            Category::Garbage => Some(Department::WasteManagement),
            Category::WaterSupply => Some(Department::WaterSupply),
            Category::Drainage => Some(Department::Drainage),
            Category::Cctv => Some(Department::Security),
            Category::Fogging => Some(Department::Health),
            Category::GreenBelt => Some(Department::Parks),
            Category::Incident => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Department {
    Electrical,
    RoadMaintenance,
    WasteManagement,
    WaterSupply,
    Drainage,
    Security,
    Health,
    Parks,
}

impl Department {
    pub fn as_str(self) -> &'static str {
        match self {
            Department::Electrical => "electrical",
            Department::RoadMaintenance => "road-maintenance",
            Department::WasteManagement => "waste-management",
            Department::WaterSupply => "water-supply",
            Department::Drainage => "drainage",
            Department::Security => "security",
            Department::Health => "health",
            Department::Parks => "parks",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Submitted,
    Assigned,
    InProgress,
    PendingVerification,
    Resolved,
    Escalated,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Submitted => "submitted",
            Status::Assigned => "assigned",
            Status::InProgress => "in-progress",
            Status::PendingVerification => "pending-verification",
            Status::Resolved => "resolved",
            Status::Escalated => "escalated",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Resolved | Status::Escalated)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagFacet {
    Category,
    Priority,
    Location,
    Urgency,
    Custom,
}

// ───────────────────────────────────────
// Tags
// ───────────────────────────────────────
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tags {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub category: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub priority: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub location: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub urgency: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub custom: BTreeSet<String>,
}

impl Tags {
    pub fn facet(&self, facet: TagFacet) -> &BTreeSet<String> {
        match facet {
            TagFacet::Category => &self.category,
            TagFacet::Priority => &self.priority,
            TagFacet::Location => &self.location,
            TagFacet::Urgency => &self.urgency,
            TagFacet::Custom => &self.custom,
        }
    }

    pub fn facet_mut(&mut self, facet: TagFacet) -> &mut BTreeSet<String> {
        match facet {
            TagFacet::Category => &mut self.category,
            TagFacet::Priority => &mut self.priority,
            TagFacet::Location => &mut self.location,
            TagFacet::Urgency => &mut self.urgency,
            TagFacet::Custom => &mut self.custom,
        }
    }

    /// True if `tag` appears under `facet`, or under any facet when none is given.
    pub fn contains(&self, tag: &str, facet: Option<TagFacet>) -> bool {
        match facet {
            Some(f) => self.facet(f).contains(tag),
            None => [
                &self.category,
                &self.priority,
                &self.location,
                &self.urgency,
                &self.custom,
            ]
            .iter()
            .any(|set| set.contains(tag)),
        }
    }
}

// ───────────────────────────────────────
// Complaint
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub text: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub content_type: Option<String>,
    pub uploaded_by: Option<String>,
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|t| t.trim().to_ascii_lowercase().starts_with("image/"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: String,
    pub category: Category,
    pub description: String,
    pub location: Option<String>,
    pub status: Status,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub submitted_by: Option<String>,
    #[serde(default)]
    pub tags: Tags,
    pub assigned_to: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub escalated_at: Option<DateTime<Utc>>,
    pub escalation_reason: Option<String>,
    pub completion_remarks: Option<String>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Complaint {
    /// Fresh `submitted` complaint with no derived state.
    pub fn new(
        id: impl Into<String>,
        category: Category,
        description: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Complaint {
            id: id.into(),
            category,
            description: description.into(),
            location: None,
            status: Status::Submitted,
            priority: None,
            submitted_by: None,
            tags: Tags::default(),
            assigned_to: None,
            submitted_at,
            assigned_at: None,
            started_at: None,
            completed_at: None,
            escalated_at: None,
            escalation_reason: None,
            completion_remarks: None,
            notes: Vec::new(),
            attachments: Vec::new(),
        }
    }

    pub fn push_note(&mut self, text: impl Into<String>, author: impl Into<String>, at: DateTime<Utc>) {
        self.notes.push(Note {
            text: text.into(),
            author: author.into(),
            timestamp: at,
        });
    }
}

// ───────────────────────────────────────
// Field managers (routing candidates)
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldManager {
    pub id: String,
    pub name: String,
    pub department: Department,
    pub area: String,
    #[serde(default)]
    pub workload: u32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

// ───────────────────────────────────────
// DTOs helpful for endpoints
// ───────────────────────────────────────
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewComplaint {
    /// Inferred from the description when absent.
    pub category: Option<Category>,
    pub description: String,
    pub location: Option<String>,
    pub priority: Option<Priority>,
    pub submitted_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: Status,
    pub note: Option<String>,
    pub author: Option<String>,
    pub remarks: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl StatusUpdate {
    pub fn to(status: Status) -> Self {
        StatusUpdate {
            status,
            note: None,
            author: None,
            remarks: None,
            attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    pub by_status: std::collections::BTreeMap<String, usize>,
    pub by_category: std::collections::BTreeMap<String, usize>,
    pub by_department: std::collections::BTreeMap<String, usize>,
    pub avg_resolution_hours: Option<f64>,
}
