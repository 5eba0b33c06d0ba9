// src/pipeline/tagger.rs

use crate::models::Complaint;

use super::classifier::contains_any;

/// Canonical location slug → keywords. Every matching slug is tagged, so
/// "hills" alone tags both Banjara and Jubilee Hills.
const LOCATION_KEYWORDS: &[(&str, &[&str])] = &[
    ("banjara-hills", &["banjara", "hills"]),
    ("jubilee-hills", &["jubilee", "hills"]),
    ("madhapur", &["madhapur"]),
    ("gachibowli", &["gachibowli"]),
    ("hitech-city", &["hitech", "hitec", "cyberabad"]),
    ("kondapur", &["kondapur"]),
    ("kukatpally", &["kukatpally"]),
    ("secunderabad", &["secunderabad"]),
];

/// Urgency is set-valued: every level whose keywords appear is tagged.
const URGENCY_KEYWORDS: &[(&str, &[&str])] = &[
    ("critical", &["emergency", "urgent", "critical", "danger", "accident"]),
    ("high", &["important", "serious", "major", "significant"]),
    ("medium", &["moderate", "normal", "regular"]),
    ("low", &["minor", "small", "routine"]),
];

/// Populate the derived tag facets. Only adds; tags already present
/// (including custom ones) are kept, so repeated calls are no-ops.
pub fn auto_tag(mut complaint: Complaint) -> Complaint {
    complaint
        .tags
        .category
        .insert(complaint.category.as_str().to_string());

    if let Some(priority) = complaint.priority {
        complaint.tags.priority.insert(priority.as_str().to_string());
    }

    let text = format!(
        "{} {}",
        complaint.description,
        complaint.location.as_deref().unwrap_or("")
    )
    .to_lowercase();

    for (slug, keywords) in LOCATION_KEYWORDS {
        if contains_any(&text, keywords) {
            complaint.tags.location.insert((*slug).to_string());
        }
    }

    for (level, keywords) in URGENCY_KEYWORDS {
        if contains_any(&text, keywords) {
            complaint.tags.urgency.insert((*level).to_string());
        }
    }

    complaint
}
