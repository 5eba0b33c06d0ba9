// src/pipeline/classifier.rs
//
// First-match keyword classifier. Rule order is load-bearing: text that
// mentions keywords of several categories resolves to whichever rule is
// listed first in `CATEGORY_RULES`.

use crate::models::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Complaint(Category),
    Tracking,
    Help,
    GeneralInquiry,
}

const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (Category::StreetLight, &["street", "light", "lamp", "bulb"]),
    (Category::Pothole, &["pothole", "road", "damage", "crack"]),
    (Category::Garbage, &["garbage", "waste", "trash", "collection"]),
    (Category::WaterSupply, &["water", "supply", "tap", "pipe"]),
    (Category::Drainage, &["drainage", "sewage", "drain", "block"]),
    (Category::Cctv, &["cctv", "camera", "security"]),
    (Category::Fogging, &["fogging", "mosquito", "spray"]),
    (Category::GreenBelt, &["park", "garden", "tree", "green"]),
];

const TRACKING_KEYWORDS: &[&str] = &["track", "status", "complaint", "id"];
const HELP_KEYWORDS: &[&str] = &["help", "support", "how"];

pub(crate) fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Full intent of a chat message, including the non-complaint intents.
pub fn classify_intent(text: &str) -> Intent {
    let lower = text.to_lowercase();
    if lower.trim().is_empty() {
        return Intent::GeneralInquiry;
    }

    if let Some((category, _)) = CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| contains_any(&lower, keywords))
    {
        return Intent::Complaint(*category);
    }

    if contains_any(&lower, TRACKING_KEYWORDS) {
        Intent::Tracking
    } else if contains_any(&lower, HELP_KEYWORDS) {
        Intent::Help
    } else {
        Intent::GeneralInquiry
    }
}

/// Category for free text, or `None` when nothing matched.
pub fn classify(text: &str) -> Option<Category> {
    match classify_intent(text) {
        Intent::Complaint(category) => Some(category),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn street_light_is_recognised() {
        assert_eq!(classify("street light not working"), Some(Category::StreetLight));
        assert_eq!(classify("The LAMP outside is dead"), Some(Category::StreetLight));
    }

    #[test]
    fn empty_and_blank_text_has_no_category() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("   \t"), None);
        assert_eq!(classify_intent(""), Intent::GeneralInquiry);
    }

    #[test]
    fn first_rule_wins_on_ambiguous_text() {
        // mentions both pothole and garbage keywords
        assert_eq!(
            classify("garbage dumped into the pothole"),
            Some(Category::Pothole)
        );
        // "street" beats "road"
        assert_eq!(classify("road near the street"), Some(Category::StreetLight));
    }

    #[test]
    fn each_category_rule_matches() {
        assert_eq!(classify("trash everywhere"), Some(Category::Garbage));
        assert_eq!(classify("no water since morning"), Some(Category::WaterSupply));
        assert_eq!(classify("sewage overflowing"), Some(Category::Drainage));
        assert_eq!(classify("camera broken"), Some(Category::Cctv));
        assert_eq!(classify("too many mosquito"), Some(Category::Fogging));
        assert_eq!(classify("fallen tree"), Some(Category::GreenBelt));
    }

    #[test]
    fn incident_is_never_inferred() {
        assert!(CATEGORY_RULES.iter().all(|(c, _)| *c != Category::Incident));
    }

    #[test]
    fn non_complaint_intents() {
        assert_eq!(classify_intent("track IALA1234567"), Intent::Tracking);
        assert_eq!(classify_intent("can you help me"), Intent::Help);
        assert_eq!(classify_intent("hello there"), Intent::GeneralInquiry);
        assert_eq!(classify("track my complaint"), None);
    }

    #[test]
    fn non_latin_text_falls_through() {
        assert_eq!(classify_intent("సమస్య ఉంది"), Intent::GeneralInquiry);
    }
}
