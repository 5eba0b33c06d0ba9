// src/pipeline/mod.rs
//
// Intake pipeline: classify → tag → escalate → route. Every stage is a
// synchronous function of its inputs; persistence and notification live
// in the service layer.

pub mod classifier;
pub mod escalation;
pub mod router;
pub mod tagger;
pub mod workflow;

use chrono::{DateTime, Utc};

use crate::models::{Category, Complaint, FieldManager, Status};

pub use classifier::{classify, classify_intent, Intent};
pub use escalation::{escalate, should_escalate};
pub use router::{release, route};
pub use tagger::auto_tag;

/// Result of running a complaint through the pipeline.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub complaint: Complaint,
    pub escalated: bool,
    /// Set when the complaint was routable but nobody was eligible.
    pub routing_failed: bool,
}

/// Category to file free text under: the classifier's pick, or `fallback`
/// when nothing matched.
pub fn infer_category(text: &str, fallback: Category) -> Category {
    classify(text).unwrap_or(fallback)
}

/// Tag, evaluate escalation, and, unless escalated, route. Candidate
/// workloads are bumped in place on a successful route.
pub fn process(
    complaint: Complaint,
    candidates: &mut [FieldManager],
    now: DateTime<Utc>,
) -> Outcome {
    let tagged = auto_tag(complaint);

    if let Some(trigger) = escalation::evaluate(&tagged, now) {
        tracing::info!(complaint = %tagged.id, %trigger, "auto-escalating complaint");
        let complaint = escalate(tagged, escalation::AUTO_ESCALATION_REASON, "system", now);
        return Outcome { complaint, escalated: true, routing_failed: false };
    }

    if tagged.status != Status::Submitted {
        return Outcome { complaint: tagged, escalated: false, routing_failed: false };
    }

    match route(&tagged, candidates) {
        Some(manager_id) => {
            // assign() only fails on terminal complaints, excluded above
            match workflow::assign(&tagged, &manager_id, "system", now) {
                Ok((complaint, _)) => Outcome { complaint, escalated: false, routing_failed: false },
                Err(_) => Outcome { complaint: tagged, escalated: false, routing_failed: true },
            }
        }
        None => {
            tracing::warn!(
                complaint = %tagged.id,
                category = %tagged.category,
                "no eligible field manager; left unassigned"
            );
            Outcome { complaint: tagged, escalated: false, routing_failed: true }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::Department;

    fn road_crew() -> Vec<FieldManager> {
        vec![FieldManager {
            id: "field002".into(),
            name: "Priya Sharma".into(),
            department: Department::RoadMaintenance,
            area: "Jubilee Hills".into(),
            workload: 2,
            active: true,
        }]
    }

    #[test]
    fn urgent_pothole_end_to_end() {
        let text = "There is a big pothole on the road causing accidents, very urgent!";
        let category = classify(text).unwrap();
        assert_eq!(category, Category::Pothole);

        let now = Utc::now();
        let mut crew = road_crew();
        let outcome = process(Complaint::new("IALA0000001", category, text, now), &mut crew, now);

        let c = &outcome.complaint;
        assert!(outcome.escalated);
        assert_eq!(c.status, Status::Escalated);
        assert!(c.tags.urgency.contains("critical"));
        assert_eq!(c.tags.category.iter().collect::<Vec<_>>(), vec!["pothole"]);
        assert!(c.escalated_at.is_some());
        assert_eq!(crew[0].workload, 2);
    }

    #[test]
    fn routine_complaint_is_routed() {
        let now = Utc::now();
        let mut crew = road_crew();
        let c = Complaint::new("IALA0000002", Category::Pothole, "crack in the road", now);
        let outcome = process(c, &mut crew, now);
        assert_eq!(outcome.complaint.status, Status::Assigned);
        assert_eq!(outcome.complaint.assigned_to.as_deref(), Some("field002"));
        assert_eq!(crew[0].workload, 3);
    }

    #[test]
    fn cctv_without_security_staff_stays_submitted() {
        let now = Utc::now();
        let mut crew = road_crew();
        let c = Complaint::new("IALA0000003", Category::Cctv, "camera offline", now);
        let outcome = process(c, &mut crew, now);
        assert!(outcome.routing_failed);
        assert_eq!(outcome.complaint.status, Status::Submitted);
        assert!(outcome.complaint.assigned_to.is_none());
    }

    #[test]
    fn infer_falls_back() {
        assert_eq!(infer_category("hello", Category::Incident), Category::Incident);
        assert_eq!(infer_category("broken lamp", Category::Incident), Category::StreetLight);
    }
}
