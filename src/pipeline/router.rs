// src/pipeline/router.rs

use crate::models::{Complaint, FieldManager};

/// "Banjara Hills" and "banjara-hills" name the same area.
pub fn area_slug(area: &str) -> String {
    area.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Candidates eligible for `complaint`, in list order. Without location tags
/// the whole department is eligible; with them, only managers working one of
/// the tagged areas are.
pub fn eligible<'a>(complaint: &Complaint, candidates: &'a [FieldManager]) -> Vec<&'a FieldManager> {
    let Some(department) = complaint.category.department() else {
        return Vec::new();
    };

    let in_department: Vec<&FieldManager> = candidates
        .iter()
        .filter(|m| m.active && m.department == department)
        .collect();

    let locations = &complaint.tags.location;
    if locations.is_empty() {
        return in_department;
    }

    in_department
        .into_iter()
        .filter(|m| locations.contains(&area_slug(&m.area)))
        .collect()
}

/// Pick the least-busy eligible manager (ties go to the earliest in the
/// list), bump its workload, and return its id.
pub fn route(complaint: &Complaint, candidates: &mut [FieldManager]) -> Option<String> {
    let chosen = eligible(complaint, candidates)
        .into_iter()
        .min_by_key(|m| m.workload)
        .map(|m| m.id.clone())?;

    let manager = candidates.iter_mut().find(|m| m.id == chosen)?;
    manager.workload += 1;
    Some(chosen)
}

/// Give back one unit of workload. Returns false if `id` is unknown.
pub fn release(candidates: &mut [FieldManager], id: &str) -> bool {
    match candidates.iter_mut().find(|m| m.id == id) {
        Some(manager) => {
            manager.workload = manager.workload.saturating_sub(1);
            true
        }
        None => false,
    }
}
