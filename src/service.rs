// src/service.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::error::{IntakeError, Result};
use crate::models::{
    Category, Complaint, Department, FieldManager, NewComplaint, Statistics, Status, StatusUpdate,
    TagFacet,
};
use crate::notify::Notifier;
use crate::pipeline::{self, escalation, router, workflow};
use crate::store::{self, CollectionStore, COMPLAINTS, FIELD_MANAGERS};

const ID_PREFIX: &str = "IALA";
const ID_SPACE: i64 = 10_000_000;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ComplaintFilter {
    pub status: Option<Status>,
    pub category: Option<Category>,
    pub assigned_to: Option<String>,
}

impl ComplaintFilter {
    fn matches(&self, c: &Complaint) -> bool {
        self.status.map_or(true, |s| c.status == s)
            && self.category.map_or(true, |cat| c.category == cat)
            && self
                .assigned_to
                .as_deref()
                .map_or(true, |id| c.assigned_to.as_deref() == Some(id))
    }
}

/// Complaint intake and lifecycle on top of a collection store.
///
/// Every mutation is a read-modify-write of whole collections, so writers
/// are serialized through `write_lock`.
pub struct ComplaintService {
    store: Arc<dyn CollectionStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl ComplaintService {
    pub fn new(
        store: Arc<dyn CollectionStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    async fn complaints(&self) -> Result<Vec<Complaint>> {
        store::load(self.store.as_ref(), COMPLAINTS).await
    }

    async fn save_complaints(&self, complaints: &[Complaint]) -> Result<()> {
        store::save(self.store.as_ref(), COMPLAINTS, complaints).await
    }

    async fn managers(&self) -> Result<Vec<FieldManager>> {
        store::load(self.store.as_ref(), FIELD_MANAGERS).await
    }

    async fn save_managers(&self, managers: &[FieldManager]) -> Result<()> {
        store::save(self.store.as_ref(), FIELD_MANAGERS, managers).await
    }

    /// `IALA` + the last seven digits of the millisecond clock, bumped past
    /// any id already taken.
    fn next_id(&self, existing: &[Complaint]) -> String {
        let mut n = self.now().timestamp_millis().rem_euclid(ID_SPACE);
        loop {
            let candidate = format!("{ID_PREFIX}{n:07}");
            if !existing.iter().any(|c| c.id == candidate) {
                return candidate;
            }
            n = (n + 1) % ID_SPACE;
        }
    }

    fn position(complaints: &[Complaint], id: &str) -> Result<usize> {
        complaints
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| IntakeError::complaint_not_found(id))
    }

    // ───────────────────────────────────────
    // Intake
    // ───────────────────────────────────────

    /// File a complaint and run it through the pipeline. A complaint nobody
    /// can take stays `submitted`; that is logged, not an error.
    pub async fn submit(&self, input: NewComplaint) -> Result<Complaint> {
        let description = input.description.trim();
        if description.is_empty() {
            return Err(IntakeError::Validation("description is required".into()));
        }
        let category = input
            .category
            .or_else(|| pipeline::classify(description))
            .ok_or_else(|| {
                IntakeError::Validation("could not infer a category; please choose one".into())
            })?;

        let _guard = self.write_lock.lock().await;
        let mut complaints = self.complaints().await?;
        let mut managers = self.managers().await?;
        let now = self.now();

        let mut complaint = Complaint::new(self.next_id(&complaints), category, description, now);
        complaint.location = input.location.filter(|l| !l.trim().is_empty());
        complaint.priority = input.priority;
        complaint.submitted_by = input.submitted_by.filter(|s| !s.trim().is_empty());
        let author = complaint.submitted_by.clone().unwrap_or_else(|| "citizen".to_string());
        complaint.push_note("Complaint submitted", author, now);

        let outcome = pipeline::process(complaint, &mut managers, now);
        let complaint = outcome.complaint;

        complaints.push(complaint.clone());
        self.save_complaints(&complaints).await?;
        if complaint.assigned_to.is_some() {
            self.save_managers(&managers).await?;
        }

        tracing::info!(
            complaint = %complaint.id,
            category = %complaint.category,
            status = %complaint.status,
            "complaint submitted"
        );
        self.notifier.notify(&complaint.id, Status::Submitted);
        if complaint.status != Status::Submitted {
            self.notifier.notify(&complaint.id, complaint.status);
        }
        Ok(complaint)
    }

    // ───────────────────────────────────────
    // Queries
    // ───────────────────────────────────────

    pub async fn get(&self, id: &str) -> Result<Complaint> {
        self.complaints()
            .await?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| IntakeError::complaint_not_found(id))
    }

    pub async fn list(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>> {
        Ok(self
            .complaints()
            .await?
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect())
    }

    /// Latest `n` complaints filed by `submitter`, oldest first.
    pub async fn recent_by(&self, submitter: &str, n: usize) -> Result<Vec<Complaint>> {
        let mut mine: Vec<Complaint> = self
            .complaints()
            .await?
            .into_iter()
            .filter(|c| c.submitted_by.as_deref() == Some(submitter))
            .collect();
        let skip = mine.len().saturating_sub(n);
        Ok(mine.split_off(skip))
    }

    pub async fn find_by_tag(&self, tag: &str, facet: Option<TagFacet>) -> Result<Vec<Complaint>> {
        Ok(self
            .complaints()
            .await?
            .into_iter()
            .filter(|c| c.tags.contains(tag, facet))
            .collect())
    }

    pub async fn statistics(&self) -> Result<Statistics> {
        let complaints = self.complaints().await?;
        let mut stats = Statistics {
            total: complaints.len(),
            ..Statistics::default()
        };

        let mut resolution_hours = Vec::new();
        for c in &complaints {
            *stats.by_status.entry(c.status.to_string()).or_default() += 1;
            *stats.by_category.entry(c.category.to_string()).or_default() += 1;
            let department = c
                .category
                .department()
                .map(Department::as_str)
                .unwrap_or("general-services");
            *stats.by_department.entry(department.to_string()).or_default() += 1;

            if let (Status::Resolved, Some(done)) = (c.status, c.completed_at) {
                resolution_hours.push((done - c.submitted_at).num_seconds() as f64 / 3600.0);
            }
        }

        if !resolution_hours.is_empty() {
            stats.avg_resolution_hours =
                Some(resolution_hours.iter().sum::<f64>() / resolution_hours.len() as f64);
        }
        Ok(stats)
    }

    // ───────────────────────────────────────
    // Lifecycle
    // ───────────────────────────────────────

    /// Move a complaint to a new status. Resolving frees the assignee's
    /// workload; the complaint is saved first and a failed release is only
    /// logged.
    pub async fn update_status(&self, id: &str, update: StatusUpdate) -> Result<Complaint> {
        let _guard = self.write_lock.lock().await;
        let mut complaints = self.complaints().await?;
        let idx = Self::position(&complaints, id)?;

        let updated = workflow::apply(&complaints[idx], update, self.now())?;
        complaints[idx] = updated.clone();
        self.save_complaints(&complaints).await?;

        if updated.status == Status::Resolved {
            if let Some(manager_id) = updated.assigned_to.as_deref() {
                match self.release_locked(manager_id).await {
                    Ok(_) => {}
                    Err(IntakeError::NotFound { .. }) => {
                        tracing::warn!(complaint = id, manager = manager_id, "assignee no longer registered");
                    }
                    Err(e) => {
                        tracing::error!(complaint = id, manager = manager_id, error = %e, "failed to release assignee workload");
                    }
                }
            }
        }

        self.notifier.notify(&updated.id, updated.status);
        Ok(updated)
    }

    /// Assign to `manager_id`, or to whoever the router picks. Reassignment
    /// releases the previous assignee.
    pub async fn assign(&self, id: &str, manager_id: Option<&str>, author: &str) -> Result<Complaint> {
        let _guard = self.write_lock.lock().await;
        let mut complaints = self.complaints().await?;
        let mut managers = self.managers().await?;
        let idx = Self::position(&complaints, id)?;

        let chosen = match manager_id {
            Some(mid) => {
                let manager = managers
                    .iter_mut()
                    .find(|m| m.id == mid)
                    .ok_or_else(|| IntakeError::manager_not_found(mid))?;
                manager.workload += 1;
                manager.id.clone()
            }
            None => {
                let tagged = pipeline::auto_tag(complaints[idx].clone());
                router::route(&tagged, &mut managers).ok_or_else(|| {
                    tracing::warn!(complaint = id, category = %tagged.category, "routing failed");
                    IntakeError::RoutingFailure { category: tagged.category }
                })?
            }
        };

        let (updated, previous) = workflow::assign(&complaints[idx], &chosen, author, self.now())?;
        if let Some(prev) = previous {
            router::release(&mut managers, &prev);
        }

        complaints[idx] = updated.clone();
        self.save_complaints(&complaints).await?;
        self.save_managers(&managers).await?;

        tracing::info!(complaint = id, manager = %chosen, "complaint assigned");
        self.notifier.notify(&updated.id, updated.status);
        Ok(updated)
    }

    pub async fn escalate(&self, id: &str, reason: Option<String>, author: &str) -> Result<Complaint> {
        let update = StatusUpdate {
            status: Status::Escalated,
            note: None,
            author: Some(author.to_string()),
            remarks: reason,
            attachments: Vec::new(),
        };
        self.update_status(id, update).await
    }

    /// Escalate every open complaint that meets an escalation criterion.
    /// Returns the ids escalated.
    pub async fn sweep_escalations(&self) -> Result<Vec<String>> {
        let _guard = self.write_lock.lock().await;
        let mut complaints = self.complaints().await?;
        let now = self.now();

        let mut escalated = Vec::new();
        for c in complaints.iter_mut().filter(|c| !c.status.is_terminal()) {
            if let Some(trigger) = escalation::evaluate(c, now) {
                tracing::info!(complaint = %c.id, %trigger, "auto-escalating complaint");
                *c = escalation::escalate(c.clone(), escalation::AUTO_ESCALATION_REASON, "system", now);
                escalated.push(c.id.clone());
            }
        }

        if !escalated.is_empty() {
            self.save_complaints(&complaints).await?;
            for id in &escalated {
                self.notifier.notify(id, Status::Escalated);
            }
        }
        Ok(escalated)
    }

    pub async fn add_note(&self, id: &str, text: &str, author: &str) -> Result<Complaint> {
        let text = text.trim();
        if text.is_empty() {
            return Err(IntakeError::Validation("note text is required".into()));
        }
        let _guard = self.write_lock.lock().await;
        let mut complaints = self.complaints().await?;
        let idx = Self::position(&complaints, id)?;
        let now = self.now();
        complaints[idx].push_note(text, author, now);
        self.save_complaints(&complaints).await?;
        Ok(complaints.swap_remove(idx))
    }

    /// Returns false when the tag was already present.
    pub async fn add_tag(&self, id: &str, facet: TagFacet, tag: &str) -> Result<bool> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(IntakeError::Validation("tag must not be empty".into()));
        }
        self.edit_tags(id, |c| c.tags.facet_mut(facet).insert(tag.to_string()))
            .await
    }

    /// Returns false when the tag was not present.
    pub async fn remove_tag(&self, id: &str, facet: TagFacet, tag: &str) -> Result<bool> {
        self.edit_tags(id, |c| c.tags.facet_mut(facet).remove(tag.trim()))
            .await
    }

    async fn edit_tags(&self, id: &str, edit: impl FnOnce(&mut Complaint) -> bool) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut complaints = self.complaints().await?;
        let idx = Self::position(&complaints, id)?;
        let changed = edit(&mut complaints[idx]);
        if changed {
            self.save_complaints(&complaints).await?;
        }
        Ok(changed)
    }

    // ───────────────────────────────────────
    // Field managers
    // ───────────────────────────────────────

    pub async fn field_managers(&self) -> Result<Vec<FieldManager>> {
        self.managers().await
    }

    pub async fn register_field_manager(&self, manager: FieldManager) -> Result<FieldManager> {
        if manager.id.trim().is_empty() || manager.name.trim().is_empty() {
            return Err(IntakeError::Validation("field manager id and name are required".into()));
        }
        let _guard = self.write_lock.lock().await;
        let mut managers = self.managers().await?;
        if managers.iter().any(|m| m.id == manager.id) {
            return Err(IntakeError::Validation(format!(
                "field manager '{}' already exists",
                manager.id
            )));
        }
        managers.push(manager.clone());
        self.save_managers(&managers).await?;
        Ok(manager)
    }

    /// Give back one unit of a manager's workload.
    pub async fn release(&self, manager_id: &str) -> Result<FieldManager> {
        let _guard = self.write_lock.lock().await;
        self.release_locked(manager_id).await
    }

    async fn release_locked(&self, manager_id: &str) -> Result<FieldManager> {
        let mut managers = self.managers().await?;
        if !router::release(&mut managers, manager_id) {
            return Err(IntakeError::manager_not_found(manager_id));
        }
        self.save_managers(&managers).await?;
        managers
            .into_iter()
            .find(|m| m.id == manager_id)
            .ok_or_else(|| IntakeError::manager_not_found(manager_id))
    }

    /// Install the demo roster when no field managers exist yet. Returns how
    /// many were added.
    pub async fn seed_demo_managers(&self) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        if !self.managers().await?.is_empty() {
            return Ok(0);
        }
        let roster = crate::seed::demo_field_managers();
        self.save_managers(&roster).await?;
        tracing::info!(count = roster.len(), "seeded demo field managers");
        Ok(roster.len())
    }
}
