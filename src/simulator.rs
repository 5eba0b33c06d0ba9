// src/simulator.rs
//
// Demo-only workflow driver: walks freshly submitted complaints through
// assigned → in-progress → resolved on fixed delays, as a stand-in for real
// field activity. Every scheduled run can be cancelled.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::error::{IntakeError, Result};
use crate::models::{Attachment, Status, StatusUpdate};
use crate::service::ComplaintService;

const ACTOR: &str = "workflow-simulator";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Measured from when the simulation started, not from the previous step.
    pub after: Duration,
    pub status: Status,
}

pub fn default_steps() -> Vec<Step> {
    vec![
        Step { after: Duration::from_secs(2 * 60), status: Status::Assigned },
        Step { after: Duration::from_secs(5 * 60), status: Status::InProgress },
        Step { after: Duration::from_secs(10 * 60), status: Status::Resolved },
    ]
}

struct Run {
    generation: u64,
    handle: JoinHandle<()>,
}

pub struct WorkflowSimulator {
    service: Arc<ComplaintService>,
    steps: Vec<Step>,
    runs: Mutex<HashMap<String, Run>>,
    generations: AtomicU64,
}

impl WorkflowSimulator {
    pub fn new(service: Arc<ComplaintService>, steps: Vec<Step>) -> Self {
        Self {
            service,
            steps,
            runs: Mutex::new(HashMap::new()),
            generations: AtomicU64::new(0),
        }
    }

    fn runs(&self) -> std::sync::MutexGuard<'_, HashMap<String, Run>> {
        self.runs.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Schedule the steps for `complaint_id`, replacing any run already
    /// scheduled for it.
    pub fn start(self: &Arc<Self>, complaint_id: &str) {
        let id = complaint_id.to_string();
        let this = Arc::clone(self);
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);

        // hold the map while spawning so the run cannot deregister before
        // it has been registered
        let mut runs = self.runs();
        let handle = tokio::spawn(async move {
            let started = Instant::now();
            for step in this.steps.clone() {
                sleep_until(started + step.after).await;
                match this.advance(&id, step.status).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => {
                        tracing::warn!(complaint = %id, status = %step.status, error = %e, "simulated step failed; stopping");
                        break;
                    }
                }
            }
            this.finish(&id, generation);
        });

        if let Some(previous) = runs.insert(complaint_id.to_string(), Run { generation, handle }) {
            previous.handle.abort();
        }
        tracing::debug!(complaint = complaint_id, "workflow simulation scheduled");
    }

    /// Stop a pending run. Returns false if nothing was scheduled.
    pub fn cancel(&self, complaint_id: &str) -> bool {
        match self.runs().remove(complaint_id) {
            Some(run) => {
                run.handle.abort();
                tracing::debug!(complaint = complaint_id, "workflow simulation cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, complaint_id: &str) -> bool {
        self.runs().contains_key(complaint_id)
    }

    /// Deregister a finished run, unless a newer run already took its slot.
    fn finish(&self, complaint_id: &str, generation: u64) {
        let mut runs = self.runs();
        if runs.get(complaint_id).is_some_and(|r| r.generation == generation) {
            runs.remove(complaint_id);
        }
    }

    /// Perform one step. `Ok(false)` means the run should end quietly.
    async fn advance(&self, id: &str, target: Status) -> Result<bool> {
        let current = self.service.get(id).await?;
        if current.status.is_terminal() {
            return Ok(false);
        }

        match target {
            Status::Assigned if current.status != Status::Submitted => Ok(true),
            Status::Assigned => match self.service.assign(id, None, ACTOR).await {
                Ok(_) => Ok(true),
                Err(IntakeError::RoutingFailure { .. }) => Ok(false),
                Err(e) => Err(e),
            },
            Status::Resolved => {
                let update = StatusUpdate {
                    status: Status::Resolved,
                    note: Some("Complaint resolved".into()),
                    author: Some(ACTOR.into()),
                    remarks: Some("Complaint resolved".into()),
                    attachments: vec![Attachment {
                        name: "simulated-proof.jpg".into(),
                        content_type: Some("image/jpeg".into()),
                        uploaded_by: Some(ACTOR.into()),
                        uploaded_at: Some(self.service.now()),
                    }],
                };
                self.service.update_status(id, update).await.map(|_| true)
            }
            status => {
                let mut update = StatusUpdate::to(status);
                update.note = Some(format!("Complaint {}", status.as_str().replace('-', " ")));
                update.author = Some(ACTOR.into());
                self.service.update_status(id, update).await.map(|_| true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::notify::RecordingNotifier;
    use crate::store::MemoryStore;

    fn simulator() -> Arc<WorkflowSimulator> {
        let service = Arc::new(ComplaintService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingNotifier::new()),
            Arc::new(SystemClock),
        ));
        Arc::new(WorkflowSimulator::new(service, default_steps()))
    }

    #[tokio::test(start_paused = true)]
    async fn stale_run_does_not_deregister_its_replacement() {
        let sim = simulator();
        sim.start("IALA0000001");
        sim.start("IALA0000001");

        // the first run finishing late must leave the second one in place
        sim.finish("IALA0000001", 0);
        assert!(sim.is_running("IALA0000001"));
        assert!(sim.cancel("IALA0000001"));

        sim.start("IALA0000001");
        sim.finish("IALA0000001", 2);
        assert!(!sim.is_running("IALA0000001"));
    }
}
