// src/lib.rs

use std::sync::Arc;

pub mod assistant;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod routes;
pub mod seed;
pub mod service;
pub mod simulator;
pub mod store;
pub mod sweep;

use service::ComplaintService;
use simulator::WorkflowSimulator;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ComplaintService>,
    /// Present only when the demo workflow simulator is enabled.
    pub simulator: Option<Arc<WorkflowSimulator>>,
}

impl AppState {
    pub fn new(service: Arc<ComplaintService>) -> Self {
        Self { service, simulator: None }
    }

    pub fn with_simulator(mut self, simulator: Arc<WorkflowSimulator>) -> Self {
        self.simulator = Some(simulator);
        self
    }

    pub fn cancel_simulation(&self, complaint_id: &str) {
        if let Some(sim) = &self.simulator {
            sim.cancel(complaint_id);
        }
    }
}
