use crate::traits::LaborClient;
use async_trait::async_trait;
use dashmap::DashMap;
use forc_core::error::{BusinessError, CollaboratorError};
use forc_core::ids::{AssignmentId, OrderId, StationId, WorkerId};
use forc_core::model::labor::{LaborAssignment, Skill, Worker};
use std::collections::BTreeSet;

pub struct InMemoryLabor {
    workers: DashMap<WorkerId, Worker>,
    assignments: DashMap<AssignmentId, LaborAssignment>,
}

impl InMemoryLabor {
    pub fn new() -> Self {
        Self {
            workers: DashMap::new(),
            assignments: DashMap::new(),
        }
    }

    pub fn seed(&self, worker: Worker) {
        self.workers.insert(worker.worker_id, worker);
    }
}

impl Default for InMemoryLabor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LaborClient for InMemoryLabor {
    async fn find_certified_workers(
        &self,
        required_skills: &[Skill],
        zone: Option<&str>,
        min_count: usize,
    ) -> Result<Vec<Worker>, CollaboratorError> {
        let required: BTreeSet<Skill> = required_skills.iter().copied().collect();

        let mut matching: Vec<Worker> = self
            .workers
            .iter()
            .map(|e| e.value().clone())
            .filter(|w| required.is_subset(&w.skills))
            .filter(|w| zone.map(|z| z == w.zone).unwrap_or(true))
            .collect();

        matching.sort_by_key(|w| w.worker_id.as_uuid());

        if matching.len() < min_count {
            return Err(CollaboratorError::Business(BusinessError::WorkerUnavailable));
        }
        Ok(matching)
    }

    async fn assign_certified_worker(
        &self,
        order_id: OrderId,
        station_id: StationId,
        worker_id: WorkerId,
        required_skills: &[Skill],
    ) -> Result<AssignmentId, CollaboratorError> {
        if !self.workers.contains_key(&worker_id) {
            return Err(CollaboratorError::Business(BusinessError::WorkerUnavailable));
        }
        let assignment_id = AssignmentId::new();
        self.assignments.insert(
            assignment_id,
            LaborAssignment {
                assignment_id,
                order_id,
                station_id,
                worker_id,
                required_skills: required_skills.iter().copied().collect(),
            },
        );
        Ok(assignment_id)
    }

    async fn release_worker(&self, assignment_id: AssignmentId) -> Result<(), CollaboratorError> {
        self.assignments.remove(&assignment_id);
        Ok(())
    }

    async fn get_available_workers(&self, zone: Option<&str>) -> Result<Vec<Worker>, CollaboratorError> {
        Ok(self
            .workers
            .iter()
            .map(|e| e.value().clone())
            .filter(|w| zone.map(|z| z == w.zone).unwrap_or(true))
            .collect())
    }

    async fn get_assignment(&self, assignment_id: AssignmentId) -> Result<LaborAssignment, CollaboratorError> {
        self.assignments
            .get(&assignment_id)
            .map(|a| a.clone())
            .ok_or_else(|| CollaboratorError::Business(BusinessError::WorkerUnavailable))
    }
}
