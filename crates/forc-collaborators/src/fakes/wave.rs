use crate::traits::WaveClient;
use async_trait::async_trait;
use dashmap::DashMap;
use forc_core::error::{BusinessError, CollaboratorError};
use forc_core::ids::{OrderId, WaveId};
use forc_core::model::process_path::ProcessPath;
use forc_core::model::wave::Wave;

pub struct InMemoryWave {
    waves: DashMap<WaveId, Wave>,
    pending_signals: DashMap<OrderId, WaveId>,
}

impl InMemoryWave {
    pub fn new() -> Self {
        Self {
            waves: DashMap::new(),
            pending_signals: DashMap::new(),
        }
    }

    pub fn seed(&self, wave: Wave) {
        self.waves.insert(wave.wave_id, wave);
    }

    pub fn all(&self) -> Vec<Wave> {
        self.waves.iter().map(|e| e.value().clone()).collect()
    }

    /// Test/ops hook standing in for the external wave planner: assigns
    /// `order_id` to `wave_id` and makes the `waveAssigned` signal available
    /// to a workflow awaiting it (spec §4.4 step 8).
    pub fn deliver_wave_assigned(&self, order_id: OrderId, wave_id: WaveId) {
        self.pending_signals.insert(order_id, wave_id);
    }

    pub fn take_signal(&self, order_id: OrderId) -> Option<WaveId> {
        self.pending_signals.remove(&order_id).map(|(_, v)| v)
    }
}

impl Default for InMemoryWave {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WaveClient for InMemoryWave {
    async fn assign_order_to_wave(&self, wave_id: WaveId, order_id: OrderId) -> Result<(), CollaboratorError> {
        let mut wave = self
            .waves
            .get_mut(&wave_id)
            .ok_or_else(|| CollaboratorError::Business(BusinessError::InvalidInput("unknown wave".into())))?;
        if !wave.orders.contains(&order_id) {
            wave.orders.push(order_id);
        }
        Ok(())
    }

    async fn get_wave(&self, wave_id: WaveId) -> Result<Wave, CollaboratorError> {
        self.waves
            .get(&wave_id)
            .map(|e| e.clone())
            .ok_or_else(|| CollaboratorError::Business(BusinessError::InvalidInput("unknown wave".into())))
    }

    async fn find_compatible_open_wave(&self, path: &ProcessPath) -> Result<Option<WaveId>, CollaboratorError> {
        let requirements: Vec<_> = path.requirements.iter().copied().collect();
        Ok(self
            .waves
            .iter()
            .find(|e| {
                let wave = e.value();
                wave.status == forc_core::model::wave::WaveStatus::Planning
                    && requirements.iter().all(|r| wave.required_capabilities.contains(r))
                    && path.special_handling_subset_of(&wave.special_handling_types)
            })
            .map(|e| *e.key()))
    }

    async fn request_wave_assignment(&self, _order_id: OrderId, _path: &ProcessPath) -> Result<(), CollaboratorError> {
        // Forwarded to the external wave planner, out of core scope; the
        // in-memory fake relies on `deliver_wave_assigned` being called by
        // a test or demo driver to simulate the planner's eventual signal.
        Ok(())
    }

    async fn poll_wave_assignment(&self, order_id: OrderId) -> Result<Option<WaveId>, CollaboratorError> {
        Ok(self.take_signal(order_id))
    }
}
