//! Typed operation surface (spec §4.1, §6). Each trait maps 1:1 to an
//! external service; the façade owns no domain state of its own — retries
//! and idempotency are layered on top in `Collaborators`, not inside these
//! trait impls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forc_core::error::CollaboratorError;
use forc_core::ids::{AssignmentId, OrderId, PathId, ReservationId, StationId, WaveId, WorkerId};
use forc_core::model::equipment::EquipmentReservation;
use forc_core::model::labor::{LaborAssignment, Skill, Worker};
use forc_core::model::metrics::RoutingMetricsSnapshot;
use forc_core::model::order::Order;
use forc_core::model::process_path::{ProcessPath, Requirement, Tier};
use forc_core::model::reservation::CapacityReservation;
use forc_core::model::station::{EquipmentType, Station, StationType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderValidation {
    pub valid: bool,
    pub errors: Vec<String>,
    pub validated_at: DateTime<Utc>,
}

#[async_trait]
pub trait OrderClient: Send + Sync {
    async fn validate(&self, order_id: OrderId) -> Result<OrderValidation, CollaboratorError>;
    async fn mark_picking(&self, order_id: OrderId) -> Result<(), CollaboratorError>;
    async fn mark_consolidated(&self, order_id: OrderId) -> Result<(), CollaboratorError>;
    async fn mark_packed(&self, order_id: OrderId) -> Result<(), CollaboratorError>;
    async fn assign_to_wave(&self, order_id: OrderId, wave_id: WaveId) -> Result<(), CollaboratorError>;
    async fn cancel(&self, order_id: OrderId, reason: &str) -> Result<(), CollaboratorError>;
    async fn reset_for_retry(&self, order_id: OrderId) -> Result<(), CollaboratorError>;
}

#[derive(Debug, Clone)]
pub struct ReserveUnitsRequest {
    pub order_id: OrderId,
    pub path_id: PathId,
    pub skus: Vec<String>,
    pub handler_id: String,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveUnitsResult {
    pub reservation_id: ReservationId,
}

#[async_trait]
pub trait UnitClient: Send + Sync {
    async fn reserve_units(&self, req: ReserveUnitsRequest) -> Result<ReserveUnitsResult, CollaboratorError>;
    async fn release_units(&self, reservation_id: ReservationId) -> Result<(), CollaboratorError>;
    async fn confirm_pick(&self, order_id: OrderId) -> Result<(), CollaboratorError>;
    async fn confirm_consolidation(&self, order_id: OrderId) -> Result<(), CollaboratorError>;
    async fn confirm_packed(&self, order_id: OrderId) -> Result<(), CollaboratorError>;
    async fn confirm_shipped(&self, order_id: OrderId) -> Result<(), CollaboratorError>;
}

#[derive(Debug, Clone)]
pub struct ReserveStationCapacityRequest {
    pub station_id: StationId,
    pub order_id: OrderId,
    pub required_slots: u32,
    pub reservation_id: ReservationId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveStationCapacityResult {
    pub reservation_id: ReservationId,
    pub station_id: StationId,
    pub reserved_slots: u32,
    pub remaining_capacity: u32,
}

#[derive(Debug, Clone)]
pub struct ReleaseStationCapacityRequest {
    pub station_id: StationId,
    pub order_id: OrderId,
    pub reservation_id: ReservationId,
    pub reason: Option<String>,
}

/// One order's standing capacity reservation at a station, as needed by the
/// optimization controller's rebalance phase to move orders off an
/// overloaded station without inventing order identities of its own
/// (spec §4.5 phase 2).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReservedOrder {
    pub order_id: OrderId,
    pub reservation_id: ReservationId,
    pub slots: u32,
}

#[async_trait]
pub trait FacilityClient: Send + Sync {
    async fn find_capable_stations(
        &self,
        requirements: &[Requirement],
        station_type: Option<StationType>,
        zone: Option<&str>,
    ) -> Result<Vec<Station>, CollaboratorError>;

    async fn get_station(&self, station_id: StationId) -> Result<Station, CollaboratorError>;

    async fn reserve_station_capacity(
        &self,
        req: ReserveStationCapacityRequest,
    ) -> Result<ReserveStationCapacityResult, CollaboratorError>;

    async fn release_station_capacity(&self, req: ReleaseStationCapacityRequest) -> Result<(), CollaboratorError>;

    /// Orders currently holding a capacity reservation at `station_id`,
    /// used by the optimization controller to pick rebalance candidates.
    async fn reserved_orders(&self, station_id: StationId) -> Result<Vec<ReservedOrder>, CollaboratorError>;
}

#[async_trait]
pub trait LaborClient: Send + Sync {
    async fn find_certified_workers(
        &self,
        required_skills: &[Skill],
        zone: Option<&str>,
        min_count: usize,
    ) -> Result<Vec<Worker>, CollaboratorError>;

    async fn assign_certified_worker(
        &self,
        order_id: OrderId,
        station_id: StationId,
        worker_id: WorkerId,
        required_skills: &[Skill],
    ) -> Result<AssignmentId, CollaboratorError>;

    async fn release_worker(&self, assignment_id: AssignmentId) -> Result<(), CollaboratorError>;

    async fn get_available_workers(&self, zone: Option<&str>) -> Result<Vec<Worker>, CollaboratorError>;

    async fn get_assignment(&self, assignment_id: AssignmentId) -> Result<LaborAssignment, CollaboratorError>;
}

#[async_trait]
pub trait EquipmentClient: Send + Sync {
    async fn check_availability(
        &self,
        equipment_types: &[EquipmentType],
        zone: Option<&str>,
        required_count: usize,
    ) -> Result<HashMap<EquipmentType, usize>, CollaboratorError>;

    async fn reserve_equipment(
        &self,
        equipment_type: EquipmentType,
        order_id: OrderId,
        quantity: usize,
        zone: Option<&str>,
        reservation_id: ReservationId,
    ) -> Result<EquipmentReservation, CollaboratorError>;

    async fn release_equipment(&self, reservation_id: ReservationId) -> Result<(), CollaboratorError>;
}

#[async_trait]
pub trait ProcessPathClient: Send + Sync {
    async fn determine_path(&self, order: &Order) -> Result<ProcessPath, CollaboratorError>;
    async fn get_by_order(&self, order_id: OrderId) -> Result<ProcessPath, CollaboratorError>;
    async fn assign_station(&self, path_id: PathId, station_id: StationId) -> Result<(), CollaboratorError>;
    async fn escalate(
        &self,
        path_id: PathId,
        trigger: forc_core::model::escalation::EscalationTrigger,
        reason: &str,
    ) -> Result<Tier, CollaboratorError>;
    async fn downgrade(&self, path_id: PathId, to_tier: Tier) -> Result<(), CollaboratorError>;
}

#[derive(Debug, Clone)]
pub struct OptimizeStationSelectionRequest {
    pub order_id: OrderId,
    pub priority: forc_core::model::order::Priority,
    pub requirements: Vec<Requirement>,
    pub special_handling: Vec<Requirement>,
    pub item_count: usize,
    pub total_weight: f64,
    pub promised_delivery_at: DateTime<Utc>,
    pub required_skills: Vec<Skill>,
    pub required_equipment: Vec<EquipmentType>,
    pub zone: Option<String>,
    pub station_type: Option<StationType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternateStation {
    pub station_id: StationId,
    pub score: f64,
    pub rank: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeStationSelectionResult {
    pub selected_station_id: StationId,
    pub score: f64,
    pub reasoning: HashMap<String, f64>,
    pub alternate_stations: Vec<AlternateStation>,
    pub confidence: f64,
    pub decision_time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RoutingMetricsRequest {
    pub facility_id: Option<String>,
    pub zone: Option<String>,
    pub time_window_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerouteResult {
    pub new_station_id: StationId,
    pub confidence: f64,
}

#[async_trait]
pub trait RoutingClient: Send + Sync {
    async fn optimize_station_selection(
        &self,
        req: OptimizeStationSelectionRequest,
    ) -> Result<OptimizeStationSelectionResult, CollaboratorError>;

    async fn get_routing_metrics(
        &self,
        req: RoutingMetricsRequest,
    ) -> Result<RoutingMetricsSnapshot, CollaboratorError>;

    async fn reroute_order(
        &self,
        order_id: OrderId,
        reason: &str,
        force_reroute: bool,
    ) -> Result<RerouteResult, CollaboratorError>;

    /// Orders the current metrics snapshot flags as rerouting candidates,
    /// honored only on the *next* planning attempt (spec §9 open question).
    async fn rerouting_candidates(&self) -> Result<Vec<OrderId>, CollaboratorError>;
}

#[async_trait]
pub trait WaveClient: Send + Sync {
    async fn assign_order_to_wave(&self, wave_id: WaveId, order_id: OrderId) -> Result<(), CollaboratorError>;
    async fn get_wave(&self, wave_id: WaveId) -> Result<forc_core::model::wave::Wave, CollaboratorError>;
    async fn find_compatible_open_wave(
        &self,
        path: &ProcessPath,
    ) -> Result<Option<WaveId>, CollaboratorError>;
    async fn request_wave_assignment(&self, order_id: OrderId, path: &ProcessPath) -> Result<(), CollaboratorError>;

    /// Polls for a `waveAssigned` signal previously requested via
    /// `request_wave_assignment`; `None` means it has not arrived yet.
    async fn poll_wave_assignment(&self, order_id: OrderId) -> Result<Option<WaveId>, CollaboratorError>;
}
