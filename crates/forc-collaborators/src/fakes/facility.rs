use crate::idempotency::IdempotencyStore;
use crate::traits::{
    FacilityClient, ReleaseStationCapacityRequest, ReservedOrder, ReserveStationCapacityRequest,
    ReserveStationCapacityResult,
};
use async_trait::async_trait;
use dashmap::DashMap;
use forc_core::cache::{LeaseCache, LeaseInfo, LeaseKind};
use forc_core::error::{BusinessError, CollaboratorError};
use forc_core::ids::{OrderId, ReservationId, StationId};
use forc_core::model::process_path::Requirement;
use forc_core::model::station::{Station, StationType};
use std::sync::Arc;

/// Linearizes `reserve_station_capacity`/`release_station_capacity` per
/// station: at most one concurrent caller wins the last slot (spec §5).
pub struct InMemoryFacility {
    stations: DashMap<StationId, Station>,
    reservations: DashMap<ReservationId, (StationId, OrderId, u32)>,
    idempotency: IdempotencyStore,
    leases: LeaseCache,
}

impl InMemoryFacility {
    pub fn new() -> Self {
        Self {
            stations: DashMap::new(),
            reservations: DashMap::new(),
            idempotency: IdempotencyStore::new(),
            leases: LeaseCache::default(),
        }
    }

    pub fn seed(&self, station: Station) {
        self.stations.insert(station.station_id, station);
    }

    pub fn station_snapshot(&self, station_id: StationId) -> Option<Station> {
        self.stations.get(&station_id).map(|s| s.clone())
    }

    pub fn all_station_ids(&self) -> Vec<StationId> {
        self.stations.iter().map(|e| *e.key()).collect()
    }
}

impl Default for InMemoryFacility {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FacilityClient for InMemoryFacility {
    async fn find_capable_stations(
        &self,
        requirements: &[Requirement],
        station_type: Option<StationType>,
        zone: Option<&str>,
    ) -> Result<Vec<Station>, CollaboratorError> {
        let mut matches: Vec<Station> = self
            .stations
            .iter()
            .map(|e| e.value().clone())
            .filter(|s| s.supports(requirements))
            .filter(|s| station_type.map(|t| t == s.station_type).unwrap_or(true))
            .filter(|s| zone.map(|z| z == s.zone).unwrap_or(true))
            .collect();

        // Deterministic ordering: greatest available capacity first, ties
        // broken by station id (spec §4.4 step 3 fallback rule).
        matches.sort_by(|a, b| {
            b.available_capacity()
                .cmp(&a.available_capacity())
                .then_with(|| a.station_id.as_uuid().cmp(&b.station_id.as_uuid()))
        });

        Ok(matches)
    }

    async fn get_station(&self, station_id: StationId) -> Result<Station, CollaboratorError> {
        self.stations
            .get(&station_id)
            .map(|s| s.clone())
            .ok_or_else(|| CollaboratorError::Business(BusinessError::StationOffline))
    }

    async fn reserve_station_capacity(
        &self,
        req: ReserveStationCapacityRequest,
    ) -> Result<ReserveStationCapacityResult, CollaboratorError> {
        let key = crate::idempotency::IdempotencyKey(format!("reserve-cap:{}", req.reservation_id));
        let stations = &self.stations;
        let reservations = &self.reservations;
        let leases = &self.leases;

        self.idempotency
            .once(&key, move || {
                let req = req.clone();
                async move {
                    let mut station = stations
                        .get_mut(&req.station_id)
                        .ok_or(CollaboratorError::Business(BusinessError::StationOffline))?;

                    if station.available_capacity() < req.required_slots {
                        return Err(CollaboratorError::Business(BusinessError::CapacityExceeded));
                    }

                    station.pending_reserved_slots += req.required_slots;
                    let remaining = station.available_capacity();
                    drop(station);
                    reservations.insert(req.reservation_id, (req.station_id, req.order_id, req.required_slots));
                    leases
                        .hold(
                            req.reservation_id,
                            LeaseInfo { owner: req.order_id.to_string(), kind: LeaseKind::Capacity },
                        )
                        .await;

                    Ok(ReserveStationCapacityResult {
                        reservation_id: req.reservation_id,
                        station_id: req.station_id,
                        reserved_slots: req.required_slots,
                        remaining_capacity: remaining,
                    })
                }
            })
            .await
    }

    async fn release_station_capacity(&self, req: ReleaseStationCapacityRequest) -> Result<(), CollaboratorError> {
        if let Some((_, (station_id, _order_id, slots))) = self.reservations.remove(&req.reservation_id) {
            if let Some(mut station) = self.stations.get_mut(&station_id) {
                station.pending_reserved_slots = station.pending_reserved_slots.saturating_sub(slots);
            }
        }
        self.leases.release(&req.reservation_id).await;
        // Idempotent: releasing an already-released reservation is a no-op.
        Ok(())
    }

    async fn reserved_orders(&self, station_id: StationId) -> Result<Vec<ReservedOrder>, CollaboratorError> {
        Ok(self
            .reservations
            .iter()
            .filter(|e| e.value().0 == station_id)
            .map(|e| ReservedOrder {
                order_id: e.value().1,
                reservation_id: *e.key(),
                slots: e.value().2,
            })
            .collect())
    }
}

pub type SharedFacility = Arc<InMemoryFacility>;

#[cfg(test)]
mod tests {
    use super::*;
    use forc_core::ids::StationId;
    use forc_core::model::station::EquipmentType;

    fn station(id: StationId, max: u32) -> Station {
        Station {
            station_id: id,
            zone: "z1".into(),
            station_type: StationType::Packing,
            capabilities: vec![Requirement::SingleItem],
            equipment: Vec::<EquipmentType>::new(),
            max_concurrent_tasks: max,
            current_tasks: 0,
            pending_reserved_slots: 0,
        }
    }

    #[tokio::test]
    async fn reserve_then_release_restores_available_capacity() {
        let facility = InMemoryFacility::new();
        let station_id = StationId::new();
        facility.seed(station(station_id, 5));

        let before = facility.station_snapshot(station_id).unwrap().available_capacity();

        let reservation_id = ReservationId::new();
        let order_id = OrderId::new();
        facility
            .reserve_station_capacity(ReserveStationCapacityRequest {
                station_id,
                order_id,
                required_slots: 2,
                reservation_id,
            })
            .await
            .unwrap();

        assert_eq!(facility.station_snapshot(station_id).unwrap().available_capacity(), before - 2);

        facility
            .release_station_capacity(ReleaseStationCapacityRequest {
                station_id,
                order_id,
                reservation_id,
                reason: None,
            })
            .await
            .unwrap();

        assert_eq!(facility.station_snapshot(station_id).unwrap().available_capacity(), before);
    }

    #[tokio::test]
    async fn reserving_more_than_available_is_capacity_exceeded() {
        let facility = InMemoryFacility::new();
        let station_id = StationId::new();
        facility.seed(station(station_id, 1));

        let result = facility
            .reserve_station_capacity(ReserveStationCapacityRequest {
                station_id,
                order_id: OrderId::new(),
                required_slots: 2,
                reservation_id: ReservationId::new(),
            })
            .await;

        assert!(matches!(result, Err(CollaboratorError::Business(BusinessError::CapacityExceeded))));
    }
}
