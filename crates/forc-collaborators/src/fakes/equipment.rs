use crate::idempotency::{IdempotencyKey, IdempotencyStore};
use crate::traits::EquipmentClient;
use async_trait::async_trait;
use dashmap::DashMap;
use forc_core::cache::{LeaseCache, LeaseInfo, LeaseKind};
use forc_core::error::{BusinessError, CollaboratorError};
use forc_core::ids::{OrderId, ReservationId};
use forc_core::model::equipment::EquipmentReservation;
use forc_core::model::station::EquipmentType;
use std::collections::HashMap;

pub struct InMemoryEquipment {
    inventory: DashMap<EquipmentType, Vec<String>>,
    reservations: DashMap<ReservationId, (EquipmentType, Vec<String>)>,
    leases: LeaseCache,
    idempotency: IdempotencyStore,
}

impl InMemoryEquipment {
    pub fn new() -> Self {
        Self {
            inventory: DashMap::new(),
            reservations: DashMap::new(),
            leases: LeaseCache::default(),
            idempotency: IdempotencyStore::new(),
        }
    }

    pub fn seed(&self, equipment_type: EquipmentType, unit_ids: Vec<String>) {
        self.inventory.insert(equipment_type, unit_ids);
    }
}

impl Default for InMemoryEquipment {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EquipmentClient for InMemoryEquipment {
    async fn check_availability(
        &self,
        equipment_types: &[EquipmentType],
        _zone: Option<&str>,
        _required_count: usize,
    ) -> Result<HashMap<EquipmentType, usize>, CollaboratorError> {
        Ok(equipment_types
            .iter()
            .map(|t| {
                let available = self.inventory.get(t).map(|v| v.len()).unwrap_or(0);
                (*t, available)
            })
            .collect())
    }

    async fn reserve_equipment(
        &self,
        equipment_type: EquipmentType,
        order_id: OrderId,
        quantity: usize,
        _zone: Option<&str>,
        reservation_id: ReservationId,
    ) -> Result<EquipmentReservation, CollaboratorError> {
        let key = IdempotencyKey(format!("reserve-equip:{reservation_id}"));
        let inventory = &self.inventory;
        let reservations = &self.reservations;
        let leases = &self.leases;

        self.idempotency
            .once(&key, move || async move {
                let mut pool = inventory
                    .get_mut(&equipment_type)
                    .ok_or(CollaboratorError::Business(BusinessError::EquipmentUnavailable))?;

                if pool.len() < quantity {
                    return Err(CollaboratorError::Business(BusinessError::EquipmentUnavailable));
                }

                let reserved: Vec<String> = pool.split_off(pool.len() - quantity);
                drop(pool);
                reservations.insert(reservation_id, (equipment_type, reserved.clone()));
                leases
                    .hold(reservation_id, LeaseInfo { owner: order_id.to_string(), kind: LeaseKind::Equipment })
                    .await;

                Ok(EquipmentReservation {
                    reservation_id,
                    order_id,
                    equipment_type,
                    reserved_equipment_ids: reserved,
                })
            })
            .await
    }

    async fn release_equipment(&self, reservation_id: ReservationId) -> Result<(), CollaboratorError> {
        // Idempotent: a duplicate release of an already-released id is a no-op.
        if let Some((_, (equipment_type, mut unit_ids))) = self.reservations.remove(&reservation_id) {
            self.inventory.entry(equipment_type).or_default().append(&mut unit_ids);
        }
        self.leases.release(&reservation_id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reserve_then_release_returns_units_to_the_pool() {
        let equipment = InMemoryEquipment::new();
        equipment.seed(EquipmentType::HazmatKit, vec!["KIT-1".into(), "KIT-2".into()]);

        let reservation_id = ReservationId::new();
        let result = equipment
            .reserve_equipment(EquipmentType::HazmatKit, OrderId::new(), 1, None, reservation_id)
            .await
            .unwrap();
        assert_eq!(result.reserved_equipment_ids.len(), 1);

        let availability = equipment
            .check_availability(&[EquipmentType::HazmatKit], None, 0)
            .await
            .unwrap();
        assert_eq!(availability[&EquipmentType::HazmatKit], 1);

        equipment.release_equipment(reservation_id).await.unwrap();
        let availability = equipment
            .check_availability(&[EquipmentType::HazmatKit], None, 0)
            .await
            .unwrap();
        assert_eq!(availability[&EquipmentType::HazmatKit], 2);
    }

    #[tokio::test]
    async fn duplicate_reservation_id_replays_the_first_result() {
        let equipment = InMemoryEquipment::new();
        equipment.seed(EquipmentType::Forklift, vec!["FORK-1".into()]);
        let reservation_id = ReservationId::new();
        let order_id = OrderId::new();

        let first = equipment
            .reserve_equipment(EquipmentType::Forklift, order_id, 1, None, reservation_id)
            .await
            .unwrap();
        let second = equipment
            .reserve_equipment(EquipmentType::Forklift, order_id, 1, None, reservation_id)
            .await
            .unwrap();

        assert_eq!(first.reserved_equipment_ids, second.reserved_equipment_ids);
        let availability = equipment
            .check_availability(&[EquipmentType::Forklift], None, 0)
            .await
            .unwrap();
        assert_eq!(availability[&EquipmentType::Forklift], 0, "retry must not double-reserve");
    }

    #[tokio::test]
    async fn reserving_more_than_available_is_equipment_unavailable() {
        let equipment = InMemoryEquipment::new();
        equipment.seed(EquipmentType::ColdStorageUnit, vec!["COLD-1".into()]);

        let result = equipment
            .reserve_equipment(EquipmentType::ColdStorageUnit, OrderId::new(), 2, None, ReservationId::new())
            .await;
        assert!(matches!(result, Err(CollaboratorError::Business(BusinessError::EquipmentUnavailable))));
    }
}
