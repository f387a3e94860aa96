//! TTL cache used for reservation lease bookkeeping: spec §5 states "any
//! lease is represented by a `reservationId` with a TTL, and any leakage is
//! reclaimed on TTL expiry" — `moka`'s time-to-live eviction gives us that
//! for free, same as the reference platform's `CacheManager`.

use crate::ids::ReservationId;
use moka::future::Cache;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LeaseInfo {
    pub owner: String,
    pub kind: LeaseKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseKind {
    Capacity,
    Labor,
    Equipment,
}

pub struct LeaseCache {
    leases: Cache<ReservationId, LeaseInfo>,
}

impl LeaseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            leases: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn hold(&self, reservation_id: ReservationId, info: LeaseInfo) {
        self.leases.insert(reservation_id, info).await;
    }

    pub async fn release(&self, reservation_id: &ReservationId) {
        self.leases.invalidate(reservation_id).await;
    }

    pub async fn is_held(&self, reservation_id: &ReservationId) -> bool {
        self.leases.get(reservation_id).await.is_some()
    }

    pub fn entry_count(&self) -> u64 {
        self.leases.entry_count()
    }
}

impl Default for LeaseCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(15 * 60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn held_lease_is_reported_held_until_released() {
        let cache = LeaseCache::default();
        let id = ReservationId::new();
        cache
            .hold(id, LeaseInfo { owner: "WF-1".to_string(), kind: LeaseKind::Capacity })
            .await;
        assert!(cache.is_held(&id).await);

        cache.release(&id).await;
        assert!(!cache.is_held(&id).await);
    }
}
