use crate::ids::{OrderId, ReservationId, StationId};
use crate::model::process_path::{ProcessPath, Requirement};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SLOT_CAP: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Held,
    Released,
    Consumed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityReservation {
    pub reservation_id: ReservationId,
    pub station_id: StationId,
    pub order_id: OrderId,
    pub reserved_slots: u32,
    pub held_until: DateTime<Utc>,
    pub status: ReservationStatus,
}

/// Deterministic slot formula (spec §3): base 1 (single-item) or 2
/// (multi-item), +1 per special-handling tag in
/// {hazmat, coldChain, highValue, giftWrap, fragile}, +2 if oversized,
/// capped at `SLOT_CAP`. Monotone in the multiset of special-handling tags
/// (spec §8 property 5).
pub fn required_slots(path: &ProcessPath) -> u32 {
    let base = if path.requirements.contains(&Requirement::MultiItem) {
        2
    } else {
        1
    };

    let additive: u32 = path
        .requirements
        .iter()
        .map(|req| match req {
            Requirement::Hazmat
            | Requirement::ColdChain
            | Requirement::HighValue
            | Requirement::GiftWrap
            | Requirement::Fragile => 1,
            Requirement::Oversized => 2,
            Requirement::SingleItem | Requirement::MultiItem => 0,
        })
        .sum();

    (base + additive).min(SLOT_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PathId;
    use std::collections::BTreeSet;

    fn path_with(requirements: &[Requirement]) -> ProcessPath {
        ProcessPath {
            path_id: PathId::new(),
            order_id: OrderId::new(),
            requirements: requirements.iter().copied().collect::<BTreeSet<_>>(),
            consolidation_required: requirements.contains(&Requirement::MultiItem),
            gift_wrap_required: requirements.contains(&Requirement::GiftWrap),
            special_handling: vec![],
            target_station_id: None,
            fallback_station_ids: vec![],
            tier: crate::model::process_path::Tier::Optimal,
            escalation_history: vec![],
        }
    }

    #[test]
    fn single_item_base_is_one() {
        let path = path_with(&[Requirement::SingleItem]);
        assert_eq!(required_slots(&path), 1);
    }

    #[test]
    fn multi_item_base_is_two() {
        let path = path_with(&[Requirement::MultiItem]);
        assert_eq!(required_slots(&path), 2);
    }

    #[test]
    fn hazmat_adds_one_slot() {
        // spec S2: base 1 (single item) + 1 hazmat = 2.
        let path = path_with(&[Requirement::SingleItem, Requirement::Hazmat]);
        assert_eq!(required_slots(&path), 2);
    }

    #[test]
    fn oversized_adds_two_slots() {
        let path = path_with(&[Requirement::SingleItem, Requirement::Oversized]);
        assert_eq!(required_slots(&path), 3);
    }

    #[test]
    fn combined_tags_cap_at_five() {
        let path = path_with(&[
            Requirement::MultiItem,
            Requirement::Hazmat,
            Requirement::ColdChain,
            Requirement::HighValue,
            Requirement::GiftWrap,
            Requirement::Fragile,
            Requirement::Oversized,
        ]);
        assert_eq!(required_slots(&path), SLOT_CAP);
    }

    #[test]
    fn slots_stay_within_bounds_for_every_tag_combination() {
        let tags = [
            Requirement::SingleItem,
            Requirement::MultiItem,
            Requirement::Hazmat,
            Requirement::ColdChain,
            Requirement::HighValue,
            Requirement::GiftWrap,
            Requirement::Fragile,
            Requirement::Oversized,
        ];
        // Exhaustively check every subset of the 6 non-cardinality tags
        // against both cardinalities (spec §8 property 5).
        for cardinality in [Requirement::SingleItem, Requirement::MultiItem] {
            for mask in 0u32..64 {
                let mut reqs = vec![cardinality];
                for (i, tag) in tags[2..].iter().enumerate() {
                    if mask & (1 << i) != 0 {
                        reqs.push(*tag);
                    }
                }
                let slots = required_slots(&path_with(&reqs));
                assert!((1..=SLOT_CAP).contains(&slots), "slots={slots} reqs={reqs:?}");
            }
        }
    }
}
