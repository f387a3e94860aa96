//! Path-aware wave planner (C3, spec §4.3): groups a candidate order pool
//! into one or more [`Wave`]s honoring the compatibility rule, type
//! assignment, priority tie-break, capacity cap, and station affinity.
//! Deterministic and pure over its inputs — no RPC calls, no clock reads.

use chrono::{DateTime, Utc};
use forc_core::ids::{OrderId, StationId, WaveId};
use forc_core::model::order::{Order, Priority};
use forc_core::model::process_path::{ProcessPath, Requirement};
use forc_core::model::wave::{Wave, WavePlanningConfig, WaveStatus, WaveType};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WaveError {
    #[error("no compatible orders to plan into a wave")]
    NoCompatibleOrders,
}

/// One candidate for wave admission: the order plus its already-determined
/// process path (C2 has already run by the time C3 sees an order).
#[derive(Debug, Clone)]
pub struct Candidate {
    pub order: Order,
    pub path: ProcessPath,
}

/// Groups `candidates` into waves per `config`. Deterministic for identical
/// input: sort keys never depend on hash-map iteration order or wall time.
pub fn plan_waves(
    candidates: &[Candidate],
    config: &WavePlanningConfig,
    scheduled_start: DateTime<Utc>,
) -> Result<Vec<Wave>, WaveError> {
    let admitted = filter_admissible(candidates, config);
    if admitted.is_empty() {
        return Err(WaveError::NoCompatibleOrders);
    }

    let buckets = bucket_by_type(&admitted);

    let mut waves = Vec::new();
    // Deterministic bucket order: `WaveType`'s `Ord` is most- to
    // least-specialized (spec §4.3 "type assignment"); iterate in reverse
    // so hazmat waves are emitted before standard ones, matching the
    // planner's documented precedence.
    let mut bucket_keys: Vec<WaveType> = buckets.keys().copied().collect();
    bucket_keys.sort();
    bucket_keys.reverse();

    for wave_type in bucket_keys {
        let mut members = buckets[&wave_type].clone();
        sort_by_priority(&mut members, config.priority_bias);

        for chunk in members.chunks(config.max_orders_per_wave.max(1)) {
            waves.push(build_wave(wave_type, chunk, scheduled_start));
        }
    }

    Ok(waves)
}

fn filter_admissible(candidates: &[Candidate], config: &WavePlanningConfig) -> Vec<Candidate> {
    candidates
        .iter()
        .filter(|c| {
            if let Some(required) = &config.required_process_paths {
                if !required.iter().all(|r| c.path.requirements.contains(r)) {
                    return false;
                }
            }
            if let Some(excluded) = &config.excluded_process_paths {
                if excluded.iter().any(|r| c.path.requirements.contains(r)) {
                    return false;
                }
            }
            if let Some(filter) = &config.special_handling_filter {
                if !c.path.special_handling.iter().all(|r| filter.contains(r)) {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect()
}

fn bucket_by_type(admitted: &[Candidate]) -> std::collections::HashMap<WaveType, Vec<Candidate>> {
    let mut buckets: std::collections::HashMap<WaveType, Vec<Candidate>> =
        std::collections::HashMap::new();
    for candidate in admitted {
        let requirements: Vec<Requirement> = candidate.path.requirements.iter().copied().collect();
        let wave_type = WaveType::for_requirements(&requirements);
        buckets.entry(wave_type).or_default().push(candidate.clone());
    }
    buckets
}

/// Priority desc (sameDay, nextDay, standard), then `promisedDeliveryAt`
/// asc, then `createdAt` asc (spec §4.3 "priority tie-break").
fn sort_by_priority(members: &mut [Candidate], priority_bias: bool) {
    members.sort_by(|a, b| {
        if priority_bias {
            let priority_cmp = b.order.priority.cmp(&a.order.priority);
            if priority_cmp != std::cmp::Ordering::Equal {
                return priority_cmp;
            }
        }
        a.order
            .promised_delivery_at
            .cmp(&b.order.promised_delivery_at)
            .then_with(|| a.order.created_at.cmp(&b.order.created_at))
            .then_with(|| a.order.order_id.as_uuid().cmp(&b.order.order_id.as_uuid()))
    });
}

fn build_wave(wave_type: WaveType, members: &[Candidate], scheduled_start: DateTime<Utc>) -> Wave {
    let mut required_capabilities: BTreeSet<Requirement> = BTreeSet::new();
    let mut special_handling_types: BTreeSet<Requirement> = BTreeSet::new();
    let mut target_ids: BTreeSet<StationId> = BTreeSet::new();
    let mut requires_certified_labor = false;

    for candidate in members {
        required_capabilities.extend(candidate.path.requirements.iter().copied());
        special_handling_types.extend(candidate.path.special_handling.iter().copied());
        if let Some(target) = candidate.path.target_station_id {
            target_ids.insert(target);
        }
        requires_certified_labor |= !candidate.path.special_handling.is_empty();
    }

    // Station affinity: if every member shares one target, this is exactly
    // that id; otherwise the union of member targets (spec §4.3) — both
    // cases are just "the set of observed targets".
    let target_station_ids: Vec<StationId> = target_ids.into_iter().collect();

    let orders: Vec<OrderId> = members.iter().map(|c| c.order.order_id).collect();

    Wave {
        wave_id: WaveId::new(),
        wave_type,
        required_capabilities: required_capabilities.into_iter().collect(),
        special_handling_types: special_handling_types.into_iter().collect(),
        station_requirements: Vec::new(),
        target_station_ids,
        requires_certified_labor,
        orders,
        scheduled_start,
        status: WaveStatus::Planning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use forc_core::ids::{OrderId, PathId};
    use forc_core::model::order::{ItemFlags, OrderItem};
    use std::collections::BTreeSet;

    fn order(priority: Priority, promised_offset_hours: i64) -> Order {
        let now = Utc::now();
        Order {
            order_id: OrderId::new(),
            items: vec![OrderItem {
                sku: "SKU1".into(),
                qty: 1,
                weight: 1.0,
                flags: ItemFlags::default(),
            }],
            priority,
            gift_wrap: false,
            total_value: 10.0,
            promised_delivery_at: now + Duration::hours(promised_offset_hours),
            created_at: now,
            zone: None,
        }
    }

    fn path_for(order: &Order, requirements: &[Requirement]) -> ProcessPath {
        ProcessPath {
            path_id: PathId::new(),
            order_id: order.order_id,
            requirements: requirements.iter().copied().collect(),
            consolidation_required: false,
            gift_wrap_required: false,
            special_handling: requirements
                .iter()
                .copied()
                .filter(|r| Requirement::SPECIAL_HANDLING.contains(r))
                .collect(),
            target_station_id: None,
            fallback_station_ids: Vec::new(),
            tier: forc_core::model::process_path::Tier::Optimal,
            escalation_history: Vec::new(),
        }
    }

    #[test]
    fn hazmat_never_shares_a_wave_with_standard() {
        let hazmat_order = order(Priority::Standard, 24);
        let hazmat_path = path_for(&hazmat_order, &[Requirement::SingleItem, Requirement::Hazmat]);
        let standard_order = order(Priority::Standard, 24);
        let standard_path = path_for(&standard_order, &[Requirement::SingleItem]);

        let candidates = vec![
            Candidate { order: hazmat_order, path: hazmat_path },
            Candidate { order: standard_order, path: standard_path },
        ];

        let waves = plan_waves(&candidates, &WavePlanningConfig::default(), Utc::now()).unwrap();
        assert_eq!(waves.len(), 2);
        let hazmat_wave = waves.iter().find(|w| w.wave_type == WaveType::Hazmat).unwrap();
        assert_eq!(hazmat_wave.orders.len(), 1);
    }

    #[test]
    fn most_specialized_type_wins_the_bucket() {
        let a = order(Priority::Standard, 24);
        let a_path = path_for(&a, &[Requirement::SingleItem, Requirement::ColdChain]);
        let candidates = vec![Candidate { order: a, path: a_path }];
        let waves = plan_waves(&candidates, &WavePlanningConfig::default(), Utc::now()).unwrap();
        assert_eq!(waves[0].wave_type, WaveType::ColdChain);
    }

    #[test]
    fn priority_tie_break_orders_same_day_first() {
        let same_day = order(Priority::SameDay, 48);
        let next_day = order(Priority::NextDay, 1);
        let same_day_path = path_for(&same_day, &[Requirement::SingleItem]);
        let next_day_path = path_for(&next_day, &[Requirement::SingleItem]);

        let candidates = vec![
            Candidate { order: next_day, path: next_day_path },
            Candidate { order: same_day.clone(), path: same_day_path },
        ];
        let waves = plan_waves(&candidates, &WavePlanningConfig::default(), Utc::now()).unwrap();
        assert_eq!(waves[0].orders[0], same_day.order_id);
    }

    #[test]
    fn capacity_cap_spawns_sibling_wave() {
        let mut config = WavePlanningConfig::default();
        config.max_orders_per_wave = 1;
        let a = order(Priority::Standard, 24);
        let b = order(Priority::Standard, 24);
        let a_path = path_for(&a, &[Requirement::SingleItem]);
        let b_path = path_for(&b, &[Requirement::SingleItem]);
        let candidates = vec![
            Candidate { order: a, path: a_path },
            Candidate { order: b, path: b_path },
        ];
        let waves = plan_waves(&candidates, &config, Utc::now()).unwrap();
        assert_eq!(waves.len(), 2);
        assert!(waves.iter().all(|w| w.orders.len() == 1));
    }

    #[test]
    fn no_compatible_orders_is_an_error() {
        let config = WavePlanningConfig {
            required_process_paths: Some(vec![Requirement::Hazmat]),
            ..WavePlanningConfig::default()
        };
        let a = order(Priority::Standard, 24);
        let a_path = path_for(&a, &[Requirement::SingleItem]);
        let candidates = vec![Candidate { order: a, path: a_path }];
        let err = plan_waves(&candidates, &config, Utc::now()).unwrap_err();
        assert!(matches!(err, WaveError::NoCompatibleOrders));
    }

    #[test]
    fn station_affinity_keeps_single_shared_target() {
        let mut a = order(Priority::Standard, 24);
        let mut a_path = path_for(&a, &[Requirement::SingleItem]);
        let target = StationId::new();
        a_path.target_station_id = Some(target);
        let mut b = order(Priority::Standard, 24);
        let mut b_path = path_for(&b, &[Requirement::SingleItem]);
        b_path.target_station_id = Some(target);
        a.zone = None;
        b.zone = None;

        let candidates = vec![
            Candidate { order: a, path: a_path },
            Candidate { order: b, path: b_path },
        ];
        let waves = plan_waves(&candidates, &WavePlanningConfig::default(), Utc::now()).unwrap();
        assert_eq!(waves[0].target_station_ids, vec![target]);
    }

    #[test]
    fn deterministic_for_identical_input() {
        let a = order(Priority::Standard, 24);
        let a_path = path_for(&a, &[Requirement::SingleItem]);
        let candidates = vec![Candidate { order: a, path: a_path }];
        let config = WavePlanningConfig::default();
        let start = Utc::now();
        let first = plan_waves(&candidates, &config, start).unwrap();
        let second = plan_waves(&candidates, &config, start).unwrap();
        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].wave_type, second[0].wave_type);
        assert_eq!(first[0].orders, second[0].orders);
    }
}
