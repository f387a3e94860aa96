//! Process-Path Determination (spec §4.2): a pure function of an `Order`
//! that derives required capabilities, special-handling tags, and the
//! initial (optimal) tier. No RPC calls happen inside this crate — the
//! workflow step that invokes it is responsible for persisting the result
//! via the process-path collaborator.

use forc_core::config::Thresholds;
use forc_core::ids::PathId;
use forc_core::model::process_path::{ProcessPath, Requirement, Tier};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PathError {
    #[error("order has no items")]
    EmptyOrder,
    #[error("item {sku} has non-positive quantity {qty}")]
    NonPositiveQuantity { sku: String, qty: i64 },
}

/// Determines the process path using the documented default thresholds
/// (`oversizedKg`, `highValueThreshold`); use
/// [`determine_path_with_thresholds`] to override them.
pub fn determine_path(order: &forc_core::model::order::Order) -> Result<ProcessPath, PathError> {
    determine_path_with_thresholds(order, &Thresholds::default())
}

pub fn determine_path_with_thresholds(
    order: &forc_core::model::order::Order,
    thresholds: &Thresholds,
) -> Result<ProcessPath, PathError> {
    if order.items.is_empty() {
        return Err(PathError::EmptyOrder);
    }
    for item in &order.items {
        if item.qty <= 0 {
            return Err(PathError::NonPositiveQuantity {
                sku: item.sku.clone(),
                qty: item.qty,
            });
        }
    }

    let mut requirements: BTreeSet<Requirement> = BTreeSet::new();

    requirements.insert(if order.items.len() > 1 {
        Requirement::MultiItem
    } else {
        Requirement::SingleItem
    });

    if order.gift_wrap {
        requirements.insert(Requirement::GiftWrap);
    }

    for item in &order.items {
        if item.flags.hazmat {
            requirements.insert(Requirement::Hazmat);
        }
        if item.flags.cold_chain {
            requirements.insert(Requirement::ColdChain);
        }
        if item.flags.fragile {
            requirements.insert(Requirement::Fragile);
        }
    }

    if order.max_item_weight() > thresholds.oversized_kg {
        requirements.insert(Requirement::Oversized);
    }

    if order.total_value >= thresholds.high_value_threshold {
        requirements.insert(Requirement::HighValue);
    }

    let consolidation_required = requirements.contains(&Requirement::MultiItem);
    let gift_wrap_required = requirements.contains(&Requirement::GiftWrap);

    let special_handling: Vec<Requirement> = Requirement::SPECIAL_HANDLING
        .into_iter()
        .filter(|tag| requirements.contains(tag))
        .collect();

    Ok(ProcessPath {
        path_id: PathId::new(),
        order_id: order.order_id,
        requirements,
        consolidation_required,
        gift_wrap_required,
        special_handling,
        target_station_id: None,
        fallback_station_ids: Vec::new(),
        tier: Tier::Optimal,
        escalation_history: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forc_core::ids::OrderId;
    use forc_core::model::order::{ItemFlags, Order, OrderItem, Priority};

    fn base_order(items: Vec<OrderItem>) -> Order {
        Order {
            order_id: OrderId::new(),
            items,
            priority: Priority::Standard,
            gift_wrap: false,
            total_value: 10.0,
            promised_delivery_at: Utc::now(),
            created_at: Utc::now(),
            zone: None,
        }
    }

    fn item(sku: &str, qty: i64, weight: f64) -> OrderItem {
        OrderItem {
            sku: sku.to_string(),
            qty,
            weight,
            flags: ItemFlags::default(),
        }
    }

    #[test]
    fn empty_order_is_invalid() {
        let order = base_order(vec![]);
        assert!(matches!(determine_path(&order), Err(PathError::EmptyOrder)));
    }

    #[test]
    fn non_positive_quantity_is_invalid() {
        let order = base_order(vec![item("A", 0, 1.0)]);
        assert!(matches!(
            determine_path(&order),
            Err(PathError::NonPositiveQuantity { .. })
        ));
    }

    #[test]
    fn single_item_standard_order_has_single_item_requirement_only() {
        // S1: single item 0.5kg, standard, no gift wrap.
        let order = base_order(vec![item("A", 1, 0.5)]);
        let path = determine_path(&order).unwrap();
        assert_eq!(path.requirements, BTreeSet::from([Requirement::SingleItem]));
        assert!(!path.consolidation_required);
        assert!(!path.gift_wrap_required);
        assert!(path.special_handling.is_empty());
        assert_eq!(path.tier, Tier::Optimal);
    }

    #[test]
    fn multi_item_order_requires_consolidation() {
        let order = base_order(vec![item("A", 1, 0.5), item("B", 2, 1.0)]);
        let path = determine_path(&order).unwrap();
        assert!(path.requirements.contains(&Requirement::MultiItem));
        assert!(path.consolidation_required);
    }

    #[test]
    fn hazmat_item_adds_hazmat_requirement_and_special_handling() {
        // S2: 1 hazmat item.
        let mut order = base_order(vec![item("A", 1, 1.0)]);
        order.items[0].flags.hazmat = true;
        let path = determine_path(&order).unwrap();
        assert!(path.requirements.contains(&Requirement::Hazmat));
        assert!(path.special_handling.contains(&Requirement::Hazmat));
    }

    #[test]
    fn cold_chain_item_without_capability_is_incompatible_with_non_cold_chain() {
        let mut order = base_order(vec![item("A", 1, 1.0)]);
        order.items[0].flags.cold_chain = true;
        let path = determine_path(&order).unwrap();
        assert!(path.requirements.contains(&Requirement::ColdChain));
    }

    #[test]
    fn oversized_uses_configured_threshold() {
        let order = base_order(vec![item("A", 1, 24.0)]);
        let path = determine_path(&order).unwrap();
        assert!(path.requirements.contains(&Requirement::Oversized));

        let light_order = base_order(vec![item("A", 1, 5.0)]);
        let light_path = determine_path(&light_order).unwrap();
        assert!(!light_path.requirements.contains(&Requirement::Oversized));
    }

    #[test]
    fn high_value_uses_configured_threshold() {
        let mut order = base_order(vec![item("A", 1, 1.0)]);
        order.total_value = 1000.0;
        let path = determine_path(&order).unwrap();
        assert!(path.requirements.contains(&Requirement::HighValue));
    }

    #[test]
    fn fallback_station_ids_never_contain_the_target_station() {
        let order = base_order(vec![item("A", 1, 1.0)]);
        let mut path = determine_path(&order).unwrap();
        let target = forc_core::ids::StationId::new();
        path.target_station_id = Some(target);
        path.push_fallback(target, 3);
        assert!(path.fallback_station_ids.is_empty());
    }
}
