//! Demonstration/operational entry point for the fulfillment orchestration
//! core: drives a single order through the planning saga, or runs the
//! optimization controller against a seeded in-memory facility, without a
//! live backend in front of it.

mod demo;

use chrono::{Duration as ChronoDuration, Utc};
use clap::{Parser, Subcommand};
use forc_core::config::{AppConfig, ControllerConfig};
use forc_core::ids::OrderId;
use forc_core::logging::{init_logging, LoggingConfig};
use forc_core::model::metrics::RoutingMetricsSnapshot;
use forc_core::model::order::{ItemFlags, Order, OrderItem, Priority};
use forc_optimization_controller::OptimizationController;
use forc_planning_workflow::clock::ChronoClock;
use forc_planning_workflow::workflow::{PlanningWorkflow, WorkflowContext};
use forc_wave_planner::Candidate;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "forc")]
#[command(about = "Fulfillment Orchestration Core — demonstration CLI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one order through the planning saga (C2-C4) to a terminal state.
    Plan {
        #[arg(long, default_value = "standard")]
        priority: String,
        #[arg(long)]
        hazmat: bool,
        #[arg(long = "cold-chain")]
        cold_chain: bool,
        #[arg(long)]
        fragile: bool,
        #[arg(long = "gift-wrap")]
        gift_wrap: bool,
        #[arg(long, default_value_t = 1.5)]
        weight_kg: f64,
        #[arg(long, default_value_t = 45.0)]
        value: f64,
    },
    /// Seed an overloaded facility and run N optimization cycles (C5).
    Optimize {
        #[arg(long, default_value_t = 3)]
        cycles: u32,
    },
    /// Group a batch of synthetic orders into waves (C2+C3).
    Waves {
        #[arg(long, default_value_t = 6)]
        orders: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = AppConfig::load().unwrap_or_default();
    init_logging(&LoggingConfig::default());

    match Cli::parse().command {
        Commands::Plan { priority, hazmat, cold_chain, fragile, gift_wrap, weight_kg, value } => {
            run_plan(&app_config, priority, hazmat, cold_chain, fragile, gift_wrap, weight_kg, value).await
        }
        Commands::Optimize { cycles } => run_optimize(&app_config, cycles).await,
        Commands::Waves { orders } => run_waves(&app_config, orders).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_plan(
    app_config: &AppConfig,
    priority: String,
    hazmat: bool,
    cold_chain: bool,
    fragile: bool,
    gift_wrap: bool,
    weight_kg: f64,
    value: f64,
) -> anyhow::Result<()> {
    let priority = match priority.to_lowercase().as_str() {
        "sameday" | "same-day" => Priority::SameDay,
        "nextday" | "next-day" => Priority::NextDay,
        _ => Priority::Standard,
    };

    let (collaborators, fixtures) = forc_collaborators::in_memory_collaborators();
    demo::seed(&fixtures);

    let order = Order {
        order_id: OrderId::new(),
        items: vec![OrderItem {
            sku: "DEMO-SKU".to_string(),
            qty: 1,
            weight: weight_kg,
            flags: ItemFlags { fragile, hazmat, cold_chain },
        }],
        priority,
        gift_wrap,
        total_value: value,
        promised_delivery_at: Utc::now() + ChronoDuration::hours(24),
        created_at: Utc::now(),
        zone: Some("z1".to_string()),
    };
    fixtures.order.seed(order.clone());
    fixtures.unit.seed("DEMO-SKU", 10);

    let mut ctx = WorkflowContext::new(
        collaborators,
        app_config.planning.clone(),
        app_config.thresholds.clone(),
        Arc::new(ChronoClock),
    );
    let mut workflow = PlanningWorkflow::new(order);
    let outcome = workflow.run_to_completion(&mut ctx).await;

    println!(
        "{}",
        serde_json::json!({
            "orderId": workflow.order.order_id,
            "outcome": format!("{outcome:?}"),
            "tier": workflow.path.as_ref().map(|p| format!("{:?}", p.tier)),
            "escalations": workflow.path.as_ref().map(|p| p.escalation_history.len()).unwrap_or(0),
            "waveId": workflow.wave_id,
            "stationId": workflow.station_id,
        })
    );

    Ok(())
}

async fn run_optimize(app_config: &AppConfig, cycles: u32) -> anyhow::Result<()> {
    let (collaborators, fixtures) = forc_collaborators::in_memory_collaborators();
    let demo_facility = demo::seed(&fixtures);

    // A deliberately overloaded snapshot so the first cycle has work to do
    // (mirrors spec §8 scenario S5).
    let mut utilization = HashMap::new();
    utilization.insert(demo_facility.hazmat_station, 0.95);
    utilization.insert(demo_facility.cold_chain_station, 0.92);
    utilization.insert(demo_facility.standard_station, 0.20);
    fixtures.routing.set_metrics(RoutingMetricsSnapshot {
        station_utilization: utilization,
        capacity_constrained_rate: 0.45,
        average_confidence: 0.75,
        route_changes: 0,
        updated_at: Utc::now(),
    });

    let mut config: ControllerConfig = app_config.controller.clone();
    config.monitoring_interval_secs = config.monitoring_interval_secs.max(1);

    let controller = OptimizationController::new("DEMO-FACILITY", Some("z1".to_string()), collaborators, config);

    for cycle in 1..=cycles {
        let report = controller.run_cycle().await?;
        println!(
            "{}",
            serde_json::json!({
                "cycle": cycle,
                "health": format!("{:?}", report.health),
                "rebalanceEvents": report.rebalance.len(),
                "rerouteEvents": report.reroute.len(),
                "predictedBottlenecks": report.prediction.as_ref().map(|p| p.bottlenecks.len()).unwrap_or(0),
            })
        );
    }

    let status = controller.status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);

    Ok(())
}

async fn run_waves(app_config: &AppConfig, order_count: u32) -> anyhow::Result<()> {
    let mut candidates = Vec::new();
    for i in 0..order_count {
        let priority = match i % 3 {
            0 => Priority::SameDay,
            1 => Priority::NextDay,
            _ => Priority::Standard,
        };
        let order = Order {
            order_id: OrderId::new(),
            items: vec![OrderItem {
                sku: format!("SKU-{i}"),
                qty: 1,
                weight: 1.0,
                flags: ItemFlags {
                    hazmat: i % 5 == 0,
                    cold_chain: i % 7 == 0,
                    fragile: i % 4 == 0,
                },
            }],
            priority,
            gift_wrap: i % 6 == 0,
            total_value: 20.0 + i as f64,
            promised_delivery_at: Utc::now() + ChronoDuration::hours(12 + i as i64),
            created_at: Utc::now(),
            zone: Some("z1".to_string()),
        };
        let path = forc_process_path::determine_path_with_thresholds(&order, &app_config.thresholds)?;
        candidates.push(Candidate { order, path });
    }

    let waves = forc_wave_planner::plan_waves(
        &candidates,
        &forc_core::model::wave::WavePlanningConfig::default(),
        Utc::now(),
    )?;

    for wave in &waves {
        println!(
            "{}",
            serde_json::json!({
                "waveId": wave.wave_id,
                "waveType": format!("{:?}", wave.wave_type),
                "orderCount": wave.orders.len(),
                "requiresCertifiedLabor": wave.requires_certified_labor,
            })
        );
    }

    Ok(())
}
