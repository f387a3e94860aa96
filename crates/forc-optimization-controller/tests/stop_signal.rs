//! Crate-level integration test for the controller's graceful-shutdown
//! path: `stopOptimization` must end the loop between cycles without
//! needing to wait out a full real-time interval.

use forc_core::config::ControllerConfig;
use forc_optimization_controller::OptimizationController;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn stop_signal_ends_the_loop_between_cycles() {
    let (collaborators, _fixtures) = forc_collaborators::in_memory_collaborators();

    let mut config = ControllerConfig::default();
    config.monitoring_interval_secs = 1;
    config.enable_auto_rebalance = false;
    config.enable_auto_reroute = false;
    config.enable_capacity_prediction = false;

    let controller = Arc::new(OptimizationController::new("FAC-1", None, collaborators, config));
    let handle = Arc::clone(&controller).start();

    tokio::time::advance(Duration::from_secs(3)).await;
    tokio::task::yield_now().await;

    let status_before_stop = controller.status().await;
    assert!(status_before_stop.total_cycles >= 1, "at least one cycle should have ticked");

    controller.stop_handle().notify_one();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("controller task should exit promptly after stopOptimization")
        .expect("controller task should not panic");
}
