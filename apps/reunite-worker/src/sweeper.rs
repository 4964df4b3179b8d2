//! The periodic reconciliation loop.

use std::{future::Future, pin::pin, time::Duration};

use tokio::time::{self, MissedTickBehavior};

use reunite_service::ReuniteService;

/// Runs [`ReuniteService::sweep_once`] on every tick until `shutdown` resolves and returns the
/// number of sweeps attempted. A failed sweep is logged and the loop keeps going.
pub async fn run_sweeper<F>(service: &ReuniteService, interval: Duration, shutdown: F) -> usize
where
	F: Future<Output = ()>,
{
	let mut ticker = time::interval(interval.max(Duration::from_millis(1)));
	let mut shutdown = pin!(shutdown);
	let mut sweeps = 0;

	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	tracing::info!(interval_ms = interval.as_millis() as u64, "Reconciliation sweeper started.");

	loop {
		tokio::select! {
			_ = &mut shutdown => break,
			_ = ticker.tick() => {
				sweeps += 1;

				match service.sweep_once().await {
					Ok(report) => tracing::debug!(
						examined = report.examined,
						reconciled = report.reconciled,
						notified = report.notified,
						"Sweep tick finished."
					),
					Err(err) => tracing::error!(error = %err, "Reconciliation sweep failed."),
				}
			},
		}
	}

	tracing::info!(sweeps, "Reconciliation sweeper stopped.");

	sweeps
}
