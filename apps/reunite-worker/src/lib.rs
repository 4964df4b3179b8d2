pub mod sweeper;

mod error;

pub use error::{Error, Result};

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use reunite_config::Config;
use reunite_service::ReuniteService;
use reunite_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = reunite_cli::VERSION,
	rename_all = "kebab",
	styles = reunite_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = reunite_config::load(&args.config)?;

	reunite_cli::init_tracing(&config.service.log_level);

	let service = connect(&config).await?;

	if !config.reconcile.enabled {
		tracing::info!("Reconciliation sweep is disabled. Waiting for shutdown.");

		shutdown_signal().await;

		return Ok(());
	}

	let interval = Duration::from_secs(config.reconcile.interval_seconds);

	sweeper::run_sweeper(&service, interval, shutdown_signal()).await;
	service.scans.wait_idle().await;

	Ok(())
}

async fn connect(config: &Config) -> Result<ReuniteService> {
	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	Ok(ReuniteService::new(config, db)?)
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		tracing::error!(error = %err, "Failed to listen for shutdown signal.");

		std::future::pending::<()>().await;
	}

	tracing::info!("Shutdown signal received.");
}
