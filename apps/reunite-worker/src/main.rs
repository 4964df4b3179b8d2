use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = reunite_worker::Args::parse();

	reunite_worker::run(args).await
}
