use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = plaza_api::Args::parse();

	plaza_api::run(args).await
}
