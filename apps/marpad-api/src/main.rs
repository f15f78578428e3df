use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = marpad_api::Args::parse();

	marpad_api::run(args).await
}
