use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = marpad_edit::Args::parse();

	marpad_edit::run(args).await
}
