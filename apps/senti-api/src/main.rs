use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = senti_api::Args::parse();

	senti_api::run(args).await
}
