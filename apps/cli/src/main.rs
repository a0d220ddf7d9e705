use clap::Parser;
use recallcheck_cli::cli::Args;
use recallcheck_cli::commands::App;
use recallcheck_cli::config::Config;
use recallcheck_cli::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing();
    let args = Args::parse();

    let app = App::from_config(&config)?;
    app.run(args.command).await
}
