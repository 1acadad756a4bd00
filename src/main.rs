use clap::Parser;

use my_voice::cli::{run, Cli, CliError};
use my_voice::config::settings::get_config;
use my_voice::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = get_config()?;

    // stdout carries command output
    let subscriber = get_subscriber(
        "my-voice".into(),
        config.application.log_level.clone(),
        std::io::stderr,
    );
    init_subscriber(subscriber);

    if let Err(e) = run(cli, &config).await {
        tracing::error!("❌ Command failed: {}", e);
        if let Some(route) = e.route() {
            eprintln!("Next: {}", route.path());
        }
        return Err(e);
    }
    Ok(())
}
