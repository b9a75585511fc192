use clap::Parser;

use macrodex::cli::{Cli, Commands};
use macrodex::config::{AppConfig, get_config, init_config_from};
use macrodex::runtime::modes;
use macrodex::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::ConfigGen { path } = cli.command() {
        AppConfig::default()
            .save_to_file(&path)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path, e))?;
        println!("Sample configuration written to {}", path);
        return Ok(());
    }

    init_config_from(&cli.config);
    let _log_guard = init_logging(&get_config().logging);

    match cli.command() {
        Commands::Worker => modes::run_worker().await,
        _ => modes::run_server().await,
    }
}
