//! Operator CLI for the greeter store.
//!
//! ```bash
//! DATABASE_DRIVER=sqlite DATABASE_DSN=greeter.db greeter-cli seed
//! ```

use clap::{Parser, Subcommand};
use greeter_server::config::{Config, ConfigArgs, LoaderOptions, load_env_file};
use greeter_server::database::Database;
use greeter_server::database::seeder::{default_seeds, run_all};
use greeter_server::telemetry::{LogSettings, init_telemetry};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(
    name = "greeter-cli",
    version,
    about = "Maintenance commands for the greeter store",
    subcommand_required = true,
    arg_required_else_help = true
)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert the sample users. Not idempotent.
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let telemetry = init_telemetry(&LogSettings::from_env())?;
    let logger = telemetry.logger.clone();
    if let Err(err) = logger.install_global() {
        logger.in_scope(|| tracing::warn!(error = %err, "global logger already installed"));
    }

    // Flags fall back to env vars, so the env file must be loaded first.
    load_env_file(&LoaderOptions::from_env(), &logger);
    let cli = Cli::parse();

    let config = match Config::try_from(cli.config) {
        Ok(config) => config,
        Err(err) => logger.fatal(&format!("invalid configuration: {err}")),
    };

    match cli.command {
        Command::Seed => {
            let database = match Database::connect(&config.database, &logger).await {
                Ok(database) => database,
                Err(err) => logger.fatal(&format!("failed to connect to database: {err}")),
            };
            if let Err(err) = database.ensure_schema().await {
                logger.fatal(&format!("failed to prepare schema: {err}"));
            }

            let result = run_all(&database, &default_seeds(), &logger).await;
            if let Err(err) = database.close().await {
                logger.in_scope(|| tracing::error!(error = %err, "failed to close database"));
            }
            if let Err(err) = result {
                logger.fatal(&format!("seeding aborted: {err}"));
            }
        }
    }

    telemetry.shutdown();
    Ok(())
}
