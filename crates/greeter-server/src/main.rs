use greeter_server::config::{Config, ConfigError, LoaderOptions};
use greeter_server::database::Database;
use greeter_server::server::GrpcServer;
use greeter_server::telemetry::{LogSettings, Logger, init_telemetry};
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let telemetry = init_telemetry(&LogSettings::from_env())?;
    let logger = telemetry.logger.clone();
    if let Err(err) = logger.install_global() {
        logger.in_scope(|| tracing::warn!(error = %err, "global logger already installed"));
    }

    let config = match Config::load(&LoaderOptions::from_env(), &logger, std::env::args_os()) {
        Ok(config) => config,
        Err(ConfigError::Args(err)) => err.exit(),
        Err(err) => logger.fatal(&format!("invalid configuration: {err}")),
    };
    log_startup_info(&logger, &config);

    let database = match Database::connect(&config.database, &logger).await {
        Ok(database) => database,
        Err(err) => logger.fatal(&format!("failed to connect to database: {err}")),
    };
    if let Err(err) = database.ensure_schema().await {
        logger.fatal(&format!("failed to prepare schema: {err}"));
    }

    let server = GrpcServer::new(config.grpc_server.clone(), logger.clone(), database.clone());
    let served = server.serve(shutdown_signal(logger.clone())).await;

    if let Err(err) = database.close().await {
        logger.in_scope(|| tracing::error!(error = %err, "failed to close database"));
    }

    if let Err(err) = served {
        logger.fatal(&format!("gRPC server failed: {err}"));
    }

    logger.in_scope(|| tracing::info!("shutdown complete"));
    telemetry.shutdown();
    Ok(())
}

fn log_startup_info(logger: &Logger, config: &Config) {
    logger.in_scope(|| {
        tracing::info!(
            address = %config.grpc_server.url,
            driver = %config.database.driver,
            pool_max_open = config.database.pool_max_open,
            pool_max_idle = config.database.pool_max_idle,
            pool_max_lifetime = ?config.database.pool_max_lifetime,
            "starting greeter service"
        )
    });
}

async fn shutdown_signal(logger: Logger) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                logger.in_scope(|| tracing::warn!(error = %err, "failed to install SIGTERM handler"));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            logger.in_scope(|| tracing::warn!(error = %err, "failed to install Ctrl+C handler"));
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            logger.in_scope(|| tracing::info!("received Ctrl+C signal"));
        },
        () = terminate => {
            logger.in_scope(|| tracing::info!("received SIGTERM signal"));
        },
    }
}
