//! gRPC server lifecycle.
//!
//! A [`GrpcServer`] moves through [`ServerState`] once:
//! `Constructed -> Serving -> Draining -> Stopped`. The shutdown future
//! passed to [`GrpcServer::serve`] starts draining: health flips to
//! `NOT_SERVING`, new connections are refused and in-flight calls run to
//! completion before `serve` returns. Closing the database is left to the
//! caller.

use crate::config::GrpcServerConfig;
use crate::database::Database;
use crate::error::{Error, Result};
use crate::handler::{GreeterService, build_greeter_service};
use crate::interceptor::LoggingLayer;
use crate::service::{UserLookup, UserService};
use crate::telemetry::Logger;
use greeter_core::proto::{FILE_DESCRIPTOR_SET, greeter_server::GreeterServer};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic_health::server::HealthReporter;
use tonic_reflection::server::Builder;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerState {
    Constructed,
    Serving,
    Draining,
    Stopped,
}

pub struct GrpcServer {
    config: GrpcServerConfig,
    logger: Logger,
    greeter: GreeterService,
    state: watch::Sender<ServerState>,
}

impl GrpcServer {
    /// Builds the server with a store-backed greeter.
    pub fn new(config: GrpcServerConfig, logger: Logger, database: Database) -> Self {
        Self::with_lookup(config, logger, Arc::new(UserService::new(database)))
    }

    /// Builds the server over any [`UserLookup`].
    pub fn with_lookup(config: GrpcServerConfig, logger: Logger, users: Arc<dyn UserLookup>) -> Self {
        let (state, _) = watch::channel(ServerState::Constructed);
        Self {
            config,
            logger,
            greeter: GreeterService::new(users),
            state,
        }
    }

    /// Observes lifecycle transitions.
    pub fn state(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(&self.config.url)
            .await
            .map_err(|source| Error::Bind {
                addr: self.config.url.clone(),
                source,
            })?;
        self.serve_with_listener(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    pub async fn serve_with_listener<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = listener.local_addr().map_err(|source| Error::Bind {
            addr: self.config.url.clone(),
            source,
        })?;

        let (health_reporter, health_service) = tonic_health::server::health_reporter();
        health_reporter
            .set_serving::<GreeterServer<GreeterService>>()
            .await;

        let reflection = Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()?;

        self.logger
            .in_scope(|| tracing::info!(address = %addr, "gRPC server started"));
        self.state.send_replace(ServerState::Serving);

        let result = Server::builder()
            .http2_adaptive_window(Some(true))
            .layer(LoggingLayer::new(self.logger.clone()))
            .add_service(health_service)
            .add_service(reflection)
            .add_service(build_greeter_service(self.greeter.clone()))
            .serve_with_incoming_shutdown(
                TcpListenerStream::new(listener),
                drain(shutdown, health_reporter, &self.logger, &self.state),
            )
            .await;

        self.state.send_replace(ServerState::Stopped);
        result?;

        self.logger.in_scope(|| tracing::info!("gRPC server stopped"));
        Ok(())
    }
}

async fn drain<F>(
    shutdown: F,
    health_reporter: HealthReporter,
    logger: &Logger,
    state: &watch::Sender<ServerState>,
) where
    F: Future<Output = ()>,
{
    shutdown.await;

    logger.in_scope(|| tracing::info!("shutdown requested, draining in-flight calls"));
    state.send_replace(ServerState::Draining);

    health_reporter
        .set_not_serving::<GreeterServer<GreeterService>>()
        .await;
}
