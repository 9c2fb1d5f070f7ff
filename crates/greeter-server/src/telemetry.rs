//! # Logging and Telemetry
//!
//! Every component logs through a [`Logger`] handed to it at construction.
//! A `Logger` owns a `tracing` dispatcher, so log calls are ordinary
//! `tracing` events (a message plus an ordered list of key/value fields)
//! emitted inside [`Logger::in_scope`]. The binaries additionally install the
//! same dispatcher as the global default so `tonic` and `sqlx` internals land
//! in the same sink.
//!
//! ## Feature matrix
//!
//! - `otel-traces`: Enables OpenTelemetry distributed tracing (via spans).
//! - `otel-metrics`: Enables OpenTelemetry metrics (request counters and
//!   durations recorded by the logging interceptor).
//! - `honeycomb`: Enables the Honeycomb OTLP exporter.
//! - `stdout`: Enables the stdout OTLP exporter.
//!
//! ## Feature constraints
//!
//! - Exporters require using at least one of: `otel-traces` or
//!   `otel-metrics`.
//! - Both `honeycomb` and `stdout` exporters can be enabled at the same time.
//!
//! ## Example usage
//!
//! ```bash
//! cargo run --bin greeter-server --features otel-traces,otel-metrics,stdout
//! ```

// Disallow using `honeycomb` without `otel-traces` or `otel-metrics`
#[cfg(all(
    feature = "honeycomb",
    not(any(feature = "otel-traces", feature = "otel-metrics"))
))]
compile_error!(
    "The 'honeycomb' feature requires at least one of 'otel-traces' or 'otel-metrics' to be enabled."
);

// Disallow using `stdout` without `otel-traces` or `otel-metrics`
#[cfg(all(
    feature = "stdout",
    not(any(feature = "otel-traces", feature = "otel-metrics"))
))]
compile_error!(
    "The 'stdout' feature requires at least one of 'otel-traces' or 'otel-metrics' to be enabled."
);

// Core imports - always needed
use tracing::Dispatch;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    filter::LevelFilter,
    fmt::{MakeWriter, time::ChronoLocal},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

// Honeycomb-specific imports
#[cfg(all(
    feature = "honeycomb",
    any(feature = "otel-metrics", feature = "otel-traces")
))]
use opentelemetry_otlp::{Compression, Protocol, WithExportConfig, WithTonicConfig};
#[cfg(all(feature = "honeycomb", feature = "otel-metrics"))]
use opentelemetry_sdk::metrics::Temporality;
#[cfg(feature = "honeycomb")]
use tonic::metadata::MetadataMap;
#[cfg(all(
    feature = "honeycomb",
    any(feature = "otel-metrics", feature = "otel-traces")
))]
use tonic::transport::ClientTlsConfig;

// Metrics-specific imports
#[cfg(feature = "otel-metrics")]
use opentelemetry::metrics::{Counter, Histogram, Meter};
#[cfg(feature = "otel-metrics")]
use opentelemetry_sdk::metrics as sdkmetrics;
#[cfg(feature = "otel-metrics")]
use std::sync::OnceLock;

// Either
#[cfg(any(feature = "otel-metrics", feature = "otel-traces"))]
use opentelemetry::{InstrumentationScope, KeyValue};
#[cfg(any(feature = "otel-metrics", feature = "otel-traces"))]
use opentelemetry_sdk::Resource;
#[cfg(any(feature = "otel-metrics", feature = "otel-traces"))]
use opentelemetry_semantic_conventions as semvcns;

// Tracing-specific imports
#[cfg(feature = "otel-traces")]
use opentelemetry::trace::TracerProvider;
#[cfg(feature = "otel-traces")]
use opentelemetry_sdk::propagation::TraceContextPropagator;
#[cfg(feature = "otel-traces")]
use opentelemetry_sdk::trace as sdktrace;

/// Output format of the console sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-readable output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Settings for the process logger, read before configuration is loaded.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// `EnvFilter` directives, e.g. `info` or `greeter_server=debug,sqlx=warn`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LogSettings {
    /// Reads `RUST_LOG` (default `info`) and `LOG_FORMAT` (`pretty` or
    /// `json`, default `pretty`).
    pub fn from_env() -> Self {
        let filter = std::env::var("RUST_LOG")
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .unwrap_or_else(|| "info".to_string());
        let format = match std::env::var("LOG_FORMAT") {
            Ok(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };
        Self { filter, format }
    }
}

/// Structured log sink passed explicitly to every component.
///
/// Cloning is cheap; clones share the same dispatcher.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

impl Logger {
    /// Builds a logger that writes one flattened JSON object per event to
    /// `writer`, keeping events at or above `level`.
    pub fn with_writer<W>(level: LevelFilter, writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::fmt()
            .json()
            .flatten_event(true)
            .with_target(false)
            .with_max_level(level)
            .with_writer(writer)
            .finish();
        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// A logger that drops every event.
    pub fn discard() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// Runs `f` with this logger as the default dispatcher, so `tracing`
    /// macros invoked inside are recorded here.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Installs this logger as the process-wide default, bridging `log`
    /// records as well.
    pub fn install_global(&self) -> Result<(), TryInitError> {
        self.dispatch.clone().try_init()
    }

    /// Logs `message` at error severity and terminates the process with
    /// status 1.
    pub fn fatal(&self, message: &str) -> ! {
        self.in_scope(|| tracing::error!(fatal = true, "{message}"));
        std::process::exit(1)
    }

    /// Logs `message` at error severity, then panics with the same message.
    pub fn panic(&self, message: &str) -> ! {
        self.in_scope(|| tracing::error!(panic = true, "{message}"));
        panic!("{message}")
    }
}

/// Process logger plus the OpenTelemetry providers that must be flushed on
/// exit.
pub struct Telemetry {
    pub logger: Logger,
    providers: TelemetryProviders,
}

struct TelemetryProviders {
    #[cfg(feature = "otel-traces")]
    tracer_provider: sdktrace::SdkTracerProvider,
    #[cfg(feature = "otel-metrics")]
    meter_provider: sdkmetrics::SdkMeterProvider,
}

impl Telemetry {
    /// Flushes and shuts down any enabled exporters.
    pub fn shutdown(self) {
        let Self { logger, providers } = self;

        #[cfg(feature = "otel-traces")]
        {
            if let Err(err) = providers.tracer_provider.force_flush() {
                logger.in_scope(|| tracing::error!(error = ?err, "failed to flush traces"));
            }
            if let Err(err) = providers.tracer_provider.shutdown() {
                logger.in_scope(|| tracing::error!(error = ?err, "failed to shut down tracer"));
            }
        }

        #[cfg(feature = "otel-metrics")]
        {
            if let Err(err) = providers.meter_provider.force_flush() {
                logger.in_scope(|| tracing::error!(error = ?err, "failed to flush metrics"));
            }
            if let Err(err) = providers.meter_provider.shutdown() {
                logger.in_scope(|| tracing::error!(error = ?err, "failed to shut down meter"));
            }
        }

        let _ = (logger, providers);
    }
}

/// Builds the process logger from `settings`, wiring in the OpenTelemetry
/// layers selected by cargo features.
pub fn init_telemetry(settings: &LogSettings) -> anyhow::Result<Telemetry> {
    #[cfg(feature = "otel-traces")]
    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

    #[cfg(feature = "otel-traces")]
    let tracer_provider = init_tracer()?;

    #[cfg(feature = "otel-metrics")]
    let meter_provider = init_metrics()?;

    #[cfg(any(feature = "otel-metrics", feature = "otel-traces"))]
    let scope = InstrumentationScope::builder("greeter")
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_schema_url(semvcns::SCHEMA_URL)
        .build();

    let filter = EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let console: Box<dyn Layer<Registry> + Send + Sync> = match settings.format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_target(false)
            .with_timer(ChronoLocal::rfc_3339())
            .with_file(true)
            .pretty()
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_timer(ChronoLocal::rfc_3339())
            .json()
            .flatten_event(true)
            .boxed(),
    };

    let registry = tracing_subscriber::registry().with(console).with(filter);

    #[cfg(feature = "otel-traces")]
    let registry = {
        opentelemetry::global::set_tracer_provider(tracer_provider.clone());
        registry.with(
            tracing_opentelemetry::layer()
                .with_tracer(tracer_provider.tracer_with_scope(scope.clone()))
                .with_error_records_to_exceptions(true),
        )
    };

    #[cfg(feature = "otel-metrics")]
    let registry = {
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        let meter = opentelemetry::global::meter_with_scope(scope);
        init_metric_handles(meter);

        registry.with(tracing_opentelemetry::MetricsLayer::new(
            meter_provider.clone(),
        ))
    };

    Ok(Telemetry {
        logger: Logger {
            dispatch: Dispatch::new(registry),
        },
        providers: TelemetryProviders {
            #[cfg(feature = "otel-traces")]
            tracer_provider,
            #[cfg(feature = "otel-metrics")]
            meter_provider,
        },
    })
}

#[cfg(feature = "honeycomb")]
fn get_metadata() -> anyhow::Result<MetadataMap> {
    use anyhow::Context;

    let mut map = MetadataMap::new();
    let api_key = std::env::var("HONEYCOMB_API_KEY").context("missing `HONEYCOMB_API_KEY`")?;
    let dataset = std::env::var("HONEYCOMB_DATASET").context("missing `HONEYCOMB_DATASET`")?;
    map.insert(
        "x-honeycomb-team",
        api_key.parse().context("invalid API key")?,
    );
    map.insert(
        "x-honeycomb-dataset",
        dataset.parse().context("invalid dataset")?,
    );
    Ok(map)
}

#[cfg(feature = "honeycomb")]
fn honeycomb_endpoint() -> anyhow::Result<(String, Compression)> {
    use anyhow::Context;
    use std::str::FromStr;

    let endpoint = std::env::var("HONEYCOMB_ENDPOINT").context("missing `HONEYCOMB_ENDPOINT`")?;
    let raw = std::env::var("HONEYCOMB_COMPRESSION")
        .context("missing `HONEYCOMB_COMPRESSION`")?
        .to_ascii_lowercase();
    Ok((endpoint, Compression::from_str(&raw)?))
}

#[cfg(any(feature = "otel-metrics", feature = "otel-traces"))]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name("greeter")
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "otel-metrics")]
fn init_metrics() -> anyhow::Result<sdkmetrics::SdkMeterProvider> {
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = {
        use opentelemetry_stdout::MetricExporter;
        let exporter = MetricExporter::default();
        let reader = opentelemetry_sdk::metrics::PeriodicReader::builder(exporter)
            .with_interval(std::time::Duration::from_secs(5))
            .build();

        builder.with_reader(reader)
    };

    #[cfg(feature = "honeycomb")]
    let builder = {
        use anyhow::Context;

        let metadata = get_metadata()?;
        let (endpoint, compression) = honeycomb_endpoint()?;
        let exporter = opentelemetry_otlp::MetricExporter::builder()
            .with_tonic()
            .with_tls_config(ClientTlsConfig::new().with_native_roots())
            .with_metadata(metadata)
            .with_timeout(std::time::Duration::from_secs(10))
            .with_compression(compression)
            .with_endpoint(endpoint)
            .with_protocol(Protocol::Grpc)
            .with_temporality(Temporality::Delta)
            .build()
            .context("failed to build metrics exporter")?;

        builder.with_periodic_exporter(exporter)
    };

    Ok(builder.build())
}

#[cfg(feature = "otel-traces")]
fn init_tracer() -> anyhow::Result<sdktrace::SdkTracerProvider> {
    let builder = sdktrace::SdkTracerProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = {
        use opentelemetry_stdout::SpanExporter;
        let exporter = SpanExporter::default();
        let batch = sdktrace::BatchSpanProcessor::builder(exporter)
            .with_batch_config(
                sdktrace::BatchConfigBuilder::default()
                    .with_scheduled_delay(std::time::Duration::from_secs(5))
                    .with_max_queue_size(2048)
                    .build(),
            )
            .build();
        builder.with_span_processor(batch)
    };

    #[cfg(feature = "honeycomb")]
    let builder = {
        use anyhow::Context;

        let metadata = get_metadata()?;
        let (endpoint, compression) = honeycomb_endpoint()?;
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_tls_config(ClientTlsConfig::new().with_native_roots())
            .with_metadata(metadata)
            .with_timeout(std::time::Duration::from_secs(10))
            .with_compression(compression)
            .with_endpoint(endpoint)
            .with_protocol(Protocol::Grpc)
            .build()
            .context("failed to build tracer exporter")?;

        let batch = sdktrace::BatchSpanProcessor::builder(exporter)
            .with_batch_config(
                sdktrace::BatchConfigBuilder::default()
                    .with_scheduled_delay(std::time::Duration::from_secs(5))
                    .with_max_queue_size(2048)
                    .build(),
            )
            .build();

        builder.with_span_processor(batch)
    };

    Ok(builder.build())
}

// Metric handles - only compiled when metrics feature is enabled
#[cfg(feature = "otel-metrics")]
static REQUESTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "otel-metrics")]
static REQUEST_ERRORS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "otel-metrics")]
static REQUEST_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();

#[cfg(feature = "otel-metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = REQUESTS.set(
        meter
            .u64_counter("requests")
            .with_description("Total gRPC requests")
            .build(),
    );

    let _ = REQUEST_ERRORS.set(
        meter
            .u64_counter("request_errors")
            .with_description("gRPC requests that ended with a non-OK status")
            .build(),
    );

    let _ = REQUEST_DURATION_MS.set(
        meter
            .f64_histogram("request_duration")
            .with_unit("ms")
            .with_description("End-to-end request duration")
            .build(),
    );
}

// Convenience functions that compile to no-ops when metrics are disabled
#[cfg(feature = "otel-metrics")]
pub fn increment_requests() {
    if let Some(counter) = REQUESTS.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn increment_requests() {}

#[cfg(feature = "otel-metrics")]
pub fn increment_request_errors() {
    if let Some(counter) = REQUEST_ERRORS.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn increment_request_errors() {}

#[cfg(feature = "otel-metrics")]
pub fn record_request_duration(duration_ms: f64) {
    if let Some(histogram) = REQUEST_DURATION_MS.get() {
        histogram.record(duration_ms, &[]);
    }
}

#[cfg(not(feature = "otel-metrics"))]
pub fn record_request_duration(_duration_ms: f64) {}
