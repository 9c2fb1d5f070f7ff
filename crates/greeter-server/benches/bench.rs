use core::{fmt, hint::black_box};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use futures::stream::{FuturesUnordered, StreamExt};
use greeter_core::proto::{SayHelloRequest, greeter_client::GreeterClient};
use greeter_server::config::{DatabaseConfig, GrpcServerConfig};
use greeter_server::database::{Database, DatabaseDriver, NewUser, UserRepository};
use greeter_server::server::{GrpcServer, ServerState};
use greeter_server::telemetry::Logger;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::runtime::Builder;
use tonic::codec::CompressionEncoding;

#[derive(Clone, Copy, Debug)]
enum Compression {
    None,
    Gzip,
    Zstd,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}

impl From<Compression> for Option<CompressionEncoding> {
    fn from(value: Compression) -> Self {
        match value {
            Compression::None => None,
            Compression::Gzip => Some(CompressionEncoding::Gzip),
            Compression::Zstd => Some(CompressionEncoding::Zstd),
        }
    }
}

/// Starts an in-process server over an in-memory store holding one user and
/// returns its address.
async fn start_server() -> (String, i64) {
    let config = DatabaseConfig {
        dsn: ":memory:".to_string(),
        driver: DatabaseDriver::Sqlite,
        pool_max_idle: 1,
        pool_max_open: 1,
        pool_max_lifetime: Duration::ZERO,
    };
    let database = Database::connect(&config, &Logger::discard())
        .await
        .expect("connect");
    database.ensure_schema().await.expect("schema");
    let user = UserRepository::new(database.clone())
        .create(&NewUser::new("Alice", "alice@example.com"))
        .await
        .expect("seed user");

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let server = GrpcServer::new(
        GrpcServerConfig {
            url: addr.to_string(),
        },
        Logger::discard(),
        database,
    );
    let mut state = server.state();
    tokio::spawn(server.serve_with_listener(listener, std::future::pending()));
    state
        .wait_for(|s| *s == ServerState::Serving)
        .await
        .expect("server started");

    (format!("http://{addr}"), i64::try_from(user.id).expect("id fits"))
}

fn grpc_bench(c: &mut Criterion) {
    let rt = Builder::new_multi_thread().enable_all().build().unwrap();
    let (uri, user_id) = rt.block_on(start_server());

    let concurrency_cases = [1, 8, 32];
    let compression_cases = [Compression::None, Compression::Gzip, Compression::Zstd];

    let mut group = c.benchmark_group("grpc/say_hello");
    for &concurrency in &concurrency_cases {
        for &compression in &compression_cases {
            group.throughput(Throughput::Elements(concurrency as u64));
            group.bench_function(format!("conc/{concurrency}/comp/{compression}"), |b| {
                b.to_async(&rt).iter_custom(|iters| {
                    let uri = uri.clone();
                    async move {
                        let mut client = GreeterClient::connect(uri).await.unwrap();
                        if let Some(encoding) = Option::<CompressionEncoding>::from(compression) {
                            client = client
                                .send_compressed(encoding)
                                .accept_compressed(encoding);
                        }

                        let start = Instant::now();
                        for _ in 0..iters {
                            let mut calls = FuturesUnordered::new();
                            for _ in 0..concurrency {
                                let mut client = client.clone();
                                calls.push(async move {
                                    client.say_hello(SayHelloRequest { user_id }).await
                                });
                            }
                            while let Some(resp) = calls.next().await {
                                black_box(resp.unwrap());
                            }
                        }
                        start.elapsed()
                    }
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, grpc_bench);
criterion_main!(benches);
