//! Per-call request logging.
//!
//! [`LoggingLayer`] wraps every service on the server at the HTTP level, so
//! it sees both the request path and the final `grpc-status`. Each call
//! produces exactly one event:
//!
//! - info `gRPC request completed` with `method` and `duration`
//! - error `gRPC request failed` with `method`, `duration`, `code` and
//!   `error` when the status is not OK or the transport fails
//!
//! A call whose future is dropped before completing (deadline exceeded,
//! client reset) is logged as failed with code `Cancelled`.
//!
//! The wrapped service's response or error is passed through untouched.

use crate::telemetry::{Logger, increment_request_errors, increment_requests, record_request_duration};
use core::fmt;
use core::task::{Context, Poll};
use futures::future::BoxFuture;
use std::time::{Duration, Instant};
use tonic::{Code, Status};
use tower::{Layer, Service};

#[derive(Clone, Debug)]
pub struct LoggingLayer {
    logger: Logger,
}

impl LoggingLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingService {
            inner,
            logger: self.logger.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoggingService<S> {
    inner: S,
    logger: Logger,
}

impl<S, ReqBody, ResBody> Service<http::Request<ReqBody>> for LoggingService<S>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: fmt::Display,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<ReqBody>) -> Self::Future {
        let call = CallLog {
            logger: self.logger.clone(),
            method: req.uri().path().to_string(),
            start: Instant::now(),
            pending: true,
        };
        let fut = self.inner.call(req);

        Box::pin(async move {
            let result = fut.await;
            let failure = match &result {
                Ok(resp) => Status::from_header_map(resp.headers())
                    .filter(|status| status.code() != Code::Ok)
                    .map(|status| (status.code(), status.message().to_string())),
                Err(err) => Some((Code::Unavailable, err.to_string())),
            };
            call.finish(failure);
            result
        })
    }
}

/// Writes the call's log entry exactly once: on completion, or on drop if
/// the call never completed.
struct CallLog {
    logger: Logger,
    method: String,
    start: Instant,
    pending: bool,
}

impl CallLog {
    fn finish(mut self, failure: Option<(Code, String)>) {
        self.pending = false;
        log_call(&self.logger, &self.method, self.start.elapsed(), failure);
    }
}

impl Drop for CallLog {
    fn drop(&mut self) {
        if self.pending {
            log_call(
                &self.logger,
                &self.method,
                self.start.elapsed(),
                Some((
                    Code::Cancelled,
                    "request cancelled before completion".to_string(),
                )),
            );
        }
    }
}

fn log_call(logger: &Logger, method: &str, elapsed: Duration, failure: Option<(Code, String)>) {
    let duration_ms = elapsed.as_secs_f64() * 1000.0;
    let duration = format!("{duration_ms:.2}ms");

    increment_requests();
    record_request_duration(duration_ms);

    match failure {
        None => logger.in_scope(|| {
            tracing::info!(method, duration = %duration, "gRPC request completed")
        }),
        Some((code, error)) => {
            increment_request_errors();
            logger.in_scope(|| {
                tracing::error!(
                    method,
                    duration = %duration,
                    code = ?code,
                    error = %error,
                    "gRPC request failed"
                )
            })
        }
    }
}
