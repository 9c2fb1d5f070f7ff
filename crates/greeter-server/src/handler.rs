//! gRPC implementation of the `Greeter` service.
//!
//! [`GreeterService`] resolves the requested user through a [`UserLookup`]
//! and greets them by name. It holds no mutable state and is shared by every
//! in-flight call.
//!
//! ## Status mapping
//!
//! - no stored row, or a negative `user_id`: `NOT_FOUND` ("user not found")
//! - any other lookup failure: `UNKNOWN` carrying the error text

use crate::error::Error;
use crate::service::UserLookup;
use greeter_core::{
    Error as RequestError, greeting,
    proto::{self, SayHelloRequest, SayHelloResponse, greeter_server::Greeter, greeter_server::GreeterServer},
    user_id_from_wire, user_id_to_wire,
};
use std::sync::Arc;
use tonic::{Request, Response, Status, codec::CompressionEncoding};

#[derive(Clone)]
pub struct GreeterService {
    users: Arc<dyn UserLookup>,
}

impl GreeterService {
    pub fn new(users: Arc<dyn UserLookup>) -> Self {
        Self { users }
    }
}

#[tonic::async_trait]
impl Greeter for GreeterService {
    async fn say_hello(
        &self,
        req: Request<SayHelloRequest>,
    ) -> Result<Response<SayHelloResponse>, Status> {
        let id = user_id_from_wire(req.get_ref().user_id)?;
        let user = self.users.find_by_id(id).await.map_err(lookup_status)?;

        Ok(Response::new(SayHelloResponse {
            message: greeting(&user.name),
            user: Some(proto::User {
                id: user_id_to_wire(user.id),
                name: user.name,
                email: user.email,
            }),
        }))
    }
}

fn lookup_status(err: Error) -> Status {
    let err = if err.is_row_not_found() {
        RequestError::UserNotFound
    } else {
        RequestError::Lookup {
            context: err.to_string(),
        }
    };
    err.into()
}

/// Wraps `service` in the generated server with zstd, gzip and deflate
/// enabled in both directions.
pub fn build_greeter_service(service: GreeterService) -> GreeterServer<GreeterService> {
    GreeterServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}
