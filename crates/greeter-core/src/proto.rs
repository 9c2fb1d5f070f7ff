//! Generated protobuf messages and gRPC stubs for the `helloworld` package.

tonic::include_proto!("helloworld");

/// Encoded file descriptor set for `helloworld.proto`, registered with the
/// reflection service.
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("helloworld_descriptor");
