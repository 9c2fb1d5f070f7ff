/// Builds the gRPC client and server code for the `helloworld.proto`
/// definition using `tonic-prost-build`.
///
/// This code generation step processes the Protocol Buffer definitions located
/// in the `proto` directory and emits Rust modules with gRPC bindings into the
/// crate's `OUT_DIR`. An encoded file descriptor set is written alongside them
/// so the server can expose gRPC reflection.
///
/// # Files and Paths
///
/// - Proto file: `proto/helloworld.proto`
/// - Includes: `proto/`
///
/// # Panics
///
/// This function will `panic!` if code generation fails.
///
/// # Output
///
/// Generated code will be accessible in Rust via:
///
/// ```rust
/// pub mod helloworld {
///     tonic::include_proto!("helloworld");
/// }
/// ```
use std::env;
use std::path::PathBuf;
fn main() {
    println!("cargo:rerun-if-changed=proto/helloworld.proto");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("helloworld_descriptor.bin");

    tonic_prost_build::configure()
        .file_descriptor_set_path(&descriptor_path)
        .compile_protos(&["proto/helloworld.proto"], &["proto"])
        .unwrap();
}
