//! # Tenancy Protobuf Bindings
//!
//! Bindings for the `base.v1` package, generated from `proto/base/v1/tenancy.proto`
//! by the `generate-tenancy-service` binary (feature `gen-proto`) and committed,
//! so building this crate never requires `protoc`.
//!
//! Both the client (`tenancy_client`) and the server (`tenancy_server`) halves are
//! exposed. The server half is what stand-in services implement in tests.
mod generated;

pub use generated::base_v1::*;
