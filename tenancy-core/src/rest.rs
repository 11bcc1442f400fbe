//! # REST Invocation Path
//!
//! The same tenancy operations as [`crate::grpc`], through the service's HTTP/JSON
//! gateway. The request and response bodies in [`models`] are independent of the
//! Protobuf types: the gateway's JSON shape is the contract here.
pub mod client;
pub mod models;
