//! # Tenancy Core
//!
//! `tenancy-core` holds the clients behind the `tenancy` CLI. Both talk to the
//! `base.v1.Tenancy` service of an authorization server, one over gRPC and one over
//! its REST gateway.
//!
//! ## Key Components
//!
//! * **[`grpc::channel::ManagedChannel`]:** A gRPC transport with an explicit
//!   shutdown protocol (graceful drain with a deadline, then forced abort).
//! * **[`grpc::client::TenancyGrpcClient`]:** Typed `Create`, `Delete` and `List` calls.
//! * **[`rest::client::TenancyApi`]:** The REST equivalents, authenticated with a
//!   static bearer token.
//! * **[`config`]:** Defaults, the optional credentials file and channel settings.
//! * **[`tenant`]:** Builders for the tenant identifiers the CLI sends.
//!
//! ## Feature Flags (Internal use only)
//!
//! * `gen-proto`: Enables the binary that regenerates [`pb`] from the `.proto` files.
//!
//! ## Re-exports
//!
//! This crate re-exports `prost` and `tonic` to ensure that consumers
//! use compatible versions of these underlying dependencies.
pub mod config;
pub mod grpc;
pub mod pb;
pub mod rest;
pub mod tenant;

// Re-exports
pub use prost;
pub use tonic;

/// Type alias for the standard boxed error used in generic bounds.
type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
