//! # gRPC Invocation Path
//!
//! [`channel`] owns the transport and its shutdown protocol, [`client`] the typed
//! calls against `base.v1.Tenancy`. A typical single-call flow:
//!
//! ```rust,no_run
//! use tenancy_core::config::{ChannelConfig, DEFAULT_GRPC_ENDPOINT, DEFAULT_SHUTDOWN_GRACE};
//! use tenancy_core::grpc::{channel::{ManagedChannel, scoped}, client::TenancyGrpcClient};
//! use tenancy_core::tenant::timestamped_create_request;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let channel = ManagedChannel::connect_lazy(DEFAULT_GRPC_ENDPOINT, &ChannelConfig::default())?;
//!
//! let (response, _teardown) = scoped(channel, DEFAULT_SHUTDOWN_GRACE, |channel| async move {
//!     let mut client = TenancyGrpcClient::new(channel);
//!     client.create(timestamped_create_request("tenant id name")).await
//! })
//! .await;
//!
//! println!("{:?}", response?);
//! # Ok(())
//! # }
//! ```
pub mod channel;
pub mod client;
