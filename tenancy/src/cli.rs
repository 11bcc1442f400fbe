//! # CLI
//!
//! This module defines the command-line interface of `tenancy` using `clap`.
//!
//! Every argument defaults to the stock local deployment, so `tenancy grpc create`
//! and `tenancy rest create` run without any flag.
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tenancy_core::config::{DEFAULT_BEARER_TOKEN, DEFAULT_REST_BASE_URL};

#[derive(Parser)]
#[command(
    name = "tenancy",
    version,
    about = "Manage the tenants of an authorization service over gRPC or REST"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Call the Tenancy service over gRPC
    ///
    /// The channel is closed after the call, waiting up to `--shutdown-grace`
    /// seconds for in-flight work before forcing it. A failed call exits with a
    /// non-zero code.
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// tenancy grpc create
    /// tenancy grpc --endpoint localhost:3478 create --id acme --name "Acme Inc"
    /// ```
    Grpc {
        /// Server URI [default: http://127.0.0.1:3478, or the credentials file's endpoint]
        #[arg(long)]
        endpoint: Option<String>,

        /// YAML file with `endpoint` and `api_token` keys
        #[arg(long)]
        credentials: Option<PathBuf>,

        /// Seconds to wait for in-flight calls when closing the channel
        #[arg(long, value_parser = parse_seconds, default_value = "5")]
        shutdown_grace: Duration,

        #[command(subcommand)]
        operation: Operation,
    },

    /// Call the Tenancy service through its REST gateway
    ///
    /// Failures are reported on standard output with the time they occurred; the
    /// command still exits successfully.
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// tenancy rest create
    /// tenancy rest --base-url http://localhost:3476 --token secret list
    /// ```
    Rest {
        /// Base URL of the gateway
        #[arg(long, default_value = DEFAULT_REST_BASE_URL)]
        base_url: String,

        /// Bearer token sent in the Authorization header
        #[arg(long, default_value = DEFAULT_BEARER_TOKEN, hide_default_value = true)]
        token: String,

        #[command(subcommand)]
        operation: Operation,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create a tenant
    Create {
        /// Tenant id [default: `tenant_<timestamp>` over gRPC, `template_tenant2` over REST]
        #[arg(long)]
        id: Option<String>,
        /// Display name [default: `tenant id name` over gRPC, `Template` over REST]
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a tenant
    Delete {
        /// Tenant id
        id: String,
    },
    /// List tenants, one page at a time
    List {
        #[arg(long, default_value_t = 10)]
        page_size: u32,
        /// Token returned by the previous page
        #[arg(long, default_value = "")]
        continuous_token: String,
    },
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| format!("Invalid number of seconds '{value}': {e}"))
}
