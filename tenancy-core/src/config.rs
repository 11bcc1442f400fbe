//! # Configuration
//!
//! Every parameter the two clients need has a built-in default matching the
//! service's stock local deployment (gRPC on `127.0.0.1:3478`, REST on
//! `localhost:3476`, pre-shared key `secret`). Callers layer overrides on top:
//!
//! 1. The defaults in this module.
//! 2. An optional YAML [`Credentials`] file (`endpoint`, `api_token`).
//! 3. Explicit values from the command line.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tonic::transport::Endpoint;

/// Plaintext gRPC endpoint of a local deployment.
pub const DEFAULT_GRPC_ENDPOINT: &str = "http://127.0.0.1:3478";

/// Base URL of the REST gateway of a local deployment.
pub const DEFAULT_REST_BASE_URL: &str = "http://localhost:3476";

/// Pre-shared key sent as the bearer token on REST calls.
pub const DEFAULT_BEARER_TOKEN: &str = "secret";

/// How long channel teardown waits for in-flight calls before forcing shutdown.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("Failed to read credentials file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse credentials file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_norway::Error,
    },
}

/// Connection details stored on disk, e.g.
///
/// ```yaml
/// endpoint: localhost:3478
/// api_token: secret
/// ```
///
/// Both keys are optional. Unknown keys (such as certificate paths) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CredentialsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_norway::from_str(&contents).map_err(|source| CredentialsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The endpoint as a URI tonic can dial, if one was configured.
    pub fn grpc_endpoint(&self) -> Option<String> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(normalize_endpoint)
    }

    /// The bearer token, ignoring blank values.
    pub fn api_token(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Prefixes `http://` to endpoints given as bare `host:port`.
pub fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}

/// Transport settings applied to every gRPC channel.
///
/// No per-call timeout is applied: a call waits until the server answers or
/// the connection fails.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub connect_timeout: Duration,
    pub tcp_nodelay: bool,
    pub http2_keep_alive_interval: Option<Duration>,
    pub keep_alive_timeout: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            tcp_nodelay: true,
            http2_keep_alive_interval: Some(Duration::from_secs(30)),
            keep_alive_timeout: Duration::from_secs(10),
        }
    }
}

impl ChannelConfig {
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn without_keep_alive(mut self) -> Self {
        self.http2_keep_alive_interval = None;
        self
    }

    pub(crate) fn apply_to_endpoint(&self, mut endpoint: Endpoint) -> Endpoint {
        if let Some(interval) = self.http2_keep_alive_interval {
            endpoint = endpoint
                .http2_keep_alive_interval(interval)
                .keep_alive_timeout(self.keep_alive_timeout);
        }

        endpoint
            .connect_timeout(self.connect_timeout)
            .tcp_nodelay(self.tcp_nodelay)
    }
}
