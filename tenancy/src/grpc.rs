//! # gRPC Command
//!
//! Resolves the connection settings, runs one operation on a managed channel and
//! prints its result. The channel is released before the result is inspected, so
//! a failed call still closes it; the failure is then returned to `main`.
use crate::cli::Operation;
use crate::formatter::FormattedString;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tenancy_core::config::{
    ChannelConfig, Credentials, CredentialsError, DEFAULT_GRPC_ENDPOINT, normalize_endpoint,
};
use tenancy_core::grpc::channel::{ManagedChannel, scoped};
use tenancy_core::grpc::client::TenancyGrpcClient;
use tenancy_core::pb::{TenantCreateRequest, TenantListRequest};
use tenancy_core::tenant::{DEFAULT_GRPC_TENANT_NAME, timestamped_create_request};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub shutdown_grace: Duration,
    pub channel: ChannelConfig,
}

impl Settings {
    /// Flag values win over the credentials file, which wins over the defaults.
    pub fn resolve(
        endpoint: Option<String>,
        credentials: Option<&Path>,
        shutdown_grace: Duration,
    ) -> Result<Self, CredentialsError> {
        let credentials = credentials
            .map(Credentials::load)
            .transpose()?
            .unwrap_or_default();

        let endpoint = endpoint
            .map(|e| normalize_endpoint(&e))
            .or_else(|| credentials.grpc_endpoint())
            .unwrap_or_else(|| DEFAULT_GRPC_ENDPOINT.to_string());

        Ok(Self {
            endpoint,
            api_token: credentials.api_token().map(str::to_string),
            shutdown_grace,
            channel: ChannelConfig::default(),
        })
    }
}

pub async fn run(
    settings: &Settings,
    operation: Operation,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let channel = ManagedChannel::connect_lazy(&settings.endpoint, &settings.channel)?;
    let api_token = settings.api_token.clone();

    let (result, teardown) = scoped(channel, settings.shutdown_grace, |channel| async move {
        let mut client = TenancyGrpcClient::new(channel);
        if let Some(token) = api_token {
            client = client.with_bearer_token(token);
        }

        match operation {
            Operation::Create { id, name } => {
                let name = name.unwrap_or_else(|| DEFAULT_GRPC_TENANT_NAME.to_string());
                let request = match id {
                    Some(id) => TenantCreateRequest { id, name },
                    None => timestamped_create_request(name),
                };
                client.create(request).await.map(FormattedString::from)
            }
            Operation::Delete { id } => client.delete(id).await.map(FormattedString::from),
            Operation::List {
                page_size,
                continuous_token,
            } => client
                .list(TenantListRequest {
                    page_size,
                    continuous_token,
                })
                .await
                .map(FormattedString::from),
        }
    })
    .await;

    info!(endpoint = %settings.endpoint, ?teardown, "gRPC channel released");

    writeln!(out, "{}", result?)?;
    Ok(())
}
