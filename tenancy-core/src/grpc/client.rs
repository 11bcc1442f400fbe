//! # Tenancy gRPC Client
//!
//! A thin layer over the generated [`TenancyClient`] that attaches the optional
//! bearer token to every call.
//!
//! Failures are reported as [`CallError`]:
//!
//! - `InvalidToken`: the bearer token cannot be encoded as gRPC metadata.
//! - `Status`: everything else. Transport failures (connection refused, channel
//!   shut down) arrive as `UNKNOWN`/`UNAVAILABLE`, service rejections with their own
//!   code (e.g. `ALREADY_EXISTS`).
//!
//! Calls are never retried and carry no deadline.
use crate::BoxError;
use crate::pb::{
    TenantCreateRequest, TenantCreateResponse, TenantDeleteRequest, TenantDeleteResponse,
    TenantListRequest, TenantListResponse, tenancy_client::TenancyClient,
};
use tonic::client::GrpcService;
use tonic::codegen::{Body as HttpBody, Bytes};
use tonic::metadata::{AsciiMetadataValue, errors::InvalidMetadataValue};
use tonic::transport::Channel;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("The bearer token is not valid gRPC metadata: '{0}'")]
    InvalidToken(#[source] InvalidMetadataValue),
    #[error("gRPC call failed: code={:?} message={:?}", .0.code(), .0.message())]
    Status(#[from] tonic::Status),
}

impl CallError {
    /// The gRPC status of the failure, when the call reached the status stage.
    pub fn status(&self) -> Option<&tonic::Status> {
        match self {
            CallError::Status(status) => Some(status),
            CallError::InvalidToken(_) => None,
        }
    }
}

/// A client for the `base.v1.Tenancy` service.
#[derive(Debug, Clone)]
pub struct TenancyGrpcClient<S = Channel> {
    client: TenancyClient<S>,
    authorization: Option<String>,
}

impl<S> TenancyGrpcClient<S>
where
    S: GrpcService<tonic::body::Body>,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    pub fn new(service: S) -> Self {
        Self {
            client: TenancyClient::new(service),
            authorization: None,
        }
    }

    /// Sends `authorization: Bearer <token>` with every call.
    pub fn with_bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.authorization = Some(format!("Bearer {}", token.as_ref()));
        self
    }

    /// Creates a tenant.
    ///
    /// # Returns
    /// * `Ok(TenantCreateResponse)` - The tenant as stored by the service.
    /// * `Err(CallError::Status)` - The service rejected the tenant (e.g. duplicate id)
    ///   or the transport failed.
    pub async fn create(
        &mut self,
        request: TenantCreateRequest,
    ) -> Result<TenantCreateResponse, CallError> {
        debug!(id = %request.id, name = %request.name, "creating tenant");

        let request = self.build_request(request)?;
        let response = self.client.create(request).await?;
        Ok(response.into_inner())
    }

    /// Deletes the tenant identified by `id`.
    pub async fn delete(&mut self, id: impl Into<String>) -> Result<TenantDeleteResponse, CallError> {
        let request = TenantDeleteRequest { id: id.into() };
        debug!(id = %request.id, "deleting tenant");

        let request = self.build_request(request)?;
        let response = self.client.delete(request).await?;
        Ok(response.into_inner())
    }

    /// Fetches one page of tenants.
    ///
    /// An empty `continuous_token` in the response means there are no more pages.
    pub async fn list(
        &mut self,
        request: TenantListRequest,
    ) -> Result<TenantListResponse, CallError> {
        debug!(
            page_size = request.page_size,
            continuous_token = %request.continuous_token,
            "listing tenants"
        );

        let request = self.build_request(request)?;
        let response = self.client.list(request).await?;
        Ok(response.into_inner())
    }

    fn build_request<T>(&self, message: T) -> Result<tonic::Request<T>, CallError> {
        let mut request = tonic::Request::new(message);

        if let Some(authorization) = &self.authorization {
            let value = authorization
                .parse::<AsciiMetadataValue>()
                .map_err(CallError::InvalidToken)?;
            request.metadata_mut().insert("authorization", value);
        }

        Ok(request)
    }
}
