//! # Tenancy Stub
//!
//! **INTERNAL USE ONLY**: This crate exists solely to provide a stand-in
//! `base.v1.Tenancy` server for integration testing `tenancy-core` and the
//! `tenancy` CLI. It is not intended for production use.
//!
//! [`StubTenancy`] keeps tenants in memory and records every call it receives,
//! together with the `authorization` metadata that came with it. It can be used
//! in-process (`TenancyServer` is itself a gRPC service) or served over TCP with
//! [`serve`].
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use prost_types::Timestamp;
use std::time::SystemTime;
use tenancy_core::pb::tenancy_server::Tenancy;
use tenancy_core::pb::{
    Tenant, TenantCreateRequest, TenantCreateResponse, TenantDeleteRequest, TenantDeleteResponse,
    TenantListRequest, TenantListResponse,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{Request, Response, Status};

pub use tenancy_core::pb::tenancy_server::TenancyServer;

/// A call as the stub received it.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(TenantCreateRequest),
    Delete(TenantDeleteRequest),
    List(TenantListRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub call: Call,
    pub authorization: Option<String>,
}

#[derive(Debug)]
struct Inner {
    tenants: Mutex<Vec<Tenant>>,
    calls: Mutex<Vec<Recorded>>,
    received: watch::Sender<usize>,
    hang: bool,
}

/// In-memory stand-in for the Tenancy service.
#[derive(Debug, Clone)]
pub struct StubTenancy {
    inner: Arc<Inner>,
}

impl Default for StubTenancy {
    fn default() -> Self {
        Self::build(false)
    }
}

impl StubTenancy {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stub that records every call and then never answers it.
    pub fn hanging() -> Self {
        Self::build(true)
    }

    fn build(hang: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                tenants: Mutex::new(Vec::new()),
                calls: Mutex::new(Vec::new()),
                received: watch::Sender::new(0),
                hang,
            }),
        }
    }

    /// Seeds the stub with existing tenants.
    pub fn with_tenants<'a>(self, tenants: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        lock(&self.inner.tenants).extend(tenants.into_iter().map(|(id, name)| Tenant {
            id: id.to_string(),
            name: name.to_string(),
            created_at: Some(now()),
        }));
        self
    }

    pub fn calls(&self) -> Vec<Recorded> {
        lock(&self.inner.calls).clone()
    }

    pub fn tenants(&self) -> Vec<Tenant> {
        lock(&self.inner.tenants).clone()
    }

    /// Resolves once at least `count` calls have been received.
    pub async fn wait_for_calls(&self, count: usize) {
        let mut received = self.inner.received.subscribe();
        let _ = received.wait_for(|n| *n >= count).await;
    }

    async fn record<T>(&self, request: &Request<T>, call: Call) {
        let authorization = request
            .metadata()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        lock(&self.inner.calls).push(Recorded {
            call,
            authorization,
        });
        self.inner.received.send_modify(|n| *n += 1);

        if self.inner.hang {
            std::future::pending::<()>().await;
        }
    }
}

#[tonic::async_trait]
impl Tenancy for StubTenancy {
    async fn create(
        &self,
        request: Request<TenantCreateRequest>,
    ) -> Result<Response<TenantCreateResponse>, Status> {
        self.record(&request, Call::Create(request.get_ref().clone()))
            .await;
        let TenantCreateRequest { id, name } = request.into_inner();

        if id.is_empty() {
            return Err(Status::invalid_argument("tenant id must not be empty"));
        }

        let mut tenants = lock(&self.inner.tenants);
        if tenants.iter().any(|t| t.id == id) {
            return Err(Status::already_exists(format!("tenant '{id}' already exists")));
        }

        let tenant = Tenant {
            id,
            name,
            created_at: Some(now()),
        };
        tenants.push(tenant.clone());

        Ok(Response::new(TenantCreateResponse {
            tenant: Some(tenant),
        }))
    }

    async fn delete(
        &self,
        request: Request<TenantDeleteRequest>,
    ) -> Result<Response<TenantDeleteResponse>, Status> {
        self.record(&request, Call::Delete(request.get_ref().clone()))
            .await;
        let id = request.into_inner().id;

        let mut tenants = lock(&self.inner.tenants);
        let position = tenants
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Status::not_found(format!("tenant '{id}' not found")))?;

        Ok(Response::new(TenantDeleteResponse {
            tenant: Some(tenants.remove(position)),
        }))
    }

    async fn list(
        &self,
        request: Request<TenantListRequest>,
    ) -> Result<Response<TenantListResponse>, Status> {
        self.record(&request, Call::List(request.get_ref().clone()))
            .await;
        let TenantListRequest {
            page_size,
            continuous_token,
        } = request.into_inner();

        if page_size == 0 {
            return Err(Status::invalid_argument("page_size must be at least 1"));
        }

        // The token is the offset of the next page.
        let offset = if continuous_token.is_empty() {
            0
        } else {
            continuous_token
                .parse::<usize>()
                .map_err(|_| Status::invalid_argument("invalid continuous_token"))?
        };

        let tenants = lock(&self.inner.tenants);
        let end = tenants.len().min(offset.saturating_add(page_size as usize));
        let page = tenants.get(offset..end).unwrap_or_default().to_vec();
        let continuous_token = if end < tenants.len() {
            end.to_string()
        } else {
            String::new()
        };

        Ok(Response::new(TenantListResponse {
            tenants: page,
            continuous_token,
        }))
    }
}

fn now() -> Timestamp {
    Timestamp::from(SystemTime::now())
}

/// Serves `stub` on an ephemeral localhost port.
pub async fn serve(stub: StubTenancy) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        let _ = tonic::transport::Server::builder()
            .add_service(TenancyServer::new(stub))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await;
    });

    Ok((addr, handle))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
