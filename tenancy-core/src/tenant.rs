//! # Tenant Requests
//!
//! Helpers for building the `TenantCreateRequest` the two clients send.
//!
//! The gRPC entry point derives a fresh identifier from the local wall clock
//! (`tenant_2026.10.15.09.41.07`), while the REST entry point uses a fixed template
//! identifier. Both are plain caller choices: the service owns uniqueness.
use crate::pb;
use chrono::{DateTime, Local, TimeZone};

/// Prefix of identifiers produced by [`timestamped_id`].
pub const TENANT_ID_PREFIX: &str = "tenant_";

/// `chrono` format of the timestamp suffix, `YYYY.MM.DD.HH.mm.ss`.
pub const TENANT_ID_TIMESTAMP_FORMAT: &str = "%Y.%m.%d.%H.%M.%S";

/// Display name the gRPC entry point gives to new tenants.
pub const DEFAULT_GRPC_TENANT_NAME: &str = "tenant id name";

/// Identifier the REST entry point sends.
pub const DEFAULT_REST_TENANT_ID: &str = "template_tenant2";

/// Display name the REST entry point sends.
pub const DEFAULT_REST_TENANT_NAME: &str = "Template";

/// Builds a tenant identifier from `now`, e.g. `tenant_2026.10.15.09.41.07`.
pub fn timestamped_id<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{TENANT_ID_PREFIX}{}",
        now.format(TENANT_ID_TIMESTAMP_FORMAT)
    )
}

/// Builds a create request whose id is stamped with the current local time.
pub fn timestamped_create_request(name: impl Into<String>) -> pb::TenantCreateRequest {
    pb::TenantCreateRequest {
        id: timestamped_id(&Local::now()),
        name: name.into(),
    }
}
