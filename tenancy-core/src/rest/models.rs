//! JSON bodies of the Tenancy REST gateway.
//!
//! Field names follow the gateway's snake_case wire format. Responses are only
//! ever printed, so every response field tolerates being absent.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantCreateRequest {
    pub id: String,
    pub name: String,
}

impl TenantCreateRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// RFC 3339 timestamp, passed through as received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantCreateResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Tenant>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantDeleteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Tenant>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantListRequest {
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub continuous_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantListResponse {
    #[serde(default)]
    pub tenants: Vec<Tenant>,
    #[serde(default)]
    pub continuous_token: String,
}

/// Error body the gateway returns alongside non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_request_omits_empty_token() {
        let request = TenantListRequest {
            page_size: 10,
            continuous_token: String::new(),
        };

        assert_eq!(serde_json::to_value(&request).unwrap(), json!({ "page_size": 10 }));
    }

    #[test]
    fn test_create_response_tolerates_missing_fields() {
        let response: TenantCreateResponse =
            serde_json::from_value(json!({ "tenant": { "id": "t1" } })).unwrap();

        let tenant = response.tenant.unwrap();
        assert_eq!(tenant.id, "t1");
        assert_eq!(tenant.name, "");
        assert_eq!(tenant.created_at, None);
    }
}
