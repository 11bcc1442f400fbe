//! # Tenancy REST Client
//!
//! An HTTP client bound to one base URL with a static bearer token sent as a
//! default `Authorization` header on every request.
//!
//! | Operation          | Route                         |
//! |--------------------|-------------------------------|
//! | `tenants_create`   | `POST /v1/tenants/create`     |
//! | `tenants_delete`   | `DELETE /v1/tenants/{id}`     |
//! | `tenants_list`     | `POST /v1/tenants/list`       |
//!
//! Any non-2xx status becomes [`RestError::Status`], carrying the `message` of the
//! gateway's error body when it has one.
use super::models::{
    ErrorBody, TenantCreateRequest, TenantCreateResponse, TenantDeleteResponse,
    TenantListRequest, TenantListResponse,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("The bearer token is not a valid header value: '{0}'")]
    InvalidToken(#[source] InvalidHeaderValue),
    #[error("Failed to build the HTTP client: '{0}'")]
    ClientBuild(#[source] reqwest::Error),
    #[error("{0}")]
    Transport(#[source] reqwest::Error),
    #[error("{status} from {url}: {message}")]
    Status {
        status: StatusCode,
        url: String,
        message: String,
    },
    #[error("Failed to decode response body: '{0}'")]
    Decode(#[source] serde_json::Error),
}

/// A client for the Tenancy REST routes.
#[derive(Debug, Clone)]
pub struct TenancyApi {
    client: reqwest::Client,
    base: Url,
}

impl TenancyApi {
    pub fn new(base_path: &str, bearer_token: &str) -> Result<Self, RestError> {
        let base = Url::parse(base_path).map_err(|e| RestError::InvalidBaseUrl {
            url: base_path.to_string(),
            reason: e.to_string(),
        })?;

        if base.cannot_be_a_base() {
            return Err(RestError::InvalidBaseUrl {
                url: base_path.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let mut authorization = HeaderValue::from_str(&format!("Bearer {bearer_token}"))
            .map_err(RestError::InvalidToken)?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(RestError::ClientBuild)?;

        Ok(Self { client, base })
    }

    /// The base URL every route is resolved against.
    pub fn base_path(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    pub async fn tenants_create(
        &self,
        request: &TenantCreateRequest,
    ) -> Result<TenantCreateResponse, RestError> {
        let url = self.route(&["v1", "tenants", "create"]);
        debug!(%url, id = %request.id, name = %request.name, "creating tenant");

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(RestError::Transport)?;

        decode(response).await
    }

    pub async fn tenants_delete(&self, id: &str) -> Result<TenantDeleteResponse, RestError> {
        let url = self.route(&["v1", "tenants", id]);
        debug!(%url, "deleting tenant");

        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(RestError::Transport)?;

        decode(response).await
    }

    pub async fn tenants_list(
        &self,
        request: &TenantListRequest,
    ) -> Result<TenantListResponse, RestError> {
        let url = self.route(&["v1", "tenants", "list"]);
        debug!(%url, page_size = request.page_size, "listing tenants");

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(RestError::Transport)?;

        decode(response).await
    }

    /// Appends `segments` to the base path, percent-encoding each of them.
    fn route(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Checked in `new`: the base can always carry path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RestError> {
    let status = response.status();
    let url = response.url().to_string();
    let body = response.text().await.map_err(RestError::Transport)?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(body);

        return Err(RestError::Status {
            status,
            url,
            message,
        });
    }

    serde_json::from_str(&body).map_err(RestError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_are_resolved_against_base() {
        let api = TenancyApi::new("http://localhost:3476", "secret").unwrap();

        assert_eq!(api.base_path(), "http://localhost:3476");
        assert_eq!(
            api.route(&["v1", "tenants", "create"]).as_str(),
            "http://localhost:3476/v1/tenants/create"
        );
    }

    #[test]
    fn test_routes_keep_base_prefix_and_encode_ids() {
        let api = TenancyApi::new("http://gateway.local/permify/", "secret").unwrap();

        assert_eq!(
            api.route(&["v1", "tenants", "a b/c"]).as_str(),
            "http://gateway.local/permify/v1/tenants/a%20b%2Fc"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = TenancyApi::new("localhost:3476", "secret").unwrap_err();
        assert!(matches!(err, RestError::InvalidBaseUrl { .. }));

        let err = TenancyApi::new("not a url", "secret").unwrap_err();
        assert!(matches!(err, RestError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_rejects_token_with_newline() {
        let err = TenancyApi::new("http://localhost:3476", "sec\nret").unwrap_err();
        assert!(matches!(err, RestError::InvalidToken(_)));
    }
}
