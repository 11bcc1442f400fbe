//! # REST Command
//!
//! Sends one request to the REST gateway and prints the decoded response as JSON,
//! after announcing the endpoint and the `Authorization` header it uses.
//!
//! Every failure (bad base URL, unreachable gateway, error status, undecodable
//! body) is printed as an error report instead of being returned.
use crate::cli::Operation;
use crate::formatter::{ErrorAt, FormattedString, Labelled};
use serde::Serialize;
use std::io::{self, Write};
use tenancy_core::rest::client::{RestError, TenancyApi};
use tenancy_core::rest::models::{TenantCreateRequest, TenantListRequest};
use tenancy_core::tenant::{DEFAULT_REST_TENANT_ID, DEFAULT_REST_TENANT_NAME};
use tracing::info;

pub async fn run(
    base_url: &str,
    token: &str,
    operation: Operation,
    out: &mut impl Write,
) -> io::Result<()> {
    let api = match TenancyApi::new(base_url, token) {
        Ok(api) => api,
        Err(err) => return writeln!(out, "{}", FormattedString::from(ErrorAt::now(err))),
    };

    writeln!(out, "Created Api Client Endpoint: {}", api.base_path())?;
    writeln!(
        out,
        "Sending request to {} with Authorization header Bearer {token}",
        api.base_path()
    )?;

    let output = match call(&api, operation).await {
        Ok(output) => output,
        Err(err) => FormattedString::from(ErrorAt::now(err)),
    };

    writeln!(out, "{output}")
}

async fn call(api: &TenancyApi, operation: Operation) -> Result<FormattedString, RestError> {
    match operation {
        Operation::Create { id, name } => {
            let request = TenantCreateRequest::new(
                id.unwrap_or_else(|| DEFAULT_REST_TENANT_ID.to_string()),
                name.unwrap_or_else(|| DEFAULT_REST_TENANT_NAME.to_string()),
            );
            info!(id = %request.id, name = %request.name, "sending tenant create request");

            let response = api.tenants_create(&request).await?;
            Ok(labelled("Tenant create response:", &response))
        }
        Operation::Delete { id } => {
            info!(%id, "sending tenant delete request");

            let response = api.tenants_delete(&id).await?;
            Ok(labelled("Tenant delete response:", &response))
        }
        Operation::List {
            page_size,
            continuous_token,
        } => {
            info!(page_size, "sending tenant list request");

            let request = TenantListRequest {
                page_size,
                continuous_token,
            };
            let response = api.tenants_list(&request).await?;
            Ok(labelled("Tenant list response:", &response))
        }
    }
}

fn labelled(label: &'static str, response: &impl Serialize) -> FormattedString {
    let body = serde_json::to_string(response).unwrap_or_else(|e| format!("<unprintable: {e}>"));
    FormattedString::from(Labelled(label, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create() -> Operation {
        Operation::Create {
            id: None,
            name: None,
        }
    }

    async fn printed(base_url: &str, operation: Operation) -> String {
        colored::control::set_override(false);

        let mut out = Vec::new();
        run(base_url, "secret", operation, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    fn last_line(output: &str) -> &str {
        output.lines().last().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_create_uses_template_tenant_and_prints_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/tenants/create"))
            .and(header("Authorization", "Bearer secret"))
            .and(body_json(json!({ "id": "template_tenant2", "name": "Template" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tenant": { "id": "template_tenant2", "name": "Template" }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let output = printed(&mock_server.uri(), create()).await;
        let base = mock_server.uri();

        assert_eq!(
            output,
            format!(
                "Created Api Client Endpoint: {base}\n\
                 Sending request to {base} with Authorization header Bearer secret\n\
                 Tenant create response: {{\"tenant\":{{\"id\":\"template_tenant2\",\"name\":\"Template\"}}}}\n"
            )
        );
    }

    #[tokio::test]
    async fn test_error_status_is_reported_with_time() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/tenants/create"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({ "message": "ERROR_CODE_UNIQUE_CONSTRAINT" })),
            )
            .mount(&mock_server)
            .await;

        let output = printed(&mock_server.uri(), create()).await;
        let report = last_line(&output);

        assert!(output.starts_with("Created Api Client Endpoint: "));
        assert!(report.starts_with("Error occurred at "));
        assert!(report.contains("409 Conflict"));
        assert!(report.contains("ERROR_CODE_UNIQUE_CONSTRAINT"));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_reported() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let output = printed(&format!("http://{addr}"), create()).await;

        assert!(output.contains(&format!("Sending request to http://{addr} ")));
        assert!(last_line(&output).starts_with("Error occurred at "));
    }

    #[tokio::test]
    async fn test_invalid_base_url_is_reported() {
        let output = printed("not a url", create()).await;

        assert_eq!(output.lines().count(), 1);
        assert!(output.starts_with("Error occurred at "));
        assert!(output.contains("not a url"));
    }

    #[tokio::test]
    async fn test_delete_and_list_labels() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/v1/tenants/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tenant": { "id": "t1", "name": "one" }
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/tenants/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tenants": [],
                "continuous_token": ""
            })))
            .mount(&mock_server)
            .await;

        let deleted = printed(
            &mock_server.uri(),
            Operation::Delete {
                id: "t1".to_string(),
            },
        )
        .await;
        assert!(last_line(&deleted).starts_with("Tenant delete response: "));

        let listed = printed(
            &mock_server.uri(),
            Operation::List {
                page_size: 10,
                continuous_token: String::new(),
            },
        )
        .await;
        assert_eq!(
            last_line(&listed),
            "Tenant list response: {\"tenants\":[],\"continuous_token\":\"\"}"
        );
    }
}
