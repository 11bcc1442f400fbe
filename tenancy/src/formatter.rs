use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use colored::*;
use std::fmt::Display;
use tenancy_core::pb::{Tenant, TenantCreateResponse, TenantDeleteResponse, TenantListResponse};

/// Time-of-day layout of error reports, e.g. `14:03:12.118+02:00`.
pub const ERROR_TIME_FORMAT: &str = "%H:%M:%S%.3f%:z";

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

/// A REST response printed as its JSON body after a label.
pub struct Labelled(pub &'static str, pub String);

/// A failure reported with the local time it was observed at.
pub struct ErrorAt<Tz: TimeZone, E: Display>(pub DateTime<Tz>, pub E);

pub struct GenericError<T: Display>(pub &'static str, pub T);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Labelled> for FormattedString {
    fn from(Labelled(label, body): Labelled) -> Self {
        FormattedString(format!("{} {}", label.green().bold(), body))
    }
}

impl<E: Display> ErrorAt<Local, E> {
    pub fn now(err: E) -> Self {
        ErrorAt(Local::now(), err)
    }
}

impl<Tz, E> From<ErrorAt<Tz, E>> for FormattedString
where
    Tz: TimeZone,
    Tz::Offset: Display,
    E: Display,
{
    fn from(ErrorAt(at, err): ErrorAt<Tz, E>) -> Self {
        FormattedString(format!(
            "{} {}: {}",
            "Error occurred at".red().bold(),
            at.format(ERROR_TIME_FORMAT),
            err
        ))
    }
}

impl From<anyhow::Error> for FormattedString {
    fn from(err: anyhow::Error) -> Self {
        FormattedString(format!("{}\n\n'{:#}'", "Call Failed:".red().bold(), err))
    }
}

impl<T: Display> From<GenericError<T>> for FormattedString {
    fn from(GenericError(msg, err): GenericError<T>) -> Self {
        FormattedString(format!("{}:\n\n'{}'", msg.red().bold(), err))
    }
}

impl From<TenantCreateResponse> for FormattedString {
    fn from(response: TenantCreateResponse) -> Self {
        FormattedString(tenant_field("tenant", response.tenant.as_ref()))
    }
}

impl From<TenantDeleteResponse> for FormattedString {
    fn from(response: TenantDeleteResponse) -> Self {
        FormattedString(tenant_field("tenant", response.tenant.as_ref()))
    }
}

impl From<TenantListResponse> for FormattedString {
    fn from(response: TenantListResponse) -> Self {
        if response.tenants.is_empty() {
            return FormattedString("No tenants found.".yellow().to_string());
        }

        let mut out = response
            .tenants
            .iter()
            .map(|tenant| tenant_field("tenants", Some(tenant)))
            .collect::<Vec<_>>()
            .join("\n");

        if !response.continuous_token.is_empty() {
            out.push_str(&format!(
                "\n{}: {:?}",
                "continuous_token".cyan(),
                response.continuous_token
            ));
        }

        FormattedString(out)
    }
}

// Protobuf text format: absent messages print nothing.
fn tenant_field(field: &str, tenant: Option<&Tenant>) -> String {
    let Some(tenant) = tenant else {
        return String::new();
    };

    let mut out = format!("{} {{\n", field.cyan());
    out.push_str(&format!("  {}: {:?}\n", "id".cyan(), tenant.id));
    out.push_str(&format!("  {}: {:?}\n", "name".cyan(), tenant.name));

    if let Some(created_at) = &tenant.created_at {
        let rendered = u32::try_from(created_at.nanos)
            .ok()
            .and_then(|nanos| DateTime::<Utc>::from_timestamp(created_at.seconds, nanos))
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_else(|| format!("{}s", created_at.seconds));
        out.push_str(&format!("  {}: {}\n", "created_at".cyan(), rendered.yellow()));
    }

    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_create_response_text_format() {
        plain();

        let response = TenantCreateResponse {
            tenant: Some(Tenant {
                id: "tenant_2024.01.02.03.04.05".to_string(),
                name: "tenant id name".to_string(),
                created_at: Some(Default::default()),
            }),
        };

        let rendered = FormattedString::from(response).to_string();

        assert_eq!(
            rendered,
            "tenant {\n  id: \"tenant_2024.01.02.03.04.05\"\n  name: \"tenant id name\"\n  created_at: 1970-01-01T00:00:00.000Z\n}"
        );
    }

    #[test]
    fn test_empty_create_response_prints_nothing() {
        plain();
        assert_eq!(
            FormattedString::from(TenantCreateResponse { tenant: None }).to_string(),
            ""
        );
    }

    #[test]
    fn test_list_response_with_token() {
        plain();

        let response = TenantListResponse {
            tenants: vec![Tenant {
                id: "a".to_string(),
                name: "A".to_string(),
                created_at: None,
            }],
            continuous_token: "1".to_string(),
        };

        assert_eq!(
            FormattedString::from(response).to_string(),
            "tenants {\n  id: \"a\"\n  name: \"A\"\n}\ncontinuous_token: \"1\""
        );
    }

    #[test]
    fn test_error_report_layout() {
        plain();

        let at = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 1, 14, 3, 12)
            .unwrap();

        let rendered = FormattedString::from(ErrorAt(at, "connection refused")).to_string();

        assert_eq!(
            rendered,
            "Error occurred at 14:03:12.000+02:00: connection refused"
        );
    }

    #[test]
    fn test_labelled_body() {
        plain();

        let rendered =
            FormattedString::from(Labelled("Tenant create response:", "{}".to_string())).to_string();

        assert_eq!(rendered, "Tenant create response: {}");
    }
}
