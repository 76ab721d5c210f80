use crate::AppError;
use crate::api::client::FikenClient;
use crate::api::endpoints::COMPANIES;
use crate::api::models::Company;
use crate::error::{ApiError, ConfigError, OperationContext};

/// Company listing and selection of the company a command works on
pub struct CompanyService {
    client: FikenClient,
}

impl CompanyService {
    pub fn new(client: FikenClient) -> Self {
        Self { client }
    }

    pub async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
        self.client.get_all(COMPANIES, &[], 100).await
    }

    /// `--company` first, then the stored default, then the only company the
    /// token can access.
    pub async fn resolve_company(
        &self,
        flag: Option<&str>,
        stored_default: Option<String>,
    ) -> Result<String, AppError> {
        if let Some(slug) = flag.map(str::trim).filter(|slug| !slug.is_empty()) {
            return Ok(slug.to_string());
        }
        if let Some(slug) = stored_default {
            return Ok(slug);
        }

        let companies = self
            .list_companies()
            .await
            .operation("fetching companies")?;
        pick_single_company(&companies)
    }
}

fn pick_single_company(companies: &[Company]) -> Result<String, AppError> {
    match companies {
        [] => Err(ConfigError::NoCompanies.into()),
        [only] => {
            log::debug!("auto-selected company {}", only.slug);
            Ok(only.slug.clone())
        }
        _ => {
            let choices = companies
                .iter()
                .map(|c| format!("  {} ({})", c.name, c.slug))
                .collect::<Vec<_>>()
                .join("\n");
            Err(ConfigError::AmbiguousCompany { choices }.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service_with_companies(server: &MockServer, body: serde_json::Value) -> CompanyService {
        Mock::given(method("GET"))
            .and(path("/companies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
        let client = FikenClient::new("t".to_string())
            .unwrap()
            .with_base_url(&server.uri())
            .with_min_delay(Duration::ZERO);
        CompanyService::new(client)
    }

    #[tokio::test]
    async fn test_flag_and_default_skip_the_api() {
        let server = MockServer::start().await;
        let service = service_with_companies(&server, json!([])).await;

        let slug = service
            .resolve_company(Some("from-flag"), Some("stored".to_string()))
            .await
            .unwrap();
        assert_eq!(slug, "from-flag");

        let slug = service
            .resolve_company(None, Some("stored".to_string()))
            .await
            .unwrap();
        assert_eq!(slug, "stored");

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_company_is_auto_selected() {
        let server = MockServer::start().await;
        let service =
            service_with_companies(&server, json!([{ "name": "Acme AS", "slug": "acme-as" }]))
                .await;

        assert_eq!(service.resolve_company(None, None).await.unwrap(), "acme-as");
    }

    #[tokio::test]
    async fn test_no_companies_is_an_error() {
        let server = MockServer::start().await;
        let service = service_with_companies(&server, json!([])).await;

        let err = service.resolve_company(None, None).await.unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::NoCompanies)));
    }

    #[tokio::test]
    async fn test_several_companies_lists_choices() {
        let server = MockServer::start().await;
        let service = service_with_companies(
            &server,
            json!([
                { "name": "Acme AS", "slug": "acme-as" },
                { "name": "Beta ENK", "slug": "beta-enk" }
            ]),
        )
        .await;

        let err = service.resolve_company(Some("  "), None).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("multiple companies found"));
        assert!(message.contains("  Acme AS (acme-as)\n  Beta ENK (beta-enk)"));
    }

    #[tokio::test]
    async fn test_api_failure_names_the_operation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&server)
            .await;
        let client = FikenClient::new("t".to_string())
            .unwrap()
            .with_base_url(&server.uri())
            .with_min_delay(Duration::ZERO);

        let err = CompanyService::new(client)
            .resolve_company(None, None)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "fetching companies: fiken API error 401: bad token"
        );
    }
}
