//! Blocking HTTP client for the bulletin API.

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::endpoints;
use super::{
    Article, Bulletin, BulletinSource, BulletinType, Category, PublishedBulletin,
    PublishedSummary, Summary,
};
use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Create a client for the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(ApiConfig::from_env())
    }

    /// The configuration in use.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// List all bulletins.
    pub fn bulletins(&self) -> Result<Vec<Bulletin>> {
        self.get_list(endpoints::BULLETINS)
    }

    /// List all bulletin types.
    pub fn bulletin_types(&self) -> Result<Vec<BulletinType>> {
        self.get_list(endpoints::BULLETIN_TYPES)
    }

    /// List published bulletins.
    pub fn published_bulletins(&self) -> Result<Vec<PublishedBulletin>> {
        self.get_list(endpoints::PUBLISHED_BULLETINS)
    }

    /// Fetch one published bulletin.
    pub fn published_bulletin(&self, id: i64) -> Result<PublishedBulletin> {
        self.get(&endpoints::published_bulletin(id))
    }

    /// Summaries of a published bulletin.
    pub fn published_summaries(&self, published_id: i64) -> Result<Vec<PublishedSummary>> {
        self.get_list(&endpoints::published_summaries(published_id))
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let body = self.get_value(endpoint)?;
        Ok(serde_json::from_value(body)?)
    }

    /// GET a list endpoint. A body that is not a JSON array counts as empty.
    fn get_list<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>> {
        match self.get_value(endpoint)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(Error::from))
                .collect(),
            other => {
                log::warn!(
                    "Expected a list from {}, got {}; treating as empty",
                    endpoint,
                    json_kind(&other)
                );
                Ok(Vec::new())
            }
        }
    }

    fn get_value(&self, endpoint: &str) -> Result<Value> {
        let url = self.config.url(endpoint);
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(api_error(status, &text));
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl BulletinSource for ApiClient {
    fn bulletin(&self, id: i64) -> Result<Bulletin> {
        self.get(&endpoints::bulletin(id))
    }

    fn bulletin_type(&self, id: i64) -> Result<BulletinType> {
        self.get(&endpoints::bulletin_type(id))
    }

    fn categories(&self) -> Result<Vec<Category>> {
        self.get_list(endpoints::CATEGORIES)
    }

    fn summaries_for_bulletin(&self, bulletin_id: i64) -> Result<Vec<Summary>> {
        self.get_list(&endpoints::summaries_for_bulletin(bulletin_id))
    }

    fn articles_for_document(&self, document_id: i64) -> Result<Vec<Article>> {
        self.get_list(&endpoints::articles_for_document(document_id))
    }
}

/// Build an API error from a failed response, preferring the body's `detail`.
fn api_error(status: StatusCode, body: &str) -> Error {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| {
            format!(
                "Error {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )
        });
    Error::Api {
        status: status.as_u16(),
        detail,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_uses_detail() {
        let err = api_error(StatusCode::NOT_FOUND, r#"{"detail": "Boletín no encontrado"}"#);
        match err {
            Error::Api { status, detail } => {
                assert_eq!(status, 404);
                assert_eq!(detail, "Boletín no encontrado");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_fallback() {
        let err = api_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>");
        assert_eq!(
            err.to_string(),
            "API error (500): Error 500: Internal Server Error"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn test_client_construction() {
        let client = ApiClient::new(ApiConfig::new().with_base_url("http://example.invalid/")).unwrap();
        assert_eq!(client.config().base_url, "http://example.invalid");
    }
}
