use crate::domain::ports::DocumentSource;
use crate::utils::error::{AtlasError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Fetches snapshot documents over HTTP(S).
///
/// Relative paths resolve against `base_url`; paths starting with `/` resolve
/// against the host root, which is how the manifest addresses narratives.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: Url,
    client: Client,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = validate_url("source.base_url", base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AtlasError::InvalidConfigValue {
                field: "document_path".to_string(),
                value: path.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.resolve(path)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AtlasError::HttpStatus {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let source = HttpSource::new("https://example.org/data/v1", Duration::from_secs(5)).unwrap();
        assert_eq!(source.base_url().as_str(), "https://example.org/data/v1/");
    }

    #[test]
    fn test_resolve_relative_and_rooted_paths() {
        let source = HttpSource::new("https://example.org/data/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            source.resolve("index.json").unwrap().as_str(),
            "https://example.org/data/v1/index.json"
        );
        assert_eq!(
            source
                .resolve("/data/v1/countries/DEU_narrative.json")
                .unwrap()
                .as_str(),
            "https://example.org/data/v1/countries/DEU_narrative.json"
        );
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(HttpSource::new("ftp://example.org/", Duration::from_secs(5)).is_err());
    }

    #[tokio::test]
    async fn test_fetch_maps_error_status() {
        let server = MockServer::start_async().await;
        let missing = server
            .mock_async(|when, then| {
                when.method(GET).path("/data/v1/missing.json");
                then.status(404);
            })
            .await;

        let source = HttpSource::new(&server.url("/data/v1/"), Duration::from_secs(5)).unwrap();
        let err = source.fetch("missing.json").await.unwrap_err();

        missing.assert_async().await;
        assert!(matches!(err, AtlasError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start_async().await;
        let doc = server
            .mock_async(|when, then| {
                when.method(GET).path("/data/v1/index.json");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .body(r#"{"countries":[]}"#);
            })
            .await;

        let source = HttpSource::new(&server.url("/data/v1/"), Duration::from_secs(5)).unwrap();
        let body = source.fetch("index.json").await.unwrap();

        doc.assert_async().await;
        assert_eq!(body, br#"{"countries":[]}"#.to_vec());
    }
}
