use crate::utils::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Read-only access to the static snapshot tree. Paths are relative to the
/// snapshot root, e.g. `index.json` or `countries/DEU_narrative.json`.
#[async_trait]
pub trait DocumentSource: Send + Sync + 'static {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>>;
}

pub async fn fetch_json<S, T>(source: &S, path: &str) -> Result<T>
where
    S: DocumentSource + ?Sized,
    T: DeserializeOwned,
{
    let bytes = source.fetch(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
