// Adapters layer: concrete document sources for the snapshot tree.

pub mod http;
pub mod local;

use crate::domain::ports::DocumentSource;
use crate::utils::error::Result;
use async_trait::async_trait;

pub use http::HttpSource;
pub use local::LocalSource;

/// The source selected by configuration.
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    Http(HttpSource),
    Local(LocalSource),
}

#[async_trait]
impl DocumentSource for SnapshotSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        match self {
            SnapshotSource::Http(source) => source.fetch(path).await,
            SnapshotSource::Local(source) => source.fetch(path).await,
        }
    }
}
