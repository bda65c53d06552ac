use crate::domain::ports::DocumentSource;
use crate::utils::error::{AtlasError, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Reads snapshot documents from a directory on disk.
///
/// Relative paths resolve under `base_path`. Rooted paths (`/data/v1/...`, as
/// written into manifests for the web) resolve under `root_dir` when one is
/// set, mirroring how `HttpSource` resolves them against the host root.
#[derive(Debug, Clone)]
pub struct LocalSource {
    base_path: PathBuf,
    root_dir: Option<PathBuf>,
}

impl LocalSource {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
            root_dir: None,
        }
    }

    pub fn with_root_dir<P: Into<PathBuf>>(mut self, root_dir: P) -> Self {
        self.root_dir = Some(root_dir.into());
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn root_dir(&self) -> Option<&Path> {
        self.root_dir.as_deref()
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let base = match (&self.root_dir, path.starts_with('/')) {
            (Some(root), true) => root,
            _ => &self.base_path,
        };
        let relative = Path::new(path.trim_start_matches('/'));
        // the snapshot root is the jail
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(AtlasError::Validation {
                message: format!("document path escapes snapshot root: {}", path),
            });
        }
        Ok(base.join(relative))
    }
}

#[async_trait]
impl DocumentSource for LocalSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path)?;
        tracing::debug!("reading {}", full_path.display());
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }
}
