use crate::config::toml_config::{DEFAULT_COUNTRIES_DIR, DEFAULT_MANIFEST_PATH};
use crate::core::ingest::{default_narrative_path, manifest_entries, parse_narrative, ManifestEntry, RawManifest, RawNarrative};
use crate::domain::model::CountryRecord;
use crate::domain::ports::{fetch_json, DocumentSource};
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio::task::JoinSet;

/// Loads every country record once and hands out the same shared list afterwards.
///
/// Concurrent callers that arrive while the first load is in flight wait on
/// that load instead of starting their own. A failed manifest fetch leaves
/// the cache empty so the next call retries.
pub struct CountryLoader<S: DocumentSource> {
    source: Arc<S>,
    manifest_path: String,
    countries_dir: String,
    cache: OnceCell<Arc<Vec<CountryRecord>>>,
}

impl<S: DocumentSource> CountryLoader<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self::with_paths(source, DEFAULT_MANIFEST_PATH, DEFAULT_COUNTRIES_DIR)
    }

    pub fn with_paths(source: Arc<S>, manifest_path: &str, countries_dir: &str) -> Self {
        Self {
            source,
            manifest_path: manifest_path.to_string(),
            countries_dir: countries_dir.to_string(),
            cache: OnceCell::new(),
        }
    }

    /// Name-sorted records. Every successful call returns the same `Arc`.
    pub async fn fetch_all(&self) -> Result<Arc<Vec<CountryRecord>>> {
        let records = self
            .cache
            .get_or_try_init(|| async { self.load().await.map(Arc::new) })
            .await?;
        Ok(Arc::clone(records))
    }

    /// The cached records, if a load has completed.
    pub fn cached(&self) -> Option<Arc<Vec<CountryRecord>>> {
        self.cache.get().cloned()
    }

    async fn load(&self) -> Result<Vec<CountryRecord>> {
        tracing::info!("Fetching snapshot manifest from {}", self.manifest_path);
        let manifest: RawManifest = fetch_json(self.source.as_ref(), &self.manifest_path).await?;
        let entries = manifest_entries(manifest, &self.countries_dir);
        let requested = entries.len();

        let mut tasks = JoinSet::new();
        for entry in entries {
            let source = Arc::clone(&self.source);
            let fallback_path = default_narrative_path(&self.countries_dir, &entry.code);
            tasks.spawn(async move { load_country(source.as_ref(), entry, fallback_path).await });
        }

        let mut countries = Vec::with_capacity(requested);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(record)) => countries.push(record),
                Ok(None) => {}
                Err(e) => tracing::warn!("country load task failed: {}", e),
            }
        }

        countries.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.code.cmp(&b.code))
        });

        tracing::info!(
            "Loaded {} of {} countries from snapshot",
            countries.len(),
            requested
        );
        Ok(countries)
    }
}

/// One country's document. Every failure is absorbed here and logged.
///
/// When the manifest's path cannot be read, the document is looked up once
/// more at `fallback_path` under the configured countries directory.
async fn load_country<S: DocumentSource + ?Sized>(
    source: &S,
    entry: ManifestEntry,
    fallback_path: String,
) -> Option<CountryRecord> {
    let fetched = match fetch_json::<S, RawNarrative>(source, &entry.narrative_path).await {
        Err(e) if fallback_path != entry.narrative_path => {
            tracing::debug!(
                "{} not readable at {} ({}), trying {}",
                entry.code,
                entry.narrative_path,
                e,
                fallback_path
            );
            fetch_json(source, &fallback_path).await
        }
        other => other,
    };

    let narrative = match fetched {
        Ok(narrative) => narrative,
        Err(e) => {
            tracing::warn!(
                "dropping {}: {} ({:?})",
                entry.code,
                e,
                e.category()
            );
            return None;
        }
    };

    let record = parse_narrative(narrative, &entry.code, &entry.name);
    if record.is_none() {
        tracing::debug!("dropping {}: no usable indicators", entry.code);
    }
    record
}
