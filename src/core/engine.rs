use crate::adapters::SnapshotSource;
use crate::config::EngineConfig;
use crate::core::distribution::summarize_distribution;
use crate::core::graph::{build_network_links, build_nodes, NodeOptions};
use crate::core::loader::CountryLoader;
use crate::core::ranking::{average_indicator, build_ranking, RankingOptions};
use crate::core::snapshot::SnapshotAggregator;
use crate::domain::indicators::IndicatorCode;
use crate::domain::model::{
    ContextSnapshot, CountryRecord, DistributionSummary, NetworkGraph, RankingEntry,
};
use crate::domain::ports::DocumentSource;
use crate::utils::error::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Entry point for the rendering layer: one loader and one snapshot
/// aggregator over a shared document source.
pub struct AtlasEngine<S: DocumentSource> {
    loader: CountryLoader<S>,
    snapshots: SnapshotAggregator<S>,
    node_options: NodeOptions,
}

impl AtlasEngine<SnapshotSource> {
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let source = Arc::new(config.build_source()?);
        let loader = CountryLoader::with_paths(
            Arc::clone(&source),
            config.manifest_path(),
            config.countries_dir(),
        );
        let snapshots = SnapshotAggregator::new(source)
            .with_countries_dir(config.countries_dir())
            .with_policy(config.snapshot_policy());

        Ok(Self {
            loader,
            snapshots,
            node_options: NodeOptions {
                limit: config.node_limit(),
            },
        })
    }
}

impl<S: DocumentSource> AtlasEngine<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            loader: CountryLoader::new(Arc::clone(&source)),
            snapshots: SnapshotAggregator::new(source),
            node_options: NodeOptions::default(),
        }
    }

    pub fn with_node_options(mut self, node_options: NodeOptions) -> Self {
        self.node_options = node_options;
        self
    }

    pub fn loader(&self) -> &CountryLoader<S> {
        &self.loader
    }

    pub fn snapshots(&self) -> &SnapshotAggregator<S> {
        &self.snapshots
    }

    pub async fn countries(&self) -> Result<Arc<Vec<CountryRecord>>> {
        self.loader.fetch_all().await
    }

    pub async fn ranking(
        &self,
        indicator: IndicatorCode,
        options: &RankingOptions,
    ) -> Result<Vec<RankingEntry>> {
        let countries = self.countries().await?;
        Ok(build_ranking(&countries, indicator, options))
    }

    pub async fn average(&self, indicator: IndicatorCode) -> Result<Option<f64>> {
        let countries = self.countries().await?;
        Ok(average_indicator(&countries, indicator))
    }

    pub async fn distribution(&self, indicator: IndicatorCode) -> Result<Option<DistributionSummary>> {
        let countries = self.countries().await?;
        Ok(summarize_distribution(&countries, indicator))
    }

    /// Ranking → nodes → links for one indicator, best performers first.
    pub async fn network(&self, indicator: IndicatorCode) -> Result<NetworkGraph> {
        let countries = self.countries().await?;
        let ranking = build_ranking(&countries, indicator, &RankingOptions::best_first(indicator));
        let nodes = build_nodes(&ranking, indicator, &self.node_options);
        let edges = build_network_links(&countries, &nodes);

        tracing::debug!(
            "Built {} network: {} nodes, {} edges",
            indicator,
            nodes.len(),
            edges.len()
        );

        Ok(NetworkGraph {
            indicator,
            nodes,
            edges,
        })
    }

    pub async fn context_snapshots(
        &self,
        group_ids: &[&str],
    ) -> BTreeMap<String, Option<ContextSnapshot>> {
        self.snapshots.load_context_snapshots(group_ids).await
    }
}
