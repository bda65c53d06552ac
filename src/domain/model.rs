use crate::domain::indicators::IndicatorCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Precomputed percentile ranks supplied by the snapshot. Each in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub world: Option<f64>,
    pub region: Option<f64>,
    pub income: Option<f64>,
}

impl Percentiles {
    pub fn is_empty(&self) -> bool {
        self.world.is_none() && self.region.is_none() && self.income.is_none()
    }

    pub fn get(&self, basis: PercentileBasis) -> Option<f64> {
        match basis {
            PercentileBasis::World => self.world,
            PercentileBasis::Region => self.region,
            PercentileBasis::Income => self.income,
        }
    }
}

/// Comparison population a percentile was computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentileBasis {
    #[default]
    World,
    Region,
    Income,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    pub value: Option<f64>,
    pub yoy: Option<f64>,
    pub percentiles: Option<Percentiles>,
}

impl IndicatorSummary {
    pub fn has_data(&self) -> bool {
        self.value.is_some() || self.yoy.is_some() || self.percentiles.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub code: String,
    pub name: String,
    pub indicators: BTreeMap<IndicatorCode, IndicatorSummary>,
}

impl CountryRecord {
    pub fn summary(&self, indicator: IndicatorCode) -> Option<&IndicatorSummary> {
        self.indicators.get(&indicator)
    }

    /// Finite value for `indicator`, if the snapshot carried one.
    pub fn value(&self, indicator: IndicatorCode) -> Option<f64> {
        self.summary(indicator)
            .and_then(|s| s.value)
            .filter(|v| v.is_finite())
    }

    pub fn percentile(&self, indicator: IndicatorCode, basis: PercentileBasis) -> Option<f64> {
        self.summary(indicator)
            .and_then(|s| s.percentiles)
            .and_then(|p| p.get(basis))
            .filter(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub code: String,
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub metric_label: String,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub weight: f64,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Proximity,
    Trade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub strength: f64,
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkGraph {
    pub indicator: IndicatorCode,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSummary {
    pub indicator: IndicatorCode,
    /// Ascending by value.
    pub entries: Vec<RankingEntry>,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub highlights: Vec<RankingEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotIndicator {
    pub code: IndicatorCode,
    pub label: String,
    pub coverage: usize,
    /// `None` when fewer members than the coverage threshold carry a value.
    pub median: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum SnapshotBody {
    Aggregated(Vec<SnapshotIndicator>),
    /// Single-country groups are described, not aggregated.
    Qualitative(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSnapshot {
    pub group_id: String,
    pub title: String,
    pub count: usize,
    pub body: SnapshotBody,
    pub as_of_text: Option<String>,
}
