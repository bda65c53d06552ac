use crate::config::toml_config::DEFAULT_COUNTRIES_DIR;
use crate::core::ingest::{default_narrative_path, fact_value, RawNarrative};
use crate::domain::groups::{builtin_groups, find_group, Group};
use crate::domain::indicators::IndicatorCode;
use crate::domain::model::{ContextSnapshot, SnapshotBody, SnapshotIndicator};
use crate::domain::ports::{fetch_json, DocumentSource};
use chrono::{DateTime, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Indicators summarised for every multi-country group.
pub const HEADLINE_INDICATORS: [IndicatorCode; 3] = [
    IndicatorCode::GdpPerCapita,
    IndicatorCode::Unemployment,
    IndicatorCode::Inflation,
];

pub const NOT_AGGREGATED_TRAIT: &str = "Context not aggregated";

/// How many members must carry a value before a median is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotPolicy {
    /// Groups up to this size use `small_group_min_coverage`.
    pub small_group_max: usize,
    pub small_group_min_coverage: usize,
    pub min_coverage: usize,
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self {
            small_group_max: 3,
            small_group_min_coverage: 2,
            min_coverage: 3,
        }
    }
}

impl SnapshotPolicy {
    pub fn required_coverage(&self, group_size: usize) -> usize {
        if group_size <= self.small_group_max {
            self.small_group_min_coverage
        } else {
            self.min_coverage
        }
    }
}

/// Group-level medians computed straight from the narrative documents.
///
/// Nothing is cached; every call re-reads the member documents.
pub struct SnapshotAggregator<S: DocumentSource> {
    source: Arc<S>,
    countries_dir: String,
    policy: SnapshotPolicy,
    groups: Vec<Group>,
}

impl<S: DocumentSource> SnapshotAggregator<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            countries_dir: DEFAULT_COUNTRIES_DIR.to_string(),
            policy: SnapshotPolicy::default(),
            groups: builtin_groups(),
        }
    }

    pub fn with_countries_dir(mut self, countries_dir: &str) -> Self {
        self.countries_dir = countries_dir.to_string();
        self
    }

    pub fn with_policy(mut self, policy: SnapshotPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_groups(mut self, groups: Vec<Group>) -> Self {
        self.groups = groups;
        self
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub async fn compute_snapshot(&self, group: &Group) -> ContextSnapshot {
        let narratives = read_narratives(&self.source, &self.countries_dir, group).await;
        build_snapshot(group, &narratives, &self.policy)
    }

    /// Snapshots keyed by group id. Unknown ids map to `None`; repeats are computed once.
    pub async fn load_context_snapshots(
        &self,
        group_ids: &[&str],
    ) -> BTreeMap<String, Option<ContextSnapshot>> {
        let mut seen = HashSet::new();
        let mut results = BTreeMap::new();

        let mut tasks = JoinSet::new();
        for id in group_ids.iter().filter(|id| seen.insert(**id)) {
            let Some(group) = find_group(&self.groups, id).cloned() else {
                tracing::warn!("unknown context group {}", id);
                results.insert(id.to_string(), None);
                continue;
            };
            let source = Arc::clone(&self.source);
            let countries_dir = self.countries_dir.clone();
            let policy = self.policy;
            tasks.spawn(async move {
                let narratives = read_narratives(&source, &countries_dir, &group).await;
                build_snapshot(&group, &narratives, &policy)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(snapshot) => {
                    results.insert(snapshot.group_id.clone(), Some(snapshot));
                }
                Err(e) => tracing::warn!("context snapshot task failed: {}", e),
            }
        }

        // a failed task leaves its group unavailable rather than missing
        for id in seen {
            results.entry(id.to_string()).or_insert(None);
        }

        results
    }
}

/// Member documents that could be read; missing or broken files are skipped.
async fn read_narratives<S: DocumentSource + ?Sized>(
    source: &Arc<S>,
    countries_dir: &str,
    group: &Group,
) -> Vec<RawNarrative> {
    let mut tasks = JoinSet::new();
    for member in group.members() {
        let source = Arc::clone(source);
        let path = default_narrative_path(countries_dir, &member.code);
        tasks.spawn(async move {
            match fetch_json::<S, RawNarrative>(source.as_ref(), &path).await {
                Ok(narrative) => Some(narrative),
                Err(e) => {
                    tracing::debug!("no narrative at {}: {}", path, e);
                    None
                }
            }
        });
    }

    let mut narratives = Vec::with_capacity(group.len());
    while let Some(joined) = tasks.join_next().await {
        if let Ok(Some(narrative)) = joined {
            narratives.push(narrative);
        }
    }
    narratives
}

pub fn build_snapshot(
    group: &Group,
    narratives: &[RawNarrative],
    policy: &SnapshotPolicy,
) -> ContextSnapshot {
    let body = if group.len() == 1 {
        let traits = if group.traits().is_empty() {
            vec![NOT_AGGREGATED_TRAIT.to_string()]
        } else {
            group.traits().to_vec()
        };
        SnapshotBody::Qualitative(traits)
    } else {
        let required = policy.required_coverage(group.len());
        let indicators = HEADLINE_INDICATORS
            .iter()
            .map(|&code| {
                let values: Vec<f64> = narratives.iter().filter_map(|n| fact_value(n, code)).collect();
                let median = if values.len() >= required {
                    median(&values)
                } else {
                    None
                };
                SnapshotIndicator {
                    code,
                    label: code.label().to_string(),
                    coverage: values.len(),
                    median,
                }
            })
            .collect();
        SnapshotBody::Aggregated(indicators)
    };

    let dates: Vec<&str> = narratives
        .iter()
        .filter_map(|n| n.snapshot_date.as_deref())
        .collect();

    ContextSnapshot {
        group_id: group.id().to_string(),
        title: group.title().to_string(),
        count: group.len(),
        body,
        as_of_text: as_of_text(&dates),
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let len = sorted.len();
    if len % 2 == 1 {
        Some(sorted[len / 2])
    } else {
        Some((sorted[len / 2 - 1] + sorted[len / 2]) / 2.0)
    }
}

/// One date when every document agrees, else `"first - last"`.
pub fn as_of_text(dates: &[&str]) -> Option<String> {
    let distinct: BTreeSet<String> = dates
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .map(normalize_date)
        .collect();

    let first = distinct.first()?;
    let last = distinct.last()?;
    if first == last {
        Some(first.clone())
    } else {
        Some(format!("{} - {}", first, last))
    }
}

/// ISO day for anything chrono understands; other strings pass through trimmed.
fn normalize_date(raw: &str) -> String {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return timestamp.date_naive().format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}
