use crate::core::ranking::{build_ranking, RankingOptions, SortOrder};
use crate::domain::indicators::IndicatorCode;
use crate::domain::model::{CountryRecord, DistributionSummary};

pub const HIGHLIGHT_COUNT: usize = 3;

/// Spread of one indicator across `countries`; `None` when nobody has a value.
///
/// Highlights are the best performers: the lowest values for lower-is-better
/// indicators, otherwise the highest values, best first.
pub fn summarize_distribution(
    countries: &[CountryRecord],
    indicator: IndicatorCode,
) -> Option<DistributionSummary> {
    let entries = build_ranking(
        countries,
        indicator,
        &RankingOptions {
            order: SortOrder::Ascending,
            ..RankingOptions::default()
        },
    );

    let min = entries.first()?.value;
    let max = entries.last()?.value;
    let mean = entries.iter().map(|e| e.value).sum::<f64>() / entries.len() as f64;

    let highlights = if indicator.is_lower_better() {
        entries.iter().take(HIGHLIGHT_COUNT).cloned().collect()
    } else {
        entries.iter().rev().take(HIGHLIGHT_COUNT).cloned().collect()
    };

    Some(DistributionSummary {
        indicator,
        entries,
        min,
        max,
        mean,
        highlights,
    })
}
