use crate::domain::indicators::{Direction, IndicatorCode};
use crate::domain::model::{CountryRecord, PercentileBasis, RankingEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Neutral gray for "no data". Its saturation is off the score ramp, so it can
/// never be mistaken for a real score.
pub const NO_DATA_COLOR: &str = "hsl(220, 9%, 70%)";

const HUE_WORST: f64 = 4.0;
const HUE_BEST: f64 = 142.0;
const LIGHTNESS_WORST: f64 = 56.0;
const LIGHTNESS_BEST: f64 = 40.0;
const SATURATION: u32 = 68;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

#[derive(Debug, Clone, Default)]
pub struct RankingOptions {
    pub limit: Option<usize>,
    pub order: SortOrder,
    /// Restricts the ranking to these country codes.
    pub filter: Option<HashSet<String>>,
}

impl RankingOptions {
    pub fn top(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Best-first order for `indicator`.
    pub fn best_first(indicator: IndicatorCode) -> Self {
        let order = match indicator.direction() {
            Direction::HigherIsBetter => SortOrder::Descending,
            Direction::LowerIsBetter => SortOrder::Ascending,
        };
        Self {
            order,
            ..Self::default()
        }
    }
}

/// Entries with a usable value, in input order.
pub fn ranking_entries(countries: &[CountryRecord], indicator: IndicatorCode) -> Vec<RankingEntry> {
    countries
        .iter()
        .filter_map(|c| {
            c.value(indicator).map(|value| RankingEntry {
                code: c.code.clone(),
                name: c.name.clone(),
                value,
            })
        })
        .collect()
}

/// Sorted ranking. The sort is stable, so equal values keep input order.
pub fn build_ranking(
    countries: &[CountryRecord],
    indicator: IndicatorCode,
    options: &RankingOptions,
) -> Vec<RankingEntry> {
    let mut entries = ranking_entries(countries, indicator);

    if let Some(filter) = &options.filter {
        entries.retain(|e| filter.contains(&e.code));
    }

    match options.order {
        SortOrder::Descending => entries.sort_by(|a, b| b.value.total_cmp(&a.value)),
        SortOrder::Ascending => entries.sort_by(|a, b| a.value.total_cmp(&b.value)),
    }

    if let Some(limit) = options.limit {
        entries.truncate(limit);
    }

    entries
}

/// Mean over countries that carry the indicator; `None` when nobody does.
pub fn average_indicator(countries: &[CountryRecord], indicator: IndicatorCode) -> Option<f64> {
    let (sum, count) = countries
        .iter()
        .filter_map(|c| c.value(indicator))
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    (count > 0).then(|| sum / count as f64)
}

/// Severity score in [0, 100] where higher always means "better".
pub fn severity_score(indicator: IndicatorCode, percentile: f64) -> f64 {
    let p = percentile.clamp(0.0, 100.0);
    match indicator.direction() {
        Direction::LowerIsBetter => 100.0 - p,
        Direction::HigherIsBetter => p,
    }
}

pub fn country_score(
    country: &CountryRecord,
    indicator: IndicatorCode,
    basis: PercentileBasis,
) -> Option<f64> {
    country
        .percentile(indicator, basis)
        .map(|p| severity_score(indicator, p))
}

/// Maps a 0–100 score onto the red→green ramp.
pub fn color_for_score(score: Option<f64>) -> String {
    let Some(score) = score.filter(|s| !s.is_nan()) else {
        return NO_DATA_COLOR.to_string();
    };
    let t = score.clamp(0.0, 100.0) / 100.0;
    let hue = HUE_WORST + (HUE_BEST - HUE_WORST) * t;
    let lightness = LIGHTNESS_WORST + (LIGHTNESS_BEST - LIGHTNESS_WORST) * t;
    format!("hsl({:.0}, {}%, {:.0}%)", hue, SATURATION, lightness)
}

/// Country whose world percentile lies closest to `target`; the first one wins ties.
pub fn nearest_by_percentile<'a>(
    countries: &'a [CountryRecord],
    indicator: IndicatorCode,
    target: f64,
) -> Option<&'a CountryRecord> {
    let mut best: Option<(&CountryRecord, f64)> = None;
    for country in countries {
        let Some(p) = country.percentile(indicator, PercentileBasis::World) else {
            continue;
        };
        let diff = (p - target).abs();
        if best.map_or(true, |(_, best_diff)| diff < best_diff) {
            best = Some((country, diff));
        }
    }
    best.map(|(country, _)| country)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{IndicatorSummary, Percentiles};
    use std::collections::BTreeMap;

    fn country(code: &str, name: &str, facts: &[(IndicatorCode, Option<f64>, Option<f64>)]) -> CountryRecord {
        let mut indicators = BTreeMap::new();
        for (indicator, value, world) in facts {
            indicators.insert(
                *indicator,
                IndicatorSummary {
                    value: *value,
                    yoy: None,
                    percentiles: world.map(|w| Percentiles {
                        world: Some(w),
                        region: None,
                        income: None,
                    }),
                },
            );
        }
        CountryRecord {
            code: code.to_string(),
            name: name.to_string(),
            indicators,
        }
    }

    fn exports(code: &str, name: &str, value: f64) -> CountryRecord {
        country(code, name, &[(IndicatorCode::Exports, Some(value), None)])
    }

    fn codes(entries: &[RankingEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.code.as_str()).collect()
    }

    #[test]
    fn test_scenario_top_two_exporters() {
        let countries = vec![
            exports("DEU", "Germany", 45.0),
            exports("NLD", "Netherlands", 60.0),
            exports("POL", "Poland", 30.0),
        ];
        let ranking = build_ranking(&countries, IndicatorCode::Exports, &RankingOptions::top(2));
        assert_eq!(
            ranking,
            vec![
                RankingEntry {
                    code: "NLD".to_string(),
                    name: "Netherlands".to_string(),
                    value: 60.0
                },
                RankingEntry {
                    code: "DEU".to_string(),
                    name: "Germany".to_string(),
                    value: 45.0
                },
            ]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let countries = vec![
            exports("AAA", "A", 5.0),
            exports("BBB", "B", 5.0),
            exports("CCC", "C", 3.0),
        ];
        let desc = build_ranking(&countries, IndicatorCode::Exports, &RankingOptions::default());
        assert_eq!(codes(&desc), vec!["AAA", "BBB", "CCC"]);

        let asc = build_ranking(
            &countries,
            IndicatorCode::Exports,
            &RankingOptions {
                order: SortOrder::Ascending,
                ..RankingOptions::default()
            },
        );
        assert_eq!(codes(&asc), vec!["CCC", "AAA", "BBB"]);
    }

    #[test]
    fn test_missing_and_nan_values_excluded() {
        let countries = vec![
            exports("DEU", "Germany", 45.0),
            country("FRA", "France", &[(IndicatorCode::Exports, None, Some(50.0))]),
            exports("ITA", "Italy", f64::NAN),
            country("ESP", "Spain", &[(IndicatorCode::Inflation, Some(2.0), None)]),
        ];
        let ranking = build_ranking(&countries, IndicatorCode::Exports, &RankingOptions::default());
        assert_eq!(codes(&ranking), vec!["DEU"]);
        assert!(ranking.iter().all(|e| e.value.is_finite()));
    }

    #[test]
    fn test_filter_set_restricts_entries() {
        let countries = vec![
            exports("DEU", "Germany", 45.0),
            exports("NLD", "Netherlands", 60.0),
            exports("POL", "Poland", 30.0),
        ];
        let options = RankingOptions {
            filter: Some(["POL".to_string(), "DEU".to_string()].into_iter().collect()),
            ..RankingOptions::default()
        };
        let ranking = build_ranking(&countries, IndicatorCode::Exports, &options);
        assert_eq!(codes(&ranking), vec!["DEU", "POL"]);
    }

    #[test]
    fn test_best_first_follows_direction() {
        assert_eq!(RankingOptions::best_first(IndicatorCode::Inflation).order, SortOrder::Ascending);
        assert_eq!(RankingOptions::best_first(IndicatorCode::Exports).order, SortOrder::Descending);
    }

    #[test]
    fn test_average_indicator() {
        let countries = vec![
            exports("DEU", "Germany", 45.0),
            exports("NLD", "Netherlands", 60.0),
            country("FRA", "France", &[(IndicatorCode::Exports, None, None)]),
        ];
        assert_eq!(average_indicator(&countries, IndicatorCode::Exports), Some(52.5));
        assert_eq!(average_indicator(&countries, IndicatorCode::Inflation), None);
        assert_eq!(average_indicator(&[], IndicatorCode::Exports), None);
    }

    #[test]
    fn test_severity_score_inverts_lower_is_better() {
        assert_eq!(severity_score(IndicatorCode::Unemployment, 80.0), 20.0);
        assert_eq!(severity_score(IndicatorCode::Inflation, 80.0), 20.0);
        assert_eq!(severity_score(IndicatorCode::GdpPerCapita, 80.0), 80.0);
        assert_eq!(severity_score(IndicatorCode::InternetUsers, 80.0), 80.0);
    }

    #[test]
    fn test_country_score() {
        let c = country(
            "DEU",
            "Germany",
            &[(IndicatorCode::Unemployment, Some(3.0), Some(80.0))],
        );
        assert_eq!(country_score(&c, IndicatorCode::Unemployment, PercentileBasis::World), Some(20.0));
        assert_eq!(country_score(&c, IndicatorCode::Unemployment, PercentileBasis::Region), None);
        assert_eq!(country_score(&c, IndicatorCode::Exports, PercentileBasis::World), None);
    }

    #[test]
    fn test_color_for_score() {
        assert_eq!(color_for_score(Some(0.0)), "hsl(4, 68%, 56%)");
        assert_eq!(color_for_score(Some(100.0)), "hsl(142, 68%, 40%)");
        assert_eq!(color_for_score(Some(50.0)), "hsl(73, 68%, 48%)");
        assert_eq!(color_for_score(Some(250.0)), color_for_score(Some(100.0)));
    }

    #[test]
    fn test_no_data_color_is_off_scale() {
        assert_eq!(color_for_score(None), NO_DATA_COLOR);
        assert_eq!(color_for_score(Some(f64::NAN)), NO_DATA_COLOR);
        for score in (0..=100).map(f64::from) {
            assert_ne!(color_for_score(Some(score)), NO_DATA_COLOR);
        }
    }

    #[test]
    fn test_nearest_by_percentile() {
        let countries = vec![
            country("DEU", "Germany", &[(IndicatorCode::Exports, Some(45.0), Some(70.0))]),
            country("NLD", "Netherlands", &[(IndicatorCode::Exports, Some(60.0), Some(90.0))]),
            country("POL", "Poland", &[(IndicatorCode::Exports, Some(30.0), Some(50.0))]),
        ];
        let nearest = nearest_by_percentile(&countries, IndicatorCode::Exports, 85.0).unwrap();
        assert_eq!(nearest.code, "NLD");
        // 60 is equidistant from 50 and 70; the first in input order wins
        let tie = nearest_by_percentile(&countries, IndicatorCode::Exports, 60.0).unwrap();
        assert_eq!(tie.code, "DEU");
        assert!(nearest_by_percentile(&countries, IndicatorCode::Inflation, 50.0).is_none());
    }
}
