//! Ingestion boundary: untyped snapshot JSON in, strict [`CountryRecord`]s out.
//!
//! Numeric fields are read as raw JSON values so that one malformed number
//! degrades to an absent value instead of failing the whole document.

use crate::domain::indicators::IndicatorCode;
use crate::domain::model::{CountryRecord, IndicatorSummary, Percentiles};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawManifest {
    #[serde(default)]
    pub countries: Option<Vec<RawManifestEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawManifestEntry {
    pub code: Option<String>,
    pub iso3: Option<String>,
    pub name: Option<String>,
    pub files: Option<RawManifestFiles>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawManifestFiles {
    pub narrative: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNarrative {
    pub code: Option<String>,
    pub iso3: Option<String>,
    pub country_name: Option<String>,
    pub snapshot_date: Option<String>,
    pub facts_used: Option<Vec<RawFact>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFact {
    pub indicator_code: Option<String>,
    pub code: Option<String>,
    pub value: Option<Value>,
    pub yoy: Option<Value>,
    pub pctl: Option<RawPercentiles>,
}

// Documents may carry either key name, or both; the first valid one wins.

impl RawManifestEntry {
    pub fn country_code(&self) -> Option<String> {
        normalize_country_code(self.code.as_deref())
            .or_else(|| normalize_country_code(self.iso3.as_deref()))
    }
}

impl RawNarrative {
    pub fn country_code(&self) -> Option<String> {
        normalize_country_code(self.code.as_deref())
            .or_else(|| normalize_country_code(self.iso3.as_deref()))
    }
}

impl RawFact {
    pub fn indicator(&self) -> Option<IndicatorCode> {
        self.indicator_code
            .as_deref()
            .and_then(IndicatorCode::parse)
            .or_else(|| self.code.as_deref().and_then(IndicatorCode::parse))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPercentiles {
    pub world: Option<Value>,
    pub region: Option<Value>,
    pub income: Option<Value>,
}

/// A manifest entry that survived validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub code: String,
    pub name: String,
    pub narrative_path: String,
}

/// Trims and upper-cases a country code; anything but three ASCII letters is rejected.
pub fn normalize_country_code(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(trimmed.to_ascii_uppercase())
    } else {
        None
    }
}

pub fn default_narrative_path(countries_dir: &str, code: &str) -> String {
    format!("{}/{}_narrative.json", countries_dir.trim_end_matches('/'), code)
}

/// Valid entries in manifest order; invalid codes and repeated codes are skipped.
pub fn manifest_entries(manifest: RawManifest, countries_dir: &str) -> Vec<ManifestEntry> {
    let mut seen = std::collections::HashSet::new();
    let mut entries = Vec::new();

    for raw in manifest.countries.unwrap_or_default() {
        let Some(code) = raw.country_code() else {
            tracing::warn!(
                "skipping manifest entry with invalid code: {:?}",
                raw.code.as_ref().or(raw.iso3.as_ref())
            );
            continue;
        };
        if !seen.insert(code.clone()) {
            tracing::warn!("skipping duplicate manifest entry for {}", code);
            continue;
        }

        let name = non_blank(raw.name).unwrap_or_else(|| code.clone());
        let narrative_path = raw
            .files
            .and_then(|f| non_blank(f.narrative))
            .unwrap_or_else(|| default_narrative_path(countries_dir, &code));

        entries.push(ManifestEntry {
            code,
            name,
            narrative_path,
        });
    }

    entries
}

/// Converts a narrative document into a record. Returns `None` when no code can
/// be established or when no tracked indicator carries usable data.
pub fn parse_narrative(
    narrative: RawNarrative,
    fallback_code: &str,
    fallback_name: &str,
) -> Option<CountryRecord> {
    let code = narrative
        .country_code()
        .or_else(|| normalize_country_code(Some(fallback_code)))?;
    let name = non_blank(narrative.country_name)
        .or_else(|| non_blank(Some(fallback_name.to_string())))
        .unwrap_or_else(|| code.clone());

    let mut indicators = BTreeMap::new();
    for fact in narrative.facts_used.unwrap_or_default() {
        let Some(indicator) = fact.indicator() else {
            continue;
        };
        let summary = IndicatorSummary {
            value: finite_number(fact.value.as_ref()),
            yoy: finite_number(fact.yoy.as_ref()),
            percentiles: fact.pctl.as_ref().and_then(normalize_percentiles),
        };
        if summary.has_data() {
            indicators.insert(indicator, summary);
        }
    }

    if indicators.is_empty() {
        return None;
    }

    Some(CountryRecord {
        code,
        name,
        indicators,
    })
}

/// Value of one tracked fact, for consumers that read documents directly.
pub fn fact_value(narrative: &RawNarrative, indicator: IndicatorCode) -> Option<f64> {
    narrative
        .facts_used
        .as_deref()?
        .iter()
        .find(|f| f.indicator() == Some(indicator))
        .and_then(|f| finite_number(f.value.as_ref()))
}

fn normalize_percentiles(raw: &RawPercentiles) -> Option<Percentiles> {
    let percentiles = Percentiles {
        world: percentile(raw.world.as_ref()),
        region: percentile(raw.region.as_ref()),
        income: percentile(raw.income.as_ref()),
    };
    (!percentiles.is_empty()).then_some(percentiles)
}

fn percentile(value: Option<&Value>) -> Option<f64> {
    finite_number(value).filter(|p| (0.0..=100.0).contains(p))
}

fn finite_number(value: Option<&Value>) -> Option<f64> {
    value?.as_f64().filter(|v| v.is_finite())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
