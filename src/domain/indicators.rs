use serde::{Deserialize, Serialize};
use std::fmt;

/// Indicators tracked by the snapshot, keyed by their World Bank code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndicatorCode {
    #[serde(rename = "NY.GDP.PCAP.KD")]
    GdpPerCapita,
    #[serde(rename = "SL.UEM.TOTL.ZS")]
    Unemployment,
    #[serde(rename = "IT.NET.USER.ZS")]
    InternetUsers,
    #[serde(rename = "NE.EXP.GNFS.ZS")]
    Exports,
    #[serde(rename = "SP.DYN.LE00.IN")]
    LifeExpectancy,
    #[serde(rename = "FP.CPI.TOTL.ZG")]
    Inflation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Currency,
    Percent,
    Years,
    PercentagePoints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    HigherIsBetter,
    LowerIsBetter,
}

pub const TRACKED_INDICATORS: [IndicatorCode; 6] = [
    IndicatorCode::GdpPerCapita,
    IndicatorCode::Unemployment,
    IndicatorCode::InternetUsers,
    IndicatorCode::Exports,
    IndicatorCode::LifeExpectancy,
    IndicatorCode::Inflation,
];

impl IndicatorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorCode::GdpPerCapita => "NY.GDP.PCAP.KD",
            IndicatorCode::Unemployment => "SL.UEM.TOTL.ZS",
            IndicatorCode::InternetUsers => "IT.NET.USER.ZS",
            IndicatorCode::Exports => "NE.EXP.GNFS.ZS",
            IndicatorCode::LifeExpectancy => "SP.DYN.LE00.IN",
            IndicatorCode::Inflation => "FP.CPI.TOTL.ZG",
        }
    }

    /// Parses a raw code; untracked codes yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        TRACKED_INDICATORS
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(raw))
    }

    pub fn label(&self) -> &'static str {
        match self {
            IndicatorCode::GdpPerCapita => "GDP per capita",
            IndicatorCode::Unemployment => "Unemployment",
            IndicatorCode::InternetUsers => "Internet users",
            IndicatorCode::Exports => "Exports of goods & services",
            IndicatorCode::LifeExpectancy => "Life expectancy",
            IndicatorCode::Inflation => "Inflation (CPI)",
        }
    }

    pub fn unit(&self) -> UnitKind {
        match self {
            IndicatorCode::GdpPerCapita => UnitKind::Currency,
            IndicatorCode::LifeExpectancy => UnitKind::Years,
            IndicatorCode::Unemployment
            | IndicatorCode::InternetUsers
            | IndicatorCode::Exports
            | IndicatorCode::Inflation => UnitKind::Percent,
        }
    }

    /// Unit of the year-over-year delta. Shares move in percentage points.
    pub fn delta_unit(&self) -> UnitKind {
        match self.unit() {
            UnitKind::Percent => UnitKind::PercentagePoints,
            other => other,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            IndicatorCode::Unemployment | IndicatorCode::Inflation => Direction::LowerIsBetter,
            _ => Direction::HigherIsBetter,
        }
    }

    pub fn is_lower_better(&self) -> bool {
        self.direction() == Direction::LowerIsBetter
    }

    pub fn format_value(&self, value: f64) -> String {
        format_in_unit(self.unit(), value)
    }

    pub fn format_delta(&self, delta: f64) -> String {
        let sign = if delta > 0.0 { "+" } else if delta < 0.0 { "-" } else { "" };
        format!("{}{}", sign, format_in_unit(self.delta_unit(), delta.abs()))
    }
}

impl fmt::Display for IndicatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn format_in_unit(unit: UnitKind, value: f64) -> String {
    match unit {
        UnitKind::Currency => {
            if value < 0.0 {
                format!("-${}", group_thousands(value.abs().round() as u64))
            } else {
                format!("${}", group_thousands(value.round() as u64))
            }
        }
        UnitKind::Percent => format!("{:.1}%", value),
        UnitKind::Years => format!("{:.1} yrs", value),
        UnitKind::PercentagePoints => format!("{:.1} pp", value),
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
