use std::fmt;

use serde::{Deserialize, Deserializer};

/// One earnings announcement as returned by the provider.
///
/// Every field is optional on the wire; the calendar builder decides which
/// records are usable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEarningsRecord {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub date: Option<String>, // ISO calendar date, e.g. 2024-05-10
    #[serde(default, deserialize_with = "quarter_label")]
    pub quarter: Option<String>,
    #[serde(default)]
    pub eps_estimate: Option<Amount>,
    #[serde(default)]
    pub revenue_estimate: Option<Amount>,
}

impl RawEarningsRecord {
    /// Record with just a symbol and date, the minimum the calendar needs.
    pub fn new(symbol: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            date: Some(date.into()),
            ..Self::default()
        }
    }

    /// The date string if present and non-blank.
    pub fn date_str(&self) -> Option<&str> {
        self.date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// A monetary or per-share figure. Providers send these as JSON numbers,
/// occasionally as numeric strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Number(n) => write!(f, "{n}"),
            Amount::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount::Number(value)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Amount::Text(value.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuarterRepr {
    Int(i64),
    Float(f64),
    Text(String),
}

// Finnhub sends the fiscal quarter as an integer; other feeds use "Q2".
fn quarter_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<QuarterRepr>::deserialize(deserializer)?;
    Ok(raw.map(|q| match q {
        QuarterRepr::Int(n) => n.to_string(),
        QuarterRepr::Float(f) => f.to_string(),
        QuarterRepr::Text(s) => s,
    }))
}
