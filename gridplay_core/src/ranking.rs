use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, CoreResult, InvalidProbability};

/// Bars narrower than this are hard to see next to a zero.
const MIN_BAR_PERCENT: f64 = 3.0;

/// A win probability as it arrived: a number (not yet range-checked) or
/// something that was not a number at all.
#[derive(Debug, Clone, PartialEq)]
pub enum Probability {
    Number(f64),
    NonNumeric(String),
}

impl From<f64> for Probability {
    fn from(v: f64) -> Self {
        Probability::Number(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub driver_code: String,
    pub win_probability: f64,
    pub rank: usize,             // 1-based
    pub display_percent: String, // "0.0" ..= "100.0"
    pub bar_percent: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ranking {
    pub entries: Vec<RankingEntry>,
    pub warnings: Vec<InvalidProbability>,
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Order drivers by win probability, highest first.
///
/// Values outside [0, 1], NaN, infinities and non-numbers become 0.0 and are
/// reported in `Ranking::warnings`. Equal probabilities are ordered by driver
/// code so the result never depends on map iteration order. An empty input is
/// a valid, empty ranking.
pub fn project<I, K, P>(predictions: I) -> Ranking
where
    I: IntoIterator<Item = (K, P)>,
    K: Into<String>,
    P: Into<Probability>,
{
    let mut warnings = Vec::new();
    let mut scored: Vec<(String, f64)> = predictions
        .into_iter()
        .map(|(code, p)| {
            let code: String = code.into();
            let p = match coerce(&code, p.into()) {
                Ok(p) => p,
                Err(warning) => {
                    tracing::warn!(
                        driver = %warning.driver_code,
                        raw = %warning.raw,
                        "invalid win probability, using 0.0"
                    );
                    warnings.push(warning);
                    0.0
                }
            };
            (code, p)
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    let entries = scored
        .into_iter()
        .enumerate()
        .map(|(idx, (driver_code, p))| RankingEntry {
            driver_code,
            win_probability: p,
            rank: idx + 1,
            display_percent: format!("{:.1}", p * 100.0),
            bar_percent: (p * 100.0).round().max(MIN_BAR_PERCENT) as u8,
        })
        .collect();

    Ranking { entries, warnings }
}

fn coerce(code: &str, p: Probability) -> Result<f64, InvalidProbability> {
    match p {
        // `+ 0.0` folds -0.0 into 0.0 so it never prints as "-0.0".
        Probability::Number(v) if v.is_finite() && (0.0..=1.0).contains(&v) => Ok(v + 0.0),
        Probability::Number(v) => Err(InvalidProbability {
            driver_code: code.to_owned(),
            raw: v.to_string(),
        }),
        Probability::NonNumeric(raw) => Err(InvalidProbability {
            driver_code: code.to_owned(),
            raw,
        }),
    }
}

/// The model's answer for one race, shape-checked but not yet ranked.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResponse {
    pub race_id: Option<String>,
    pub predictions: Vec<(String, Probability)>,
    /// Untouched payload for the debug panel.
    pub raw: Value,
}

impl PredictionResponse {
    /// Accepts each driver's value as `{"win_prob": x}`,
    /// `{"winProbability": x}` or a bare number. Anything else is kept as
    /// non-numeric and zeroed during ranking. A missing or non-object
    /// `predictions` field is `MalformedInput`.
    pub fn from_value(value: Value) -> CoreResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| CoreError::malformed("prediction response is not an object"))?;

        let map = match obj.get("predictions") {
            Some(Value::Object(map)) => map,
            Some(_) => return Err(CoreError::malformed("`predictions` is not a mapping")),
            None => return Err(CoreError::malformed("missing `predictions`")),
        };

        let predictions = map
            .iter()
            .map(|(code, v)| (code.clone(), unwrap_probability(v)))
            .collect();
        let race_id = obj
            .get("race_id")
            .and_then(Value::as_str)
            .map(str::to_owned);

        Ok(Self {
            race_id,
            predictions,
            raw: value,
        })
    }

    pub fn ranking(&self) -> Ranking {
        project(self.predictions.iter().cloned())
    }
}

fn unwrap_probability(v: &Value) -> Probability {
    let inner = match v {
        Value::Object(m) => m.get("win_prob").or_else(|| m.get("winProbability")),
        other => Some(other),
    };
    match inner.and_then(Value::as_f64) {
        Some(p) => Probability::Number(p),
        None => Probability::NonNumeric(inner.unwrap_or(v).to_string()),
    }
}
