use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};

/// Lower/upper multipliers applied to the lap-time extent so a pit-stop lap
/// never sits on the chart border.
const Y_PAD_LOW: f64 = 0.99;
const Y_PAD_HIGH: f64 = 1.01;

/// One timed lap for one driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LapRecord {
    pub lap: u32,  // 1-based
    pub time: f64, // seconds
}

/// Chart-ready form of a driver's laps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySeries {
    /// (lap, time) in input order.
    pub points: Vec<(u32, f64)>,
    pub x_domain: (u32, u32),
    pub y_domain: (f64, f64),
}

impl TelemetrySeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Build the plotted series for a driver's laps.
///
/// Points keep the caller's order; ascending laps are the backend's contract
/// and are not re-sorted here. Fails with `EmptySeries` on no laps and
/// `MalformedInput` on a lap numbered 0 or a time that is not a positive
/// finite number.
pub fn build(laps: &[LapRecord]) -> CoreResult<TelemetrySeries> {
    let first = laps.first().ok_or(CoreError::EmptySeries)?;

    let mut lap_min = first.lap;
    let mut lap_max = first.lap;
    let mut time_min = first.time;
    let mut time_max = first.time;

    for rec in laps {
        if rec.lap == 0 {
            return Err(CoreError::malformed("lap numbers start at 1"));
        }
        if !(rec.time.is_finite() && rec.time > 0.0) {
            return Err(CoreError::malformed(format!(
                "lap {} has invalid time {}",
                rec.lap, rec.time
            )));
        }
        lap_min = lap_min.min(rec.lap);
        lap_max = lap_max.max(rec.lap);
        time_min = time_min.min(rec.time);
        time_max = time_max.max(rec.time);
    }

    // Padding is multiplicative, so a flat series still gets a non-zero height.
    let series = TelemetrySeries {
        points: laps.iter().map(|r| (r.lap, r.time)).collect(),
        x_domain: (lap_min, lap_max),
        y_domain: (time_min * Y_PAD_LOW, time_max * Y_PAD_HIGH),
    };
    tracing::debug!(
        points = series.len(),
        x_min = lap_min,
        x_max = lap_max,
        "built telemetry series"
    );
    Ok(series)
}

/// Telemetry payload for one race + driver, as received from the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryResponse {
    pub laps: Vec<LapRecord>,
    pub tyres: Vec<String>,
    /// Laps present in the payload without a usable time (in/out laps).
    #[serde(skip)]
    pub dropped_laps: usize,
}

impl TelemetryResponse {
    /// Validate the shape of an already-decoded payload.
    ///
    /// `laps` must be an array whose entries each carry a lap number >= 1.
    /// Entries whose `time` is null or not positive are skipped. `tyres` is
    /// optional and passed through as-is.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| CoreError::malformed("telemetry response is not an object"))?;

        let raw_laps = match obj.get("laps") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(CoreError::malformed("`laps` is not an array")),
            None => return Err(CoreError::malformed("missing `laps`")),
        };

        let mut laps = Vec::with_capacity(raw_laps.len());
        let mut dropped_laps = 0;
        for (idx, item) in raw_laps.iter().enumerate() {
            let lap = item
                .get("lap")
                .and_then(Value::as_u64)
                .filter(|n| *n >= 1)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| {
                    CoreError::malformed(format!("laps[{idx}] has no valid lap number"))
                })?;

            match item
                .get("time")
                .and_then(Value::as_f64)
                .filter(|t| t.is_finite() && *t > 0.0)
            {
                Some(time) => laps.push(LapRecord { lap, time }),
                None => {
                    tracing::debug!(lap, "dropping lap without a usable time");
                    dropped_laps += 1;
                }
            }
        }

        let tyres = match obj.get("tyres") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|t| {
                    t.as_str()
                        .map(str::to_owned)
                        .ok_or_else(|| CoreError::malformed("`tyres` must hold strings"))
                })
                .collect::<CoreResult<Vec<_>>>()?,
            Some(_) => return Err(CoreError::malformed("`tyres` is not an array")),
        };

        Ok(Self {
            laps,
            tyres,
            dropped_laps,
        })
    }

    pub fn series(&self) -> CoreResult<TelemetrySeries> {
        build(&self.laps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn laps(raw: &[(u32, f64)]) -> Vec<LapRecord> {
        raw.iter()
            .map(|&(lap, time)| LapRecord { lap, time })
            .collect()
    }

    #[test]
    fn test_domains_for_three_laps() {
        let s = build(&laps(&[(1, 91.2), (2, 90.8), (3, 95.5)])).unwrap();
        assert_eq!(s.x_domain, (1, 3));
        assert!((s.y_domain.0 - 89.892).abs() < 1e-9);
        assert!((s.y_domain.1 - 96.455).abs() < 1e-9);
        assert_eq!(s.points, vec![(1, 91.2), (2, 90.8), (3, 95.5)]);
    }

    #[test]
    fn test_empty_is_error() {
        assert_eq!(build(&[]), Err(CoreError::EmptySeries));
    }

    #[test]
    fn test_flat_series_has_height() {
        let s = build(&laps(&[(4, 80.0), (5, 80.0)])).unwrap();
        assert!(s.y_domain.1 - s.y_domain.0 > 1.0);
        assert!(s.y_domain.0 < 80.0 && s.y_domain.1 > 80.0);
    }

    #[test]
    fn test_input_order_kept() {
        let s = build(&laps(&[(3, 90.0), (1, 91.0), (2, 92.0)])).unwrap();
        assert_eq!(s.points[0], (3, 90.0));
        assert_eq!(s.x_domain, (1, 3));
    }

    #[test]
    fn test_invalid_records_rejected() {
        assert!(matches!(
            build(&laps(&[(0, 90.0)])),
            Err(CoreError::MalformedInput(_))
        ));
        assert!(matches!(
            build(&laps(&[(1, 90.0), (2, -1.0)])),
            Err(CoreError::MalformedInput(_))
        ));
        assert!(matches!(
            build(&laps(&[(1, f64::NAN)])),
            Err(CoreError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_response_drops_untimed_laps() {
        let v = json!({
            "laps": [
                {"lap": 1, "time": null, "speed": null, "sector": []},
                {"lap": 2, "time": 92.4, "speed": 201.3, "sector": [30.1, 31.0, 31.3]},
                {"lap": 3, "time": 91.9}
            ],
            "tyres": ["SOFT", "SOFT", "MEDIUM"]
        });
        let resp = TelemetryResponse::from_value(&v).unwrap();
        assert_eq!(resp.laps.len(), 2);
        assert_eq!(resp.dropped_laps, 1);
        assert_eq!(resp.tyres, vec!["SOFT", "SOFT", "MEDIUM"]);
        assert_eq!(resp.series().unwrap().x_domain, (2, 3));
    }

    #[test]
    fn test_response_shape_errors() {
        let missing = TelemetryResponse::from_value(&json!({"tyres": []}));
        assert!(matches!(missing, Err(CoreError::MalformedInput(_))));

        let not_array = TelemetryResponse::from_value(&json!({"laps": {"1": 90.0}}));
        assert!(matches!(not_array, Err(CoreError::MalformedInput(_))));

        let bad_lap = TelemetryResponse::from_value(&json!({"laps": [{"lap": 0, "time": 90.0}]}));
        assert!(matches!(bad_lap, Err(CoreError::MalformedInput(_))));

        // Backend error object from the sample fallback.
        let err_obj = TelemetryResponse::from_value(&json!({"error": "sample telemetry unavailable"}));
        assert!(matches!(err_obj, Err(CoreError::MalformedInput(_))));
    }

    #[test]
    fn test_all_laps_untimed_is_empty_series() {
        let v = json!({"laps": [{"lap": 1, "time": null}], "tyres": ["unknown"]});
        let resp = TelemetryResponse::from_value(&v).unwrap();
        assert_eq!(resp.series(), Err(CoreError::EmptySeries));
    }

    #[test]
    fn test_tyres_optional() {
        let resp = TelemetryResponse::from_value(&json!({"laps": []})).unwrap();
        assert!(resp.tyres.is_empty());
        assert_eq!(resp.series(), Err(CoreError::EmptySeries));
    }
}
