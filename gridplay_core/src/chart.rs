//! Pixel geometry for the lap-time chart.
//!
//! The renderer only draws what `ChartLayout::project` returns, so redrawing
//! the same series is idempotent.

use serde::{Deserialize, Serialize};

use crate::telemetry::TelemetrySeries;

const DEFAULT_Y_TICKS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            left: 30.0,
            right: 10.0,
            top: 10.0,
            bottom: 30.0,
        }
    }
}

/// Size of the drawing area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 700.0,
            height: 200.0,
            margin: Margin::default(),
        }
    }
}

/// Maps a continuous domain onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// A zero-width domain maps everything to the middle of the range.
    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return (r0 + r1) / 2.0;
        }
        r0 + (v - d0) / span * (r1 - r0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    pub offset: f64, // pixel position along the axis
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartGeometry {
    pub width: f64,
    pub height: f64,
    pub points: Vec<(f64, f64)>,
    /// SVG path data for the lap-time line.
    pub path: String,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
}

impl ChartLayout {
    pub fn x_scale(&self, series: &TelemetrySeries) -> LinearScale {
        let (lo, hi) = series.x_domain;
        LinearScale::new(
            (lo as f64, hi as f64),
            (self.margin.left, self.width - self.margin.right),
        )
    }

    /// Inverted: the bottom of the plot area is the domain minimum.
    pub fn y_scale(&self, series: &TelemetrySeries) -> LinearScale {
        LinearScale::new(
            series.y_domain,
            (self.height - self.margin.bottom, self.margin.top),
        )
    }

    pub fn project(&self, series: &TelemetrySeries) -> ChartGeometry {
        let x = self.x_scale(series);
        let y = self.y_scale(series);

        let points: Vec<(f64, f64)> = series
            .points
            .iter()
            .map(|&(lap, time)| (x.apply(lap as f64), y.apply(time)))
            .collect();

        let mut path = String::with_capacity(points.len() * 16);
        for (i, (px, py)) in points.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            path.push_str(&format!("{cmd}{px:.2},{py:.2}"));
        }

        // One tick per point was requested; only whole laps get a label.
        let (x_values, _) = tick_spec(x.domain.0, x.domain.1, series.len());
        let x_ticks = x_values
            .into_iter()
            .filter(|v| v.fract() == 0.0)
            .map(|v| Tick {
                value: v,
                offset: x.apply(v),
                label: format!("{}", v as i64),
            })
            .collect();

        let (y_values, step) = tick_spec(y.domain.0, y.domain.1, DEFAULT_Y_TICKS);
        let precision = label_precision(step);
        let y_ticks = y_values
            .into_iter()
            .map(|v| Tick {
                value: v,
                offset: y.apply(v),
                label: format!("{v:.precision$}"),
            })
            .collect();

        ChartGeometry {
            width: self.width,
            height: self.height,
            points,
            path,
            x_ticks,
            y_ticks,
        }
    }
}

/// Roughly `count` evenly spaced values inside `[start, stop]`, on steps of
/// 1, 2 or 5 times a power of ten.
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    tick_spec(start, stop, count).0
}

fn tick_spec(start: f64, stop: f64, count: usize) -> (Vec<f64>, f64) {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return (Vec::new(), 0.0);
    }
    if start == stop {
        return (vec![start], 0.0);
    }
    let (lo, hi) = if start < stop { (start, stop) } else { (stop, start) };

    let raw_step = (hi - lo) / count as f64;
    let power = raw_step.log10().floor();
    let error = raw_step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    // Negative powers divide by an integer inverse to keep values like 0.3 exact.
    if power < 0.0 {
        let inv = 10f64.powf(-power) / factor;
        let mut i1 = (lo * inv).round();
        let mut i2 = (hi * inv).round();
        if i1 / inv < lo {
            i1 += 1.0;
        }
        if i2 / inv > hi {
            i2 -= 1.0;
        }
        let values = (i1 as i64..=i2 as i64).map(|i| i as f64 / inv).collect();
        (values, 1.0 / inv)
    } else {
        let inc = 10f64.powf(power) * factor;
        let mut i1 = (lo / inc).round();
        let mut i2 = (hi / inc).round();
        if i1 * inc < lo {
            i1 += 1.0;
        }
        if i2 * inc > hi {
            i2 -= 1.0;
        }
        let values = (i1 as i64..=i2 as i64).map(|i| i as f64 * inc).collect();
        (values, inc)
    }
}

fn label_precision(step: f64) -> usize {
    if step <= 0.0 || !step.is_finite() {
        return 0;
    }
    // Round first so 0.1 stored as 0.0999.. still reads as one decimal.
    let exp = (step.log10() * 1e6).round() / 1e6;
    (-exp.floor()).max(0.0) as usize
}
