//! Render-ready transforms for the GridPlay dashboard: lap-time series with
//! chart geometry, and win-probability rankings.

pub mod chart;
pub mod contracts;
pub mod error;
pub mod ranking;
pub mod request;
pub mod telemetry;

pub use chart::{ChartGeometry, ChartLayout, LinearScale, Margin, Tick};
pub use contracts::{BattleEcho, DriverSummary, RaceSummary};
pub use error::{CoreError, CoreResult, InvalidProbability};
pub use ranking::{project, PredictionResponse, Probability, Ranking, RankingEntry};
pub use request::{Completion, RequestSlot, RequestState, RequestToken};
pub use telemetry::{build, LapRecord, TelemetryResponse, TelemetrySeries};
