use axum::{extract::State, http::StatusCode, Json};
use gridplay_core::{
    ChartGeometry, ChartLayout, CoreError, InvalidProbability, PredictionResponse, RankingEntry,
    TelemetryResponse, TelemetrySeries,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub chart: Arc<ChartLayout>,
}

type ApiError = (StatusCode, Json<Value>);

fn reject(err: CoreError) -> ApiError {
    let status = match err {
        CoreError::EmptySeries => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::MalformedInput(_) => StatusCode::BAD_REQUEST,
    };
    tracing::info!(kind = err.kind(), "rejecting payload: {}", err);
    (
        status,
        Json(json!({ "kind": err.kind(), "error": err.to_string() })),
    )
}

// ---------- Response types ----------

#[derive(Serialize)]
pub struct SeriesOut {
    series: TelemetrySeries,
    chart: ChartGeometry,
    tyres: Vec<String>,
}

#[derive(Serialize)]
pub struct RankingOut {
    ranking: Vec<RankingEntry>,
    warnings: Vec<InvalidProbability>,
    raw: Value,
}

// ---------- Handlers ----------

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

pub async fn telemetry_series(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<SeriesOut>, ApiError> {
    let resp = TelemetryResponse::from_value(&payload).map_err(reject)?;
    let series = resp.series().map_err(reject)?;
    let chart = state.chart.project(&series);

    tracing::info!(
        laps = series.len(),
        dropped = resp.dropped_laps,
        "telemetry series built"
    );
    Ok(Json(SeriesOut {
        series,
        chart,
        tyres: resp.tyres,
    }))
}

pub async fn prediction_ranking(
    Json(payload): Json<Value>,
) -> Result<Json<RankingOut>, ApiError> {
    let resp = PredictionResponse::from_value(payload).map_err(reject)?;
    let ranking = resp.ranking();

    tracing::info!(
        race = resp.race_id.as_deref().unwrap_or("-"),
        drivers = ranking.len(),
        warnings = ranking.warnings.len(),
        "ranking projected"
    );
    Ok(Json(RankingOut {
        ranking: ranking.entries,
        warnings: ranking.warnings,
        raw: resp.raw,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> State<AppState> {
        State(AppState {
            chart: Arc::new(ChartLayout::default()),
        })
    }

    #[tokio::test]
    async fn test_series_ok() {
        let body = json!({
            "laps": [{"lap": 1, "time": 91.2}, {"lap": 2, "time": 90.8}, {"lap": 3, "time": 95.5}],
            "tyres": ["SOFT"]
        });
        let Json(out) = telemetry_series(state(), Json(body)).await.unwrap();
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["series"]["xDomain"], json!([1, 3]));
        assert_eq!(v["chart"]["points"].as_array().unwrap().len(), 3);
        assert_eq!(v["tyres"], json!(["SOFT"]));
    }

    #[tokio::test]
    async fn test_series_empty_is_422() {
        let err = telemetry_series(state(), Json(json!({"laps": []})))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.1 .0["kind"], "empty_series");
    }

    #[tokio::test]
    async fn test_series_missing_laps_is_400() {
        let err = telemetry_series(state(), Json(json!({"error": "sample telemetry unavailable"})))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(err.1 .0["kind"], "malformed_input");
    }

    #[tokio::test]
    async fn test_ranking_ok_with_warning() {
        let body = json!({
            "race_id": "2023-01-bahrain",
            "predictions": {"VER": {"win_prob": 0.62}, "LEC": {"win_prob": 1.4}}
        });
        let Json(out) = prediction_ranking(Json(body.clone())).await.unwrap();
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["ranking"][0]["driverCode"], "VER");
        assert_eq!(v["ranking"][0]["displayPercent"], "62.0");
        assert_eq!(v["ranking"][1]["displayPercent"], "0.0");
        assert_eq!(v["warnings"][0]["driver_code"], "LEC");
        assert_eq!(v["raw"], body);
    }

    #[tokio::test]
    async fn test_ranking_empty_mapping() {
        let Json(out) = prediction_ranking(Json(json!({"predictions": {}}))).await.unwrap();
        assert!(out.ranking.is_empty());
    }

    #[tokio::test]
    async fn test_ranking_missing_predictions_is_400() {
        let err = prediction_ranking(Json(json!({"race_id": "x"}))).await.err().unwrap();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
