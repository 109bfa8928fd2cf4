//! 스냅샷 조회 endpoint.
//!
//! # 엔드포인트
//!
//! - `GET /api/bist100` - 벤치마크 지수 시세
//! - `GET /api/bist100/companies` - 전체 스냅샷 (종목, 환율, 원자재, 파생 자산)

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use quote_core::AssetRecord;
use quote_data::{MarketRegime, SnapshotStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

// ==================== 응답 타입 ====================

/// 지수 시세 응답.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexQuoteResponse {
    pub symbol: String,
    pub short_name: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub regular_market_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub regular_market_open: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub regular_market_day_high: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub regular_market_day_low: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub regular_market_previous_close: Option<Decimal>,
    /// "REGULAR" | "CLOSED"
    pub market_state: String,
    pub as_of: DateTime<Utc>,
    /// 마지막 조회 실패 사유 (값은 이전 조회에서 유지됨)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IndexQuoteResponse {
    fn from_record(record: AssetRecord, regime: MarketRegime) -> Self {
        let market_state = match regime {
            MarketRegime::Open => "REGULAR",
            MarketRegime::Closed => "CLOSED",
        };

        Self {
            symbol: record.symbol,
            short_name: record.name,
            regular_market_price: record.price,
            regular_market_open: record.open,
            regular_market_day_high: record.high,
            regular_market_day_low: record.low,
            regular_market_previous_close: record.previous_close,
            market_state: market_state.to_string(),
            as_of: record.as_of,
            error: record.error,
        }
    }
}

// ==================== Handler ====================

/// 벤치마크 지수 시세 조회.
///
/// GET /api/bist100
///
/// 스냅샷에 있는 지수 레코드를 반환하며 조회 완료를 기다리지 않습니다.
pub async fn get_index_quote(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<IndexQuoteResponse>> {
    let Some(symbol) = state.index_symbol.as_deref() else {
        return ApiErrorResponse::new("INDEX_NOT_CONFIGURED", "유니버스에 지수가 없습니다")
            .into_error(StatusCode::NOT_FOUND);
    };

    let Some(record) = state.context.store.get(symbol).await else {
        return ApiErrorResponse::with_details(
            "NOT_READY",
            "지수 시세가 아직 조회되지 않았습니다",
            json!({ "symbol": symbol }),
        )
        .into_error(StatusCode::SERVICE_UNAVAILABLE);
    };

    if record.price.is_none() {
        warn!(symbol, error = ?record.error, "지수 현재가 없음");
        return ApiErrorResponse::with_details(
            "FETCH_FAILED",
            "지수 시세 조회 실패",
            json!({ "symbol": symbol, "error": record.error }),
        )
        .into_error(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let regime = state.clock.regime(Utc::now());
    Ok(Json(IndexQuoteResponse::from_record(record, regime)))
}

/// 전체 스냅샷 조회.
///
/// GET /api/bist100/companies
///
/// - 200: 레코드 목록 (심볼 순)
/// - 504 `WARMING_UP`: 첫 조회 대기 시간 초과
/// - 503 `NOT_READY`: 비어 있고 진행 중인 조회 없음
/// - 500 `FETCH_FAILED`: 조회가 끝났지만 레코드가 없음
pub async fn get_companies(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<AssetRecord>>> {
    let view = state.reader.get_snapshot().await;

    match view.status {
        SnapshotStatus::Serving if !view.records.is_empty() => {
            debug!(
                count = view.records.len(),
                last_refresh = ?view.last_refresh,
                "스냅샷 제공"
            );
            Ok(Json(view.records))
        }
        SnapshotStatus::Serving => {
            ApiErrorResponse::new("FETCH_FAILED", "시세 조회가 끝났지만 데이터가 없습니다")
                .into_error(StatusCode::INTERNAL_SERVER_ERROR)
        }
        SnapshotStatus::WarmingUp => {
            ApiErrorResponse::new("WARMING_UP", "첫 시세 조회가 아직 진행 중입니다")
                .into_error(StatusCode::GATEWAY_TIMEOUT)
        }
        SnapshotStatus::NotReady => {
            ApiErrorResponse::new("NOT_READY", "시세 데이터가 아직 준비되지 않았습니다")
                .into_error(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// 스냅샷 라우터 생성.
pub fn snapshot_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_index_quote))
        .route("/companies", get(get_companies))
}
