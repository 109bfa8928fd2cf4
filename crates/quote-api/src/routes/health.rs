//! 헬스 체크 endpoint.
//!
//! 로드밸런서나 오케스트레이션 시스템에서 사용됩니다.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// 헬스 체크 응답 구조체.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// 전체 서비스 상태 ("healthy" | "starting" | "unhealthy")
    pub status: String,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// 현재 시간 (ISO 8601)
    pub timestamp: String,

    /// 스냅샷 레코드 수
    pub records: usize,

    /// 마지막 갱신 완료 시각 (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<String>,

    /// 장 상태 ("OPEN" | "CLOSED")
    pub market_regime: String,

    /// 개별 컴포넌트 상태
    pub components: ComponentHealth,
}

/// 개별 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// 스냅샷 저장소
    pub snapshot: ComponentStatus,

    /// 시세 조회 상태
    pub fetcher: ComponentStatus,
}

/// 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// 상태 ("up" | "down")
    pub status: String,

    /// 추가 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    /// 비정상 상태.
    pub fn down(message: impl Into<String>) -> Self {
        Self {
            status: "down".to_string(),
            message: Some(message.into()),
        }
    }

    /// 정보 포함 정상 상태.
    pub fn up_with_info(message: impl Into<String>) -> Self {
        Self {
            status: "up".to_string(),
            message: Some(message.into()),
        }
    }
}

/// 간단한 헬스 체크 (liveness probe용).
///
/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 상세 헬스 체크 (readiness probe용).
///
/// 스냅샷에 레코드가 하나라도 있어야 준비 상태입니다.
/// GET /health/ready
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let now = Utc::now();
    let records = state.context.store.len().await;
    let last_refresh = state.context.store.last_refresh().await;
    let fetching = !state.context.coordinator.is_idle();

    let (overall_status, status_code) = match (records, fetching) {
        (0, true) => ("starting", StatusCode::SERVICE_UNAVAILABLE),
        (0, false) => ("unhealthy", StatusCode::SERVICE_UNAVAILABLE),
        _ => ("healthy", StatusCode::OK),
    };

    let snapshot_status = if records > 0 {
        ComponentStatus::up_with_info(format!(
            "{} / {} records",
            records, state.universe_size
        ))
    } else {
        ComponentStatus::down("스냅샷 비어 있음")
    };

    let fetcher_status = ComponentStatus::up_with_info(format!(
        "{}, generation {}",
        if fetching { "fetching" } else { "idle" },
        state.context.coordinator.generation()
    ));

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: now.to_rfc3339(),
        records,
        last_refresh: last_refresh.map(|ts| ts.to_rfc3339()),
        market_regime: state.clock.regime(now).to_string(),
        components: ComponentHealth {
            snapshot: snapshot_status,
            fetcher: fetcher_status,
        },
    };

    (status_code, Json(response))
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
