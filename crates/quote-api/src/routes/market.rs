//! 시장 상태 endpoint.
//!
//! - `GET /api/market/status` - 거래소 장 상태 및 현지 시각

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quote_data::{MarketClock, MarketRegime};

use crate::state::AppState;

/// 시장 상태 응답.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStatusResponse {
    /// 시장 코드
    pub market: String,
    /// 시장 개장 여부
    pub is_open: bool,
    /// "OPEN" | "CLOSED"
    pub regime: String,
    /// IANA 타임존
    pub timezone: String,
    /// 거래소 현지 시각 (ISO 8601)
    pub local_time: String,
    /// 개장 시각 (HH:MM)
    pub opens_at: String,
    /// 마감 시각 (HH:MM)
    pub closes_at: String,
}

impl MarketStatusResponse {
    fn at(clock: &MarketClock, now: DateTime<Utc>) -> Self {
        let regime = clock.regime(now);
        Self {
            market: "BIST".to_string(),
            is_open: regime == MarketRegime::Open,
            regime: regime.to_string(),
            timezone: clock.timezone().name().to_string(),
            local_time: clock.local_time(now).to_rfc3339(),
            opens_at: clock.open_time().format("%H:%M").to_string(),
            closes_at: clock.close_time().format("%H:%M").to_string(),
        }
    }
}

/// 시장 상태 조회.
///
/// GET /api/market/status
pub async fn get_market_status(State(state): State<Arc<AppState>>) -> Json<MarketStatusResponse> {
    Json(MarketStatusResponse::at(&state.clock, Utc::now()))
}

/// 시장 라우터 생성.
pub fn market_router() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(get_market_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_during_session() {
        // 2024-03-04 (월) 12:00 Istanbul
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        let status = MarketStatusResponse::at(&MarketClock::default(), now);

        assert!(status.is_open);
        assert_eq!(status.regime, "OPEN");
        assert_eq!(status.timezone, "Europe/Istanbul");
        assert!(status.local_time.starts_with("2024-03-04T12:00:00"));
        assert_eq!(status.opens_at, "10:00");
        assert_eq!(status.closes_at, "18:10");
    }

    #[test]
    fn test_status_on_weekend() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 9, 0, 0).unwrap();
        let status = MarketStatusResponse::at(&MarketClock::default(), now);

        assert!(!status.is_open);
        assert_eq!(status.regime, "CLOSED");
    }

    #[test]
    fn test_status_serializes_camel_case() {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        let json = serde_json::to_value(MarketStatusResponse::at(&MarketClock::default(), now))
            .unwrap();
        assert_eq!(json["isOpen"], true);
        assert!(json.get("localTime").is_some());
    }
}
