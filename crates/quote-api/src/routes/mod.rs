//! API 라우트.
//!
//! - `/health`: 헬스 체크
//! - `/api/bist100`: 지수 시세 및 스냅샷
//! - `/api/market`: 장 상태

pub mod health;
pub mod market;
pub mod snapshot;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub use health::health_router;
pub use market::market_router;
pub use snapshot::snapshot_router;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/bist100", snapshot_router())
        .nest("/api/market", market_router())
}
