//! 시세 스냅샷 REST API.
//!
//! 스냅샷 조회, 지수 시세, 장 상태, 헬스 체크 엔드포인트를 제공합니다.

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiErrorResponse, ApiResult};
pub use routes::create_api_router;
pub use state::AppState;
