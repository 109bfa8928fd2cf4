//! API 에러 응답 타입.
//!
//! 모든 엔드포인트가 같은 JSON 에러 형식을 사용합니다.
//!
//! ```json
//! {
//!   "code": "WARMING_UP",
//!   "message": "첫 시세 조회가 아직 진행 중입니다",
//!   "timestamp": 1738300800
//! }
//! ```

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 통합 API 에러 응답.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "WARMING_UP", "NOT_READY")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }

    /// 상태 코드와 함께 핸들러 에러로 변환합니다.
    pub fn into_error<T>(self, status: StatusCode) -> ApiResult<T> {
        Err((status, Json(self)))
    }
}

/// 핸들러 결과 타입.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization_skips_empty_details() {
        let error = ApiErrorResponse::new("NOT_READY", "준비되지 않음");
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["code"], "NOT_READY");
        assert!(json.get("details").is_none());
        assert!(json["timestamp"].is_i64());
    }

    #[test]
    fn test_with_details() {
        let error = ApiErrorResponse::with_details(
            "WARMING_UP",
            "대기 시간 초과",
            serde_json::json!({ "waitSecs": 60 }),
        );
        assert_eq!(error.details.unwrap()["waitSecs"], 60);
    }

    #[test]
    fn test_into_error_keeps_status() {
        let result: ApiResult<()> =
            ApiErrorResponse::new("FETCH_FAILED", "실패").into_error(StatusCode::INTERNAL_SERVER_ERROR);
        let (status, Json(body)) = result.unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "FETCH_FAILED");
    }
}
