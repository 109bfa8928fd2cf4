//! 시세 스냅샷 서비스의 에러 타입.
//!
//! 설정 로드와 도메인 검증 단계에서 발생하는 에러를 정의합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 알 수 없는 심볼
    #[error("알 수 없는 심볼: {0}")]
    UnknownSymbol(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type QuoteResult<T> = Result<T, QuoteError>;

impl QuoteError {
    /// 설정 관련 에러인지 확인합니다.
    pub fn is_config(&self) -> bool {
        matches!(self, QuoteError::Config(_))
    }
}

impl From<config::ConfigError> for QuoteError {
    fn from(err: config::ConfigError) -> Self {
        QuoteError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_config() {
        let err = QuoteError::Config("group_size는 0일 수 없습니다".to_string());
        assert!(err.is_config());

        let err = QuoteError::UnknownSymbol("XYZ.IS".to_string());
        assert!(!err.is_config());
    }

    #[test]
    fn test_error_display() {
        let err = QuoteError::InvalidInput("빈 심볼".to_string());
        assert_eq!(err.to_string(), "잘못된 입력: 빈 심볼");
    }
}
