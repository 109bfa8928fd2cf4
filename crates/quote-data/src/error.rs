//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터 소스 연결 오류
    #[error("Data source connection error: {0}")]
    ConnectionError(String),

    /// 데이터 가져오기 오류 (외부 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 갱신 사이클 실패 (병합된 그룹 없음)
    #[error("Refresh failed: {0}")]
    RefreshFailed(String),
}

impl DataError {
    /// 재시도로 해결될 수 있는 오류인지 확인합니다.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DataError::ConnectionError(_) | DataError::FetchError(_) | DataError::RefreshFailed(_)
        )
    }
}

impl From<quote_core::QuoteError> for DataError {
    fn from(err: quote_core::QuoteError) -> Self {
        DataError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
