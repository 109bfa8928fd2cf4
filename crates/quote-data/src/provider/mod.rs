//! 시세 데이터 Provider 모듈.
//!
//! ## 데이터 소스
//! - `QuoteSource`: 종목 묶음의 최신 시세를 조회하는 트레잇
//! - `YahooQuoteSource`: Yahoo Finance 차트 API 기반 구현
//!
//! ## 정규화
//! - `normalize_batch`: 누락 심볼 보충, 전일 종가 대체 정책 적용

pub mod normalize;
pub mod yahoo;

use async_trait::async_trait;
use quote_core::{AssetRecord, Instrument};

use crate::error::Result;

pub use normalize::{normalize_batch, FALLBACK_WARNING, MISSING_PRICE_ERROR, MISSING_SYMBOL_ERROR};
pub use yahoo::YahooQuoteSource;

/// 시세 데이터 소스 트레잇.
///
/// 반환 목록은 입력보다 짧을 수 있으며 (누락 = 실패), 각 레코드는 `error`를 가질 수 있습니다.
/// `Err`는 묶음 전체가 실패했음을 뜻하며 치명적이지 않습니다.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// 종목 묶음의 최신 시세를 조회합니다.
    async fn fetch_batch(&self, instruments: &[Instrument]) -> Result<Vec<AssetRecord>>;

    /// 데이터 소스 이름 (로그용).
    fn name(&self) -> &str;
}
