//! Yahoo Finance 기반 시세 데이터 소스.
//!
//! 심볼별로 최근 5일 일봉을 조회해 마지막 캔들을 현재 시세로,
//! 직전 캔들의 종가를 전일 종가로 사용합니다.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use quote_core::{AssetRecord, Instrument};
use rust_decimal::Decimal;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use super::QuoteSource;
use crate::error::{DataError, Result};

/// 심볼 단위 조회 실패.
enum SymbolFailure {
    /// 요청 자체가 실패 (네트워크, HTTP 상태)
    Transport(String),
    /// 응답은 받았으나 사용할 수 없음
    Data(String),
}

/// Yahoo Finance 시세 데이터 소스.
pub struct YahooQuoteSource {
    connector: yahoo::YahooConnector,
}

impl YahooQuoteSource {
    /// 새 데이터 소스를 생성합니다.
    pub fn new() -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| DataError::ConnectionError(format!("{}", e)))?;

        Ok(Self { connector })
    }

    async fn fetch_one(&self, instrument: &Instrument) -> std::result::Result<AssetRecord, SymbolFailure> {
        let symbol = instrument.symbol.as_str();

        // 주말/휴일을 고려하여 5일 범위 조회
        let response = self
            .connector
            .get_quote_range(symbol, "1d", "5d")
            .await
            .map_err(|e| SymbolFailure::Transport(format!("{}", e)))?;

        let quotes = response
            .quotes()
            .map_err(|e| SymbolFailure::Data(format!("{}", e)))?;

        let Some(latest) = quotes.last() else {
            return Err(SymbolFailure::Data("데이터 없음".to_string()));
        };

        let as_of = timestamp_to_utc(latest.timestamp as i64);
        let mut record = AssetRecord::for_instrument(instrument, as_of);
        record.price = to_price(latest.close);
        record.open = to_price(latest.open);
        record.high = to_price(latest.high);
        record.low = to_price(latest.low);
        record.volume = Some(Decimal::from(latest.volume));

        if quotes.len() >= 2 {
            record.previous_close = to_price(quotes[quotes.len() - 2].close);
        }

        debug!(symbol, candles = quotes.len(), price = ?record.price, "시세 수신");
        Ok(record)
    }
}

#[async_trait]
impl QuoteSource for YahooQuoteSource {
    async fn fetch_batch(&self, instruments: &[Instrument]) -> Result<Vec<AssetRecord>> {
        let mut records = Vec::with_capacity(instruments.len());
        let mut transport_failures = 0usize;
        let mut last_transport_error = None;

        // 순차 조회 (요청 제한 회피)
        for instrument in instruments {
            match self.fetch_one(instrument).await {
                Ok(record) => records.push(record),
                Err(SymbolFailure::Transport(message)) => {
                    warn!(symbol = %instrument.symbol, error = %message, "시세 요청 실패");
                    transport_failures += 1;
                    records.push(AssetRecord::failed(instrument, message.clone(), Utc::now()));
                    last_transport_error = Some(message);
                }
                Err(SymbolFailure::Data(message)) => {
                    warn!(symbol = %instrument.symbol, error = %message, "시세 데이터 사용 불가");
                    records.push(AssetRecord::failed(instrument, message, Utc::now()));
                }
            }
        }

        if !instruments.is_empty() && transport_failures == instruments.len() {
            return Err(DataError::FetchError(format!(
                "{}개 심볼 전체 요청 실패: {}",
                transport_failures,
                last_transport_error.unwrap_or_default()
            )));
        }

        Ok(records)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

/// 유효한 가격만 Decimal로 변환합니다 (유한하고 0보다 큰 값).
fn to_price(value: f64) -> Option<Decimal> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Decimal::from_f64_retain(value)
}

fn timestamp_to_utc(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_price_rejects_invalid_values() {
        assert!(to_price(f64::NAN).is_none());
        assert!(to_price(f64::INFINITY).is_none());
        assert!(to_price(0.0).is_none());
        assert!(to_price(-1.5).is_none());
        assert!(to_price(32.5).is_some());
    }

    #[test]
    fn test_timestamp_to_utc() {
        let ts = timestamp_to_utc(1_709_542_800);
        assert_eq!(ts.to_rfc3339(), "2024-03-04T09:00:00+00:00");
    }
}
