//! 자산 시세 레코드.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Instrument;

/// 자산 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// 주식
    #[default]
    Equity,
    /// 통화쌍 (예: USDTRY=X)
    CurrencyPair,
    /// 원자재 현물/선물 (예: GC=F)
    CommoditySpot,
    /// 다른 시세에서 계산된 파생 자산 (예: 그램 금)
    CommodityDerived,
    /// 벤치마크 지수
    Index,
}

impl AssetKind {
    /// 주식인지 확인합니다.
    pub fn is_equity(&self) -> bool {
        matches!(self, AssetKind::Equity)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetKind::Equity => "equity",
            AssetKind::CurrencyPair => "currency_pair",
            AssetKind::CommoditySpot => "commodity_spot",
            AssetKind::CommodityDerived => "commodity_derived",
            AssetKind::Index => "index",
        };
        write!(f, "{}", s)
    }
}

/// 단일 심볼의 최신 시세.
///
/// `error`가 설정된 레코드도 스냅샷에서 제거되지 않으며,
/// 숫자 필드는 이전 값이거나 비어 있을 수 있습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    /// 심볼 (스냅샷의 키)
    pub symbol: String,
    /// 자산 유형
    pub kind: AssetKind,
    /// 표시 이름
    #[serde(default)]
    pub name: Option<String>,
    /// 업종
    #[serde(default)]
    pub sector: Option<String>,
    /// 현재가
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    /// 전일 종가
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub previous_close: Option<Decimal>,
    /// 시가
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub open: Option<Decimal>,
    /// 고가
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub high: Option<Decimal>,
    /// 저가
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub low: Option<Decimal>,
    /// 거래량
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub volume: Option<Decimal>,
    /// 관측 시각
    pub as_of: DateTime<Utc>,
    /// 조회 실패 사유
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 전일 종가 대체 등 주의 사항
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl AssetRecord {
    /// 숫자 필드가 비어 있는 레코드를 생성합니다.
    pub fn new(symbol: impl Into<String>, kind: AssetKind, as_of: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            kind,
            name: None,
            sector: None,
            price: None,
            previous_close: None,
            open: None,
            high: None,
            low: None,
            volume: None,
            as_of,
            error: None,
            warning: None,
        }
    }

    /// 종목 정의의 메타데이터로 빈 레코드를 생성합니다.
    pub fn for_instrument(instrument: &Instrument, as_of: DateTime<Utc>) -> Self {
        let mut record = Self::new(instrument.symbol.clone(), instrument.kind, as_of);
        record.name = instrument.name.clone();
        record.sector = instrument.sector.clone();
        record
    }

    /// 조회 실패 레코드를 생성합니다.
    pub fn failed(
        instrument: &Instrument,
        error: impl Into<String>,
        as_of: DateTime<Utc>,
    ) -> Self {
        Self::for_instrument(instrument, as_of).with_error(error)
    }

    /// 현재가를 설정합니다.
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    /// 전일 종가를 설정합니다.
    pub fn with_previous_close(mut self, previous_close: Decimal) -> Self {
        self.previous_close = Some(previous_close);
        self
    }

    /// 에러를 설정합니다.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// 에러가 없고 현재가가 있는지 확인합니다.
    pub fn is_usable(&self) -> bool {
        self.error.is_none() && self.price.is_some()
    }

    /// 에러 레코드에 이전 레코드의 숫자 필드를 이어받습니다.
    ///
    /// 에러가 없는 레코드는 변경하지 않습니다. 비어 있는 필드만 채웁니다.
    pub fn carry_forward_from(&mut self, previous: &AssetRecord) {
        if self.error.is_none() {
            return;
        }

        self.price = self.price.or(previous.price);
        self.previous_close = self.previous_close.or(previous.previous_close);
        self.open = self.open.or(previous.open);
        self.high = self.high.or(previous.high);
        self.low = self.low.or(previous.low);
        self.volume = self.volume.or(previous.volume);

        if self.name.is_none() {
            self.name = previous.name.clone();
        }
        if self.sector.is_none() {
            self.sector = previous.sector.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-04T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_carry_forward_fills_missing_fields() {
        let previous = AssetRecord::new("GARAN.IS", AssetKind::Equity, ts())
            .with_price(dec!(101.5))
            .with_previous_close(dec!(100));

        let mut failed = AssetRecord::new("GARAN.IS", AssetKind::Equity, ts())
            .with_error("HTTP 429");
        failed.carry_forward_from(&previous);

        assert_eq!(failed.price, Some(dec!(101.5)));
        assert_eq!(failed.previous_close, Some(dec!(100)));
        assert_eq!(failed.error.as_deref(), Some("HTTP 429"));
    }

    #[test]
    fn test_carry_forward_ignored_without_error() {
        let previous = AssetRecord::new("GARAN.IS", AssetKind::Equity, ts()).with_price(dec!(1));
        let mut fresh = AssetRecord::new("GARAN.IS", AssetKind::Equity, ts());
        fresh.carry_forward_from(&previous);
        assert_eq!(fresh.price, None);
    }

    #[test]
    fn test_serializes_camel_case_with_float_decimals() {
        let record = AssetRecord::new("USDTRY=X", AssetKind::CurrencyPair, ts())
            .with_price(dec!(32.15))
            .with_previous_close(dec!(32.0));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["symbol"], "USDTRY=X");
        assert_eq!(json["kind"], "currency_pair");
        assert_eq!(json["price"], 32.15);
        assert_eq!(json["previousClose"], 32.0);
        assert!(json["open"].is_null());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(AssetKind::CommodityDerived.to_string(), "commodity_derived");
        assert!(AssetKind::Equity.is_equity());
        assert!(!AssetKind::Index.is_equity());
    }
}
