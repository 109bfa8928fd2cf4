//! 데이터 소스 응답 정규화.
//!
//! 요청한 종목마다 정확히 하나의 레코드가 나오도록 보정합니다.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use quote_core::{AssetRecord, Instrument, PriceFallback};
use tracing::debug;

/// 응답에 빠진 심볼의 에러 메시지.
pub const MISSING_SYMBOL_ERROR: &str = "데이터 소스 응답에 심볼 없음";

/// 현재가가 없는 레코드의 에러 메시지.
pub const MISSING_PRICE_ERROR: &str = "현재가 없음";

/// 전일 종가로 대체한 레코드의 경고 메시지.
pub const FALLBACK_WARNING: &str = "현재가 없음: 전일 종가로 대체";

/// 데이터 소스 응답을 종목 순서대로 정규화합니다.
///
/// - 응답에 없는 종목은 에러 레코드로 채웁니다.
/// - 요청하지 않은 심볼은 버립니다.
/// - 현재가가 없으면 `fallback` 정책에 따라 전일 종가로 대체하거나 에러로 표시합니다.
pub fn normalize_batch(
    instruments: &[Instrument],
    fetched: Vec<AssetRecord>,
    fallback: PriceFallback,
    now: DateTime<Utc>,
) -> Vec<AssetRecord> {
    let mut by_symbol: HashMap<String, AssetRecord> = HashMap::with_capacity(fetched.len());
    for record in fetched {
        by_symbol.insert(record.symbol.clone(), record);
    }

    let normalized: Vec<AssetRecord> = instruments
        .iter()
        .map(|instrument| match by_symbol.remove(&instrument.symbol) {
            Some(record) => normalize_record(instrument, record, fallback),
            None => AssetRecord::failed(instrument, MISSING_SYMBOL_ERROR, now),
        })
        .collect();

    if !by_symbol.is_empty() {
        debug!(extra = by_symbol.len(), "요청하지 않은 심볼 무시");
    }

    normalized
}

fn normalize_record(
    instrument: &Instrument,
    mut record: AssetRecord,
    fallback: PriceFallback,
) -> AssetRecord {
    record.kind = instrument.kind;
    if record.name.is_none() {
        record.name = instrument.name.clone();
    }
    if record.sector.is_none() {
        record.sector = instrument.sector.clone();
    }

    if record.price.is_some() {
        return record;
    }

    match (fallback, record.previous_close) {
        (PriceFallback::PreviousClose, Some(previous_close)) => {
            record.price = Some(previous_close);
            record.error = None;
            record.warning = Some(FALLBACK_WARNING.to_string());
        }
        _ => {
            if record.error.is_none() {
                record.error = Some(MISSING_PRICE_ERROR.to_string());
            }
        }
    }

    record
}
