//! 파생 자산 계산.
//!
//! 온스 단위 원자재 시세와 환율에서 그램 단위 현지 통화 가격을 계산합니다.
//! 순수 함수로만 구성되며 I/O가 없습니다.

use chrono::{DateTime, Utc};
use quote_core::{AssetKind, AssetRecord, DerivedDefinition};
use rust_decimal::Decimal;
use tracing::debug;

/// 트로이 온스당 그램 수 (31.1035).
pub const OUNCE_TO_GRAM: Decimal = Decimal::from_parts(311_035, 0, 0, false, 4);

/// `(base / 31.1035) * fx`
///
/// `Decimal` 범위를 넘으면 `None`을 반환합니다.
pub fn ounce_to_gram_price(base: Decimal, fx: Decimal) -> Option<Decimal> {
    base.checked_div(OUNCE_TO_GRAM)?.checked_mul(fx)
}

/// 두 기초 레코드에서 파생 레코드를 계산합니다.
///
/// 어느 한쪽이 에러를 가지거나 현재가가 없거나 계산 결과가 범위를 넘으면
/// `None`을 반환합니다. 전일 종가는 양쪽 모두 있을 때만 계산합니다.
pub fn compute_derived(
    definition: &DerivedDefinition,
    base: &AssetRecord,
    fx: &AssetRecord,
    as_of: DateTime<Utc>,
) -> Option<AssetRecord> {
    if base.is_error() || fx.is_error() {
        return None;
    }
    let price = ounce_to_gram_price(base.price?, fx.price?)?;

    let mut record = AssetRecord::new(definition.symbol.clone(), AssetKind::CommodityDerived, as_of)
        .with_price(price);
    record.name = Some(definition.name.clone());
    record.previous_close = match (base.previous_close, fx.previous_close) {
        (Some(b), Some(f)) => ounce_to_gram_price(b, f),
        _ => None,
    };

    Some(record)
}

/// 정의 목록 전체에 대해 파생 레코드를 계산합니다.
///
/// `lookup`으로 기초 레코드를 찾지 못하거나 사용할 수 없는 정의는 건너뜁니다.
pub fn compute_all<'a, F>(
    definitions: &[DerivedDefinition],
    lookup: F,
    as_of: DateTime<Utc>,
) -> Vec<AssetRecord>
where
    F: Fn(&str) -> Option<&'a AssetRecord>,
{
    definitions
        .iter()
        .filter_map(|def| {
            let derived = match (lookup(&def.base), lookup(&def.fx)) {
                (Some(base), Some(fx)) => compute_derived(def, base, fx, as_of),
                _ => None,
            };
            if derived.is_none() {
                debug!(symbol = %def.symbol, base = %def.base, fx = %def.fx, "파생 자산 계산 건너뜀");
            }
            derived
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn gold_def() -> DerivedDefinition {
        DerivedDefinition::new("GRAMALTIN", "Gram Altın (TL)", "GC=F", "USDTRY=X")
    }

    fn rec(symbol: &str, kind: AssetKind, price: Option<Decimal>, prev: Option<Decimal>) -> AssetRecord {
        let mut r = AssetRecord::new(symbol, kind, Utc::now());
        r.price = price;
        r.previous_close = prev;
        r
    }

    #[test]
    fn test_constant() {
        assert_eq!(OUNCE_TO_GRAM, dec!(31.1035));
    }

    #[test]
    fn test_gram_gold_scenario() {
        let gold = rec("GC=F", AssetKind::CommoditySpot, Some(dec!(2000)), None);
        let usd = rec("USDTRY=X", AssetKind::CurrencyPair, Some(dec!(30)), None);

        let derived = compute_derived(&gold_def(), &gold, &usd, Utc::now()).unwrap();
        let price = derived.price.unwrap();

        assert_eq!(price, (dec!(2000) / dec!(31.1035)) * dec!(30));
        assert!((price - dec!(1929.0434)).abs() < dec!(0.001));
        assert_eq!(derived.kind, AssetKind::CommodityDerived);
        assert_eq!(derived.name.as_deref(), Some("Gram Altın (TL)"));
        assert!(derived.previous_close.is_none());
    }

    #[test]
    fn test_previous_close_requires_both_inputs() {
        let gold = rec("GC=F", AssetKind::CommoditySpot, Some(dec!(2000)), Some(dec!(1990)));
        let usd = rec("USDTRY=X", AssetKind::CurrencyPair, Some(dec!(30)), Some(dec!(29.9)));

        let derived = compute_derived(&gold_def(), &gold, &usd, Utc::now()).unwrap();
        assert_eq!(
            derived.previous_close,
            Some((dec!(1990) / OUNCE_TO_GRAM) * dec!(29.9))
        );
    }

    #[test]
    fn test_error_input_emits_nothing() {
        let gold = rec("GC=F", AssetKind::CommoditySpot, Some(dec!(2000)), None).with_error("HTTP 500");
        let usd = rec("USDTRY=X", AssetKind::CurrencyPair, Some(dec!(30)), None);
        assert!(compute_derived(&gold_def(), &gold, &usd, Utc::now()).is_none());

        let gold = rec("GC=F", AssetKind::CommoditySpot, None, None);
        assert!(compute_derived(&gold_def(), &gold, &usd, Utc::now()).is_none());
    }

    #[test]
    fn test_overflowing_inputs_emit_nothing() {
        let huge = Decimal::from_f64_retain(1e20).unwrap();
        assert!(ounce_to_gram_price(huge, huge).is_none());

        let gold = rec("GC=F", AssetKind::CommoditySpot, Some(huge), None);
        let usd = rec("USDTRY=X", AssetKind::CurrencyPair, Some(huge), None);
        assert!(compute_derived(&gold_def(), &gold, &usd, Utc::now()).is_none());
    }

    #[test]
    fn test_overflowing_previous_close_left_empty() {
        let huge = Decimal::from_f64_retain(1e20).unwrap();
        let gold = rec("GC=F", AssetKind::CommoditySpot, Some(dec!(2000)), Some(huge));
        let usd = rec("USDTRY=X", AssetKind::CurrencyPair, Some(dec!(30)), Some(huge));

        let derived = compute_derived(&gold_def(), &gold, &usd, Utc::now()).unwrap();
        assert!(derived.price.is_some());
        assert!(derived.previous_close.is_none());
    }

    #[test]
    fn test_compute_all_skips_missing_inputs() {
        let gold = rec("GC=F", AssetKind::CommoditySpot, Some(dec!(2000)), None);
        let usd = rec("USDTRY=X", AssetKind::CurrencyPair, Some(dec!(30)), None);
        let defs = vec![
            gold_def(),
            DerivedDefinition::new("GRAMGUMUS", "Gram Gümüş (TL)", "SI=F", "USDTRY=X"),
        ];

        let out = compute_all(
            &defs,
            |s| match s {
                "GC=F" => Some(&gold),
                "USDTRY=X" => Some(&usd),
                _ => None,
            },
            Utc::now(),
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].symbol, "GRAMALTIN");
    }
}
