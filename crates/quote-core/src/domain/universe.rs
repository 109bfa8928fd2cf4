//! 심볼 유니버스 정의.
//!
//! 갱신 대상 종목과 파생 자산 정의를 보관합니다.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::AssetKind;
use crate::error::{QuoteError, QuoteResult};

/// 갱신 대상 종목.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    /// 데이터 소스 심볼 (예: "GARAN.IS", "USDTRY=X")
    pub symbol: String,
    /// 자산 유형
    #[serde(default)]
    pub kind: AssetKind,
    /// 표시 이름
    #[serde(default)]
    pub name: Option<String>,
    /// 업종
    #[serde(default)]
    pub sector: Option<String>,
}

impl Instrument {
    /// 새 종목을 생성합니다.
    pub fn new(symbol: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            symbol: symbol.into(),
            kind,
            name: None,
            sector: None,
        }
    }

    /// 표시 이름을 설정합니다.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 업종을 설정합니다.
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }
}

/// 파생 자산 정의.
///
/// 온스 단위 원자재 시세(`base`)와 환율(`fx`)에서 그램 단위 현지 통화 가격을 계산합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedDefinition {
    /// 파생 자산 심볼 (예: "GRAMALTIN")
    pub symbol: String,
    /// 표시 이름
    pub name: String,
    /// 온스 단위 기초 자산 심볼
    pub base: String,
    /// 환율 심볼
    pub fx: String,
}

impl DerivedDefinition {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        base: impl Into<String>,
        fx: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            base: base.into(),
            fx: fx.into(),
        }
    }

    /// 주어진 심볼이 이 정의의 입력인지 확인합니다.
    pub fn depends_on(&self, symbol: &str) -> bool {
        self.base == symbol || self.fx == symbol
    }
}

/// 갱신 대상 전체 목록.
#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    instruments: Vec<Instrument>,
    derived: Vec<DerivedDefinition>,
}

impl Universe {
    /// 새 유니버스를 생성합니다. 종목 순서는 유지됩니다.
    pub fn new(instruments: Vec<Instrument>, derived: Vec<DerivedDefinition>) -> Self {
        Self {
            instruments,
            derived,
        }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn derived(&self) -> &[DerivedDefinition] {
        &self.derived
    }

    /// 주식 종목 (설정 순서).
    pub fn equities(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter().filter(|i| i.kind.is_equity())
    }

    /// 주식 외 종목 (환율, 원자재, 지수).
    pub fn non_equities(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter().filter(|i| !i.kind.is_equity())
    }

    /// 심볼로 종목을 찾습니다.
    pub fn get(&self, symbol: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.symbol == symbol)
    }

    /// 전체 종목 수 (파생 자산 제외).
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// 중복 심볼과 파생 입력을 검증합니다.
    pub fn validate(&self) -> QuoteResult<()> {
        let mut seen = HashSet::new();
        for inst in &self.instruments {
            if inst.symbol.trim().is_empty() {
                return Err(QuoteError::InvalidInput("빈 심볼".to_string()));
            }
            if !seen.insert(inst.symbol.as_str()) {
                return Err(QuoteError::Config(format!("중복 심볼: {}", inst.symbol)));
            }
        }

        for def in &self.derived {
            if !seen.insert(def.symbol.as_str()) {
                return Err(QuoteError::Config(format!("중복 심볼: {}", def.symbol)));
            }
            for input in [&def.base, &def.fx] {
                if self.get(input).is_none() {
                    return Err(QuoteError::UnknownSymbol(format!(
                        "{} (파생 자산 {}의 입력)",
                        input, def.symbol
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for Universe {
    /// 내장 기본 유니버스: 환율, 귀금속, BIST 100 지수, 대표 종목 3개.
    fn default() -> Self {
        use AssetKind::*;

        let instruments = vec![
            Instrument::new("USDTRY=X", CurrencyPair).with_name("Dolar/TL"),
            Instrument::new("EURTRY=X", CurrencyPair).with_name("Euro/TL"),
            Instrument::new("GBPTRY=X", CurrencyPair).with_name("Sterlin/TL"),
            Instrument::new("EURUSD=X", CurrencyPair).with_name("Euro/Dolar Paritesi"),
            Instrument::new("GC=F", CommoditySpot).with_name("Ons Altın (USD)"),
            Instrument::new("SI=F", CommoditySpot).with_name("Ons Gümüş (USD)"),
            Instrument::new("PL=F", CommoditySpot).with_name("Ons Platin (USD)"),
            Instrument::new("XU100.IS", Index).with_name("BIST 100"),
            Instrument::new("GARAN.IS", Equity)
                .with_name("Garanti BBVA")
                .with_sector("Bankacılık"),
            Instrument::new("AKBNK.IS", Equity)
                .with_name("Akbank")
                .with_sector("Bankacılık"),
            Instrument::new("THYAO.IS", Equity)
                .with_name("Türk Hava Yolları")
                .with_sector("Ulaştırma"),
        ];

        let derived = vec![
            DerivedDefinition::new("GRAMALTIN", "Gram Altın (TL)", "GC=F", "USDTRY=X"),
            DerivedDefinition::new("GRAMGUMUS", "Gram Gümüş (TL)", "SI=F", "USDTRY=X"),
            DerivedDefinition::new("GRAMPLATIN", "Gram Platin (TL)", "PL=F", "USDTRY=X"),
        ];

        Self::new(instruments, derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_universe_is_valid() {
        let universe = Universe::default();
        assert!(universe.validate().is_ok());
        assert_eq!(universe.equities().count(), 3);
        assert_eq!(universe.non_equities().count(), 8);
        assert_eq!(universe.get("XU100.IS").unwrap().kind, AssetKind::Index);
    }

    #[test]
    fn test_equity_order_preserved() {
        let symbols: Vec<_> = Universe::default()
            .equities()
            .map(|i| i.symbol.clone())
            .collect();
        assert_eq!(symbols, vec!["GARAN.IS", "AKBNK.IS", "THYAO.IS"]);
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        let universe = Universe::new(
            vec![
                Instrument::new("GARAN.IS", AssetKind::Equity),
                Instrument::new("GARAN.IS", AssetKind::Equity),
            ],
            vec![],
        );
        assert!(universe.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_derived_with_unknown_input_rejected() {
        let universe = Universe::new(
            vec![Instrument::new("GC=F", AssetKind::CommoditySpot)],
            vec![DerivedDefinition::new(
                "GRAMALTIN",
                "Gram Altın (TL)",
                "GC=F",
                "USDTRY=X",
            )],
        );
        let err = universe.validate().unwrap_err();
        assert!(matches!(err, QuoteError::UnknownSymbol(_)));
    }

    #[test]
    fn test_depends_on() {
        let def = DerivedDefinition::new("GRAMALTIN", "Gram Altın (TL)", "GC=F", "USDTRY=X");
        assert!(def.depends_on("GC=F"));
        assert!(def.depends_on("USDTRY=X"));
        assert!(!def.depends_on("SI=F"));
    }
}
