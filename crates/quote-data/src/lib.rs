//! 시세 스냅샷 갱신 및 캐싱.
//!
//! 이 crate는 다음을 제공합니다:
//! - 공유 스냅샷 저장소와 단일 조회 보장 (`cache`)
//! - Yahoo Finance 데이터 소스와 응답 정규화 (`provider`)
//! - 단계별 로드와 주기적 갱신 (`refresh`)
//! - 거래소 운영 시간 판단 (`market_clock`)
//! - 그램 단위 파생 자산 계산 (`derived`)

pub mod cache;
pub mod derived;
pub mod error;
pub mod market_clock;
pub mod provider;
pub mod refresh;

pub use error::{DataError, Result};

pub use cache::{
    FetchCoordinator, FetchGuard, SnapshotContext, SnapshotReader, SnapshotStatus, SnapshotStore,
    SnapshotView, WaitOutcome,
};
pub use derived::{compute_derived, OUNCE_TO_GRAM};
pub use market_clock::{MarketClock, MarketRegime};
pub use provider::{QuoteSource, YahooQuoteSource};
pub use refresh::{
    RefreshEngine, RefreshMode, RefreshPlan, RefreshScheduler, RefreshStats, SchedulerSettings,
    TickOutcome,
};
