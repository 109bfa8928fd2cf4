//! 갱신 레이어.
//!
//! - `RefreshPlan`: 그룹 분할과 읽기 허용 시점
//! - `RefreshEngine`: 그룹 순차 조회 및 병합
//! - `RefreshScheduler`: 시작 시 단계별 로드 후 주기적 신선도 검사

pub mod engine;
pub mod plan;
pub mod scheduler;
pub mod stats;

pub use engine::RefreshEngine;
pub use plan::{partition, RefreshMode, RefreshPlan, SymbolGroup};
pub use scheduler::{RefreshScheduler, SchedulerSettings, TickOutcome};
pub use stats::RefreshStats;
