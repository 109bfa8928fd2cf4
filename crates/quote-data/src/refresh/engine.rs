//! 갱신 엔진.
//!
//! 계획의 그룹을 순서대로 조회해 스냅샷에 병합합니다.
//! 단계별 로드와 전체 갱신은 `RefreshPlan`의 `unlock_after`로만 구분됩니다.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use quote_core::{DerivedDefinition, PriceFallback, Universe};
use tracing::{debug, info, instrument, warn};

use super::{RefreshPlan, RefreshStats, SymbolGroup};
use crate::cache::{FetchGuard, MergeOutcome, SnapshotContext};
use crate::derived::compute_all;
use crate::error::{DataError, Result};
use crate::provider::{normalize_batch, QuoteSource};

/// 갱신 엔진.
pub struct RefreshEngine {
    context: Arc<SnapshotContext>,
    source: Arc<dyn QuoteSource>,
    derived: Vec<DerivedDefinition>,
    fallback: PriceFallback,
}

impl RefreshEngine {
    pub fn new(
        context: Arc<SnapshotContext>,
        source: Arc<dyn QuoteSource>,
        universe: &Universe,
        fallback: PriceFallback,
    ) -> Self {
        Self {
            context,
            source,
            derived: universe.derived().to_vec(),
            fallback,
        }
    }

    /// 계획을 실행합니다.
    ///
    /// `guard`는 `unlock_after` 단계 직후 또는 사이클 종료 시 해제됩니다.
    /// 어떤 그룹도 병합하지 못하면 `RefreshFailed`를 반환합니다.
    #[instrument(skip_all, fields(mode = %plan.mode, groups = plan.groups.len()))]
    pub async fn run(&self, plan: &RefreshPlan, mut guard: FetchGuard) -> Result<RefreshStats> {
        let started = Instant::now();
        let mut stats = RefreshStats::new(plan.mode, plan.groups.len());

        info!(
            source = self.source.name(),
            symbols = plan.total_symbols(),
            "갱신 시작"
        );

        for (stage, group) in plan.groups.iter().enumerate() {
            if plan.pauses_before(stage) {
                tokio::time::sleep(plan.group_pause).await;
            }

            match self.refresh_group(group).await {
                Ok((outcome, derived)) => {
                    stats.groups_merged += 1;
                    stats.records += outcome.merged;
                    stats.errors += outcome.errors;
                    stats.carried_forward += outcome.carried_forward;
                    stats.derived += derived;
                }
                Err(e) => {
                    // 이전 레코드는 그대로 유지
                    warn!(group = %group.label, error = %e, "그룹 조회 실패");
                    stats.groups_failed += 1;
                }
            }

            if plan.unlock_after == Some(stage) {
                if stats.any_merged() {
                    self.context.store.mark_refreshed(Utc::now()).await;
                }
                guard.release();
                info!(stage, records = stats.records, "최소 준비 완료, 읽기 허용");
            }
        }

        stats.elapsed = started.elapsed();

        if !stats.any_merged() {
            guard.release();
            stats.log_summary();
            return Err(DataError::RefreshFailed(format!(
                "{}개 그룹 모두 조회 실패",
                stats.groups_total
            )));
        }

        self.context.store.mark_refreshed(Utc::now()).await;
        guard.release();
        stats.log_summary();
        Ok(stats)
    }

    /// 그룹 하나를 조회, 정규화, 병합하고 필요하면 파생 자산을 다시 계산합니다.
    async fn refresh_group(&self, group: &SymbolGroup) -> Result<(MergeOutcome, usize)> {
        let fetched = self.source.fetch_batch(&group.instruments).await?;
        let records = normalize_batch(&group.instruments, fetched, self.fallback, Utc::now());
        let outcome = self.context.store.merge_group(records).await;

        debug!(
            group = %group.label,
            merged = outcome.merged,
            errors = outcome.errors,
            "그룹 병합"
        );

        let touches_derived = self.derived.iter().any(|def| {
            group
                .instruments
                .iter()
                .any(|inst| def.depends_on(&inst.symbol))
        });

        let derived = if touches_derived {
            self.recompute_derived().await
        } else {
            0
        };

        Ok((outcome, derived))
    }

    /// 현재 스냅샷 값으로 파생 자산을 계산해 병합합니다.
    async fn recompute_derived(&self) -> usize {
        let inputs: HashSet<&str> = self
            .derived
            .iter()
            .flat_map(|def| [def.base.as_str(), def.fx.as_str()])
            .collect();

        let snapshot = self.context.store.get_many(inputs).await;
        let records = compute_all(&self.derived, |symbol| snapshot.get(symbol), Utc::now());

        let count = records.len();
        if count > 0 {
            self.context.store.merge_group(records).await;
        }
        count
    }
}
