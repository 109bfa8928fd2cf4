//! 스냅샷 읽기 경로.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use quote_core::AssetRecord;
use serde::Serialize;
use tracing::debug;

use super::{SnapshotContext, WaitOutcome};

/// 읽기 결과 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotStatus {
    /// 레코드 제공 (대기 후 비어 있을 수도 있음)
    Serving,
    /// 첫 조회가 아직 끝나지 않음 (대기 시간 초과)
    WarmingUp,
    /// 비어 있고 진행 중인 조회 없음
    NotReady,
}

/// 읽기 결과.
#[derive(Debug, Clone)]
pub struct SnapshotView {
    pub status: SnapshotStatus,
    pub records: Vec<AssetRecord>,
    pub last_refresh: Option<DateTime<Utc>>,
}

impl SnapshotView {
    fn with_status(status: SnapshotStatus) -> Self {
        Self {
            status,
            records: Vec::new(),
            last_refresh: None,
        }
    }
}

/// 스냅샷 읽기 요청 처리기.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    context: Arc<SnapshotContext>,
    wait_timeout: Duration,
}

impl SnapshotReader {
    pub fn new(context: Arc<SnapshotContext>, wait_timeout: Duration) -> Self {
        Self {
            context,
            wait_timeout,
        }
    }

    /// 현재 스냅샷을 반환합니다.
    ///
    /// - 비어 있지 않으면 즉시 `Serving`
    /// - 비어 있고 조회 중이면 최대 `wait_timeout` 대기 후 `Serving` 또는 `WarmingUp`
    /// - 비어 있고 조회 중이 아니면 `NotReady`
    pub async fn get_snapshot(&self) -> SnapshotView {
        let (records, last_refresh) = self.context.store.read_all().await;
        if !records.is_empty() {
            return SnapshotView {
                status: SnapshotStatus::Serving,
                records,
                last_refresh,
            };
        }

        self.resolve_empty().await
    }

    /// 첫 읽기에서 비어 있던 경우를 처리합니다.
    async fn resolve_empty(&self) -> SnapshotView {
        let store = &self.context.store;
        let coordinator = &self.context.coordinator;

        if coordinator.is_idle() {
            // 첫 읽기 직후 사이클이 병합하고 해제했을 수 있음
            let (records, last_refresh) = store.read_all().await;
            if records.is_empty() {
                return SnapshotView::with_status(SnapshotStatus::NotReady);
            }
            return SnapshotView {
                status: SnapshotStatus::Serving,
                records,
                last_refresh,
            };
        }

        debug!(timeout_secs = self.wait_timeout.as_secs(), "스냅샷 대기");
        match coordinator.wait_for_completion(self.wait_timeout).await {
            WaitOutcome::Completed { generation } => {
                let (records, last_refresh) = store.read_all().await;
                debug!(generation, count = records.len(), "대기 완료");
                SnapshotView {
                    status: SnapshotStatus::Serving,
                    records,
                    last_refresh,
                }
            }
            WaitOutcome::TimedOut => SnapshotView::with_status(SnapshotStatus::WarmingUp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_core::AssetKind;
    use rust_decimal_macros::dec;

    fn record(symbol: &str) -> AssetRecord {
        AssetRecord::new(symbol, AssetKind::Equity, Utc::now()).with_price(dec!(1))
    }

    #[tokio::test]
    async fn test_not_ready_when_empty_and_idle() {
        let context = Arc::new(SnapshotContext::new());
        let reader = SnapshotReader::new(context, Duration::from_secs(60));
        let view = reader.get_snapshot().await;
        assert_eq!(view.status, SnapshotStatus::NotReady);
        assert!(view.records.is_empty());
    }

    #[tokio::test]
    async fn test_serving_immediately_when_populated() {
        let context = Arc::new(SnapshotContext::new());
        context
            .store
            .merge_group(vec![record("A.IS"), record("B.IS"), record("C.IS")])
            .await;
        // 조회 중이어도 대기하지 않음
        assert!(context.coordinator.try_begin_fetch());

        let reader = SnapshotReader::new(Arc::clone(&context), Duration::from_secs(60));
        let view = reader.get_snapshot().await;
        assert_eq!(view.status, SnapshotStatus::Serving);
        assert_eq!(view.records.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_warming_up_on_timeout() {
        let context = Arc::new(SnapshotContext::new());
        assert!(context.coordinator.try_begin_fetch());

        let reader = SnapshotReader::new(context, Duration::from_secs(60));
        let view = reader.get_snapshot().await;
        assert_eq!(view.status, SnapshotStatus::WarmingUp);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiter_sees_records_after_completion() {
        let context = Arc::new(SnapshotContext::new());
        let mut guard = context.coordinator.begin().unwrap();

        let reader = SnapshotReader::new(Arc::clone(&context), Duration::from_secs(60));
        let pending = tokio::spawn(async move { reader.get_snapshot().await });

        tokio::time::sleep(Duration::from_secs(5)).await;
        context.store.merge_group(vec![record("A.IS")]).await;
        guard.release();

        let view = pending.await.unwrap();
        assert_eq!(view.status, SnapshotStatus::Serving);
        assert_eq!(view.records.len(), 1);
    }

    #[tokio::test]
    async fn test_cycle_finishing_after_first_read_is_served() {
        // 첫 읽기는 비어 있었고, 그 사이 사이클이 병합 후 해제된 상태
        let context = Arc::new(SnapshotContext::new());
        let mut guard = context.coordinator.begin().unwrap();
        context.store.merge_group(vec![record("A.IS"), record("B.IS")]).await;
        guard.release();

        let reader = SnapshotReader::new(Arc::clone(&context), Duration::from_secs(60));
        let view = reader.resolve_empty().await;
        assert_eq!(view.status, SnapshotStatus::Serving);
        assert_eq!(view.records.len(), 2);
    }
}
