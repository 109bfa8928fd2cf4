//! 공유 시세 스냅샷 저장소.
//!
//! 심볼 → 최신 레코드 맵과 마지막 갱신 시각을 보관합니다.
//! 그룹 단위 병합은 하나의 쓰기 락 구간에서 원자적으로 수행됩니다.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use quote_core::AssetRecord;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct SnapshotInner {
    records: HashMap<String, AssetRecord>,
    last_refresh: Option<DateTime<Utc>>,
}

/// 병합 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// 병합된 레코드 수
    pub merged: usize,
    /// 이 중 에러 레코드 수
    pub errors: usize,
    /// 에러 레코드에 이전 값을 이어받은 수
    pub carried_forward: usize,
}

/// 공유 시세 스냅샷.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    inner: RwLock<SnapshotInner>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 레코드 묶음을 병합합니다.
    ///
    /// 에러 레코드는 기존 레코드의 숫자 필드를 이어받습니다.
    /// 묶음에 없는 심볼은 그대로 유지됩니다.
    pub async fn merge_group(&self, records: Vec<AssetRecord>) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        let mut inner = self.inner.write().await;

        for mut record in records {
            if record.is_error() {
                outcome.errors += 1;
                if let Some(previous) = inner.records.get(&record.symbol) {
                    record.carry_forward_from(previous);
                    outcome.carried_forward += 1;
                }
            }
            inner.records.insert(record.symbol.clone(), record);
            outcome.merged += 1;
        }

        outcome
    }

    /// 마지막 갱신 시각을 설정합니다.
    pub async fn mark_refreshed(&self, at: DateTime<Utc>) {
        self.inner.write().await.last_refresh = Some(at);
    }

    pub async fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.last_refresh
    }

    /// 모든 레코드를 심볼 순으로 반환합니다.
    pub async fn records(&self) -> Vec<AssetRecord> {
        self.read_all().await.0
    }

    /// 레코드와 마지막 갱신 시각을 함께 읽습니다.
    pub async fn read_all(&self) -> (Vec<AssetRecord>, Option<DateTime<Utc>>) {
        let inner = self.inner.read().await;
        let mut records: Vec<AssetRecord> = inner.records.values().cloned().collect();
        records.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        (records, inner.last_refresh)
    }

    pub async fn get(&self, symbol: &str) -> Option<AssetRecord> {
        self.inner.read().await.records.get(symbol).cloned()
    }

    /// 주어진 심볼들의 레코드를 복사합니다.
    pub async fn get_many<'a, I>(&self, symbols: I) -> HashMap<String, AssetRecord>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let inner = self.inner.read().await;
        symbols
            .into_iter()
            .filter_map(|s| inner.records.get(s).map(|r| (s.to_string(), r.clone())))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }
}
