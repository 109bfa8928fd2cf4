//! 모든 핸들러에서 공유되는 애플리케이션 상태.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use quote_core::{AssetKind, Universe};
use quote_data::{MarketClock, SnapshotContext, SnapshotReader};

/// 애플리케이션 공유 상태.
///
/// `Arc<AppState>`로 래핑되어 Axum의 State extractor를 통해 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 갱신 작업과 공유하는 스냅샷 저장소 및 조회 조정자
    pub context: Arc<SnapshotContext>,

    /// 대기/타임아웃을 포함한 읽기 경로
    pub reader: SnapshotReader,

    /// 거래소 운영 시간
    pub clock: MarketClock,

    /// 벤치마크 지수 심볼 (유니버스에 지수가 없으면 None)
    pub index_symbol: Option<String>,

    /// 유니버스 심볼 수 (파생 자산 포함)
    pub universe_size: usize,

    /// API 버전
    pub version: String,

    /// 서버 시작 시간
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        context: Arc<SnapshotContext>,
        clock: MarketClock,
        universe: &Universe,
        reader_wait_timeout: Duration,
    ) -> Self {
        let index_symbol = universe
            .instruments()
            .iter()
            .find(|inst| inst.kind == AssetKind::Index)
            .map(|inst| inst.symbol.clone());

        Self {
            reader: SnapshotReader::new(Arc::clone(&context), reader_wait_timeout),
            context,
            clock,
            index_symbol,
            universe_size: universe.len() + universe.derived().len(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
        }
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 기본 유니버스와 빈 스냅샷을 사용합니다.
#[cfg(test)]
pub fn create_test_state(reader_wait_timeout: Duration) -> AppState {
    AppState::new(
        Arc::new(SnapshotContext::new()),
        MarketClock::default(),
        &Universe::default(),
        reader_wait_timeout,
    )
}
