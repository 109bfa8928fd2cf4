//! 캐싱 레이어.
//!
//! - `SnapshotStore`: 심볼별 최신 시세 저장소
//! - `FetchCoordinator`: 단일 조회 보장 및 완료 신호
//! - `SnapshotReader`: 읽기 요청 처리 (대기/타임아웃 포함)

pub mod coordinator;
pub mod reader;
pub mod snapshot;

use std::sync::Arc;

pub use coordinator::{FetchCoordinator, FetchGuard, WaitOutcome};
pub use reader::{SnapshotReader, SnapshotStatus, SnapshotView};
pub use snapshot::{MergeOutcome, SnapshotStore};

/// 갱신 작업과 읽기 요청이 공유하는 상태.
#[derive(Debug, Default)]
pub struct SnapshotContext {
    pub store: SnapshotStore,
    pub coordinator: Arc<FetchCoordinator>,
}

impl SnapshotContext {
    pub fn new() -> Self {
        Self::default()
    }
}
