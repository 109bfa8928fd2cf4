//! 갱신 스케줄러.
//!
//! 시작 시 단계별 로드를 한 번 실행한 뒤, 주기적으로 스냅샷 신선도를 검사해
//! 장 상태별 임계값을 넘으면 전체 갱신을 실행합니다.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use quote_core::{RefreshConfig, Universe};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::{RefreshEngine, RefreshPlan, RefreshStats};
use crate::cache::SnapshotContext;
use crate::error::Result;
use crate::market_clock::{MarketClock, MarketRegime};

/// 스케줄러 주기 설정.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// 틱 간격
    pub poll_interval: Duration,
    /// 장중 신선도 임계값
    pub open_threshold: Duration,
    /// 장외 신선도 임계값
    pub closed_threshold: Duration,
    /// 실패 후 대기 시간
    pub backoff: Duration,
    /// 그룹당 주식 수
    pub group_size: usize,
    /// 그룹 사이 대기 시간
    pub group_pause: Duration,
}

impl From<&RefreshConfig> for SchedulerSettings {
    fn from(config: &RefreshConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            open_threshold: config.open_threshold(),
            closed_threshold: config.closed_threshold(),
            backoff: config.backoff(),
            group_size: config.group_size,
            group_pause: config.group_pause(),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from(&RefreshConfig::default())
    }
}

impl SchedulerSettings {
    /// 장 상태별 신선도 임계값.
    pub fn threshold(&self, regime: MarketRegime) -> Duration {
        match regime {
            MarketRegime::Open => self.open_threshold,
            MarketRegime::Closed => self.closed_threshold,
        }
    }
}

/// 틱 한 번의 결과.
#[derive(Debug)]
pub enum TickOutcome {
    /// 스냅샷이 아직 신선함
    Fresh,
    /// 다른 조회가 진행 중
    Busy,
    /// 전체 갱신 완료
    Refreshed(RefreshStats),
}

/// 백그라운드 갱신 스케줄러.
pub struct RefreshScheduler {
    context: Arc<SnapshotContext>,
    engine: RefreshEngine,
    universe: Universe,
    clock: MarketClock,
    settings: SchedulerSettings,
}

impl RefreshScheduler {
    pub fn new(
        context: Arc<SnapshotContext>,
        engine: RefreshEngine,
        universe: Universe,
        clock: MarketClock,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            context,
            engine,
            universe,
            clock,
            settings,
        }
    }

    /// 스냅샷이 `now` 시점에 갱신이 필요한지 판단합니다.
    ///
    /// 한 번도 갱신되지 않았으면 항상 필요합니다.
    pub fn is_stale(
        &self,
        last_refresh: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(last) = last_refresh else {
            return true;
        };

        let threshold = self.settings.threshold(self.clock.regime(now));
        match (now - last).to_std() {
            Ok(age) => age > threshold,
            // 시계가 뒤로 간 경우
            Err(_) => false,
        }
    }

    /// 시작용 단계별 로드를 실행합니다. 이미 조회 중이면 건너뜁니다.
    pub async fn warm_up(&self) -> Result<Option<RefreshStats>> {
        let Some(guard) = self.context.coordinator.begin() else {
            debug!("단계별 로드 건너뜀: 조회 진행 중");
            return Ok(None);
        };

        let plan = RefreshPlan::warm_up(
            &self.universe,
            self.settings.group_size,
            self.settings.group_pause,
        );
        self.engine.run(&plan, guard).await.map(Some)
    }

    /// `now` 기준으로 틱 한 번을 처리합니다.
    pub async fn tick_at(&self, now: DateTime<Utc>) -> Result<TickOutcome> {
        let last_refresh = self.context.store.last_refresh().await;
        if !self.is_stale(last_refresh, now) {
            debug!(last_refresh = ?last_refresh, "스냅샷 신선함");
            return Ok(TickOutcome::Fresh);
        }

        if !self.context.coordinator.is_idle() {
            debug!("갱신 필요하나 조회 진행 중");
            return Ok(TickOutcome::Busy);
        }

        let Some(guard) = self.context.coordinator.begin() else {
            return Ok(TickOutcome::Busy);
        };

        info!(
            regime = %self.clock.regime(now),
            last_refresh = ?last_refresh,
            "스냅샷 만료, 전체 갱신 시작"
        );

        let plan = RefreshPlan::full(
            &self.universe,
            self.settings.group_size,
            self.settings.group_pause,
        );
        self.engine.run(&plan, guard).await.map(TickOutcome::Refreshed)
    }

    /// 종료 신호를 받을 때까지 실행합니다.
    ///
    /// 대기 중에만 종료 신호를 확인하며, 진행 중인 조회는 중단하지 않습니다.
    pub async fn run(self, shutdown_token: CancellationToken) {
        info!(
            poll_secs = self.settings.poll_interval.as_secs(),
            open_threshold_secs = self.settings.open_threshold.as_secs(),
            closed_threshold_secs = self.settings.closed_threshold.as_secs(),
            symbols = self.universe.len(),
            "갱신 스케줄러 시작"
        );

        let mut wait = match self.warm_up().await {
            Ok(_) => self.settings.poll_interval,
            Err(e) => {
                error!(error = %e, transient = e.is_transient(), "단계별 로드 실패");
                self.settings.backoff
            }
        };

        loop {
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = shutdown_token.cancelled() => {
                    info!("갱신 스케줄러: 종료 시그널 수신");
                    break;
                }
            }

            wait = match self.tick_at(Utc::now()).await {
                Ok(_) => self.settings.poll_interval,
                Err(e) => {
                    error!(
                        error = %e,
                        transient = e.is_transient(),
                        backoff_secs = self.settings.backoff.as_secs(),
                        "갱신 사이클 실패"
                    );
                    self.settings.backoff
                }
            };
        }

        info!("갱신 스케줄러 종료됨");
    }

    /// 백그라운드 태스크로 실행합니다.
    pub fn spawn(self, shutdown_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown_token))
    }
}
