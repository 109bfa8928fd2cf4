//! 단일 조회 보장 (single-flight).
//!
//! 동시에 하나의 갱신 사이클만 실행되도록 하고, 사이클이 끝날 때마다
//! 세대 번호를 올려 대기 중인 모든 읽기 요청을 깨웁니다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

/// 완료 대기 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// 사이클 종료 신호 수신 (또는 이미 유휴 상태)
    Completed { generation: u64 },
    /// 제한 시간 초과
    TimedOut,
}

/// 조회 상태 조정자.
#[derive(Debug)]
pub struct FetchCoordinator {
    in_progress: AtomicBool,
    generation: watch::Sender<u64>,
}

impl Default for FetchCoordinator {
    fn default() -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            in_progress: AtomicBool::new(false),
            generation,
        }
    }
}

impl FetchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 유휴 상태일 때만 진행 중으로 전환하고 `true`를 반환합니다.
    pub fn try_begin_fetch(&self) -> bool {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// 유휴 상태로 전환하고 완료 신호를 보냅니다.
    pub fn end_fetch(&self) {
        self.in_progress.store(false, Ordering::Release);
        self.generation.send_modify(|g| *g += 1);
        debug!(generation = *self.generation.borrow(), "조회 사이클 종료");
    }

    /// RAII 형태의 `try_begin_fetch`.
    ///
    /// 반환된 가드는 `release()` 또는 drop 시 정확히 한 번 `end_fetch`를 호출합니다.
    pub fn begin(self: &Arc<Self>) -> Option<FetchGuard> {
        if self.try_begin_fetch() {
            Some(FetchGuard {
                coordinator: Arc::clone(self),
                released: false,
            })
        } else {
            None
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.in_progress.load(Ordering::Acquire)
    }

    /// 지금까지 종료된 사이클 수.
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// 진행 중인 사이클이 끝날 때까지 최대 `timeout` 동안 기다립니다.
    ///
    /// 이미 유휴 상태이면 즉시 반환합니다.
    pub async fn wait_for_completion(&self, timeout: Duration) -> WaitOutcome {
        // 신호 유실을 막기 위해 상태 확인 전에 구독
        let mut rx = self.generation.subscribe();

        if self.is_idle() {
            return WaitOutcome::Completed {
                generation: *rx.borrow_and_update(),
            };
        }

        match tokio::time::timeout(timeout, rx.changed()).await {
            Ok(Ok(())) => WaitOutcome::Completed {
                generation: *rx.borrow_and_update(),
            },
            // 송신자는 self가 보유하므로 닫히지 않음
            Ok(Err(_)) => WaitOutcome::Completed {
                generation: self.generation(),
            },
            Err(_) => WaitOutcome::TimedOut,
        }
    }
}

/// 진행 중인 조회 사이클의 소유권.
#[derive(Debug)]
pub struct FetchGuard {
    coordinator: Arc<FetchCoordinator>,
    released: bool,
}

impl FetchGuard {
    /// 사이클을 종료하고 신호를 보냅니다. 이후 drop은 아무것도 하지 않습니다.
    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.coordinator.end_fetch();
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight() {
        let coordinator = FetchCoordinator::new();
        assert!(coordinator.try_begin_fetch());
        assert!(!coordinator.try_begin_fetch());
        assert!(!coordinator.is_idle());

        coordinator.end_fetch();
        assert!(coordinator.is_idle());
        assert_eq!(coordinator.generation(), 1);
        assert!(coordinator.try_begin_fetch());
    }

    #[test]
    fn test_guard_releases_once() {
        let coordinator = Arc::new(FetchCoordinator::new());
        let mut guard = coordinator.begin().unwrap();
        assert!(coordinator.begin().is_none());

        guard.release();
        assert!(guard.is_released());
        assert!(coordinator.is_idle());
        drop(guard);

        assert_eq!(coordinator.generation(), 1);
    }

    #[test]
    fn test_guard_drop_ends_fetch() {
        let coordinator = Arc::new(FetchCoordinator::new());
        {
            let _guard = coordinator.begin().unwrap();
        }
        assert!(coordinator.is_idle());
        assert_eq!(coordinator.generation(), 1);
    }

    #[test]
    fn test_guard_ends_fetch_on_panic() {
        let coordinator = Arc::new(FetchCoordinator::new());
        let c = Arc::clone(&coordinator);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = c.begin().unwrap();
            panic!("fetch body failed");
        }));

        assert!(result.is_err());
        assert!(coordinator.is_idle());
        assert_eq!(coordinator.generation(), 1);
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_idle() {
        let coordinator = FetchCoordinator::new();
        let outcome = coordinator.wait_for_completion(Duration::from_secs(1)).await;
        assert_eq!(outcome, WaitOutcome::Completed { generation: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let coordinator = FetchCoordinator::new();
        assert!(coordinator.try_begin_fetch());

        let outcome = coordinator.wait_for_completion(Duration::from_secs(60)).await;
        assert_eq!(outcome, WaitOutcome::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_waiters_woken() {
        let coordinator = Arc::new(FetchCoordinator::new());
        assert!(coordinator.try_begin_fetch());

        let mut waiters = Vec::new();
        for _ in 0..5 {
            let c = Arc::clone(&coordinator);
            waiters.push(tokio::spawn(async move {
                c.wait_for_completion(Duration::from_secs(60)).await
            }));
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
        coordinator.end_fetch();

        for waiter in waiters {
            assert_eq!(
                waiter.await.unwrap(),
                WaitOutcome::Completed { generation: 1 }
            );
        }
    }
}
