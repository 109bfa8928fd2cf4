//! 갱신 사이클 통계.

use std::time::Duration;

use super::RefreshMode;

/// 갱신 사이클 통계
#[derive(Debug, Clone)]
pub struct RefreshStats {
    /// 갱신 방식
    pub mode: RefreshMode,
    /// 계획된 그룹 수
    pub groups_total: usize,
    /// 병합된 그룹 수
    pub groups_merged: usize,
    /// 데이터 소스 호출이 실패한 그룹 수
    pub groups_failed: usize,
    /// 병합된 레코드 수
    pub records: usize,
    /// 에러 레코드 수
    pub errors: usize,
    /// 이전 값을 이어받은 에러 레코드 수
    pub carried_forward: usize,
    /// 계산된 파생 레코드 수
    pub derived: usize,
    /// 소요 시간
    pub elapsed: Duration,
}

impl RefreshStats {
    /// 새 통계 객체 생성
    pub fn new(mode: RefreshMode, groups_total: usize) -> Self {
        Self {
            mode,
            groups_total,
            groups_merged: 0,
            groups_failed: 0,
            records: 0,
            errors: 0,
            carried_forward: 0,
            derived: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// 레코드 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.records == 0 {
            0.0
        } else {
            ((self.records - self.errors) as f64 / self.records as f64) * 100.0
        }
    }

    /// 병합된 그룹이 하나라도 있는지 확인
    pub fn any_merged(&self) -> bool {
        self.groups_merged > 0
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self) {
        tracing::info!(
            mode = %self.mode,
            groups_total = self.groups_total,
            groups_merged = self.groups_merged,
            groups_failed = self.groups_failed,
            records = self.records,
            errors = self.errors,
            carried_forward = self.carried_forward,
            derived = self.derived,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "갱신 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let mut stats = RefreshStats::new(RefreshMode::Full, 3);
        assert_eq!(stats.success_rate(), 0.0);

        stats.records = 10;
        stats.errors = 1;
        assert!((stats.success_rate() - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_any_merged() {
        let mut stats = RefreshStats::new(RefreshMode::WarmUp, 2);
        assert!(!stats.any_merged());
        stats.groups_merged = 1;
        assert!(stats.any_merged());
    }
}
