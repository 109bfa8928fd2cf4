//! 거래소 운영 시간 판단.
//!
//! 요일과 고정된 장중 시간대로 장 상태를 판단하는 순수 함수입니다.
//! 공휴일은 고려하지 않습니다.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use quote_core::{MarketConfig, QuoteResult};
use serde::Serialize;

/// 장 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketRegime {
    Open,
    Closed,
}

impl MarketRegime {
    pub fn is_open(&self) -> bool {
        matches!(self, MarketRegime::Open)
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketRegime::Open => write!(f, "OPEN"),
            MarketRegime::Closed => write!(f, "CLOSED"),
        }
    }
}

/// 거래소 시계.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketClock {
    tz: Tz,
    open: NaiveTime,
    close: NaiveTime,
}

impl MarketClock {
    pub fn new(tz: Tz, open: NaiveTime, close: NaiveTime) -> Self {
        Self { tz, open, close }
    }

    /// 설정에서 시계를 생성합니다.
    pub fn from_config(config: &MarketConfig) -> QuoteResult<Self> {
        Ok(Self::new(config.tz()?, config.open_time()?, config.close_time()?))
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// 개장 시각 (현지).
    pub fn open_time(&self) -> NaiveTime {
        self.open
    }

    /// 마감 시각 (현지).
    pub fn close_time(&self) -> NaiveTime {
        self.close
    }

    /// 거래소 현지 시각 기준으로 장중인지 판단합니다.
    ///
    /// 토/일요일은 항상 장외이며, 개장/마감 시각은 장중에 포함됩니다.
    pub fn is_open_at(&self, local: NaiveDateTime) -> bool {
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }

        let time = local.time();
        time >= self.open && time <= self.close
    }

    /// UTC 시각을 거래소 현지 시각으로 변환합니다.
    pub fn local_time(&self, now: DateTime<Utc>) -> DateTime<Tz> {
        now.with_timezone(&self.tz)
    }

    /// UTC 시각의 장 상태를 반환합니다.
    pub fn regime(&self, now: DateTime<Utc>) -> MarketRegime {
        if self.is_open_at(self.local_time(now).naive_local()) {
            MarketRegime::Open
        } else {
            MarketRegime::Closed
        }
    }
}

impl Default for MarketClock {
    /// Borsa Istanbul: 10:00 - 18:10 (Europe/Istanbul).
    fn default() -> Self {
        Self::new(
            chrono_tz::Europe::Istanbul,
            NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
            NaiveTime::from_hms_opt(18, 10, 0).unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use proptest::prelude::*;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_weekday_window_inclusive() {
        let clock = MarketClock::default();
        // 2024-03-04 월요일
        assert!(clock.is_open_at(local(2024, 3, 4, 10, 0, 0)));
        assert!(clock.is_open_at(local(2024, 3, 4, 18, 10, 0)));
        assert!(clock.is_open_at(local(2024, 3, 4, 14, 30, 0)));
        assert!(!clock.is_open_at(local(2024, 3, 4, 9, 59, 59)));
        assert!(!clock.is_open_at(local(2024, 3, 4, 18, 10, 1)));
    }

    #[test]
    fn test_weekend_closed() {
        let clock = MarketClock::default();
        // 2024-03-09 토요일, 2024-03-10 일요일
        assert!(!clock.is_open_at(local(2024, 3, 9, 12, 0, 0)));
        assert!(!clock.is_open_at(local(2024, 3, 10, 12, 0, 0)));
    }

    #[test]
    fn test_regime_converts_timezone() {
        let clock = MarketClock::default();
        // 07:30 UTC = 10:30 Istanbul (UTC+3)
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 7, 30, 0).unwrap();
        assert_eq!(clock.regime(now), MarketRegime::Open);

        // 06:30 UTC = 09:30 Istanbul
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 6, 30, 0).unwrap();
        assert_eq!(clock.regime(now), MarketRegime::Closed);
    }

    #[test]
    fn test_from_config() {
        let clock = MarketClock::from_config(&MarketConfig::default()).unwrap();
        assert_eq!(clock, MarketClock::default());
    }

    proptest! {
        #[test]
        fn prop_weekend_always_closed(day in 0u32..2, secs in 0u32..86_400) {
            // 2024-03-09 토요일부터
            let date = NaiveDate::from_ymd_opt(2024, 3, 9 + day).unwrap();
            let t = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap();
            prop_assert!(!MarketClock::default().is_open_at(date.and_time(t)));
        }

        #[test]
        fn prop_weekday_matches_window(day in 0u32..5, secs in 0u32..86_400) {
            // 2024-03-04 월요일부터
            let date = NaiveDate::from_ymd_opt(2024, 3, 4 + day).unwrap();
            let t = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap();
            let expected = (10 * 3600..=18 * 3600 + 10 * 60).contains(&secs);
            prop_assert_eq!(MarketClock::default().is_open_at(date.and_time(t)), expected);
        }
    }
}
