//! 설정 관리.
//!
//! 기본값, 설정 파일, `SNAPSHOT__` 접두사 환경 변수 순서로 병합합니다.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::domain::{AssetKind, DerivedDefinition, Instrument, Universe};
use crate::error::{QuoteError, QuoteResult};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 갱신 주기 설정
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// 시장 운영 시간 설정
    #[serde(default)]
    pub market: MarketConfig,
    /// 심볼 유니버스 설정
    #[serde(default)]
    pub universe: UniverseConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// 바인딩 주소.
    pub fn socket_addr(&self) -> QuoteResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| QuoteError::Config(format!("서버 주소 {}:{}: {}", self.host, self.port, e)))
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 현재가가 없을 때의 대체 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceFallback {
    /// 대체하지 않음. 현재가 없는 레코드는 에러로 표시됩니다.
    Disabled,
    /// 전일 종가로 대체하고 경고를 남깁니다.
    #[default]
    PreviousClose,
}

/// 갱신 주기 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// 스케줄러 틱 간격 (초)
    pub poll_interval_secs: u64,
    /// 장중 신선도 임계값 (초)
    pub open_threshold_secs: u64,
    /// 장외 신선도 임계값 (초)
    pub closed_threshold_secs: u64,
    /// 갱신 실패 후 대기 시간 (초)
    pub backoff_secs: u64,
    /// 읽기 요청의 최대 대기 시간 (초)
    pub reader_wait_timeout_secs: u64,
    /// 종목 그룹당 심볼 수
    pub group_size: usize,
    /// 그룹 간 대기 시간 (밀리초)
    pub group_pause_ms: u64,
    /// 현재가 대체 정책
    pub price_fallback: PriceFallback,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            open_threshold_secs: 15 * 60,
            closed_threshold_secs: 60 * 60,
            backoff_secs: 300,
            reader_wait_timeout_secs: 60,
            group_size: 25,
            group_pause_ms: 3000,
            price_fallback: PriceFallback::PreviousClose,
        }
    }
}

impl RefreshConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn open_threshold(&self) -> Duration {
        Duration::from_secs(self.open_threshold_secs)
    }

    pub fn closed_threshold(&self) -> Duration {
        Duration::from_secs(self.closed_threshold_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    pub fn reader_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.reader_wait_timeout_secs)
    }

    pub fn group_pause(&self) -> Duration {
        Duration::from_millis(self.group_pause_ms)
    }
}

/// 시장 운영 시간 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MarketConfig {
    /// 거래소 시간대 (IANA 이름)
    pub timezone: String,
    /// 개장 시각 (HH:MM)
    pub open: String,
    /// 마감 시각 (HH:MM)
    pub close: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            timezone: "Europe/Istanbul".to_string(),
            open: "10:00".to_string(),
            close: "18:10".to_string(),
        }
    }
}

impl MarketConfig {
    /// 시간대를 파싱합니다.
    pub fn tz(&self) -> QuoteResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| QuoteError::Config(format!("알 수 없는 시간대: {}", self.timezone)))
    }

    /// 개장 시각을 파싱합니다.
    pub fn open_time(&self) -> QuoteResult<NaiveTime> {
        parse_clock_time("market.open", &self.open)
    }

    /// 마감 시각을 파싱합니다.
    pub fn close_time(&self) -> QuoteResult<NaiveTime> {
        parse_clock_time("market.close", &self.close)
    }
}

fn parse_clock_time(key: &str, value: &str) -> QuoteResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| QuoteError::Config(format!("{} 시각 형식 오류 ({}): {}", key, value, e)))
}

/// 심볼 유니버스 설정.
///
/// 모든 목록이 비어 있으면 내장 기본 유니버스를 사용합니다.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// 주식 외 종목 (환율, 원자재, 지수)
    pub instruments: Vec<Instrument>,
    /// 주식 종목 (설정 순서대로 그룹화됨)
    pub equities: Vec<Instrument>,
    /// 파생 자산 정의
    pub derived: Vec<DerivedDefinition>,
}

impl UniverseConfig {
    /// 설정 목록에서 유니버스를 만듭니다.
    pub fn to_universe(&self) -> Universe {
        if self.instruments.is_empty() && self.equities.is_empty() && self.derived.is_empty() {
            return Universe::default();
        }

        let equities = self.equities.iter().cloned().map(|mut inst| {
            inst.kind = AssetKind::Equity;
            inst
        });

        let instruments = self.instruments.iter().cloned().chain(equities).collect();
        Universe::new(instruments, self.derived.clone())
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> QuoteResult<Self> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("SNAPSHOT")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> QuoteResult<Self> {
        Self::load("config/default.toml")
    }

    /// 유니버스를 만듭니다.
    pub fn universe(&self) -> Universe {
        self.universe.to_universe()
    }

    /// 설정 값을 검증합니다.
    pub fn validate(&self) -> QuoteResult<()> {
        let refresh = &self.refresh;

        if refresh.group_size == 0 {
            return Err(QuoteError::Config(
                "refresh.group_size는 0일 수 없습니다".to_string(),
            ));
        }
        if refresh.poll_interval_secs == 0 {
            return Err(QuoteError::Config(
                "refresh.poll_interval_secs는 0일 수 없습니다".to_string(),
            ));
        }
        if refresh.open_threshold_secs >= refresh.closed_threshold_secs {
            return Err(QuoteError::Config(format!(
                "장중 임계값({}초)은 장외 임계값({}초)보다 작아야 합니다",
                refresh.open_threshold_secs, refresh.closed_threshold_secs
            )));
        }

        self.market.tz()?;
        let open = self.market.open_time()?;
        let close = self.market.close_time()?;
        if open >= close {
            return Err(QuoteError::Config(format!(
                "개장 시각({})은 마감 시각({})보다 빨라야 합니다",
                open, close
            )));
        }

        self.universe().validate()
    }
}
