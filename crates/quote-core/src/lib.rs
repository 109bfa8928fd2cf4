//! # Quote Core
//!
//! 시세 스냅샷 서비스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 서비스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 자산 시세 레코드 (`AssetRecord`) 및 자산 유형
//! - 심볼 유니버스 정의 (종목, 환율, 원자재, 파생 자산)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
