//! 시세 스냅샷 API 서버.
//!
//! 백그라운드 갱신 스케줄러와 Axum REST API 서버를 함께 시작합니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use quote_api::{create_api_router, AppState};
use quote_core::{init_logging, AppConfig, LogConfig};
use quote_data::{
    MarketClock, RefreshEngine, RefreshScheduler, SchedulerSettings, SnapshotContext,
    YahooQuoteSource,
};

/// 설정 파일 경로 환경변수.
const CONFIG_PATH_ENV: &str = "SNAPSHOT_CONFIG";

/// 기본 설정 파일 경로.
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS`(쉼표 구분)가 설정되면 해당 origin만 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
///
/// 요청 타임아웃은 읽기 대기 시간보다 길어야 `WARMING_UP` 응답이 먼저 나갑니다.
fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load(&config_path)?;

    init_logging(LogConfig::from_settings(&config.logging))?;
    info!(config = %config_path, "Starting market snapshot server...");

    let addr = config.server.socket_addr().map_err(|e| {
        error!(
            host = %config.server.host,
            port = config.server.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다"
        );
        e
    })?;

    let universe = config.universe();
    let clock = MarketClock::from_config(&config.market)?;
    let settings = SchedulerSettings::from(&config.refresh);
    let reader_wait = config.refresh.reader_wait_timeout();

    info!(
        instruments = universe.len(),
        equities = universe.equities().count(),
        derived = universe.derived().len(),
        timezone = %clock.timezone(),
        "유니버스 로드 완료"
    );

    // 갱신 작업과 API가 공유하는 상태
    let context = Arc::new(SnapshotContext::new());
    let source = Arc::new(YahooQuoteSource::new()?);
    let engine = RefreshEngine::new(
        Arc::clone(&context),
        source,
        &universe,
        config.refresh.price_fallback,
    );
    let state = Arc::new(AppState::new(
        Arc::clone(&context),
        clock,
        &universe,
        reader_wait,
    ));
    let scheduler = RefreshScheduler::new(context, engine, universe, clock, settings);

    // 전역 종료 토큰 (스케줄러와 서버가 공유)
    let shutdown_token = CancellationToken::new();
    let scheduler_handle = scheduler.spawn(shutdown_token.clone());

    let app = create_router(state, reader_wait + Duration::from_secs(10));

    info!(%addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("Server shutdown initiated, cleaning up...");
    shutdown_token.cancel();

    // 진행 중인 조회는 중단하지 않으므로 최대 10초만 기다림
    match tokio::time::timeout(Duration::from_secs(10), scheduler_handle).await {
        Ok(Ok(())) => info!("갱신 스케줄러 정리 완료"),
        Ok(Err(e)) => error!(error = %e, "갱신 스케줄러 태스크 비정상 종료"),
        Err(_) => warn!("Cleanup timeout, forcing shutdown"),
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
