//! 마켓플레이스 API 서버.
//!
//! 설정을 로드하고 보안 경계가 적용된 Axum 서버를 시작합니다.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::StatusCode;
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};

use crafts_api::auth::{AccessControlMatrix, InMemoryCredentialStore};
use crafts_api::{build_app, AppState};
use crafts_core::{init_logging, AppConfig, LogConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load_default().context("설정 로드 실패")?;

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    info!("Starting crafts API server...");

    if config.security.uses_dev_secret() {
        warn!("security.jwt_secret not set, using default (INSECURE for development only)");
    }

    // 영속 저장소는 외부 서비스가 담당하며, 단독 실행 시 인메모리 저장소 사용
    let credentials = Arc::new(InMemoryCredentialStore::new());
    let state = AppState::from_config(&config.security, credentials)
        .context("애플리케이션 상태 초기화 실패")?;
    state
        .bootstrap_admin(&config.security)
        .await
        .context("관리자 계정 등록 실패")?;
    let state = Arc::new(state);

    info!(
        version = %state.version,
        token_ttl_minutes = config.security.token_ttl_minutes,
        cors_origins = ?config.security.cors_origins,
        "Application state initialized"
    );

    let matrix = AccessControlMatrix::marketplace();
    info!(rules = matrix.rules().len(), "Access control matrix loaded");

    let app = build_app(state, matrix, &config.security.cors_origins).layer(
        TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_secs),
        ),
    );

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("{} 바인딩 실패", addr))?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("서버 실행 실패")?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Ctrl+C 또는 SIGTERM 시그널 대기.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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
}
