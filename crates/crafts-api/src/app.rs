//! 애플리케이션 라우터 조립.
//!
//! 요청 처리 순서 (바깥 → 안):
//! CORS → 요청 트레이싱 → 보안 경계 (인증 필터 → 접근 제어) → 라우트

use std::sync::Arc;

use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::auth::AccessControlMatrix;
use crate::middleware::{cors_layer, security_middleware, SecurityBoundary};
use crate::routes::create_api_router;
use crate::state::AppState;

/// 상태, 접근 정책, CORS origin으로 전체 라우터 생성.
pub fn build_app(state: Arc<AppState>, matrix: AccessControlMatrix, cors_origins: &[String]) -> Router {
    let boundary = Arc::new(SecurityBoundary::new(state.tokens.clone(), matrix));

    create_api_router()
        .with_state(state)
        .layer(middleware::from_fn_with_state(boundary, security_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}
