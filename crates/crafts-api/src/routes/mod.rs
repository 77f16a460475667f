//! REST API 라우트.
//!
//! 인증 코어가 직접 처리하는 endpoint만 포함합니다.
//! 상점/상품 라우트는 별도 서비스가 담당하며, 여기서는 접근 제어만 적용됩니다.

pub mod auth;

use std::sync::Arc;

use axum::{http::StatusCode, Json, Router};

pub use auth::{auth_router, CredentialsRequest, PrincipalResponse};

use crate::error::ApiErrorResponse;
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 일치하는 라우트가 없는 요청도 보안 경계를 거치도록 fallback을 명시합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new().merge(auth_router()).fallback(not_found)
}

async fn not_found() -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiErrorResponse::new("NOT_FOUND", "Resource not found")),
    )
}
