//! 인증 endpoint.
//!
//! - `POST /auth/register`: 회원 가입 (USER 역할)
//! - `POST /auth/login`: 로그인 → 토큰 발급
//! - `GET /auth/userinfo`: 현재 주체 조회

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::auth::{
    validate_password_strength, AccessDenied, CurrentPrincipal, IssuedToken, Principal, Role,
    StoreError, StoredCredential,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// 로그인/회원 가입 요청.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// 주체 조회 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct PrincipalResponse {
    pub username: String,
    pub roles: Vec<Role>,
}

impl From<Principal> for PrincipalResponse {
    fn from(principal: Principal) -> Self {
        Self {
            username: principal.username,
            roles: principal.roles.into_iter().collect(),
        }
    }
}

/// 인증 라우터.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/userinfo", get(userinfo))
}

/// 회원 가입.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "INVALID_INPUT",
            "Username must not be empty",
        ));
    }
    validate_password_strength(&request.password)
        .map_err(|msg| ApiError::new(StatusCode::BAD_REQUEST, "WEAK_PASSWORD", msg))?;

    let hash = state.hasher.hash_blocking(&request.password).await.map_err(|e| {
        error!(error = %e, "Password hashing failed");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Registration failed",
        )
    })?;

    let credential = StoredCredential::new(username, hash, [Role::User]);

    match state.credentials.register(credential).await {
        Ok(()) => {}
        Err(StoreError::Duplicate(_)) => {
            return Err(ApiError::new(
                StatusCode::CONFLICT,
                "USER_EXISTS",
                "Username is already taken",
            ));
        }
        Err(e) => {
            error!(error = %e, "Credential registration failed");
            return Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Registration failed",
            ));
        }
    }

    info!(username = %username, "User registered");
    let body = PrincipalResponse {
        username: username.to_string(),
        roles: vec![Role::User],
    };
    Ok((StatusCode::CREATED, Json(body)))
}

/// 로그인.
///
/// 실패 원인과 관계없이 동일한 401 응답을 반환합니다.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    let principal = state
        .provider
        .authenticate(&request.username, &request.password)
        .await
        .map_err(|_| AccessDenied::Unauthenticated)?;

    let issued: IssuedToken = state.tokens.issue(&principal).map_err(|e| {
        error!(error = %e, "Token issuance failed");
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Login failed",
        )
    })?;

    let header = HeaderValue::from_str(&format!("Bearer {}", issued.access_token)).map_err(|_| {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Login failed",
        )
    })?;

    info!(username = %principal.username, "User logged in");
    Ok(([(AUTHORIZATION, header)], Json(issued)))
}

/// 현재 주체 조회.
pub async fn userinfo(CurrentPrincipal(principal): CurrentPrincipal) -> Json<PrincipalResponse> {
    Json(principal.into())
}
