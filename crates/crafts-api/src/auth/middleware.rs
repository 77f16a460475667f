//! 요청별 인증 필터 및 Axum 추출기.
//!
//! 필터는 라우트와 무관하게 토큰만 해석해 [`RequestContext`]를 채웁니다.
//! 토큰이 없거나 유효하지 않으면 익명 요청으로 계속 진행하며,
//! 거부 여부는 이후 접근 제어 매트릭스가 결정합니다.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::debug;

use super::{AccessDenied, Principal, TokenError, TokenService};

/// 요청 단위 인증 상태.
///
/// 요청 진입 시 생성되어 요청 확장(extensions)에 실리고, 요청이 끝나면 버려집니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// 토큰으로 확인된 주체 (익명이면 None)
    pub principal: Option<Principal>,
    /// 요청 경로
    pub path: String,
}

impl RequestContext {
    pub fn anonymous(path: impl Into<String>) -> Self {
        Self {
            principal: None,
            path: path.into(),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

/// `Authorization: Bearer <token>` 헤더에서 토큰 추출.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// 인증 필터.
///
/// 요청마다 정확히 한 번, 라우트별 인가 판단보다 먼저 실행됩니다.
#[derive(Debug, Clone)]
pub struct AuthenticationFilter {
    tokens: Arc<TokenService>,
}

impl AuthenticationFilter {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// 헤더와 경로로 RequestContext 생성.
    pub fn resolve(&self, headers: &HeaderMap, path: &str) -> RequestContext {
        let Some(token) = bearer_token(headers) else {
            return RequestContext::anonymous(path);
        };

        match self.tokens.validate(token) {
            Ok(principal) => RequestContext {
                principal: Some(principal),
                path: path.to_string(),
            },
            Err(e) => {
                let reason = match e {
                    TokenError::TokenExpired => "expired",
                    _ => "malformed",
                };
                debug!(path = %path, reason, "Bearer token rejected, continuing as anonymous");
                RequestContext::anonymous(path)
            }
        }
    }
}

/// 인증된 주체 추출기.
///
/// 보안 경계를 통과한 요청에서 사용합니다. 주체가 없으면 401입니다.
///
/// ```rust,ignore
/// async fn profile(CurrentPrincipal(principal): CurrentPrincipal) -> impl IntoResponse {
///     format!("Hello, {}!", principal.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Principal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AccessDenied;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .and_then(|ctx| ctx.principal.clone())
            .map(CurrentPrincipal)
            .ok_or(AccessDenied::Unauthenticated)
    }
}

/// 선택적 주체 추출기.
///
/// 공개 라우트에서 로그인 여부에 따라 응답을 달리할 때 사용합니다.
#[derive(Debug, Clone)]
pub struct OptionalPrincipal(pub Option<Principal>);

impl<S> FromRequestParts<S> for OptionalPrincipal
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalPrincipal(
            parts
                .extensions
                .get::<RequestContext>()
                .and_then(|ctx| ctx.principal.clone()),
        ))
    }
}
