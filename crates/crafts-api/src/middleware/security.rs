//! 보안 경계 middleware.
//!
//! 인증 필터 → 접근 제어 매트릭스 순서로 요청을 처리합니다.
//! 거부되면 401/403 고정 응답을 반환하고, 허용되면 [`RequestContext`]를
//! 요청 확장에 실어 다음 핸들러로 넘깁니다.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::auth::{
    AccessControlMatrix, AccessDenied, AuthenticationFilter, Decision, RequestContext,
    TokenService,
};

/// 인증 필터와 접근 제어 매트릭스의 조합.
#[derive(Debug, Clone)]
pub struct SecurityBoundary {
    filter: AuthenticationFilter,
    matrix: Arc<AccessControlMatrix>,
}

impl SecurityBoundary {
    pub fn new(tokens: Arc<TokenService>, matrix: AccessControlMatrix) -> Self {
        Self {
            filter: AuthenticationFilter::new(tokens),
            matrix: Arc::new(matrix),
        }
    }

    pub fn matrix(&self) -> &AccessControlMatrix {
        &self.matrix
    }

    /// 요청 하나에 대한 인증 + 인가.
    pub fn check(&self, headers: &HeaderMap, path: &str) -> Result<RequestContext, AccessDenied> {
        let ctx = self.filter.resolve(headers, path);

        match self.matrix.evaluate(path, ctx.principal()) {
            Decision::Allow => Ok(ctx),
            Decision::DenyUnauthenticated => {
                debug!(path = %path, "Access denied: authentication required");
                Err(AccessDenied::Unauthenticated)
            }
            Decision::DenyForbidden => {
                debug!(
                    path = %path,
                    username = ctx.principal().map(|p| p.username.as_str()).unwrap_or_default(),
                    "Access denied: insufficient role"
                );
                Err(AccessDenied::Forbidden)
            }
        }
    }
}

/// 보안 경계 middleware 함수.
///
/// ```rust,ignore
/// let app = router.layer(middleware::from_fn_with_state(boundary, security_middleware));
/// ```
pub async fn security_middleware(
    State(boundary): State<Arc<SecurityBoundary>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    match boundary.check(request.headers(), &path) {
        Ok(ctx) => {
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Err(denied) => denied.into_response(),
    }
}
