//! 마켓플레이스 REST API 인증/인가 코어.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Argon2id 비밀번호 해싱과 자격증명 검증
//! - 상태 없는 JWT 발급/검증
//! - 요청별 인증 필터와 경로 기반 역할 접근 제어
//! - CORS 정책과 401/403 고정 응답을 포함한 보안 경계
//!
//! # 모듈 구성
//!
//! - [`auth`]: 인증 및 권한 관리
//! - [`middleware`]: 보안 경계 및 CORS middleware
//! - [`routes`]: 인증 endpoint
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`app`]: 라우터 조립

pub mod app;
pub mod auth;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use app::build_app;
pub use auth::{
    AccessControlMatrix, CurrentPrincipal, Decision, Principal, RequestContext, Role,
    TokenService,
};
pub use error::{AccessDenied, ApiError, ApiErrorResponse, ApiResult};
pub use middleware::SecurityBoundary;
pub use state::AppState;
