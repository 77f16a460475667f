//! 인증 및 권한 부여.
//!
//! 상태 없는 JWT 인증과 경로 기반 역할 접근 제어(RBAC)를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`PasswordHasher`]: Argon2id 비밀번호 해싱/검증
//! - [`CredentialStore`]: 자격증명 조회 인터페이스 (외부 협력자)
//! - [`AuthenticationProvider`]: 식별자/비밀번호 검증
//! - [`TokenService`]: JWT 발급/검증
//! - [`AuthenticationFilter`]: 요청별 토큰 해석 → [`RequestContext`]
//! - [`AccessControlMatrix`]: 경로별 접근 규칙 평가
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn profile(CurrentPrincipal(principal): CurrentPrincipal) -> impl IntoResponse {
//!     format!("Hello, {}!", principal.username)
//! }
//! ```

mod access;
mod jwt;
mod middleware;
mod password;
mod provider;
mod roles;
mod store;

pub use crate::error::AccessDenied;
pub use access::{
    AccessControlMatrix, AccessControlMatrixBuilder, AccessMode, AccessRule, Decision,
    PathPattern,
};
pub use jwt::{Claims, IssuedToken, TokenError, TokenService};
pub use middleware::{
    bearer_token, AuthenticationFilter, CurrentPrincipal, OptionalPrincipal, RequestContext,
};
pub use password::{validate_password_strength, PasswordError, PasswordHasher};
pub use provider::{AuthenticationError, AuthenticationProvider};
pub use roles::{Principal, Role};
pub use store::{CredentialStore, InMemoryCredentialStore, StoreError, StoredCredential};

#[cfg(test)]
pub(crate) use password::test_hasher;
