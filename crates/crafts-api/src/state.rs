//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! 부팅 시 한 번 구성되며 이후 변경되지 않습니다.
//! 요청 간에 공유되는 가변 상태는 자격증명 저장소뿐입니다.

use std::sync::Arc;
use std::time::Duration;

use crafts_core::SecurityConfig;
use secrecy::ExposeSecret;
use tracing::info;

use crate::auth::{
    AuthenticationProvider, CredentialStore, PasswordError, PasswordHasher, Role, StoreError,
    StoredCredential, TokenService,
};

/// 상태 구성 에러.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("비밀번호 해셔 구성 실패: {0}")]
    Password(#[from] PasswordError),
    #[error("관리자 계정 등록 실패: {0}")]
    Bootstrap(#[from] StoreError),
    #[error("잘못된 토큰 유효 기간: {0}분")]
    InvalidTokenTtl(i64),
}

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 자격증명 저장소 (외부 협력자)
    pub credentials: Arc<dyn CredentialStore>,
    /// 비밀번호 해셔 (회원 가입 시 사용)
    pub hasher: PasswordHasher,
    /// 인증 제공자
    pub provider: Arc<AuthenticationProvider>,
    /// 토큰 서비스
    pub tokens: Arc<TokenService>,
    /// API 버전
    pub version: String,
}

impl AppState {
    /// 보안 설정과 저장소로 상태 생성.
    pub fn from_config(
        security: &SecurityConfig,
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, StateError> {
        let ttl = chrono::Duration::try_minutes(security.token_ttl_minutes)
            .filter(|ttl| *ttl > chrono::Duration::zero())
            .ok_or(StateError::InvalidTokenTtl(security.token_ttl_minutes))?;
        let hasher = PasswordHasher::new(&security.password)?;
        let provider = AuthenticationProvider::new(
            credentials.clone(),
            hasher.clone(),
            Duration::from_millis(security.credential_lookup_timeout_ms),
        )?;
        let tokens = TokenService::new(&security.jwt_secret, ttl);

        Ok(Self {
            credentials,
            hasher,
            provider: Arc::new(provider),
            tokens: Arc::new(tokens),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// 설정된 SUPER_ADMIN 계정 등록.
    ///
    /// 이미 존재하면 건너뜁니다.
    pub async fn bootstrap_admin(&self, security: &SecurityConfig) -> Result<(), StateError> {
        let Some(admin) = &security.bootstrap_admin else {
            return Ok(());
        };

        let hash = self
            .hasher
            .hash_blocking(admin.password.expose_secret())
            .await?;
        let credential = StoredCredential::new(&admin.username, hash, [Role::SuperAdmin]);

        match self.credentials.register(credential).await {
            Ok(()) => {
                info!(username = %admin.username, "Bootstrap admin registered");
                Ok(())
            }
            Err(StoreError::Duplicate(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) fn create_test_state() -> AppState {
    use crafts_core::PasswordCostConfig;

    let security = SecurityConfig {
        password: PasswordCostConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        ..SecurityConfig::default()
    };
    AppState::from_config(
        &security,
        Arc::new(crate::auth::InMemoryCredentialStore::new()),
    )
    .unwrap()
}
