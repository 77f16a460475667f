//! 자격증명 검증.
//!
//! 식별자/비밀번호 쌍을 저장소와 해셔로 검증해 Principal을 만듭니다.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use super::{CredentialStore, PasswordError, PasswordHasher, Principal, StoreError};

/// 인증 실패.
///
/// 외부에는 항상 같은 일반 메시지로 노출됩니다.
/// 세부 원인은 로그로만 남깁니다.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    /// 알 수 없는 식별자, 비밀번호 불일치, 비활성 계정, 조회 타임아웃
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// 저장된 해시 손상
    #[error("Invalid credentials")]
    CredentialFormat(#[source] PasswordError),
    /// 저장소 장애
    #[error("Invalid credentials")]
    Store(#[source] StoreError),
}

/// 인증 제공자.
pub struct AuthenticationProvider {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    lookup_timeout: Duration,
    // 존재하지 않는 사용자도 같은 비용으로 검증하기 위한 해시
    dummy_hash: String,
}

impl AuthenticationProvider {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        lookup_timeout: Duration,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = hasher.hash("timing-equalizer-password")?;

        Ok(Self {
            store,
            hasher,
            lookup_timeout,
            dummy_hash,
        })
    }

    /// 식별자와 평문 비밀번호로 인증.
    ///
    /// 저장소는 시도당 최대 한 번, `lookup_timeout` 이내로만 조회합니다.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Principal, AuthenticationError> {
        let lookup = tokio::time::timeout(self.lookup_timeout, self.store.lookup(username)).await;

        let credential = match lookup {
            Ok(Ok(credential)) => credential,
            Ok(Err(e)) => {
                warn!(username = %username, error = %e, "Credential lookup failed");
                return Err(AuthenticationError::Store(e));
            }
            Err(_) => {
                warn!(
                    username = %username,
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "Credential lookup timed out"
                );
                return Err(AuthenticationError::InvalidCredentials);
            }
        };

        let Some(credential) = credential else {
            let _ = self.hasher.verify_blocking(password, &self.dummy_hash).await;
            warn!(username = %username, "Authentication failed");
            return Err(AuthenticationError::InvalidCredentials);
        };

        let matches = self
            .hasher
            .verify_blocking(password, &credential.password_hash)
            .await
            .map_err(|e| {
                error!(
                    username = %username,
                    error = %e,
                    "Password verification failed"
                );
                AuthenticationError::CredentialFormat(e)
            })?;

        if !matches || !credential.active {
            warn!(username = %username, active = credential.active, "Authentication failed");
            return Err(AuthenticationError::InvalidCredentials);
        }

        Principal::new(credential.username, credential.roles).ok_or_else(|| {
            error!(username = %username, "Stored credential has no roles");
            AuthenticationError::InvalidCredentials
        })
    }
}

impl std::fmt::Debug for AuthenticationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationProvider")
            .field("lookup_timeout", &self.lookup_timeout)
            .finish_non_exhaustive()
    }
}
