//! 비밀번호 해싱.
//!
//! Argon2id 기반 단방향 해싱 및 검증.

use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use crafts_core::PasswordCostConfig;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    /// 저장된 해시가 손상됨. 데이터 무결성 문제이므로 재시도하지 않습니다.
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
    #[error("잘못된 해싱 비용 설정: {0}")]
    InvalidCost(String),
    #[error("해싱 작업 실행 실패: {0}")]
    TaskFailed(String),
}

/// Argon2id 비밀번호 해셔.
///
/// 비용 파라미터는 부팅 시 고정됩니다. 해싱할 때마다 새 솔트를
/// 생성하므로 같은 평문이라도 매번 다른 해시가 나옵니다.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// 비용 설정으로 해셔 생성.
    pub fn new(cost: &PasswordCostConfig) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| PasswordError::InvalidCost(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// 비밀번호 해싱.
    ///
    /// PHC 형식 문자열(`$argon2id$v=19$m=...`)을 반환합니다.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|_| PasswordError::HashingFailed)?;

        Ok(hash.to_string())
    }

    /// 비밀번호 검증.
    ///
    /// 일치 여부를 반환합니다. 저장된 해시를 파싱할 수 없으면
    /// `InvalidHashFormat` 에러입니다. 검증 비용은 해시에 기록된
    /// 파라미터를 따릅니다.
    pub fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

        match self.argon2.verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(_) => Err(PasswordError::InvalidHashFormat),
        }
    }
}

impl PasswordHasher {
    /// blocking thread pool에서 해싱.
    ///
    /// CPU-intensive 해싱을 `spawn_blocking`으로 별도 thread pool에서 실행하여
    /// async worker thread를 블로킹하지 않습니다.
    pub async fn hash_blocking(&self, plaintext: &str) -> Result<String, PasswordError> {
        let hasher = self.clone();
        let plaintext = plaintext.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| PasswordError::TaskFailed(e.to_string()))?
    }

    /// blocking thread pool에서 검증.
    pub async fn verify_blocking(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        let plaintext = plaintext.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash))
            .await
            .map_err(|e| PasswordError::TaskFailed(e.to_string()))?
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

/// 비밀번호 강도 검증.
///
/// - 최소 8자 이상
/// - 최소 1개의 숫자 포함
/// - 최소 1개의 영문자 포함
pub fn validate_password_strength(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long");
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit");
    }

    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("Password must contain at least one letter");
    }

    Ok(())
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    // 테스트 속도를 위한 최소 비용
    PasswordHasher::new(&PasswordCostConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}
