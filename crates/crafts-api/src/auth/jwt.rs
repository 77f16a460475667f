//! JWT 토큰 발급/검증.
//!
//! 토큰은 서버에 저장되지 않습니다. 유효성은 서명과 만료 시각만으로
//! 판단하며, 검증 경로에서 자격증명 저장소를 조회하지 않습니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{Principal, Role};

/// JWT 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 식별자
    pub sub: String,
    /// 발급 시점의 역할 스냅샷
    pub roles: Vec<Role>,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// JWT ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// `issued_at` 기준으로 Claims 생성.
    ///
    /// 만료 시각이 표현 범위를 넘으면 `ExpiryOutOfRange`입니다.
    pub fn new(
        principal: &Principal,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(TokenError::ExpiryOutOfRange)?;

        Ok(Self {
            sub: principal.username.clone(),
            roles: principal.roles.iter().copied().collect(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Some(uuid::Uuid::new_v4().to_string()),
        })
    }

    /// `now` 시점에 만료되었는지 확인.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }

    /// 토큰 내용만으로 Principal 복원.
    pub fn principal(&self) -> Option<Principal> {
        Principal::new(self.sub.clone(), self.roles.iter().copied())
    }
}

/// 발급된 토큰.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// 인코딩된 JWT
    pub access_token: String,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
    /// 만료까지 남은 시간 (초)
    pub expires_in: i64,
}

/// JWT 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("토큰 만료 시각이 범위를 벗어났습니다")]
    ExpiryOutOfRange,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("잘못된 토큰 형식")]
    TokenMalformed,
}

/// 토큰 발급/검증 서비스.
///
/// 서명 키는 부팅 시 한 번 로드되고 이후 변경되지 않습니다.
/// 내부 상태가 불변이므로 동기화 없이 여러 요청에서 동시에 사용할 수 있습니다.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// 비밀 키와 토큰 유효 기간으로 서비스 생성.
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let secret = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        // 만료는 주입된 시각 기준으로 직접 검사
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// 토큰 유효 기간.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 현재 시각 기준으로 토큰 발급.
    pub fn issue(&self, principal: &Principal) -> Result<IssuedToken, TokenError> {
        self.issue_at(principal, Utc::now())
    }

    /// 주어진 시각 기준으로 토큰 발급.
    pub fn issue_at(
        &self,
        principal: &Principal,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let claims = Claims::new(principal, issued_at, self.ttl)?;
        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.ttl.num_seconds(),
        })
    }

    /// 현재 시각 기준으로 토큰 검증.
    pub fn validate(&self, token: &str) -> Result<Principal, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// 주어진 시각 기준으로 토큰 검증.
    ///
    /// 서명 불일치, 구조 손상, 빈 역할 집합은 `TokenMalformed`,
    /// `now > exp`이면 `TokenExpired`입니다.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::TokenMalformed)?;

        if data.claims.is_expired_at(now) {
            return Err(TokenError::TokenExpired);
        }

        data.claims.principal().ok_or(TokenError::TokenMalformed)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
