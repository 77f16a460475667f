//! 설정 관리.
//!
//! 기본값 → TOML 파일(선택) → `CRAFTS__` 접두사 환경 변수 순서로 병합합니다.
//! 부팅 시 한 번 로드되며 이후에는 변경되지 않습니다.

use std::path::Path;

use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use crate::logging::LogFormat;

/// 개발용 기본 JWT 시크릿. 운영 환경에서는 반드시 교체해야 합니다.
pub const DEV_JWT_SECRET: &str = "dev-secret-key-change-in-production";

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 토큰 유효 기간 상한 (분, 30일).
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 30;

/// 애플리케이션 설정.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 인증/인가 설정
    #[serde(default)]
    pub security: SecurityConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 전체 타임아웃 (초)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 인증/인가 설정.
#[derive(Debug, Deserialize)]
pub struct SecurityConfig {
    /// 토큰 서명 키 (HS256)
    #[serde(default = "default_jwt_secret", deserialize_with = "deserialize_secret")]
    pub jwt_secret: SecretString,
    /// 토큰 유효 기간 (분)
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
    /// 비밀번호 해싱 비용
    #[serde(default)]
    pub password: PasswordCostConfig,
    /// 자격증명 조회 타임아웃 (밀리초)
    #[serde(default = "default_lookup_timeout_ms")]
    pub credential_lookup_timeout_ms: u64,
    /// credential 요청을 허용할 origin 목록
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// 부팅 시 등록할 SUPER_ADMIN 계정 (선택)
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_minutes: default_token_ttl_minutes(),
            password: PasswordCostConfig::default(),
            credential_lookup_timeout_ms: default_lookup_timeout_ms(),
            cors_origins: default_cors_origins(),
            bootstrap_admin: None,
        }
    }
}

impl SecurityConfig {
    /// 개발용 기본 시크릿을 그대로 쓰고 있는지 확인.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret.expose_secret() == DEV_JWT_SECRET
    }
}

/// Argon2id 비용 파라미터.
///
/// 요청마다 바꿀 수 없는 고정값이며 기본값은 OWASP 권장치입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PasswordCostConfig {
    /// 메모리 비용 (KiB)
    pub memory_kib: u32,
    /// 반복 횟수
    pub iterations: u32,
    /// 병렬도
    pub parallelism: u32,
}

impl Default for PasswordCostConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// 부팅 시 생성할 관리자 계정.
#[derive(Debug, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    #[serde(deserialize_with = "deserialize_secret")]
    pub password: SecretString,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨 필터
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 출력 형식
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

fn default_log_level() -> String {
    "crafts_api=info,tower_http=info".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_jwt_secret() -> SecretString {
    SecretString::new(DEV_JWT_SECRET.into())
}

fn default_token_ttl_minutes() -> i64 {
    600
}

fn default_lookup_timeout_ms() -> u64 {
    3_000
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(SecretString::new(raw.into()))
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Self::environment());

        Self::finish(builder.build()?)
    }

    /// `CRAFTS_CONFIG` 경로 또는 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path =
            std::env::var("CRAFTS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    /// TOML 문자열에서 설정을 로드합니다. 환경 변수는 적용하지 않습니다.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?.add_source(File::from_str(toml, FileFormat::Toml));
        Self::finish(builder.build()?)
    }

    fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)
    }

    fn environment() -> Environment {
        Environment::with_prefix("CRAFTS")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("security.cors_origins")
    }

    fn finish(config: Config) -> Result<Self, ConfigError> {
        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 값 범위를 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.expose_secret().is_empty() {
            return Err(ConfigError::Message(
                "security.jwt_secret must not be empty".to_string(),
            ));
        }
        if self.security.token_ttl_minutes <= 0 {
            return Err(ConfigError::Message(
                "security.token_ttl_minutes must be positive".to_string(),
            ));
        }
        if self.security.token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
            return Err(ConfigError::Message(format!(
                "security.token_ttl_minutes must not exceed {}",
                MAX_TOKEN_TTL_MINUTES
            )));
        }
        if self.security.credential_lookup_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "security.credential_lookup_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
