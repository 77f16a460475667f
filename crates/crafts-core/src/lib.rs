//! # Crafts Core
//!
//! 마켓플레이스 백엔드 전반에서 사용하는 공통 인프라를 제공합니다:
//! - 설정 관리 (기본값, TOML 파일, 환경 변수)
//! - 로깅 초기화

pub mod config;
pub mod logging;

pub use config::{
    AppConfig, BootstrapAdmin, LoggingConfig, PasswordCostConfig, SecurityConfig, ServerConfig,
    MAX_TOKEN_TTL_MINUTES,
};
pub use logging::{init_logging, LogConfig, LogFormat};
