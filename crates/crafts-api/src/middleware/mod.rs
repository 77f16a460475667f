//! API 서버용 HTTP middleware.
//!
//! 요청 처리 파이프라인에 적용되는 middleware 모듈.

mod cors;
mod security;

pub use cors::cors_layer;
pub use security::{security_middleware, SecurityBoundary};
