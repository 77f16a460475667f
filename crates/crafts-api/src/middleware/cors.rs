//! CORS 정책.
//!
//! 설정된 origin 목록만 자격 증명(credential)을 포함한 요청을 보낼 수 있습니다.

use std::time::Duration;

use axum::http::{
    header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE},
    HeaderValue, Method,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// CORS 레이어 구성.
///
/// 잘못된 origin 값은 건너뜁니다. 허용 origin이 하나도 없으면
/// 모든 교차 출처 요청이 거부됩니다.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        warn!("No valid CORS origins configured, cross-origin requests will be rejected");
    } else {
        info!("CORS configured with {} allowed origins", origins.len());
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE])
        .expose_headers([AUTHORIZATION])
        // preflight 요청 캐시 시간
        .max_age(Duration::from_secs(3600))
}
