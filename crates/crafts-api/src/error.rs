//! API 에러 응답 타입.
//!
//! 인증/인가 거부는 [`AccessDenied`]의 두 가지 고정 응답만 사용합니다.
//! 그 밖의 API 에러는 [`ApiErrorResponse`] 형식을 따릅니다.

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// 401 응답 본문.
pub const UNAUTHORIZED_BODY: &str = r#"{"error": "Unauthorized - Authentication required"}"#;

/// 403 응답 본문.
pub const FORBIDDEN_BODY: &str = r#"{"error": "Access Denied - You don't have permission"}"#;

/// 인증/인가 거부.
///
/// 내부 원인(토큰 만료, 사용자 없음, 비밀번호 불일치 등)은 응답에 드러나지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("Unauthorized - Authentication required")]
    Unauthenticated,
    #[error("Access Denied - You don't have permission")]
    Forbidden,
}

impl AccessDenied {
    pub fn status(&self) -> StatusCode {
        match self {
            AccessDenied::Unauthenticated => StatusCode::UNAUTHORIZED,
            AccessDenied::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    /// 응답 본문 (JSON).
    pub fn body(&self) -> &'static str {
        match self {
            AccessDenied::Unauthenticated => UNAUTHORIZED_BODY,
            AccessDenied::Forbidden => FORBIDDEN_BODY,
        }
    }
}

impl IntoResponse for AccessDenied {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            self.body(),
        )
            .into_response()
    }
}

/// 일반 API 에러 응답.
///
/// ```json
/// {
///   "code": "USER_EXISTS",
///   "message": "Username is already taken",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_INPUT", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }
}

/// 핸들러 에러.
#[derive(Debug)]
pub enum ApiError {
    Denied(AccessDenied),
    Status(StatusCode, ApiErrorResponse),
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        ApiError::Status(status, ApiErrorResponse::new(code, message))
    }
}

impl From<AccessDenied> for ApiError {
    fn from(denied: AccessDenied) -> Self {
        ApiError::Denied(denied)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Denied(denied) => denied.into_response(),
            ApiError::Status(status, body) => (status, Json(body)).into_response(),
        }
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;
