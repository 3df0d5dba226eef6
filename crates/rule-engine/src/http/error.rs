//! HTTP 错误响应
//!
//! 将 `RuleError` 映射为统一的错误响应体和状态码

use crate::error::RuleError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("参数验证失败: {0}")]
    Validation(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Rule(err) => match err {
                RuleError::Parse(_)
                | RuleError::MalformedOperand { .. }
                | RuleError::TypeMismatch { .. }
                | RuleError::EmptyCombination
                | RuleError::TreeTooDeep { .. } => StatusCode::BAD_REQUEST,
                RuleError::NotFound(_) => StatusCode::NOT_FOUND,
                RuleError::MalformedTree(_) => StatusCode::UNPROCESSABLE_ENTITY,
                RuleError::Database(_) | RuleError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Rule(err) => err.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Rule(RuleError::Database(e)) => {
                tracing::error!(error = %e, "Database operation failed");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Rule(RuleError::Json(e)) => {
                tracing::error!(error = %e, "JSON encoding failed");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
