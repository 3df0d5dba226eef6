//! 规则引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("规则解析失败: {0}")]
    Parse(String),

    #[error("规则树结构损坏: {0}")]
    MalformedTree(String),

    #[error("无效的比较条件 '{operand}': {reason}")]
    MalformedOperand { operand: String, reason: String },

    #[error("类型不匹配: 字段 '{field}' 期望 {expected}, 实际 {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("规则未找到: {0}")]
    NotFound(String),

    #[error("合并规则时至少需要一条规则")]
    EmptyCombination,

    #[error("规则树深度 {depth} 超过上限 {max}")]
    TreeTooDeep { depth: usize, max: usize },

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}

impl RuleError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "PARSE_ERROR",
            Self::MalformedTree(_) => "MALFORMED_TREE",
            Self::MalformedOperand { .. } => "MALFORMED_OPERAND",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::NotFound(_) => "RULE_NOT_FOUND",
            Self::EmptyCombination => "EMPTY_COMBINATION",
            Self::TreeTooDeep { .. } => "TREE_TOO_DEEP",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    pub(crate) fn malformed_operand(operand: &str, reason: impl Into<String>) -> Self {
        Self::MalformedOperand {
            operand: operand.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(RuleError::Parse("x".into()).code(), "PARSE_ERROR");
        assert_eq!(RuleError::EmptyCombination.code(), "EMPTY_COMBINATION");
        assert_eq!(RuleError::NotFound("r1".into()).code(), "RULE_NOT_FOUND");
        assert_eq!(
            RuleError::malformed_operand("age >", "need 3 fields").code(),
            "MALFORMED_OPERAND"
        );
        let deep = RuleError::TreeTooDeep { depth: 600, max: 512 };
        assert_eq!(deep.code(), "TREE_TOO_DEEP");
        assert!(deep.to_string().contains("600"));
    }

    #[test]
    fn test_display_contains_operand() {
        let err = RuleError::malformed_operand("age >= 30", "unknown operator");
        assert!(err.to_string().contains("age >= 30"));
    }
}
