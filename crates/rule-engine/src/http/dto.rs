//! HTTP 请求与响应 DTO

use crate::models::{EvaluationResult, RuleDocument};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRuleRequest {
    #[validate(length(max = 4096, message = "规则文本过长"))]
    pub rule_string: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CombineRulesRequest {
    /// 为空时由服务层返回 EMPTY_COMBINATION
    #[validate(
        length(max = 256, message = "一次最多合并 256 条规则"),
        custom(function = "validate_rule_ids")
    )]
    pub rule_ids: Vec<String>,
}

/// 每个 ID 去掉首尾空白后都不能为空
fn validate_rule_ids(ids: &[String]) -> Result<(), ValidationError> {
    if ids.iter().any(|id| id.trim().is_empty()) {
        return Err(ValidationError::new("blank_rule_id")
            .with_message(Cow::Borrowed("rule_ids 中不能包含空 ID")));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct EvaluateRuleRequest {
    #[validate(length(min = 1, message = "rule_id 不能为空"))]
    pub rule_id: String,
    pub data: Map<String, Value>,
    /// 是否返回条件级别的评估追踪
    #[serde(default)]
    pub trace: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ModifyRuleRequest {
    #[validate(length(min = 1, message = "rule_id 不能为空"))]
    pub rule_id: String,
    #[validate(length(max = 4096, message = "规则文本过长"))]
    pub new_rule_string: String,
}

/// API 统一响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    /// 创建成功响应（无数据）
    pub fn success_empty() -> ApiResponse<()> {
        ApiResponse {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RuleCreatedDto {
    pub id: String,
    pub ast: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluationDto {
    pub result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_conditions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<String>>,
}

impl EvaluationDto {
    pub fn plain(result: bool) -> Self {
        Self {
            result,
            matched_conditions: None,
            trace: None,
        }
    }
}

impl From<EvaluationResult> for EvaluationDto {
    fn from(r: EvaluationResult) -> Self {
        Self {
            result: r.matched,
            matched_conditions: Some(r.matched_conditions),
            trace: Some(r.evaluation_trace),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RuleDto {
    pub id: String,
    pub rule_string: String,
    pub ast: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RuleDocument> for RuleDto {
    fn from(doc: RuleDocument) -> Self {
        Self {
            id: doc.id,
            rule_string: doc.rule_string,
            ast: doc.ast,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_string_length_limit() {
        let ok = CreateRuleRequest {
            rule_string: "age > 30".to_string(),
        };
        assert!(ok.validate().is_ok());

        let too_long = CreateRuleRequest {
            rule_string: "a".repeat(4097),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_combine_request_rejects_blank_ids() {
        let ok = CombineRulesRequest {
            rule_ids: vec!["r1".to_string(), "r2".to_string()],
        };
        assert!(ok.validate().is_ok());

        // 空列表交给服务层返回 EMPTY_COMBINATION
        let empty = CombineRulesRequest { rule_ids: vec![] };
        assert!(empty.validate().is_ok());

        for ids in [vec![""], vec!["r1", "   "]] {
            let req = CombineRulesRequest {
                rule_ids: ids.into_iter().map(String::from).collect(),
            };
            let errors = req.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("rule_ids"));
        }
    }

    #[test]
    fn test_evaluate_request_defaults() {
        let req: EvaluateRuleRequest =
            serde_json::from_str(r#"{"rule_id": "r1", "data": {"age": 30}}"#).unwrap();
        assert!(!req.trace);
        assert!(req.validate().is_ok());

        let empty: EvaluateRuleRequest =
            serde_json::from_str(r#"{"rule_id": "", "data": {}}"#).unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_empty_response_omits_data() {
        let json = serde_json::to_value(ApiResponse::<()>::success_empty()).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("data").is_none());
    }
}
