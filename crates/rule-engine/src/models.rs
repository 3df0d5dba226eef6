//! 规则引擎领域模型

use crate::error::{Result, RuleError};
use crate::operators::Comparator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 持久化的规则文档
///
/// `rule_string` 与 `ast` 始终描述同一个表达式，修改时两者一起替换。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    pub id: String,
    pub rule_string: String,
    /// 序列化后的语法树
    pub ast: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 待写入的新规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRule {
    pub rule_string: String,
    pub ast: String,
}

/// 规则修改内容，整体替换文本和语法树
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulePatch {
    pub rule_string: String,
    pub ast: String,
}

/// 比较条件右侧的字面量
///
/// 全部由 ASCII 数字组成时为整数，否则去掉一对外层单引号后作为字符串。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Integer(i64),
    String(String),
}

impl Literal {
    pub fn parse(raw: &str) -> std::result::Result<Self, String> {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            return raw
                .parse()
                .map(Self::Integer)
                .map_err(|_| format!("整数字面量超出范围: {}", raw));
        }

        let unquoted = raw
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))
            .unwrap_or(raw);
        Ok(Self::String(unquoted.to_string()))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "'{}'", s),
        }
    }
}

/// 解析后的比较条件 `<field> <op> <literal>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub field: String,
    pub comparator: Comparator,
    pub literal: Literal,
}

impl Comparison {
    /// 解析条件节点文本，必须恰好是三个以空白分隔的片段
    pub fn parse(operand: &str) -> Result<Self> {
        let parts: Vec<&str> = operand.split_whitespace().collect();
        let [field, symbol, raw] = parts.as_slice() else {
            return Err(RuleError::malformed_operand(
                operand,
                format!("需要 3 个片段（字段 操作符 值），实际 {} 个", parts.len()),
            ));
        };

        let comparator = Comparator::from_symbol(symbol).ok_or_else(|| {
            RuleError::malformed_operand(operand, format!("不支持的比较操作符 '{}'", symbol))
        })?;

        let literal = Literal::parse(raw).map_err(|reason| RuleError::malformed_operand(operand, reason))?;

        Ok(Self {
            field: field.to_string(),
            comparator,
            literal,
        })
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.comparator, self.literal)
    }
}

/// 评估上下文 - 提供给规则引擎的输入记录
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    data: Map<String, Value>,
}

impl EvaluationContext {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// 从 JSON 值创建，只接受对象
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(data) => Ok(Self { data }),
            other => Err(RuleError::TypeMismatch {
                field: "<record>".to_string(),
                expected: "object".to_string(),
                actual: value_type_name(Some(&other)).to_string(),
            }),
        }
    }

    /// 获取字段值，字段名按原样匹配
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

impl From<Map<String, Value>> for EvaluationContext {
    fn from(data: Map<String, Value>) -> Self {
        Self::new(data)
    }
}

/// 获取值的类型名称，字段缺失时为 "missing"
pub(crate) fn value_type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "missing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

/// 评估结果
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub matched: bool,
    pub matched_conditions: Vec<String>,
    pub evaluation_trace: Vec<String>,
    pub evaluation_time_ms: i64,
}

impl EvaluationResult {
    pub fn new() -> Self {
        Self {
            matched: false,
            matched_conditions: Vec::new(),
            evaluation_trace: Vec::new(),
            evaluation_time_ms: 0,
        }
    }
}

impl Default for EvaluationResult {
    fn default() -> Self {
        Self::new()
    }
}
