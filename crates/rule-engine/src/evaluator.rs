//! 规则求值
//!
//! 递归遍历语法树，先左后右短路求值。比较语义：
//! - `>` / `<`：数值与整数字面量按数值比较，字符串与字符串字面量按字典序比较，
//!   其他组合（包括字段缺失和 null）返回 `TypeMismatch`；
//! - `=`：不做类型转换，类型不同（包括字段缺失）直接为 false。

use crate::ast::Node;
use crate::error::{Result, RuleError};
use crate::models::{Comparison, EvaluationContext, EvaluationResult, Literal, value_type_name};
use crate::operators::{Comparator, LogicalOperator};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::time::Instant;

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估单个比较条件
    ///
    /// # Arguments
    /// * `comparison` - 解析后的比较条件
    /// * `field_value` - 从输入记录中取得的字段值，缺失时为 `None`
    pub fn evaluate(comparison: &Comparison, field_value: Option<&Value>) -> Result<bool> {
        match comparison.comparator {
            Comparator::Eq => Ok(Self::eq(field_value, &comparison.literal)),
            Comparator::Gt => Self::ordered(comparison, field_value).map(|o| o == Ordering::Greater),
            Comparator::Lt => Self::ordered(comparison, field_value).map(|o| o == Ordering::Less),
        }
    }

    /// 相等比较
    fn eq(field: Option<&Value>, literal: &Literal) -> bool {
        match (field, literal) {
            (Some(Value::Number(n)), Literal::Integer(i)) => {
                Self::cmp_number(n, *i) == Some(Ordering::Equal)
            }
            (Some(Value::String(s)), Literal::String(l)) => s == l,
            _ => false,
        }
    }

    /// 有序比较，返回字段值相对字面量的顺序
    fn ordered(comparison: &Comparison, field: Option<&Value>) -> Result<Ordering> {
        let ordering = match (field, &comparison.literal) {
            (Some(Value::Number(n)), Literal::Integer(i)) => Self::cmp_number(n, *i),
            (Some(Value::String(s)), Literal::String(l)) => Some(s.as_str().cmp(l.as_str())),
            _ => None,
        };

        ordering.ok_or_else(|| RuleError::TypeMismatch {
            field: comparison.field.clone(),
            expected: comparison.literal.type_name().to_string(),
            actual: value_type_name(field).to_string(),
        })
    }

    /// 整数精确比较，非整数退化为浮点比较
    fn cmp_number(n: &Number, literal: i64) -> Option<Ordering> {
        if let Some(v) = n.as_i64() {
            return Some(v.cmp(&literal));
        }
        if n.is_u64() {
            // 超出 i64 范围的无符号数一定更大
            return Some(Ordering::Greater);
        }
        n.as_f64()?.partial_cmp(&(literal as f64))
    }
}

/// 便捷入口：评估语法树，返回是否匹配
pub fn evaluate(node: &Node, context: &EvaluationContext) -> Result<bool> {
    Evaluator::new().execute(node, context).map(|r| r.matched)
}

/// 语法树求值器
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    /// 执行规则评估
    pub fn execute(&self, node: &Node, context: &EvaluationContext) -> Result<EvaluationResult> {
        let start = Instant::now();
        let mut result = EvaluationResult::new();

        result.matched = self.evaluate_node(node, context, &mut result, "root")?;
        result.evaluation_time_ms = start.elapsed().as_millis() as i64;

        Ok(result)
    }

    fn evaluate_node(
        &self,
        node: &Node,
        context: &EvaluationContext,
        result: &mut EvaluationResult,
        path: &str,
    ) -> Result<bool> {
        match node {
            Node::Operand { value } => self.evaluate_operand(value, context, result, path),
            Node::Operator {
                operator,
                left,
                right,
            } => self.evaluate_operator(*operator, left, right, context, result, path),
        }
    }

    fn evaluate_operand(
        &self,
        operand: &str,
        context: &EvaluationContext,
        result: &mut EvaluationResult,
        path: &str,
    ) -> Result<bool> {
        let comparison = Comparison::parse(operand)?;
        let field_value = context.get_field(&comparison.field);

        let matched = ConditionEvaluator::evaluate(&comparison, field_value)?;

        if self.trace_enabled {
            result.evaluation_trace.push(format!(
                "{}: {} (actual: {}) => {}",
                path,
                comparison,
                field_value.map_or_else(|| "missing".to_string(), |v| v.to_string()),
                if matched { "MATCHED" } else { "NOT_MATCHED" }
            ));
        }

        if matched {
            result.matched_conditions.push(comparison.to_string());
        }

        Ok(matched)
    }

    /// 评估逻辑节点（短路求值，先左后右）
    fn evaluate_operator(
        &self,
        operator: LogicalOperator,
        left: &Node,
        right: &Node,
        context: &EvaluationContext,
        result: &mut EvaluationResult,
        path: &str,
    ) -> Result<bool> {
        let left_matched = self.evaluate_node(left, context, result, &format!("{}.left", path))?;

        let short_circuit = match operator {
            LogicalOperator::And => !left_matched,
            LogicalOperator::Or => left_matched,
        };
        if short_circuit {
            if self.trace_enabled {
                result
                    .evaluation_trace
                    .push(format!("{}: {} 短路 - 跳过右子节点", path, operator));
            }
            return Ok(left_matched);
        }

        self.evaluate_node(right, context, result, &format!("{}.right", path))
    }
}
