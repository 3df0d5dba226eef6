//! AST 规则引擎
//!
//! 将形如 `(age > 30 AND department = 'Sales') OR salary > 50000` 的规则文本
//! 解析为二叉语法树并持久化，支持：
//! - 规则文本的分词与语法树构建（OR 优先级低于 AND）
//! - 语法树的 JSON 序列化
//! - 针对输入记录的短路求值
//! - 多条规则的 AND 合并与规则修改
//! - HTTP 接口

pub mod ast;
pub mod combiner;
pub mod error;
pub mod evaluator;
pub mod http;
pub mod models;
pub mod operators;
pub mod parser;
pub mod service;
pub mod store;
pub mod tokenizer;

pub use ast::Node;
pub use error::{Result, RuleError};
pub use evaluator::{ConditionEvaluator, Evaluator, evaluate};
pub use models::{
    Comparison, EvaluationContext, EvaluationResult, Literal, NewRule, RuleDocument, RulePatch,
};
pub use operators::{Comparator, LogicalOperator};
pub use parser::parse_rule;
pub use service::{CreatedRule, RuleService};
pub use store::{MemoryRuleRepository, PostgresRuleRepository, RuleRepository};
