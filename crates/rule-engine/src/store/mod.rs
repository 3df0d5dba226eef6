//! 规则存储
//!
//! 服务层只依赖 `RuleRepository` 抽象，生产环境使用 PostgreSQL，
//! 开发和测试可使用内存实现。

mod memory;
mod postgres;

pub use memory::MemoryRuleRepository;
pub use postgres::PostgresRuleRepository;

use crate::error::Result;
use crate::models::{NewRule, RuleDocument, RulePatch};
use async_trait::async_trait;

/// 规则仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// 写入新规则，返回带有生成 ID 的完整文档
    async fn insert(&self, rule: NewRule) -> Result<RuleDocument>;

    async fn find_by_id(&self, id: &str) -> Result<Option<RuleDocument>>;

    /// 批量查询，不存在的 ID 不出现在结果中，结果顺序不保证
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<RuleDocument>>;

    /// 整体替换规则文本和语法树，返回匹配的记录数（0 或 1）
    async fn update(&self, id: &str, patch: RulePatch) -> Result<u64>;
}

/// 生成新的规则 ID
pub(crate) fn new_rule_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
