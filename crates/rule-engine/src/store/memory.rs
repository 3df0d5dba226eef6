//! 内存规则仓储
//!
//! 基于 DashMap，适合本地开发和测试，进程退出后数据丢失。

use super::{RuleRepository, new_rule_id};
use crate::error::Result;
use crate::models::{NewRule, RuleDocument, RulePatch};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone, Default)]
pub struct MemoryRuleRepository {
    rules: Arc<DashMap<String, RuleDocument>>,
}

impl MemoryRuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前存储的规则数量
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[async_trait]
impl RuleRepository for MemoryRuleRepository {
    #[instrument(skip(self, rule))]
    async fn insert(&self, rule: NewRule) -> Result<RuleDocument> {
        let now = Utc::now();
        let doc = RuleDocument {
            id: new_rule_id(),
            rule_string: rule.rule_string,
            ast: rule.ast,
            created_at: now,
            updated_at: now,
        };

        self.rules.insert(doc.id.clone(), doc.clone());
        debug!(rule_id = %doc.id, "Rule stored in memory");
        Ok(doc)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<RuleDocument>> {
        Ok(self.rules.get(id).map(|r| r.value().clone()))
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<RuleDocument>> {
        let mut seen = std::collections::HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| self.rules.get(id).map(|r| r.value().clone()))
            .collect())
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &str, patch: RulePatch) -> Result<u64> {
        match self.rules.get_mut(id) {
            Some(mut entry) => {
                let doc = entry.value_mut();
                doc.rule_string = patch.rule_string;
                doc.ast = patch.ast;
                doc.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
