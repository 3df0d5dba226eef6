//! 规则服务
//!
//! 对外提供创建、合并、求值、修改四个操作。每个操作最多一次存储往返
//! （合并为一次批量查询加一次写入），失败时返回结构化的 `RuleError`，
//! 解析失败的规则不会被写入。

use crate::ast::{self, Node};
use crate::combiner::combine;
use crate::error::{Result, RuleError};
use crate::evaluator::Evaluator;
use crate::models::{EvaluationContext, EvaluationResult, NewRule, RuleDocument, RulePatch};
use crate::parser::parse_rule;
use crate::store::RuleRepository;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// 新建或合并后的规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedRule {
    pub id: String,
    /// 序列化后的语法树
    pub ast: String,
}

impl From<RuleDocument> for CreatedRule {
    fn from(doc: RuleDocument) -> Self {
        Self {
            id: doc.id,
            ast: doc.ast,
        }
    }
}

#[derive(Clone)]
pub struct RuleService {
    repo: Arc<dyn RuleRepository>,
}

impl RuleService {
    pub fn new(repo: Arc<dyn RuleRepository>) -> Self {
        Self { repo }
    }

    /// 解析并保存新规则
    #[instrument(skip(self))]
    pub async fn create_rule(&self, rule_string: &str) -> Result<CreatedRule> {
        let tree = parse_rule(rule_string).inspect_err(|e| {
            warn!(error = %e, "Rejected rule string");
        })?;

        let doc = self
            .repo
            .insert(NewRule {
                rule_string: rule_string.to_string(),
                ast: ast::to_json(&tree)?,
            })
            .await?;

        metrics::counter!("rules_created_total").increment(1);
        info!(rule_id = %doc.id, depth = tree.depth(), "Rule created");

        Ok(doc.into())
    }

    /// 按给定顺序将多条已保存的规则以 AND 合并为一条新规则
    ///
    /// 重复的 ID 会让对应规则在合并结果中重复出现。
    #[instrument(skip(self))]
    pub async fn combine_rules(&self, ids: &[String]) -> Result<CreatedRule> {
        if ids.is_empty() {
            return Err(RuleError::EmptyCombination);
        }

        let docs = self.repo.find_by_ids(ids).await?;
        let by_id: HashMap<&str, &RuleDocument> =
            docs.iter().map(|doc| (doc.id.as_str(), doc)).collect();

        let mut reported = HashSet::new();
        let missing: Vec<&str> = ids
            .iter()
            .map(String::as_str)
            .filter(|id| !by_id.contains_key(id) && reported.insert(*id))
            .collect();
        if !missing.is_empty() {
            warn!(missing = ?missing, "Combine referenced unknown rules");
            return Err(RuleError::NotFound(missing.join(", ")));
        }

        let mut rules = Vec::with_capacity(ids.len());
        for id in ids {
            let doc = by_id[id.as_str()];
            rules.push((ast::from_json(&doc.ast)?, doc.rule_string.clone()));
        }

        let (tree, rule_string) = combine(rules)?;
        let doc = self
            .repo
            .insert(NewRule {
                rule_string,
                ast: ast::to_json(&tree)?,
            })
            .await?;

        metrics::counter!("rules_combined_total").increment(1);
        info!(rule_id = %doc.id, sources = ids.len(), "Rules combined");

        Ok(doc.into())
    }

    /// 对输入记录求值已保存的规则
    pub async fn evaluate_rule(&self, id: &str, context: &EvaluationContext) -> Result<bool> {
        self.evaluate_with(id, context, Evaluator::new())
            .await
            .map(|r| r.matched)
    }

    /// 求值并返回条件级别的追踪信息
    pub async fn evaluate_rule_traced(
        &self,
        id: &str,
        context: &EvaluationContext,
    ) -> Result<EvaluationResult> {
        self.evaluate_with(id, context, Evaluator::new().with_trace())
            .await
    }

    #[instrument(skip(self, context, evaluator))]
    async fn evaluate_with(
        &self,
        id: &str,
        context: &EvaluationContext,
        evaluator: Evaluator,
    ) -> Result<EvaluationResult> {
        let doc = self.get_rule(id).await?;
        let tree: Node = ast::from_json(&doc.ast)?;

        let start = Instant::now();
        let outcome = evaluator.execute(&tree, context);
        metrics::histogram!("rule_evaluation_duration_seconds").record(start.elapsed().as_secs_f64());

        let label = match &outcome {
            Ok(r) if r.matched => "matched",
            Ok(_) => "not_matched",
            Err(_) => "error",
        };
        metrics::counter!("rule_evaluations_total", "result" => label).increment(1);

        outcome.inspect_err(|e| warn!(rule_id = %id, error = %e, "Rule evaluation failed"))
    }

    /// 用新的规则文本整体替换已保存的规则
    #[instrument(skip(self))]
    pub async fn modify_rule(&self, id: &str, new_rule_string: &str) -> Result<()> {
        let tree = parse_rule(new_rule_string).inspect_err(|e| {
            warn!(error = %e, "Rejected rule string");
        })?;

        let matched = self
            .repo
            .update(
                id,
                RulePatch {
                    rule_string: new_rule_string.to_string(),
                    ast: ast::to_json(&tree)?,
                },
            )
            .await?;

        if matched == 0 {
            warn!(rule_id = %id, "Modify targeted unknown rule");
            return Err(RuleError::NotFound(id.to_string()));
        }

        metrics::counter!("rules_modified_total").increment(1);
        info!(rule_id = %id, "Rule modified");
        Ok(())
    }

    /// 获取规则文档
    pub async fn get_rule(&self, id: &str) -> Result<RuleDocument> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| RuleError::NotFound(id.to_string()))
    }
}
