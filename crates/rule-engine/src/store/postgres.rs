//! PostgreSQL 规则仓储

use super::{RuleRepository, new_rule_id};
use crate::error::Result;
use crate::models::{NewRule, RuleDocument, RulePatch};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, instrument};

/// 规则表结构，启动时按需创建
const CREATE_RULES_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS rules (
        id          TEXT PRIMARY KEY,
        rule_string TEXT NOT NULL,
        ast         TEXT NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

/// 数据库规则行
#[derive(sqlx::FromRow)]
struct RuleRow {
    id: String,
    rule_string: String,
    ast: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RuleRow> for RuleDocument {
    fn from(row: RuleRow) -> Self {
        Self {
            id: row.id,
            rule_string: row.rule_string,
            ast: row.ast,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// 规则仓储
///
/// 封装 `rules` 表的数据库操作
#[derive(Clone)]
pub struct PostgresRuleRepository {
    pool: PgPool,
}

impl PostgresRuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 创建规则表（已存在时跳过）
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_RULES_TABLE_SQL)
            .execute(&self.pool)
            .await?;
        info!("Rules table ready");
        Ok(())
    }
}

#[async_trait]
impl RuleRepository for PostgresRuleRepository {
    #[instrument(skip(self, rule))]
    async fn insert(&self, rule: NewRule) -> Result<RuleDocument> {
        let row = sqlx::query_as::<_, RuleRow>(
            r#"
            INSERT INTO rules (id, rule_string, ast)
            VALUES ($1, $2, $3)
            RETURNING id, rule_string, ast, created_at, updated_at
            "#,
        )
        .bind(new_rule_id())
        .bind(&rule.rule_string)
        .bind(&rule.ast)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> Result<Option<RuleDocument>> {
        let row = sqlx::query_as::<_, RuleRow>(
            "SELECT id, rule_string, ast, created_at, updated_at FROM rules WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<RuleDocument>> {
        let rows = sqlx::query_as::<_, RuleRow>(
            "SELECT id, rule_string, ast, created_at, updated_at FROM rules WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &str, patch: RulePatch) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE rules
            SET rule_string = $2, ast = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&patch.rule_string)
        .bind(&patch.ast)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
