//! 基于连接池的 Repository 实现
//!
//! 查询处理器不需要事务协调，直接用 PgPool 读写。
//! 查询计时通过 DbTimer 上报。

use async_trait::async_trait;
use mes_common::{Pagination, TenantId};
use mes_errors::{AppError, AppResult};
use sqlx::PgPool;

use crate::domain::coding::CodeRule;
use crate::domain::documents::DocKind;
use crate::domain::relations::{DocRelation, RelationMode};
use crate::domain::repositories::coding::CodeRuleRepository;
use crate::domain::repositories::relations::RelationRepository;
use crate::infrastructure::observability::DbTimer;

use super::rows::{CodeRuleRow, DocRelationRow};

/// 编码规则 Repository（连接池版）
pub struct PostgresCodeRuleRepository {
    pool: PgPool,
}

impl PostgresCodeRuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CodeRuleRepository for PostgresCodeRuleRepository {
    async fn find_by_code(&self, tenant_id: &TenantId, code: &str) -> AppResult<Option<CodeRule>> {
        let timer = DbTimer::new("select", "sys_code_rules");
        let result = sqlx::query_as::<_, CodeRuleRow>(
            "SELECT * FROM sys_code_rules WHERE tenant_id = $1 AND code = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result.is_ok());

        let row = result
            .map_err(|e| AppError::database(format!("Failed to find code rule: {}", e)))?;
        row.map(|r| r.into_rule()).transpose()
    }

    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<CodeRule>> {
        let timer = DbTimer::new("select", "sys_code_rules");
        let result = sqlx::query_as::<_, CodeRuleRow>(
            "SELECT * FROM sys_code_rules WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result.is_ok());

        let row = result
            .map_err(|e| AppError::database(format!("Failed to find code rule: {}", e)))?;
        row.map(|r| r.into_rule()).transpose()
    }

    async fn exists_by_code(&self, tenant_id: &TenantId, code: &str) -> AppResult<bool> {
        let timer = DbTimer::new("select", "sys_code_rules");
        let result: Result<(bool,), _> = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM sys_code_rules WHERE tenant_id = $1 AND code = $2 AND deleted_at IS NULL)",
        )
        .bind(tenant_id.0)
        .bind(code)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result.is_ok());

        result
            .map(|(exists,)| exists)
            .map_err(|e| AppError::database(format!("Failed to check code rule: {}", e)))
    }

    async fn insert(&self, rule: &CodeRule) -> AppResult<i64> {
        let timer = DbTimer::new("insert", "sys_code_rules");
        let result: Result<(i64,), _> = sqlx::query_as(
            r#"
            INSERT INTO sys_code_rules (uuid, tenant_id, code, name, template, seq_start, seq_step,
                                        seq_width, reset_policy, is_system, is_active, description,
                                        created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            "#,
        )
        .bind(rule.uuid)
        .bind(rule.tenant_id.0)
        .bind(&rule.code)
        .bind(&rule.name)
        .bind(&rule.template)
        .bind(rule.seq_start)
        .bind(rule.seq_step)
        .bind(rule.seq_width)
        .bind(rule.reset_policy.as_str())
        .bind(rule.is_system)
        .bind(rule.is_active)
        .bind(&rule.description)
        .bind(rule.audit_info.created_at)
        .bind(rule.audit_info.created_by.as_ref().map(|u| u.0))
        .bind(rule.audit_info.updated_at)
        .bind(rule.audit_info.updated_by.as_ref().map(|u| u.0))
        .fetch_one(&self.pool)
        .await;
        timer.finish(result.is_ok());

        result
            .map(|(id,)| id)
            .map_err(|e| AppError::database(format!("Failed to insert code rule: {}", e)))
    }

    async fn update(&self, rule: &CodeRule) -> AppResult<()> {
        let timer = DbTimer::new("update", "sys_code_rules");
        let result = sqlx::query(
            r#"
            UPDATE sys_code_rules
            SET name = $3, template = $4, seq_start = $5, seq_step = $6, seq_width = $7,
                reset_policy = $8, is_active = $9, description = $10, updated_at = $11,
                updated_by = $12
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(rule.tenant_id.0)
        .bind(rule.id)
        .bind(&rule.name)
        .bind(&rule.template)
        .bind(rule.seq_start)
        .bind(rule.seq_step)
        .bind(rule.seq_width)
        .bind(rule.reset_policy.as_str())
        .bind(rule.is_active)
        .bind(&rule.description)
        .bind(rule.audit_info.updated_at)
        .bind(rule.audit_info.updated_by.as_ref().map(|u| u.0))
        .execute(&self.pool)
        .await;
        timer.finish(result.is_ok());

        result
            .map(|_| ())
            .map_err(|e| AppError::database(format!("Failed to update code rule: {}", e)))
    }

    async fn soft_delete(&self, tenant_id: &TenantId, id: i64) -> AppResult<()> {
        let timer = DbTimer::new("update", "sys_code_rules");
        let result = sqlx::query(
            "UPDATE sys_code_rules SET deleted_at = NOW() WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.finish(result.is_ok());

        result
            .map(|_| ())
            .map_err(|e| AppError::database(format!("Failed to delete code rule: {}", e)))
    }

    async fn list(
        &self,
        tenant_id: &TenantId,
        pagination: &Pagination,
    ) -> AppResult<(Vec<CodeRule>, i64)> {
        let timer = DbTimer::new("select", "sys_code_rules");
        let result = sqlx::query_as::<_, CodeRuleRow>(
            r#"
            SELECT * FROM sys_code_rules
            WHERE tenant_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(tenant_id.0)
        .bind(pagination.page_size as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result.is_ok());

        let rows = result
            .map_err(|e| AppError::database(format!("Failed to list code rules: {}", e)))?;
        let rules = rows
            .into_iter()
            .map(|r| r.into_rule())
            .collect::<AppResult<Vec<_>>>()?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sys_code_rules WHERE tenant_id = $1 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count code rules: {}", e)))?;

        Ok((rules, total.0))
    }
}

/// 单据关联 Repository（连接池版）
pub struct PostgresRelationRepository {
    pool: PgPool,
}

impl PostgresRelationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationRepository for PostgresRelationRepository {
    async fn find_existing(
        &self,
        tenant_id: &TenantId,
        source_kind: DocKind,
        source_id: i64,
        target_kind: DocKind,
        target_id: i64,
        mode: RelationMode,
    ) -> AppResult<Option<DocRelation>> {
        let timer = DbTimer::new("select", "doc_relations");
        let result = sqlx::query_as::<_, DocRelationRow>(
            r#"
            SELECT * FROM doc_relations
            WHERE tenant_id = $1 AND source_kind = $2 AND source_id = $3
              AND target_kind = $4 AND target_id = $5 AND relation_mode = $6
              AND deleted_at IS NULL
            "#,
        )
        .bind(tenant_id.0)
        .bind(source_kind.as_str())
        .bind(source_id)
        .bind(target_kind.as_str())
        .bind(target_id)
        .bind(mode.as_str())
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result.is_ok());

        let row = result
            .map_err(|e| AppError::database(format!("Failed to find relation: {}", e)))?;
        row.map(|r| r.into_relation()).transpose()
    }

    async fn insert(&self, relation: &DocRelation) -> AppResult<i64> {
        let timer = DbTimer::new("insert", "doc_relations");
        let result: Result<(i64,), _> = sqlx::query_as(
            r#"
            INSERT INTO doc_relations (uuid, tenant_id, source_kind, source_id, source_code,
                                       source_name, target_kind, target_id, target_code,
                                       target_name, relation_type, relation_mode, relation_desc,
                                       business_mode, demand_id,
                                       created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, $19)
            RETURNING id
            "#,
        )
        .bind(relation.uuid)
        .bind(relation.tenant_id.0)
        .bind(relation.source_kind.as_str())
        .bind(relation.source_id)
        .bind(&relation.source_code)
        .bind(&relation.source_name)
        .bind(relation.target_kind.as_str())
        .bind(relation.target_id)
        .bind(&relation.target_code)
        .bind(&relation.target_name)
        .bind(&relation.relation_type)
        .bind(relation.relation_mode.as_str())
        .bind(&relation.relation_desc)
        .bind(relation.business_mode.map(|m| m.as_str()))
        .bind(relation.demand_id)
        .bind(relation.audit_info.created_at)
        .bind(relation.audit_info.created_by.as_ref().map(|u| u.0))
        .bind(relation.audit_info.updated_at)
        .bind(relation.audit_info.updated_by.as_ref().map(|u| u.0))
        .fetch_one(&self.pool)
        .await;
        timer.finish(result.is_ok());

        result
            .map(|(id,)| id)
            .map_err(|e| AppError::database(format!("Failed to insert relation: {}", e)))
    }

    async fn list_targets(
        &self,
        tenant_id: &TenantId,
        source_kind: DocKind,
        source_id: i64,
        target_kind: Option<DocKind>,
    ) -> AppResult<Vec<DocRelation>> {
        let timer = DbTimer::new("select", "doc_relations");
        let result = match target_kind {
            Some(kind) => {
                sqlx::query_as::<_, DocRelationRow>(
                    r#"
                    SELECT * FROM doc_relations
                    WHERE tenant_id = $1 AND source_kind = $2 AND source_id = $3
                      AND target_kind = $4 AND deleted_at IS NULL
                    ORDER BY id ASC
                    "#,
                )
                .bind(tenant_id.0)
                .bind(source_kind.as_str())
                .bind(source_id)
                .bind(kind.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, DocRelationRow>(
                    r#"
                    SELECT * FROM doc_relations
                    WHERE tenant_id = $1 AND source_kind = $2 AND source_id = $3
                      AND deleted_at IS NULL
                    ORDER BY id ASC
                    "#,
                )
                .bind(tenant_id.0)
                .bind(source_kind.as_str())
                .bind(source_id)
                .fetch_all(&self.pool)
                .await
            }
        };
        timer.finish(result.is_ok());

        let rows = result
            .map_err(|e| AppError::database(format!("Failed to list relation targets: {}", e)))?;
        rows.into_iter().map(|r| r.into_relation()).collect()
    }

    async fn list_sources(
        &self,
        tenant_id: &TenantId,
        target_kind: DocKind,
        target_id: i64,
    ) -> AppResult<Vec<DocRelation>> {
        let timer = DbTimer::new("select", "doc_relations");
        let result = sqlx::query_as::<_, DocRelationRow>(
            r#"
            SELECT * FROM doc_relations
            WHERE tenant_id = $1 AND target_kind = $2 AND target_id = $3 AND deleted_at IS NULL
            ORDER BY id ASC
            "#,
        )
        .bind(tenant_id.0)
        .bind(target_kind.as_str())
        .bind(target_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result.is_ok());

        let rows = result
            .map_err(|e| AppError::database(format!("Failed to list relation sources: {}", e)))?;
        rows.into_iter().map(|r| r.into_relation()).collect()
    }

    async fn list_by_demand(
        &self,
        tenant_id: &TenantId,
        demand_id: i64,
    ) -> AppResult<Vec<DocRelation>> {
        let timer = DbTimer::new("select", "doc_relations");
        let result = sqlx::query_as::<_, DocRelationRow>(
            r#"
            SELECT * FROM doc_relations
            WHERE tenant_id = $1 AND demand_id = $2 AND deleted_at IS NULL
            ORDER BY id ASC
            "#,
        )
        .bind(tenant_id.0)
        .bind(demand_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result.is_ok());

        let rows = result
            .map_err(|e| AppError::database(format!("Failed to list demand relations: {}", e)))?;
        rows.into_iter().map(|r| r.into_relation()).collect()
    }
}
