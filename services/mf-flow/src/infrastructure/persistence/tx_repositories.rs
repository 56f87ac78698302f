//! 事务感知的 Repository 实现
//!
//! 这些 Repository 使用共享的 Transaction 而非 PgPool，
//! 同一 UnitOfWork 内的所有读写落在同一个数据库事务里。

use async_trait::async_trait;
use chrono::NaiveDate;
use mes_adapter_postgres::is_lock_conflict;
use mes_common::{Pagination, TenantId};
use mes_errors::{AppError, AppResult};
use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::coding::{CodeRule, CodeSequence};
use crate::domain::documents::{
    ComputationLine, Demand, DemandComputation, DocKind, FinanceDocument, PlanLine,
    ProductionPlan, PurchaseOrder, PurchaseOrderLine, PurchaseReceipt, PurchaseRequisition,
    ReceiptLine, RequisitionLine, WorkOrder, WorkOrderOperation,
};
use crate::domain::relations::{DocRelation, RelationMode};
use crate::domain::repositories::coding::{CodeRuleRepository, CodeSequenceRepository};
use crate::domain::repositories::documents::{
    ComputationRepository, DemandRepository, FinanceRepository, PlanRepository,
    PurchaseOrderRepository, ReceiptRepository, RequisitionRepository, WorkOrderRepository,
};
use crate::domain::repositories::relations::RelationRepository;

use super::rows::{
    CodeRuleRow, CodeSequenceRow, ComputationLineRow, ComputationRow, DemandRow, DocRelationRow,
    PlanLineRow, PlanRow, PurchaseOrderLineRow, PurchaseOrderRow, RequisitionLineRow,
    RequisitionRow, WorkOrderRow,
};

/// 共享事务类型
pub(super) type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

/// 唯一约束冲突的 PostgreSQL 错误码
const UNIQUE_VIOLATION: &str = "23505";

/// 宏：定义一个简单的 TxRepository 结构体
macro_rules! define_tx_repo {
    ($name:ident) => {
        pub struct $name {
            tx: SharedTx,
        }

        impl $name {
            pub fn new(tx: SharedTx) -> Self {
                Self { tx }
            }
        }
    };
}

define_tx_repo!(TxCodeRuleRepository);
define_tx_repo!(TxCodeSequenceRepository);
define_tx_repo!(TxDemandRepository);
define_tx_repo!(TxComputationRepository);
define_tx_repo!(TxPlanRepository);
define_tx_repo!(TxWorkOrderRepository);
define_tx_repo!(TxPurchaseOrderRepository);
define_tx_repo!(TxRequisitionRepository);
define_tx_repo!(TxReceiptRepository);
define_tx_repo!(TxFinanceRepository);
define_tx_repo!(TxRelationRepository);

// =============================================================================
// CodeRuleRepository 实现
// =============================================================================

#[async_trait]
impl CodeRuleRepository for TxCodeRuleRepository {
    async fn find_by_code(&self, tenant_id: &TenantId, code: &str) -> AppResult<Option<CodeRule>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, CodeRuleRow>(
            "SELECT * FROM sys_code_rules WHERE tenant_id = $1 AND code = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(code)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to find code rule: {}", e)))?;

        row.map(|r| r.into_rule()).transpose()
    }

    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<CodeRule>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, CodeRuleRow>(
            "SELECT * FROM sys_code_rules WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to find code rule: {}", e)))?;

        row.map(|r| r.into_rule()).transpose()
    }

    async fn exists_by_code(&self, tenant_id: &TenantId, code: &str) -> AppResult<bool> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM sys_code_rules WHERE tenant_id = $1 AND code = $2 AND deleted_at IS NULL)",
        )
        .bind(tenant_id.0)
        .bind(code)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to check code rule: {}", e)))?;

        Ok(result.0)
    }

    async fn insert(&self, rule: &CodeRule) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (id,): (i64,) = sqlx::query_as(
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
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                AppError::conflict(format!("编码规则已存在: {}", rule.code))
            }
            _ => AppError::database(format!("Failed to insert code rule: {}", e)),
        })?;

        Ok(id)
    }

    async fn update(&self, rule: &CodeRule) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
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
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update code rule: {}", e)))?;

        Ok(())
    }

    async fn soft_delete(&self, tenant_id: &TenantId, id: i64) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
            "UPDATE sys_code_rules SET deleted_at = NOW() WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete code rule: {}", e)))?;

        Ok(())
    }

    async fn list(
        &self,
        tenant_id: &TenantId,
        pagination: &Pagination,
    ) -> AppResult<(Vec<CodeRule>, i64)> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, CodeRuleRow>(
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
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to list code rules: {}", e)))?;

        let rules = rows
            .into_iter()
            .map(|r| r.into_rule())
            .collect::<AppResult<Vec<_>>>()?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sys_code_rules WHERE tenant_id = $1 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to count code rules: {}", e)))?;

        Ok((rules, total.0))
    }
}

// =============================================================================
// CodeSequenceRepository 实现
// =============================================================================

#[async_trait]
impl CodeSequenceRepository for TxCodeSequenceRepository {
    async fn ensure(
        &self,
        rule_id: i64,
        tenant_id: &TenantId,
        scope_key: &str,
        initial_value: i64,
    ) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
            r#"
            INSERT INTO sys_code_sequences (rule_id, tenant_id, scope_key, current_value)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (rule_id, tenant_id, scope_key) DO NOTHING
            "#,
        )
        .bind(rule_id)
        .bind(tenant_id.0)
        .bind(scope_key)
        .bind(initial_value)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to ensure code sequence: {}", e)))?;

        Ok(())
    }

    async fn lock(
        &self,
        rule_id: i64,
        tenant_id: &TenantId,
        scope_key: &str,
    ) -> AppResult<CodeSequence> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, CodeSequenceRow>(
            r#"
            SELECT id, rule_id, tenant_id, scope_key, current_value, last_reset
            FROM sys_code_sequences
            WHERE rule_id = $1 AND tenant_id = $2 AND scope_key = $3
            FOR UPDATE NOWAIT
            "#,
        )
        .bind(rule_id)
        .bind(tenant_id.0)
        .bind(scope_key)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            if is_lock_conflict(&e) {
                AppError::allocation_contention(format!(
                    "sequence row locked: rule {} scope '{}'",
                    rule_id, scope_key
                ))
            } else {
                AppError::database(format!("Failed to lock code sequence: {}", e))
            }
        })?;

        let row = row.ok_or_else(|| {
            AppError::internal(format!(
                "code sequence missing after ensure: rule {} scope '{}'",
                rule_id, scope_key
            ))
        })?;

        Ok(row.into_sequence())
    }

    async fn update(
        &self,
        id: i64,
        current_value: i64,
        last_reset: Option<NaiveDate>,
    ) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
            "UPDATE sys_code_sequences SET current_value = $2, last_reset = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(current_value)
        .bind(last_reset)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update code sequence: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// DemandRepository 实现
// =============================================================================

#[async_trait]
impl DemandRepository for TxDemandRepository {
    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<Demand>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, DemandRow>(
            "SELECT * FROM demands WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to find demand: {}", e)))?;

        row.map(|r| r.into_demand()).transpose()
    }

    async fn update(&self, demand: &Demand) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
            r#"
            UPDATE demands
            SET pushed_to_computation = $3, computation_id = $4, computation_code = $5,
                updated_at = $6, updated_by = $7
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(demand.tenant_id.0)
        .bind(demand.id)
        .bind(demand.pushed_to_computation)
        .bind(demand.computation_id)
        .bind(&demand.computation_code)
        .bind(demand.audit_info.updated_at)
        .bind(demand.audit_info.updated_by.as_ref().map(|u| u.0))
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update demand: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// ComputationRepository 实现
// =============================================================================

#[async_trait]
impl ComputationRepository for TxComputationRepository {
    async fn find_by_id(
        &self,
        tenant_id: &TenantId,
        id: i64,
    ) -> AppResult<Option<DemandComputation>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, ComputationRow>(
            "SELECT * FROM demand_computations WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to find computation: {}", e)))?;

        row.map(|r| r.into_computation()).transpose()
    }

    async fn insert(&self, computation: &DemandComputation) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO demand_computations (uuid, tenant_id, computation_code, demand_id,
                                             demand_code, business_mode, computation_type,
                                             computation_params, status, remarks,
                                             created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(computation.uuid)
        .bind(computation.tenant_id.0)
        .bind(&computation.computation_code)
        .bind(computation.demand_id)
        .bind(&computation.demand_code)
        .bind(computation.business_mode.as_str())
        .bind(computation.computation_type.as_str())
        .bind(&computation.computation_params)
        .bind(computation.status.as_str())
        .bind(&computation.remarks)
        .bind(computation.audit_info.created_at)
        .bind(computation.audit_info.created_by.as_ref().map(|u| u.0))
        .bind(computation.audit_info.updated_at)
        .bind(computation.audit_info.updated_by.as_ref().map(|u| u.0))
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert computation: {}", e)))?;

        Ok(id)
    }

    async fn list_lines(&self, computation_id: i64) -> AppResult<Vec<ComputationLine>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, ComputationLineRow>(
            "SELECT * FROM demand_computation_lines WHERE computation_id = $1 ORDER BY id ASC",
        )
        .bind(computation_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to list computation lines: {}", e)))?;

        rows.into_iter().map(|r| r.into_line()).collect()
    }
}

// =============================================================================
// PlanRepository 实现
// =============================================================================

#[async_trait]
impl PlanRepository for TxPlanRepository {
    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<ProductionPlan>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, PlanRow>(
            "SELECT * FROM production_plans WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to find plan: {}", e)))?;

        row.map(|r| r.into_plan()).transpose()
    }

    async fn insert(&self, plan: &ProductionPlan) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO production_plans (uuid, tenant_id, plan_code, plan_name, plan_type,
                                          source_type, source_id, source_code, plan_start_date,
                                          plan_end_date, status, remarks,
                                          created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            "#,
        )
        .bind(plan.uuid)
        .bind(plan.tenant_id.0)
        .bind(&plan.plan_code)
        .bind(&plan.plan_name)
        .bind(plan.plan_type.as_str())
        .bind(&plan.source_type)
        .bind(plan.source_id)
        .bind(&plan.source_code)
        .bind(plan.plan_start_date)
        .bind(plan.plan_end_date)
        .bind(plan.status.as_str())
        .bind(&plan.remarks)
        .bind(plan.audit_info.created_at)
        .bind(plan.audit_info.created_by.as_ref().map(|u| u.0))
        .bind(plan.audit_info.updated_at)
        .bind(plan.audit_info.updated_by.as_ref().map(|u| u.0))
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert plan: {}", e)))?;

        Ok(id)
    }

    async fn insert_line(&self, line: &PlanLine) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO production_plan_lines (plan_id, material_id, material_code, material_name,
                                               material_source, planned_quantity, suggested_action,
                                               work_order_quantity, purchase_order_quantity,
                                               execution_status, work_order_id, purchase_order_id,
                                               notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(line.plan_id)
        .bind(line.material_id)
        .bind(&line.material_code)
        .bind(&line.material_name)
        .bind(line.material_source.as_str())
        .bind(line.planned_quantity)
        .bind(line.suggested_action.as_str())
        .bind(line.work_order_quantity)
        .bind(line.purchase_order_quantity)
        .bind(line.execution_status.as_str())
        .bind(line.work_order_id)
        .bind(line.purchase_order_id)
        .bind(&line.notes)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert plan line: {}", e)))?;

        Ok(id)
    }

    async fn list_lines(&self, plan_id: i64) -> AppResult<Vec<PlanLine>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, PlanLineRow>(
            "SELECT * FROM production_plan_lines WHERE plan_id = $1 ORDER BY id ASC",
        )
        .bind(plan_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to list plan lines: {}", e)))?;

        rows.into_iter().map(|r| r.into_line()).collect()
    }

    async fn update_line_execution(&self, line: &PlanLine) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        sqlx::query(
            r#"
            UPDATE production_plan_lines
            SET execution_status = $2, work_order_id = $3, purchase_order_id = $4
            WHERE id = $1
            "#,
        )
        .bind(line.id)
        .bind(line.execution_status.as_str())
        .bind(line.work_order_id)
        .bind(line.purchase_order_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update plan line: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// WorkOrderRepository 实现
// =============================================================================

#[async_trait]
impl WorkOrderRepository for TxWorkOrderRepository {
    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<WorkOrder>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, WorkOrderRow>(
            "SELECT * FROM work_orders WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to find work order: {}", e)))?;

        row.map(|r| r.into_work_order()).transpose()
    }

    async fn exists_by_code(&self, tenant_id: &TenantId, code: &str) -> AppResult<bool> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM work_orders WHERE tenant_id = $1 AND code = $2 AND deleted_at IS NULL)",
        )
        .bind(tenant_id.0)
        .bind(code)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to check work order code: {}", e)))?;

        Ok(result.0)
    }

    async fn insert(&self, work_order: &WorkOrder) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO work_orders (uuid, tenant_id, code, name, material_id, material_code,
                                     material_name, quantity, production_mode, status, priority,
                                     planned_start_date, planned_end_date, actual_start_date,
                                     workshop_id, workshop_name, completed_quantity,
                                     qualified_quantity, unqualified_quantity, source_type,
                                     source_id, source_code, remarks,
                                     created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, $19, $20, $21, $22, $23, $24, $25, $26, $27)
            RETURNING id
            "#,
        )
        .bind(work_order.uuid)
        .bind(work_order.tenant_id.0)
        .bind(&work_order.code)
        .bind(&work_order.name)
        .bind(work_order.material_id)
        .bind(&work_order.material_code)
        .bind(&work_order.material_name)
        .bind(work_order.quantity)
        .bind(work_order.production_mode.as_str())
        .bind(work_order.status.as_str())
        .bind(work_order.priority.as_str())
        .bind(work_order.planned_start_date)
        .bind(work_order.planned_end_date)
        .bind(work_order.actual_start_date)
        .bind(work_order.workshop_id)
        .bind(&work_order.workshop_name)
        .bind(work_order.completed_quantity)
        .bind(work_order.qualified_quantity)
        .bind(work_order.unqualified_quantity)
        .bind(&work_order.source_type)
        .bind(work_order.source_id)
        .bind(&work_order.source_code)
        .bind(&work_order.remarks)
        .bind(work_order.audit_info.created_at)
        .bind(work_order.audit_info.created_by.as_ref().map(|u| u.0))
        .bind(work_order.audit_info.updated_at)
        .bind(work_order.audit_info.updated_by.as_ref().map(|u| u.0))
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert work order: {}", e)))?;

        Ok(id)
    }

    async fn insert_operation(&self, operation: &WorkOrderOperation) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO work_order_operations (work_order_id, operation_id, operation_code,
                                               operation_name, sequence, status,
                                               actual_start_date, remarks)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(operation.work_order_id)
        .bind(operation.operation_id)
        .bind(&operation.operation_code)
        .bind(&operation.operation_name)
        .bind(operation.sequence)
        .bind(operation.status.as_str())
        .bind(operation.actual_start_date)
        .bind(&operation.remarks)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert work order operation: {}", e)))?;

        Ok(id)
    }
}

// =============================================================================
// PurchaseOrderRepository 实现
// =============================================================================

#[async_trait]
impl PurchaseOrderRepository for TxPurchaseOrderRepository {
    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<PurchaseOrder>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, PurchaseOrderRow>(
            "SELECT * FROM purchase_orders WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to find purchase order: {}", e)))?;

        row.map(|r| r.into_order()).transpose()
    }

    async fn insert(&self, order: &PurchaseOrder) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO purchase_orders (uuid, tenant_id, order_code, order_name, supplier_id,
                                         supplier_name, order_date, delivery_date, status,
                                         total_amount, remarks,
                                         created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id
            "#,
        )
        .bind(order.uuid)
        .bind(order.tenant_id.0)
        .bind(&order.order_code)
        .bind(&order.order_name)
        .bind(order.supplier_id)
        .bind(&order.supplier_name)
        .bind(order.order_date)
        .bind(order.delivery_date)
        .bind(order.status.as_str())
        .bind(order.total_amount)
        .bind(&order.remarks)
        .bind(order.audit_info.created_at)
        .bind(order.audit_info.created_by.as_ref().map(|u| u.0))
        .bind(order.audit_info.updated_at)
        .bind(order.audit_info.updated_by.as_ref().map(|u| u.0))
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert purchase order: {}", e)))?;

        Ok(id)
    }

    async fn insert_line(&self, line: &PurchaseOrderLine) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO purchase_order_lines (order_id, material_id, material_code, material_name,
                                              material_spec, unit, ordered_quantity, unit_price,
                                              total_price, required_date, source_type, source_id,
                                              remarks)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(line.order_id)
        .bind(line.material_id)
        .bind(&line.material_code)
        .bind(&line.material_name)
        .bind(&line.material_spec)
        .bind(&line.unit)
        .bind(line.ordered_quantity)
        .bind(line.unit_price)
        .bind(line.total_price)
        .bind(line.required_date)
        .bind(&line.source_type)
        .bind(line.source_id)
        .bind(&line.remarks)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert purchase order line: {}", e)))?;

        Ok(id)
    }

    async fn list_lines(&self, order_id: i64) -> AppResult<Vec<PurchaseOrderLine>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, PurchaseOrderLineRow>(
            "SELECT * FROM purchase_order_lines WHERE order_id = $1 ORDER BY id ASC",
        )
        .bind(order_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to list purchase order lines: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.into_line()).collect())
    }
}

// =============================================================================
// RequisitionRepository 实现
// =============================================================================

#[async_trait]
impl RequisitionRepository for TxRequisitionRepository {
    async fn find_by_id(
        &self,
        tenant_id: &TenantId,
        id: i64,
    ) -> AppResult<Option<PurchaseRequisition>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, RequisitionRow>(
            "SELECT * FROM purchase_requisitions WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id.0)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to find requisition: {}", e)))?;

        row.map(|r| r.into_requisition()).transpose()
    }

    async fn insert(&self, requisition: &PurchaseRequisition) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO purchase_requisitions (uuid, tenant_id, requisition_code, requisition_name,
                                               status, requisition_date, source_type, source_id,
                                               source_code, remarks,
                                               created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(requisition.uuid)
        .bind(requisition.tenant_id.0)
        .bind(&requisition.requisition_code)
        .bind(&requisition.requisition_name)
        .bind(requisition.status.as_str())
        .bind(requisition.requisition_date)
        .bind(&requisition.source_type)
        .bind(requisition.source_id)
        .bind(&requisition.source_code)
        .bind(&requisition.remarks)
        .bind(requisition.audit_info.created_at)
        .bind(requisition.audit_info.created_by.as_ref().map(|u| u.0))
        .bind(requisition.audit_info.updated_at)
        .bind(requisition.audit_info.updated_by.as_ref().map(|u| u.0))
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert requisition: {}", e)))?;

        Ok(id)
    }

    async fn insert_line(&self, line: &RequisitionLine) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO purchase_requisition_lines (requisition_id, material_id, material_code,
                                                    material_name, material_spec, unit, quantity,
                                                    supplier_id, required_date, computation_line_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(line.requisition_id)
        .bind(line.material_id)
        .bind(&line.material_code)
        .bind(&line.material_name)
        .bind(&line.material_spec)
        .bind(&line.unit)
        .bind(line.quantity)
        .bind(line.supplier_id)
        .bind(line.required_date)
        .bind(line.computation_line_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert requisition line: {}", e)))?;

        Ok(id)
    }

    async fn list_lines(&self, requisition_id: i64) -> AppResult<Vec<RequisitionLine>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, RequisitionLineRow>(
            "SELECT * FROM purchase_requisition_lines WHERE requisition_id = $1 ORDER BY id ASC",
        )
        .bind(requisition_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to list requisition lines: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.into_line()).collect())
    }
}

// =============================================================================
// ReceiptRepository 实现
// =============================================================================

#[async_trait]
impl ReceiptRepository for TxReceiptRepository {
    async fn insert(&self, receipt: &PurchaseReceipt) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO purchase_receipts (uuid, tenant_id, receipt_code, warehouse_id,
                                           warehouse_code, warehouse_name, source_order_code,
                                           supplier_id, supplier_name, status, review_status,
                                           receipt_time, notes,
                                           created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING id
            "#,
        )
        .bind(receipt.uuid)
        .bind(receipt.tenant_id.0)
        .bind(&receipt.receipt_code)
        .bind(receipt.warehouse_id)
        .bind(&receipt.warehouse_code)
        .bind(&receipt.warehouse_name)
        .bind(&receipt.source_order_code)
        .bind(receipt.supplier_id)
        .bind(&receipt.supplier_name)
        .bind(receipt.status.as_str())
        .bind(receipt.review_status.as_str())
        .bind(receipt.receipt_time)
        .bind(&receipt.notes)
        .bind(receipt.audit_info.created_at)
        .bind(receipt.audit_info.created_by.as_ref().map(|u| u.0))
        .bind(receipt.audit_info.updated_at)
        .bind(receipt.audit_info.updated_by.as_ref().map(|u| u.0))
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert receipt: {}", e)))?;

        Ok(id)
    }

    async fn insert_line(&self, line: &ReceiptLine) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO purchase_receipt_lines (receipt_id, material_id, material_code,
                                                material_name, unit, quantity, unit_price,
                                                total_amount, batch_number, location_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(line.receipt_id)
        .bind(line.material_id)
        .bind(&line.material_code)
        .bind(&line.material_name)
        .bind(&line.unit)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.total_amount)
        .bind(&line.batch_number)
        .bind(&line.location_code)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert receipt line: {}", e)))?;

        Ok(id)
    }
}

// =============================================================================
// FinanceRepository 实现
// =============================================================================

#[async_trait]
impl FinanceRepository for TxFinanceRepository {
    async fn insert(&self, document: &FinanceDocument) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO finance_documents (uuid, tenant_id, kind, document_code, customer_id,
                                           customer_name, supplier_id, supplier_name, source_type,
                                           source_id, source_code, business_date, due_date,
                                           total_amount, settled_amount, remaining_amount, status,
                                           review_status, has_invoice, invoice_number, notes,
                                           created_at, created_by, updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, $19, $20, $21, $22, $23, $24, $25)
            RETURNING id
            "#,
        )
        .bind(document.uuid)
        .bind(document.tenant_id.0)
        .bind(document.kind.as_str())
        .bind(&document.document_code)
        .bind(document.customer_id)
        .bind(&document.customer_name)
        .bind(document.supplier_id)
        .bind(&document.supplier_name)
        .bind(&document.source_type)
        .bind(document.source_id)
        .bind(&document.source_code)
        .bind(document.business_date)
        .bind(document.due_date)
        .bind(document.total_amount)
        .bind(document.settled_amount)
        .bind(document.remaining_amount)
        .bind(document.status.as_str())
        .bind(document.review_status.as_str())
        .bind(document.has_invoice)
        .bind(&document.invoice_number)
        .bind(&document.notes)
        .bind(document.audit_info.created_at)
        .bind(document.audit_info.created_by.as_ref().map(|u| u.0))
        .bind(document.audit_info.updated_at)
        .bind(document.audit_info.updated_by.as_ref().map(|u| u.0))
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert finance document: {}", e)))?;

        Ok(id)
    }
}

// =============================================================================
// RelationRepository 实现
// =============================================================================

#[async_trait]
impl RelationRepository for TxRelationRepository {
    async fn find_existing(
        &self,
        tenant_id: &TenantId,
        source_kind: DocKind,
        source_id: i64,
        target_kind: DocKind,
        target_id: i64,
        mode: RelationMode,
    ) -> AppResult<Option<DocRelation>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let row = sqlx::query_as::<_, DocRelationRow>(
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
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to find relation: {}", e)))?;

        row.map(|r| r.into_relation()).transpose()
    }

    async fn insert(&self, relation: &DocRelation) -> AppResult<i64> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let (id,): (i64,) = sqlx::query_as(
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
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                AppError::conflict("关联已存在")
            }
            _ => AppError::database(format!("Failed to insert relation: {}", e)),
        })?;

        Ok(id)
    }

    async fn list_targets(
        &self,
        tenant_id: &TenantId,
        source_kind: DocKind,
        source_id: i64,
        target_kind: Option<DocKind>,
    ) -> AppResult<Vec<DocRelation>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = match target_kind {
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
                .fetch_all(&mut **tx)
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
                .fetch_all(&mut **tx)
                .await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to list relation targets: {}", e)))?;

        rows.into_iter().map(|r| r.into_relation()).collect()
    }

    async fn list_sources(
        &self,
        tenant_id: &TenantId,
        target_kind: DocKind,
        target_id: i64,
    ) -> AppResult<Vec<DocRelation>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, DocRelationRow>(
            r#"
            SELECT * FROM doc_relations
            WHERE tenant_id = $1 AND target_kind = $2 AND target_id = $3 AND deleted_at IS NULL
            ORDER BY id ASC
            "#,
        )
        .bind(tenant_id.0)
        .bind(target_kind.as_str())
        .bind(target_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to list relation sources: {}", e)))?;

        rows.into_iter().map(|r| r.into_relation()).collect()
    }

    async fn list_by_demand(
        &self,
        tenant_id: &TenantId,
        demand_id: i64,
    ) -> AppResult<Vec<DocRelation>> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction consumed"))?;

        let rows = sqlx::query_as::<_, DocRelationRow>(
            r#"
            SELECT * FROM doc_relations
            WHERE tenant_id = $1 AND demand_id = $2 AND deleted_at IS NULL
            ORDER BY id ASC
            "#,
        )
        .bind(tenant_id.0)
        .bind(demand_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to list demand relations: {}", e)))?;

        rows.into_iter().map(|r| r.into_relation()).collect()
    }
}
