//! PostgreSQL Unit of Work 实现
//!
//! 使用 SQLx Transaction 提供事务协调能力。

use async_trait::async_trait;
use mes_adapter_postgres::TransactionManager;
use mes_errors::{AppError, AppResult};
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::repositories::coding::{CodeRuleRepository, CodeSequenceRepository};
use crate::domain::repositories::documents::{
    ComputationRepository, DemandRepository, FinanceRepository, PlanRepository,
    PurchaseOrderRepository, ReceiptRepository, RequisitionRepository, WorkOrderRepository,
};
use crate::domain::repositories::relations::RelationRepository;
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};

use super::tx_repositories::{
    TxCodeRuleRepository, TxCodeSequenceRepository, TxComputationRepository, TxDemandRepository,
    TxFinanceRepository, TxPlanRepository, TxPurchaseOrderRepository, TxReceiptRepository,
    TxRelationRepository, TxRequisitionRepository, TxWorkOrderRepository,
};

/// PostgreSQL Unit of Work 工厂
pub struct PostgresUnitOfWorkFactory {
    tx_manager: TransactionManager,
}

impl PostgresUnitOfWorkFactory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            tx_manager: TransactionManager::new(pool),
        }
    }
}

#[async_trait]
impl UnitOfWorkFactory for PostgresUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self.tx_manager.begin().await?;
        Ok(Box::new(PostgresUnitOfWork::new(tx)))
    }
}

/// PostgreSQL Unit of Work 实现
///
/// 持有一个事务和所有相关的 Repository 实例。
/// 所有 Repository 操作都在同一个事务中执行。
pub struct PostgresUnitOfWork {
    /// 使用 Arc<Mutex> 包装 Transaction，使其可以被多个 Repository 共享
    tx: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,

    code_rule_repo: TxCodeRuleRepository,
    code_sequence_repo: TxCodeSequenceRepository,
    demand_repo: TxDemandRepository,
    computation_repo: TxComputationRepository,
    plan_repo: TxPlanRepository,
    work_order_repo: TxWorkOrderRepository,
    purchase_order_repo: TxPurchaseOrderRepository,
    requisition_repo: TxRequisitionRepository,
    receipt_repo: TxReceiptRepository,
    finance_repo: TxFinanceRepository,
    relation_repo: TxRelationRepository,
}

impl PostgresUnitOfWork {
    fn new(tx: Transaction<'static, Postgres>) -> Self {
        let tx = Arc::new(Mutex::new(Some(tx)));

        Self {
            tx: tx.clone(),
            code_rule_repo: TxCodeRuleRepository::new(tx.clone()),
            code_sequence_repo: TxCodeSequenceRepository::new(tx.clone()),
            demand_repo: TxDemandRepository::new(tx.clone()),
            computation_repo: TxComputationRepository::new(tx.clone()),
            plan_repo: TxPlanRepository::new(tx.clone()),
            work_order_repo: TxWorkOrderRepository::new(tx.clone()),
            purchase_order_repo: TxPurchaseOrderRepository::new(tx.clone()),
            requisition_repo: TxRequisitionRepository::new(tx.clone()),
            receipt_repo: TxReceiptRepository::new(tx.clone()),
            finance_repo: TxFinanceRepository::new(tx.clone()),
            relation_repo: TxRelationRepository::new(tx.clone()),
        }
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    // ============ 编码 Repositories ============

    fn code_rules(&self) -> &dyn CodeRuleRepository {
        &self.code_rule_repo
    }

    fn code_sequences(&self) -> &dyn CodeSequenceRepository {
        &self.code_sequence_repo
    }

    // ============ 单据 Repositories ============

    fn demands(&self) -> &dyn DemandRepository {
        &self.demand_repo
    }

    fn computations(&self) -> &dyn ComputationRepository {
        &self.computation_repo
    }

    fn plans(&self) -> &dyn PlanRepository {
        &self.plan_repo
    }

    fn work_orders(&self) -> &dyn WorkOrderRepository {
        &self.work_order_repo
    }

    fn purchase_orders(&self) -> &dyn PurchaseOrderRepository {
        &self.purchase_order_repo
    }

    fn requisitions(&self) -> &dyn RequisitionRepository {
        &self.requisition_repo
    }

    fn receipts(&self) -> &dyn ReceiptRepository {
        &self.receipt_repo
    }

    fn finance_documents(&self) -> &dyn FinanceRepository {
        &self.finance_repo
    }

    // ============ 关联 Repositories ============

    fn relations(&self) -> &dyn RelationRepository {
        &self.relation_repo
    }

    // ============ Transaction Control ============

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit transaction: {}", e)))?;

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        let mut guard = self.tx.lock().await;
        let tx = guard
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;

        tx.rollback()
            .await
            .map_err(|e| AppError::database(format!("Failed to rollback transaction: {}", e)))?;

        Ok(())
    }
}
