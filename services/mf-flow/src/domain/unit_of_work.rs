//! Unit of Work 模式
//!
//! 提供跨多个 Repository 的事务协调能力。一次下推、上拉或期初导入
//! 批次的全部读写都在同一个 UnitOfWork 内完成，要么整体提交，
//! 要么整体回滚。

use async_trait::async_trait;
use mes_errors::AppResult;

use crate::domain::repositories::coding::{CodeRuleRepository, CodeSequenceRepository};
use crate::domain::repositories::documents::{
    ComputationRepository, DemandRepository, FinanceRepository, PlanRepository,
    PurchaseOrderRepository, ReceiptRepository, RequisitionRepository, WorkOrderRepository,
};
use crate::domain::repositories::relations::RelationRepository;

/// Unit of Work trait
///
/// 协调多个 Repository 在同一事务中的操作。
///
/// # 使用示例
///
/// ```ignore
/// let uow = uow_factory.begin().await?;
///
/// // 所有操作在同一事务中
/// let demand = uow.demands().find_by_id(&tenant, id).await?;
/// uow.relations().insert(&relation).await?;
///
/// // 提交事务
/// uow.commit().await?;
/// ```
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    // ============ 编码 Repositories ============

    /// 获取编码规则 Repository
    fn code_rules(&self) -> &dyn CodeRuleRepository;

    /// 获取序列计数器 Repository
    fn code_sequences(&self) -> &dyn CodeSequenceRepository;

    // ============ 单据 Repositories ============

    /// 获取销售需求 Repository
    fn demands(&self) -> &dyn DemandRepository;

    /// 获取需求计算 Repository
    fn computations(&self) -> &dyn ComputationRepository;

    /// 获取生产计划 Repository
    fn plans(&self) -> &dyn PlanRepository;

    /// 获取工单 Repository
    fn work_orders(&self) -> &dyn WorkOrderRepository;

    /// 获取采购单 Repository
    fn purchase_orders(&self) -> &dyn PurchaseOrderRepository;

    /// 获取采购申请 Repository
    fn requisitions(&self) -> &dyn RequisitionRepository;

    /// 获取采购入库单 Repository
    fn receipts(&self) -> &dyn ReceiptRepository;

    /// 获取应收应付 Repository
    fn finance_documents(&self) -> &dyn FinanceRepository;

    // ============ 关联 Repositories ============

    /// 获取单据关联 Repository
    fn relations(&self) -> &dyn RelationRepository;

    // ============ Transaction Control ============

    /// 提交事务
    ///
    /// 成功时所有更改将持久化，失败时自动回滚。
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// 回滚事务
    ///
    /// 撤销所有未提交的更改。
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Unit of Work 工厂 trait
///
/// 用于创建新的 UnitOfWork 实例。
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    /// 开始新的事务
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}
