//! 单据注册表
//!
//! 推拉网络覆盖六种单据类型，编排器只需要每种单据的统一视图：
//! ID、编码、名称快照和根需求锚点。注册表按类型分发到对应仓储，
//! 把查询结果收敛为一个枚举。

use mes_common::TenantId;
use mes_errors::AppResult;

use super::documents::{
    Demand, DemandComputation, DocKind, ProductionPlan, PurchaseOrder, PurchaseRequisition,
    WorkOrder,
};
use super::unit_of_work::UnitOfWork;

/// 统一的单据视图
#[derive(Debug, Clone)]
pub enum Document {
    Demand(Demand),
    Computation(DemandComputation),
    Plan(ProductionPlan),
    WorkOrder(WorkOrder),
    PurchaseOrder(PurchaseOrder),
    Requisition(PurchaseRequisition),
}

impl Document {
    pub fn kind(&self) -> DocKind {
        match self {
            Self::Demand(_) => DocKind::Demand,
            Self::Computation(_) => DocKind::DemandComputation,
            Self::Plan(_) => DocKind::ProductionPlan,
            Self::WorkOrder(_) => DocKind::WorkOrder,
            Self::PurchaseOrder(_) => DocKind::PurchaseOrder,
            Self::Requisition(_) => DocKind::PurchaseRequisition,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Demand(d) => d.id,
            Self::Computation(c) => c.id,
            Self::Plan(p) => p.id,
            Self::WorkOrder(w) => w.id,
            Self::PurchaseOrder(o) => o.id,
            Self::Requisition(r) => r.id,
        }
    }

    /// 单据编码快照
    pub fn code(&self) -> &str {
        match self {
            Self::Demand(d) => &d.demand_code,
            Self::Computation(c) => &c.computation_code,
            Self::Plan(p) => &p.plan_code,
            Self::WorkOrder(w) => &w.code,
            Self::PurchaseOrder(o) => &o.order_code,
            Self::Requisition(r) => &r.requisition_code,
        }
    }

    /// 单据名称快照，计算单没有独立名称
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Demand(d) => Some(&d.demand_name),
            Self::Computation(_) => None,
            Self::Plan(p) => Some(&p.plan_name),
            Self::WorkOrder(w) => Some(&w.name),
            Self::PurchaseOrder(o) => o.order_name.as_deref(),
            Self::Requisition(r) => Some(&r.requisition_name),
        }
    }

    /// 根需求锚点
    ///
    /// 需求锚定自身，计算单锚定其来源需求；计划、工单、采购单和
    /// 采购申请没有可靠的需求锚点。
    pub fn demand_anchor(&self) -> Option<i64> {
        match self {
            Self::Demand(d) => Some(d.id),
            Self::Computation(c) => Some(c.demand_id),
            _ => None,
        }
    }
}

/// 按类型加载单据（不含软删除）
pub async fn load_document(
    uow: &dyn UnitOfWork,
    tenant_id: &TenantId,
    kind: DocKind,
    id: i64,
) -> AppResult<Option<Document>> {
    let document = match kind {
        DocKind::Demand => uow.demands().find_by_id(tenant_id, id).await?.map(Document::Demand),
        DocKind::DemandComputation => uow
            .computations()
            .find_by_id(tenant_id, id)
            .await?
            .map(Document::Computation),
        DocKind::ProductionPlan => uow.plans().find_by_id(tenant_id, id).await?.map(Document::Plan),
        DocKind::WorkOrder => uow
            .work_orders()
            .find_by_id(tenant_id, id)
            .await?
            .map(Document::WorkOrder),
        DocKind::PurchaseOrder => uow
            .purchase_orders()
            .find_by_id(tenant_id, id)
            .await?
            .map(Document::PurchaseOrder),
        DocKind::PurchaseRequisition => uow
            .requisitions()
            .find_by_id(tenant_id, id)
            .await?
            .map(Document::Requisition),
    };
    Ok(document)
}
