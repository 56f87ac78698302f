//! 仓储接口定义
//!
//! 按业务区域分组，每个聚合一个 trait，由基础设施层提供事务内实现。

pub mod coding;
pub mod documents;
pub mod relations;

pub use coding::{CodeRuleRepository, CodeSequenceRepository};
pub use documents::{
    ComputationRepository, DemandRepository, FinanceRepository, PlanRepository,
    PurchaseOrderRepository, ReceiptRepository, RequisitionRepository, WorkOrderRepository,
};
pub use relations::RelationRepository;
