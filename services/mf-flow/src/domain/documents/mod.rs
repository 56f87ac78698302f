//! 业务单据聚合

mod computation;
mod demand;
mod kind;
mod opening;
mod plan;
mod purchase;
mod work_order;

pub use computation::{ComputationLine, ComputationStatus, DemandComputation};
pub use demand::{Demand, DemandStatus};
pub use kind::{BusinessMode, ComputationType, DocKind, MaterialSource, ReviewStatus};
pub use opening::{
    FinanceDocument, FinanceKind, FinanceStatus, PurchaseReceipt, ReceiptLine, ReceiptStatus,
};
pub use plan::{ExecutionStatus, PlanLine, PlanStatus, ProductionPlan, SuggestedAction};
pub use purchase::{
    PurchaseOrder, PurchaseOrderLine, PurchaseRequisition, PurchaseStatus, RequisitionLine,
};
pub use work_order::{
    OperationStatus, WorkOrder, WorkOrderOperation, WorkOrderPriority, WorkOrderStatus,
};
