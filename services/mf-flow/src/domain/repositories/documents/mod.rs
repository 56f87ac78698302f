//! 业务单据仓储接口

mod computation_repository;
mod demand_repository;
mod finance_repository;
mod plan_repository;
mod purchase_order_repository;
mod receipt_repository;
mod requisition_repository;
mod work_order_repository;

pub use computation_repository::ComputationRepository;
pub use demand_repository::DemandRepository;
pub use finance_repository::FinanceRepository;
pub use plan_repository::PlanRepository;
pub use purchase_order_repository::PurchaseOrderRepository;
pub use receipt_repository::ReceiptRepository;
pub use requisition_repository::RequisitionRepository;
pub use work_order_repository::WorkOrderRepository;
