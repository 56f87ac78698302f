//! 采购申请仓储接口

use async_trait::async_trait;
use mes_common::TenantId;
use mes_errors::AppResult;

use crate::domain::documents::{PurchaseRequisition, RequisitionLine};

/// 采购申请仓储
#[async_trait]
pub trait RequisitionRepository: Send + Sync {
    /// 按 ID 查找（不含软删除）
    async fn find_by_id(
        &self,
        tenant_id: &TenantId,
        id: i64,
    ) -> AppResult<Option<PurchaseRequisition>>;

    /// 插入申请头，返回数据库生成的 ID
    async fn insert(&self, requisition: &PurchaseRequisition) -> AppResult<i64>;

    /// 插入申请行
    async fn insert_line(&self, line: &RequisitionLine) -> AppResult<i64>;

    /// 列出申请的全部明细行
    async fn list_lines(&self, requisition_id: i64) -> AppResult<Vec<RequisitionLine>>;
}
