//! 采购单仓储接口

use async_trait::async_trait;
use mes_common::TenantId;
use mes_errors::AppResult;

use crate::domain::documents::{PurchaseOrder, PurchaseOrderLine};

/// 采购单仓储
#[async_trait]
pub trait PurchaseOrderRepository: Send + Sync {
    /// 按 ID 查找（不含软删除）
    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<PurchaseOrder>>;

    /// 插入采购单头，返回数据库生成的 ID
    async fn insert(&self, order: &PurchaseOrder) -> AppResult<i64>;

    /// 插入采购单行
    async fn insert_line(&self, line: &PurchaseOrderLine) -> AppResult<i64>;

    /// 列出采购单的全部明细行
    async fn list_lines(&self, order_id: i64) -> AppResult<Vec<PurchaseOrderLine>>;
}
