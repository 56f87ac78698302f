//! 工单仓储接口

use async_trait::async_trait;
use mes_common::TenantId;
use mes_errors::AppResult;

use crate::domain::documents::{WorkOrder, WorkOrderOperation};

/// 工单仓储
#[async_trait]
pub trait WorkOrderRepository: Send + Sync {
    /// 按 ID 查找（不含软删除）
    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<WorkOrder>>;

    /// 工单号是否已存在（不含软删除）
    async fn exists_by_code(&self, tenant_id: &TenantId, code: &str) -> AppResult<bool>;

    /// 插入工单，返回数据库生成的 ID
    async fn insert(&self, work_order: &WorkOrder) -> AppResult<i64>;

    /// 插入工单工序行
    async fn insert_operation(&self, operation: &WorkOrderOperation) -> AppResult<i64>;
}
