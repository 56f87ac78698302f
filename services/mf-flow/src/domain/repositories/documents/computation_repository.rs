//! 需求计算仓储接口

use async_trait::async_trait;
use mes_common::TenantId;
use mes_errors::AppResult;

use crate::domain::documents::{ComputationLine, DemandComputation};

/// 需求计算仓储
#[async_trait]
pub trait ComputationRepository: Send + Sync {
    /// 按 ID 查找（不含软删除）
    async fn find_by_id(
        &self,
        tenant_id: &TenantId,
        id: i64,
    ) -> AppResult<Option<DemandComputation>>;

    /// 插入计算单，返回数据库生成的 ID
    async fn insert(&self, computation: &DemandComputation) -> AppResult<i64>;

    /// 列出计算单的全部明细行
    async fn list_lines(&self, computation_id: i64) -> AppResult<Vec<ComputationLine>>;
}
