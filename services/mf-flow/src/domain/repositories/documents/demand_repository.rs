//! 销售需求仓储接口

use async_trait::async_trait;
use mes_common::TenantId;
use mes_errors::AppResult;

use crate::domain::documents::Demand;

/// 销售需求仓储
///
/// 需求由上游模块创建，本服务只读取并回写下推标记。
#[async_trait]
pub trait DemandRepository: Send + Sync {
    /// 按 ID 查找（不含软删除）
    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<Demand>>;

    /// 回写下推标记与目标计算单快照
    async fn update(&self, demand: &Demand) -> AppResult<()>;
}
