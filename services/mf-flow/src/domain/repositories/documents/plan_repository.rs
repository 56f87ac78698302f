//! 生产计划仓储接口

use async_trait::async_trait;
use mes_common::TenantId;
use mes_errors::AppResult;

use crate::domain::documents::{PlanLine, ProductionPlan};

/// 生产计划仓储
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// 按 ID 查找（不含软删除）
    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<ProductionPlan>>;

    /// 插入计划头，返回数据库生成的 ID
    async fn insert(&self, plan: &ProductionPlan) -> AppResult<i64>;

    /// 插入计划行
    async fn insert_line(&self, line: &PlanLine) -> AppResult<i64>;

    /// 列出计划的全部明细行
    async fn list_lines(&self, plan_id: i64) -> AppResult<Vec<PlanLine>>;

    /// 回写计划行的执行状态与生成的工单 ID
    async fn update_line_execution(&self, line: &PlanLine) -> AppResult<()>;
}
