//! 编码规则仓储接口

use async_trait::async_trait;
use mes_common::{Pagination, TenantId};
use mes_errors::AppResult;

use crate::domain::coding::CodeRule;

/// 编码规则仓储
#[async_trait]
pub trait CodeRuleRepository: Send + Sync {
    /// 按规则编码查找（不含软删除）
    async fn find_by_code(&self, tenant_id: &TenantId, code: &str) -> AppResult<Option<CodeRule>>;

    /// 按 ID 查找
    async fn find_by_id(&self, tenant_id: &TenantId, id: i64) -> AppResult<Option<CodeRule>>;

    /// 规则编码是否已存在
    async fn exists_by_code(&self, tenant_id: &TenantId, code: &str) -> AppResult<bool>;

    /// 插入规则，返回数据库生成的 ID
    async fn insert(&self, rule: &CodeRule) -> AppResult<i64>;

    /// 更新规则
    async fn update(&self, rule: &CodeRule) -> AppResult<()>;

    /// 软删除规则
    async fn soft_delete(&self, tenant_id: &TenantId, id: i64) -> AppResult<()>;

    /// 分页列出租户下的规则
    async fn list(
        &self,
        tenant_id: &TenantId,
        pagination: &Pagination,
    ) -> AppResult<(Vec<CodeRule>, i64)>;
}
