//! 序列计数器仓储接口

use async_trait::async_trait;
use chrono::NaiveDate;
use mes_common::TenantId;
use mes_errors::AppResult;

use crate::domain::coding::CodeSequence;

/// 序列计数器仓储
///
/// `lock` 以 NOWAIT 方式抢占行级锁，抢占失败映射为
/// `AllocationContention`，由调用方以全新事务重试。
#[async_trait]
pub trait CodeSequenceRepository: Send + Sync {
    /// 确保计数器行存在，不存在则以给定种子值创建
    async fn ensure(
        &self,
        rule_id: i64,
        tenant_id: &TenantId,
        scope_key: &str,
        initial_value: i64,
    ) -> AppResult<()>;

    /// 锁定并返回计数器行
    async fn lock(
        &self,
        rule_id: i64,
        tenant_id: &TenantId,
        scope_key: &str,
    ) -> AppResult<CodeSequence>;

    /// 写回计数器当前值与重置日期
    async fn update(
        &self,
        id: i64,
        current_value: i64,
        last_reset: Option<NaiveDate>,
    ) -> AppResult<()>;
}
