//! 单据关联仓储接口

use async_trait::async_trait;
use mes_common::TenantId;
use mes_errors::AppResult;

use crate::domain::documents::DocKind;
use crate::domain::relations::{DocRelation, RelationMode};

/// 单据关联仓储
///
/// 去重键为 (租户, 源类型, 源 ID, 目标类型, 目标 ID, 方向)，
/// 判断永远排除已软删除的边。
#[async_trait]
pub trait RelationRepository: Send + Sync {
    /// 查找去重键命中的存活边
    async fn find_existing(
        &self,
        tenant_id: &TenantId,
        source_kind: DocKind,
        source_id: i64,
        target_kind: DocKind,
        target_id: i64,
        mode: RelationMode,
    ) -> AppResult<Option<DocRelation>>;

    /// 插入关联边，返回数据库生成的 ID
    async fn insert(&self, relation: &DocRelation) -> AppResult<i64>;

    /// 列出某源单据出发的边，可按目标类型过滤
    async fn list_targets(
        &self,
        tenant_id: &TenantId,
        source_kind: DocKind,
        source_id: i64,
        target_kind: Option<DocKind>,
    ) -> AppResult<Vec<DocRelation>>;

    /// 列出指向某目标单据的边
    async fn list_sources(
        &self,
        tenant_id: &TenantId,
        target_kind: DocKind,
        target_id: i64,
    ) -> AppResult<Vec<DocRelation>>;

    /// 列出锚定在某根需求上的全部边
    async fn list_by_demand(
        &self,
        tenant_id: &TenantId,
        demand_id: i64,
    ) -> AppResult<Vec<DocRelation>>;
}
