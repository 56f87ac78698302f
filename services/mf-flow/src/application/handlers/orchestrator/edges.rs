//! 关联边落库
//!
//! 去重键 (租户, 源, 目标, 方向) 命中存活边时返回既有边而不是重复
//! 插入；唯一约束竞态由仓储层的插入错误暴露，调用方整体重试。

use mes_common::{AuditInfo, TenantId, UserId};
use mes_errors::AppResult;
use uuid::Uuid;

use crate::domain::documents::{BusinessMode, DocKind};
use crate::domain::relations::{DocRelation, RelationMode};
use crate::domain::unit_of_work::UnitOfWork;

/// 待落库的边
pub(crate) struct EdgeSpec {
    pub source_kind: DocKind,
    pub source_id: i64,
    pub source_code: String,
    pub source_name: Option<String>,
    pub target_kind: DocKind,
    pub target_id: i64,
    pub target_code: String,
    pub target_name: Option<String>,
    pub mode: RelationMode,
    pub description: String,
    pub business_mode: Option<BusinessMode>,
    pub demand_id: Option<i64>,
}

/// 幂等落库一条关联边，返回 (边, 是否新建)
pub(crate) async fn record_edge(
    uow: &dyn UnitOfWork,
    tenant_id: &TenantId,
    created_by: Option<UserId>,
    spec: EdgeSpec,
) -> AppResult<(DocRelation, bool)> {
    if let Some(existing) = uow
        .relations()
        .find_existing(
            tenant_id,
            spec.source_kind,
            spec.source_id,
            spec.target_kind,
            spec.target_id,
            spec.mode,
        )
        .await?
    {
        return Ok((existing, false));
    }

    let mut edge = DocRelation {
        id: 0,
        uuid: Uuid::now_v7(),
        tenant_id: *tenant_id,
        source_kind: spec.source_kind,
        source_id: spec.source_id,
        source_code: spec.source_code,
        source_name: spec.source_name,
        target_kind: spec.target_kind,
        target_id: spec.target_id,
        target_code: spec.target_code,
        target_name: spec.target_name,
        relation_type: "source".to_string(),
        relation_mode: spec.mode,
        relation_desc: spec.description,
        business_mode: spec.business_mode,
        demand_id: spec.demand_id,
        audit_info: AuditInfo::new(created_by),
        deleted_at: None,
    };
    edge.id = uow.relations().insert(&edge).await?;
    Ok((edge, true))
}
