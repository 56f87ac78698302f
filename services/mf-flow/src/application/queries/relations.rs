//! 单据关联查询

use chrono::{DateTime, Utc};
use mes_common::TenantId;
use mes_cqrs_core::Query;
use serde::Serialize;

use crate::domain::documents::DocKind;
use crate::domain::relations::DocRelation;

/// 查询某单据两个方向上的全部关联
#[derive(Debug, Clone)]
pub struct DocumentRelationsQuery {
    pub tenant_id: TenantId,
    pub kind: DocKind,
    pub id: i64,
}

impl Query for DocumentRelationsQuery {
    type Result = DocumentRelations;
}

/// 查询锚定在某需求上的全部传播边（追溯闭包）
#[derive(Debug, Clone)]
pub struct DemandTraceQuery {
    pub tenant_id: TenantId,
    pub demand_id: i64,
}

impl Query for DemandTraceQuery {
    type Result = Vec<RelationView>;
}

/// 单据关联两个方向的视图
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRelations {
    /// 该单据作为源的出边
    pub as_source: Vec<RelationView>,
    /// 指向该单据的入边
    pub as_target: Vec<RelationView>,
}

/// 关联边视图
#[derive(Debug, Clone, Serialize)]
pub struct RelationView {
    pub id: i64,
    pub source_kind: DocKind,
    pub source_id: i64,
    pub source_code: String,
    pub source_name: Option<String>,
    pub target_kind: DocKind,
    pub target_id: i64,
    pub target_code: String,
    pub target_name: Option<String>,
    pub relation_mode: String,
    pub relation_desc: String,
    pub demand_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<DocRelation> for RelationView {
    fn from(edge: DocRelation) -> Self {
        Self {
            id: edge.id,
            source_kind: edge.source_kind,
            source_id: edge.source_id,
            source_code: edge.source_code,
            source_name: edge.source_name,
            target_kind: edge.target_kind,
            target_id: edge.target_id,
            target_code: edge.target_code,
            target_name: edge.target_name,
            relation_mode: edge.relation_mode.as_str().to_string(),
            relation_desc: edge.relation_desc,
            demand_id: edge.demand_id,
            created_at: edge.audit_info.created_at,
        }
    }
}
