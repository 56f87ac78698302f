//! 单据关联查询接口

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use mes_cqrs_core::QueryHandler;

use crate::application::queries::relations::{
    DemandTraceQuery, DocumentRelations, DocumentRelationsQuery, RelationView,
};
use crate::domain::documents::DocKind;

use super::error::ApiResult;
use super::extract;
use super::state::AppState;

/// GET /api/relations/{kind}/{id}
pub async fn document_relations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((kind, id)): Path<(String, i64)>,
) -> ApiResult<Json<DocumentRelations>> {
    let query = DocumentRelationsQuery {
        tenant_id: extract::tenant_id(&headers)?,
        kind: DocKind::parse(&kind)?,
        id,
    };

    Ok(Json(state.document_relations.handle(query).await?))
}

/// GET /api/relations/demand/{demand_id}/targets
pub async fn demand_trace(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(demand_id): Path<i64>,
) -> ApiResult<Json<Vec<RelationView>>> {
    let query = DemandTraceQuery {
        tenant_id: extract::tenant_id(&headers)?,
        demand_id,
    };

    Ok(Json(state.demand_trace.handle(query).await?))
}
