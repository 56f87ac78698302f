//! 推拉编排接口

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use mes_common::UserId;
use mes_cqrs_core::CommandHandler;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::commands::orchestrator::{
    PullDocumentCommand, PushDocumentCommand, PushParams, TargetRef,
};
use crate::domain::documents::DocKind;

use super::error::ApiResult;
use super::extract;
use super::state::AppState;

/// 下推附加参数（生成采购单时供应商必填）
#[derive(Debug, Default, Deserialize)]
pub struct PushParamsDto {
    #[serde(default)]
    pub supplier_id: Option<i64>,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub extra: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct PushRequest {
    pub source_type: String,
    pub source_id: i64,
    pub target_type: String,
    #[serde(default)]
    pub push_params: PushParamsDto,
    #[serde(default)]
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub success: bool,
    pub message: String,
    pub target_documents: Vec<TargetRef>,
    pub relations: Vec<i64>,
}

/// POST /api/orchestrator/push
pub async fn push(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PushRequest>,
) -> ApiResult<Json<PushResponse>> {
    let command = PushDocumentCommand {
        tenant_id: extract::tenant_id(&headers)?,
        source_kind: DocKind::parse(&req.source_type)?,
        source_id: req.source_id,
        target_kind: DocKind::parse(&req.target_type)?,
        params: PushParams {
            supplier_id: req.push_params.supplier_id,
            unit_price: req.push_params.unit_price,
            extra: req.push_params.extra,
        },
        created_by: req
            .created_by
            .map(UserId::from_uuid)
            .or_else(|| extract::user_id(&headers)),
    };

    let outcome = state.push.handle(command).await?;
    Ok(Json(PushResponse {
        success: true,
        message: outcome.message,
        target_documents: outcome.targets,
        relations: outcome.relation_ids,
    }))
}

#[derive(Debug, Deserialize)]
pub struct PullRequest {
    pub target_type: String,
    pub target_id: i64,
    pub source_type: String,
    pub source_id: i64,
    #[serde(default)]
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PullResponse {
    pub success: bool,
    pub message: String,
    pub relation: i64,
}

/// POST /api/orchestrator/pull
pub async fn pull(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PullRequest>,
) -> ApiResult<Json<PullResponse>> {
    let command = PullDocumentCommand {
        tenant_id: extract::tenant_id(&headers)?,
        target_kind: DocKind::parse(&req.target_type)?,
        target_id: req.target_id,
        source_kind: DocKind::parse(&req.source_type)?,
        source_id: req.source_id,
        created_by: req
            .created_by
            .map(UserId::from_uuid)
            .or_else(|| extract::user_id(&headers)),
    };

    let outcome = state.pull.handle(command).await?;
    Ok(Json(PullResponse {
        success: true,
        message: outcome.message,
        relation: outcome.relation_id,
    }))
}
