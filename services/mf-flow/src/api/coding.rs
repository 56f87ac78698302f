//! 编码规则维护与分配接口

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use mes_common::{PagedResult, Pagination};
use mes_cqrs_core::{CommandHandler, QueryHandler};
use mes_errors::AppError;
use serde::{Deserialize, Serialize};

use crate::application::commands::coding::{
    AllocateCodeCommand, CodeRuleView, CreateCodeRuleCommand, DeleteCodeRuleCommand,
    UpdateCodeRuleCommand,
};
use crate::application::queries::coding::{GetCodeRuleQuery, ListCodeRulesQuery, PreviewCodeQuery};

use super::error::ApiResult;
use super::extract;
use super::state::AppState;

fn default_seq_start() -> i64 {
    1
}

fn default_seq_step() -> i64 {
    1
}

fn default_seq_width() -> i64 {
    4
}

fn default_reset_policy() -> String {
    "never".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateRuleRequest {
    pub code: String,
    pub name: String,
    pub template: String,
    #[serde(default = "default_seq_start")]
    pub seq_start: i64,
    #[serde(default = "default_seq_step")]
    pub seq_step: i64,
    #[serde(default = "default_seq_width")]
    pub seq_width: i64,
    #[serde(default = "default_reset_policy")]
    pub reset_policy: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /api/code-rules
pub async fn create_rule(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateRuleRequest>,
) -> ApiResult<(StatusCode, Json<CodeRuleView>)> {
    let command = CreateCodeRuleCommand {
        tenant_id: extract::tenant_id(&headers)?,
        code: req.code,
        name: req.name,
        template: req.template,
        seq_start: req.seq_start,
        seq_step: req.seq_step,
        seq_width: req.seq_width,
        reset_policy: req.reset_policy,
        description: req.description,
        created_by: extract::user_id(&headers),
    };

    let view = state.create_rule.handle(command).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRuleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub seq_start: Option<i64>,
    #[serde(default)]
    pub seq_step: Option<i64>,
    #[serde(default)]
    pub seq_width: Option<i64>,
    #[serde(default)]
    pub reset_policy: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

/// PUT /api/code-rules/{id}
pub async fn update_rule(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRuleRequest>,
) -> ApiResult<Json<CodeRuleView>> {
    let command = UpdateCodeRuleCommand {
        tenant_id: extract::tenant_id(&headers)?,
        id,
        name: req.name,
        template: req.template,
        seq_start: req.seq_start,
        seq_step: req.seq_step,
        seq_width: req.seq_width,
        reset_policy: req.reset_policy,
        is_active: req.is_active,
        description: req.description,
        updated_by: extract::user_id(&headers),
    };

    Ok(Json(state.update_rule.handle(command).await?))
}

/// DELETE /api/code-rules/{id}
pub async fn delete_rule(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let command = DeleteCodeRuleCommand {
        tenant_id: extract::tenant_id(&headers)?,
        id,
    };

    state.delete_rule.handle(command).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/code-rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResult<Json<CodeRuleView>> {
    let query = GetCodeRuleQuery {
        tenant_id: extract::tenant_id(&headers)?,
        id,
    };

    let view = state
        .get_rule
        .handle(query)
        .await?
        .ok_or_else(|| AppError::not_found(format!("编码规则#{}", id)))?;

    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// GET /api/code-rules
pub async fn list_rules(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<PagedResult<CodeRuleView>>> {
    let default = Pagination::default();
    let query = ListCodeRulesQuery {
        tenant_id: extract::tenant_id(&headers)?,
        pagination: Pagination {
            page: params.page.unwrap_or(default.page).max(1),
            page_size: params.page_size.unwrap_or(default.page_size).clamp(1, 200),
        },
    };

    Ok(Json(state.list_rules.handle(query).await?))
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub template: String,
    #[serde(default = "default_seq_start")]
    pub seq_start: i64,
    #[serde(default = "default_seq_width")]
    pub seq_width: i64,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub dict: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub preview: String,
}

/// POST /api/code-rules/preview
pub async fn preview(
    State(state): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> ApiResult<Json<PreviewResponse>> {
    let query = PreviewCodeQuery {
        template: req.template,
        seq_start: req.seq_start,
        seq_width: req.seq_width,
        prefix: req.prefix,
        dict: req.dict,
    };

    let preview = state.preview_code.handle(query).await?;
    Ok(Json(PreviewResponse { preview }))
}

#[derive(Debug, Deserialize)]
pub struct AllocateRequest {
    pub rule_code: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub scope_key: Option<String>,
    #[serde(default)]
    pub dict: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct AllocateResponse {
    pub code: String,
}

/// POST /api/codes/allocate
pub async fn allocate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AllocateRequest>,
) -> ApiResult<Json<AllocateResponse>> {
    let command = AllocateCodeCommand {
        tenant_id: extract::tenant_id(&headers)?,
        rule_code: req.rule_code,
        prefix: req.prefix,
        scope_key: req.scope_key,
        dict: req.dict,
    };

    let code = state.allocate_code.handle(command).await?;
    Ok(Json(AllocateResponse { code }))
}
