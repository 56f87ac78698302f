//! 期初导入接口
//!
//! 请求体 `data` 是二维表格：第 0 行表头，第 1 行示例行，其后为数据行。
//! 行级失败记入结果报告，不中断整批导入。

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use mes_common::UserId;
use mes_cqrs_core::CommandHandler;
use serde::Deserialize;
use uuid::Uuid;

use crate::application::commands::init::{
    LoadOpeningFinanceCommand, LoadOpeningInventoryCommand, LoadOpeningWipCommand, LoadReport,
};

use super::error::ApiResult;
use super::extract;
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    pub data: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    pub snapshot_time: Option<String>,
    #[serde(default)]
    pub created_by: Option<Uuid>,
}

impl LoadRequest {
    fn created_by(&self, headers: &HeaderMap) -> Option<UserId> {
        self.created_by
            .map(UserId::from_uuid)
            .or_else(|| extract::user_id(headers))
    }
}

/// POST /api/init/inventory
pub async fn load_inventory(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoadRequest>,
) -> ApiResult<Json<LoadReport>> {
    let command = LoadOpeningInventoryCommand {
        tenant_id: extract::tenant_id(&headers)?,
        created_by: req.created_by(&headers),
        rows: req.data,
        snapshot_time: req.snapshot_time,
    };

    Ok(Json(state.load_inventory.handle(command).await?))
}

/// POST /api/init/wip
pub async fn load_wip(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoadRequest>,
) -> ApiResult<Json<LoadReport>> {
    let command = LoadOpeningWipCommand {
        tenant_id: extract::tenant_id(&headers)?,
        created_by: req.created_by(&headers),
        rows: req.data,
        snapshot_time: req.snapshot_time,
    };

    Ok(Json(state.load_wip.handle(command).await?))
}

/// POST /api/init/receivables-payables
pub async fn load_finance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoadRequest>,
) -> ApiResult<Json<LoadReport>> {
    let command = LoadOpeningFinanceCommand {
        tenant_id: extract::tenant_id(&headers)?,
        created_by: req.created_by(&headers),
        rows: req.data,
        snapshot_time: req.snapshot_time,
    };

    Ok(Json(state.load_finance.handle(command).await?))
}
