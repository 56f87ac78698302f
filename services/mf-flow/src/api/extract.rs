//! 请求头解析

use axum::http::HeaderMap;
use mes_common::{TenantId, UserId};
use mes_errors::AppError;

use super::error::ApiError;

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const USER_HEADER: &str = "x-user-id";

/// 解析必填的租户头
pub fn tenant_id(headers: &HeaderMap) -> Result<TenantId, ApiError> {
    let raw = headers
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError(AppError::validation("缺少 X-Tenant-Id 请求头")))?;

    TenantId::from_string(raw)
        .map_err(|_| ApiError(AppError::validation(format!("无效的租户 ID: {}", raw))))
}

/// 解析可选的操作人头，格式非法按未提供处理
pub fn user_id(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| UserId::from_string(raw).ok())
}
