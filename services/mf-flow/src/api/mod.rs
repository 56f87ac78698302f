//! HTTP API 层
//!
//! Axum 路由 + 请求/响应 DTO。租户与操作人从请求头解析，
//! 业务错误统一转换为 RFC 7807 Problem Details。

mod coding;
mod error;
mod extract;
mod health;
mod init;
mod orchestrator;
mod relations;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;
