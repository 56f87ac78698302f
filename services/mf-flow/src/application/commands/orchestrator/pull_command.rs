//! 上拉命令

use mes_common::{TenantId, UserId};
use mes_cqrs_core::Command;
use serde::Serialize;

use crate::domain::documents::DocKind;

/// 上拉命令
///
/// 只建立关联边，不生成单据，两端必须都已存在。
#[derive(Debug, Clone)]
pub struct PullDocumentCommand {
    pub tenant_id: TenantId,
    pub target_kind: DocKind,
    pub target_id: i64,
    pub source_kind: DocKind,
    pub source_id: i64,
    pub created_by: Option<UserId>,
}

impl Command for PullDocumentCommand {
    type Result = PullOutcome;
}

/// 上拉结果
#[derive(Debug, Clone, Serialize)]
pub struct PullOutcome {
    pub message: String,
    pub relation_id: i64,
}
