//! 下推命令

use mes_common::{TenantId, UserId};
use mes_cqrs_core::Command;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::documents::DocKind;

/// 下推附加参数
///
/// 生成采购单时供应商必填，单价缺省为 0。
#[derive(Debug, Clone, Default)]
pub struct PushParams {
    pub supplier_id: Option<i64>,
    pub unit_price: Option<Decimal>,
    pub extra: Option<serde_json::Value>,
}

/// 下推命令
#[derive(Debug, Clone)]
pub struct PushDocumentCommand {
    pub tenant_id: TenantId,
    pub source_kind: DocKind,
    pub source_id: i64,
    pub target_kind: DocKind,
    pub params: PushParams,
    pub created_by: Option<UserId>,
}

impl Command for PushDocumentCommand {
    type Result = PushOutcome;
}

/// 下推生成的目标单据引用
#[derive(Debug, Clone, Serialize)]
pub struct TargetRef {
    pub kind: DocKind,
    pub id: i64,
    pub code: String,
}

/// 下推结果
#[derive(Debug, Clone, Serialize)]
pub struct PushOutcome {
    pub message: String,
    pub targets: Vec<TargetRef>,
    pub relation_ids: Vec<i64>,
}
