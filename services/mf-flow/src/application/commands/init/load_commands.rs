//! 期初导入命令与结果

use mes_common::{TenantId, UserId};
use mes_cqrs_core::Command;
use serde::Serialize;

/// 期初库存导入命令
///
/// `rows` 是二维表格：第 0 行表头，第 1 行示例（丢弃），其后为数据。
#[derive(Debug, Clone)]
pub struct LoadOpeningInventoryCommand {
    pub tenant_id: TenantId,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub snapshot_time: Option<String>,
    pub created_by: Option<UserId>,
}

impl Command for LoadOpeningInventoryCommand {
    type Result = LoadReport;
}

/// 期初在制品导入命令
#[derive(Debug, Clone)]
pub struct LoadOpeningWipCommand {
    pub tenant_id: TenantId,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub snapshot_time: Option<String>,
    pub created_by: Option<UserId>,
}

impl Command for LoadOpeningWipCommand {
    type Result = LoadReport;
}

/// 期初应收应付导入命令
#[derive(Debug, Clone)]
pub struct LoadOpeningFinanceCommand {
    pub tenant_id: TenantId,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub snapshot_time: Option<String>,
    pub created_by: Option<UserId>,
}

impl Command for LoadOpeningFinanceCommand {
    type Result = LoadReport;
}

/// 行级失败记录，行号按含表头和示例行的 1 起始序号上报
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    pub row: usize,
    pub error: String,
}

/// 导入结果汇总
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub success_count: usize,
    pub failure_count: usize,
    pub total: usize,
    pub errors: Vec<RowFailure>,
}

impl LoadReport {
    pub fn record_success(&mut self) {
        self.success_count += 1;
        self.total += 1;
    }

    pub fn record_failure(&mut self, row: usize, error: impl Into<String>) {
        self.failure_count += 1;
        self.total += 1;
        self.errors.push(RowFailure {
            row,
            error: error.into(),
        });
    }
}
