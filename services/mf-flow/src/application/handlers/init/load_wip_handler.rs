//! 期初在制品导入处理器
//!
//! 一行一个在制工单，行级独立事务：单行失败不影响其他行。
//! 工单号可由表格指定（重复则拒绝该行），未指定时自动分配。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mes_common::{AuditInfo, TenantId, UserId};
use mes_cqrs_core::CommandHandler;
use mes_errors::AppResult;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::application::commands::init::{LoadOpeningWipCommand, LoadReport};
use crate::domain::coding::{allocate, system_rules, AllocationContext};
use crate::domain::documents::{
    BusinessMode, OperationStatus, WorkOrder, WorkOrderOperation, WorkOrderPriority,
    WorkOrderStatus,
};
use crate::domain::ports::{CodeMappingPort, MaterialLookup, OperationLookup, WorkshopLookup};
use crate::domain::unit_of_work::UnitOfWorkFactory;
use crate::infrastructure::observability::record_initial_load;

use super::table::{optional, parse_date, parse_decimal, required, Column, Sheet};
use super::EXTERNAL_SYSTEM;

const COLUMNS: &[Column] = &[
    required("产品编码", &["产品代码", "物料编码", "product_code"]),
    required("当前工序编码", &["工序编码", "operation_code"]),
    required("在制品数量", &["在制数量", "wip_quantity"]),
    optional("工单编号", &["工单号", "work_order_code"]),
    optional("投入数量", &["input_quantity"]),
    optional("预计完工时间", &["estimated_completion_time"]),
    optional("车间编码", &["车间代码", "workshop_code"]),
];

pub struct LoadOpeningWipHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    materials: Arc<dyn MaterialLookup>,
    operations: Arc<dyn OperationLookup>,
    workshops: Arc<dyn WorkshopLookup>,
    code_mapping: Arc<dyn CodeMappingPort>,
}

impl LoadOpeningWipHandler {
    pub fn new(
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        materials: Arc<dyn MaterialLookup>,
        operations: Arc<dyn OperationLookup>,
        workshops: Arc<dyn WorkshopLookup>,
        code_mapping: Arc<dyn CodeMappingPort>,
    ) -> Self {
        Self {
            uow_factory,
            materials,
            operations,
            workshops,
            code_mapping,
        }
    }

    async fn load_row(
        &self,
        tenant_id: &TenantId,
        created_by: Option<UserId>,
        snapshot: Option<DateTime<Utc>>,
        snapshot_label: &str,
        sheet: &Sheet,
        row: &[serde_json::Value],
    ) -> Result<(), String> {
        let raw_code = sheet
            .text(row, "产品编码")
            .ok_or_else(|| "产品编码为空".to_string())?;
        let code = self
            .code_mapping
            .convert(tenant_id, EXTERNAL_SYSTEM, "material", &raw_code)
            .await
            .map_err(|e| e.to_string())?;
        let product = self
            .materials
            .find_by_code(tenant_id, &code)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("产品不存在: {}", raw_code))?;

        let operation_code = sheet
            .text(row, "当前工序编码")
            .ok_or_else(|| "当前工序编码为空".to_string())?;
        let operation = self
            .operations
            .find_by_code(tenant_id, &operation_code)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("工序不存在: {}", operation_code))?;

        let quantity_text = sheet
            .text(row, "在制品数量")
            .ok_or_else(|| "在制品数量为空".to_string())?;
        let wip_quantity = parse_decimal(&quantity_text)
            .filter(|q| *q > Decimal::ZERO)
            .ok_or_else(|| format!("在制品数量格式错误: {}", quantity_text))?;

        let input_quantity = match sheet.text(row, "投入数量") {
            Some(text) => Some(
                parse_decimal(&text).ok_or_else(|| format!("投入数量格式错误: {}", text))?,
            ),
            None => None,
        };

        let planned_end_date = sheet
            .text(row, "预计完工时间")
            .and_then(|text| parse_date(&text));

        // 车间是可选主数据，查不到时静默置空
        let workshop = match sheet.text(row, "车间编码") {
            Some(code) => self
                .workshops
                .find_by_code(tenant_id, &code)
                .await
                .map_err(|e| e.to_string())?,
            None => None,
        };

        let uow = self.uow_factory.begin().await.map_err(|e| e.to_string())?;

        let code = match sheet.text(row, "工单编号") {
            Some(provided) => {
                let exists = uow
                    .work_orders()
                    .exists_by_code(tenant_id, &provided)
                    .await
                    .map_err(|e| e.to_string())?;
                if exists {
                    return Err(format!("工单已存在: {}", provided));
                }
                provided
            }
            None => {
                let today = Utc::now().date_naive();
                let prefix = format!("INIT-WIP{}", today.format("%Y%m%d"));
                let context = AllocationContext::with_prefix(prefix).scoped("INIT-WIP");
                allocate(
                    uow.code_rules(),
                    uow.code_sequences(),
                    tenant_id,
                    system_rules::WORK_ORDER_CODE,
                    &context,
                    today,
                )
                .await
                .map_err(|e| e.to_string())?
            }
        };

        let started_at = snapshot.unwrap_or_else(Utc::now);
        let mut work_order = WorkOrder {
            id: 0,
            uuid: Uuid::now_v7(),
            tenant_id: *tenant_id,
            code,
            name: format!("期初在制品-{}", product.name),
            material_id: product.id,
            material_code: product.code.clone(),
            material_name: product.name.clone(),
            quantity: input_quantity.unwrap_or(wip_quantity),
            production_mode: BusinessMode::Mts,
            status: WorkOrderStatus::InProgress,
            priority: WorkOrderPriority::Normal,
            planned_start_date: None,
            planned_end_date,
            actual_start_date: Some(started_at),
            workshop_id: workshop.as_ref().map(|w| w.id),
            workshop_name: workshop.as_ref().map(|w| w.name.clone()),
            completed_quantity: Decimal::ZERO,
            qualified_quantity: Decimal::ZERO,
            unqualified_quantity: Decimal::ZERO,
            source_type: None,
            source_id: None,
            source_code: None,
            remarks: Some(format!(
                "期初在制品导入（快照时间点：{}，当前工序：{}）",
                snapshot_label, operation.name
            )),
            audit_info: AuditInfo::new(created_by),
            deleted_at: None,
        };
        work_order.id = uow
            .work_orders()
            .insert(&work_order)
            .await
            .map_err(|e| e.to_string())?;

        let operation_row = WorkOrderOperation {
            id: 0,
            work_order_id: work_order.id,
            operation_id: operation.id,
            operation_code: operation.code.clone(),
            operation_name: operation.name.clone(),
            sequence: 1,
            status: OperationStatus::InProgress,
            actual_start_date: Some(started_at),
            remarks: Some(format!("期初在制品，在制品数量：{}", wip_quantity)),
        };
        uow.work_orders()
            .insert_operation(&operation_row)
            .await
            .map_err(|e| e.to_string())?;

        uow.commit().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl CommandHandler<LoadOpeningWipCommand> for LoadOpeningWipHandler {
    async fn handle(&self, command: LoadOpeningWipCommand) -> AppResult<LoadReport> {
        let sheet = Sheet::parse(&command.rows, COLUMNS)?;

        let snapshot = command.snapshot_time.as_deref().and_then(|text| {
            parse_date(text)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        });
        let snapshot_label = command.snapshot_time.as_deref().unwrap_or("未指定");

        let mut report = LoadReport::default();
        for (row_no, row) in sheet.rows() {
            match self
                .load_row(
                    &command.tenant_id,
                    command.created_by,
                    snapshot,
                    snapshot_label,
                    &sheet,
                    row,
                )
                .await
            {
                Ok(()) => report.record_success(),
                Err(error) => report.record_failure(*row_no, error),
            }
        }

        record_initial_load(
            "wip",
            report.success_count as u64,
            report.failure_count as u64,
        );
        info!(
            tenant_id = %command.tenant_id,
            success = report.success_count,
            failed = report.failure_count,
            "Opening WIP load finished"
        );
        Ok(report)
    }
}
