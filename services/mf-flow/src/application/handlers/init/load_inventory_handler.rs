//! 期初库存导入处理器
//!
//! 行级校验独立进行，校验通过的行按仓库分组，一仓一张入库单，
//! 单内一行一条明细。某仓库落库失败时该仓库的所有行整体上报失败，
//! 不影响其他仓库。

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mes_common::{AuditInfo, TenantId, UserId};
use mes_cqrs_core::CommandHandler;
use mes_errors::AppResult;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::application::commands::init::{LoadOpeningInventoryCommand, LoadReport};
use crate::domain::coding::{allocate, system_rules, AllocationContext};
use crate::domain::documents::{PurchaseReceipt, ReceiptLine, ReceiptStatus, ReviewStatus};
use crate::domain::ports::{CodeMappingPort, MaterialLookup, WarehouseLookup, WarehouseRef};
use crate::domain::unit_of_work::UnitOfWorkFactory;
use crate::infrastructure::observability::record_initial_load;

use super::table::{optional, parse_decimal, required, Column, Sheet};
use super::EXTERNAL_SYSTEM;

const COLUMNS: &[Column] = &[
    required("物料编码", &["物料代码", "material_code"]),
    required("仓库编码", &["仓库代码", "warehouse_code"]),
    required("期初数量", &["数量", "quantity"]),
    optional("期初金额", &["金额", "amount"]),
    optional("批次号", &["批次", "batch_number"]),
    optional("库位编码", &["库位", "location_code"]),
];

/// 校验通过的行
struct ValidRow {
    row_no: usize,
    material_id: i64,
    material_code: String,
    material_name: String,
    unit: Option<String>,
    warehouse: WarehouseRef,
    quantity: Decimal,
    amount: Decimal,
    batch_number: Option<String>,
    location_code: Option<String>,
}

pub struct LoadOpeningInventoryHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    materials: Arc<dyn MaterialLookup>,
    warehouses: Arc<dyn WarehouseLookup>,
    code_mapping: Arc<dyn CodeMappingPort>,
}

impl LoadOpeningInventoryHandler {
    pub fn new(
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        materials: Arc<dyn MaterialLookup>,
        warehouses: Arc<dyn WarehouseLookup>,
        code_mapping: Arc<dyn CodeMappingPort>,
    ) -> Self {
        Self {
            uow_factory,
            materials,
            warehouses,
            code_mapping,
        }
    }

    async fn validate_row(
        &self,
        tenant_id: &TenantId,
        sheet: &Sheet,
        row_no: usize,
        row: &[serde_json::Value],
    ) -> Result<ValidRow, String> {
        let raw_code = sheet
            .text(row, "物料编码")
            .ok_or_else(|| "物料编码为空".to_string())?;
        let code = self
            .code_mapping
            .convert(tenant_id, EXTERNAL_SYSTEM, "material", &raw_code)
            .await
            .map_err(|e| e.to_string())?;
        let material = self
            .materials
            .find_by_code(tenant_id, &code)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("物料不存在: {}", raw_code))?;

        let warehouse_code = sheet
            .text(row, "仓库编码")
            .ok_or_else(|| "仓库编码为空".to_string())?;
        let warehouse = self
            .warehouses
            .find_by_code(tenant_id, &warehouse_code)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("仓库不存在: {}", warehouse_code))?;

        let quantity_text = sheet
            .text(row, "期初数量")
            .ok_or_else(|| "期初数量为空".to_string())?;
        let quantity = parse_decimal(&quantity_text)
            .filter(|q| *q > Decimal::ZERO)
            .ok_or_else(|| format!("期初数量格式错误: {}", quantity_text))?;

        let amount = match sheet.text(row, "期初金额") {
            Some(text) => {
                parse_decimal(&text).ok_or_else(|| format!("期初金额格式错误: {}", text))?
            }
            None => Decimal::ZERO,
        };

        Ok(ValidRow {
            row_no,
            material_id: material.id,
            material_code: material.code,
            material_name: material.name,
            unit: material.unit,
            warehouse,
            quantity,
            amount,
            batch_number: sheet.text(row, "批次号"),
            location_code: sheet.text(row, "库位编码"),
        })
    }

    /// 一个仓库一张入库单，组内任何一步失败整体回滚
    async fn persist_group(
        &self,
        tenant_id: &TenantId,
        created_by: Option<UserId>,
        snapshot_time: Option<&str>,
        rows: &[ValidRow],
    ) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;
        let today = Utc::now().date_naive();
        let prefix = format!("INIT-INV{}", today.format("%Y%m%d"));
        let context = AllocationContext::with_prefix(prefix).scoped("INIT-INV");
        let code = allocate(
            uow.code_rules(),
            uow.code_sequences(),
            tenant_id,
            system_rules::PURCHASE_RECEIPT_CODE,
            &context,
            today,
        )
        .await?;

        let warehouse = &rows[0].warehouse;
        let mut receipt = PurchaseReceipt {
            id: 0,
            uuid: Uuid::now_v7(),
            tenant_id: *tenant_id,
            receipt_code: code,
            warehouse_id: warehouse.id,
            warehouse_code: warehouse.code.clone(),
            warehouse_name: warehouse.name.clone(),
            source_order_code: "期初库存".to_string(),
            supplier_id: 0,
            supplier_name: "期初库存导入".to_string(),
            status: ReceiptStatus::Received,
            review_status: ReviewStatus::Approved,
            receipt_time: Utc::now(),
            notes: Some(format!(
                "期初库存导入（快照时间点：{}）",
                snapshot_time.unwrap_or("未指定")
            )),
            audit_info: AuditInfo::new(created_by),
            deleted_at: None,
        };
        receipt.id = uow.receipts().insert(&receipt).await?;

        for row in rows {
            let line = ReceiptLine {
                id: 0,
                receipt_id: receipt.id,
                material_id: row.material_id,
                material_code: row.material_code.clone(),
                material_name: row.material_name.clone(),
                unit: row.unit.clone(),
                quantity: row.quantity,
                unit_price: row.amount / row.quantity,
                total_amount: row.amount,
                batch_number: row.batch_number.clone(),
                location_code: row.location_code.clone(),
            };
            uow.receipts().insert_line(&line).await?;
        }

        uow.commit().await
    }
}

#[async_trait]
impl CommandHandler<LoadOpeningInventoryCommand> for LoadOpeningInventoryHandler {
    async fn handle(&self, command: LoadOpeningInventoryCommand) -> AppResult<LoadReport> {
        let sheet = Sheet::parse(&command.rows, COLUMNS)?;

        let mut report = LoadReport::default();
        let mut groups: BTreeMap<i64, Vec<ValidRow>> = BTreeMap::new();
        for (row_no, row) in sheet.rows() {
            match self
                .validate_row(&command.tenant_id, &sheet, *row_no, row)
                .await
            {
                Ok(valid) => groups.entry(valid.warehouse.id).or_default().push(valid),
                Err(error) => report.record_failure(*row_no, error),
            }
        }

        for rows in groups.values() {
            match self
                .persist_group(
                    &command.tenant_id,
                    command.created_by,
                    command.snapshot_time.as_deref(),
                    rows,
                )
                .await
            {
                Ok(()) => {
                    for _ in rows {
                        report.record_success();
                    }
                }
                Err(e) => {
                    for row in rows {
                        report.record_failure(row.row_no, format!("创建入库单失败: {}", e));
                    }
                }
            }
        }

        record_initial_load(
            "inventory",
            report.success_count as u64,
            report.failure_count as u64,
        );
        info!(
            tenant_id = %command.tenant_id,
            success = report.success_count,
            failed = report.failure_count,
            "Opening inventory load finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::application::handlers::orchestrator::testing::{
        system_rule, FakeMasterData, FakeUnitOfWorkFactory, Store,
    };
    use crate::domain::ports::MaterialRef;

    fn master() -> FakeMasterData {
        FakeMasterData::default()
            .with_material(MaterialRef {
                id: 1,
                code: "M-001".to_string(),
                name: "物料一".to_string(),
                spec: None,
                unit: Some("件".to_string()),
                default_supplier_id: None,
            })
            .with_material(MaterialRef {
                id: 2,
                code: "M-002".to_string(),
                name: "物料二".to_string(),
                spec: None,
                unit: None,
                default_supplier_id: None,
            })
            .with_warehouse(crate::domain::ports::WarehouseRef {
                id: 10,
                code: "WH-A".to_string(),
                name: "原料仓".to_string(),
            })
            .with_warehouse(crate::domain::ports::WarehouseRef {
                id: 11,
                code: "WH-B".to_string(),
                name: "成品仓".to_string(),
            })
    }

    fn handler(factory: Arc<FakeUnitOfWorkFactory>) -> LoadOpeningInventoryHandler {
        let master = Arc::new(master());
        LoadOpeningInventoryHandler::new(factory, master.clone(), master.clone(), master)
    }

    fn seeded_factory() -> Arc<FakeUnitOfWorkFactory> {
        let mut store = Store::default();
        store.rules.push({
            let mut rule = system_rule(
                crate::application::handlers::orchestrator::testing::tenant(),
                system_rules::PURCHASE_RECEIPT_CODE,
                "{SEQ:4}",
            );
            rule.id = 9001;
            rule
        });
        Arc::new(FakeUnitOfWorkFactory::new(store))
    }

    fn command(
        tenant_id: TenantId,
        rows: Vec<Vec<serde_json::Value>>,
    ) -> LoadOpeningInventoryCommand {
        LoadOpeningInventoryCommand {
            tenant_id,
            rows,
            snapshot_time: Some("2025-01-01".to_string()),
            created_by: None,
        }
    }

    #[tokio::test]
    async fn test_load_inventory_groups_by_warehouse_and_reports_bad_rows() {
        let tenant_id = mes_common::TenantId::new();
        let mut store = Store::default();
        store.rules.push({
            let mut rule = system_rule(tenant_id, system_rules::PURCHASE_RECEIPT_CODE, "{SEQ:4}");
            rule.id = 9001;
            rule
        });
        let factory = Arc::new(FakeUnitOfWorkFactory::new(store));
        let handler = handler(factory.clone());

        let report = handler
            .handle(command(
                tenant_id,
                vec![
                    vec![json!("物料编码"), json!("仓库编码"), json!("期初数量"), json!("期初金额")],
                    vec![json!("示例"), json!("示例"), json!("10"), json!("")],
                    vec![json!("M-001"), json!("WH-A"), json!("100"), json!("500")],
                    vec![json!("M-002"), json!("WH-A"), json!("20"), json!("")],
                    vec![json!("M-001"), json!("WH-B"), json!("7"), json!("")],
                    vec![json!("M-404"), json!("WH-A"), json!("5"), json!("")],
                ],
            ))
            .await
            .unwrap();

        assert_eq!(report.success_count, 3);
        assert_eq!(report.failure_count, 1);
        assert_eq!(report.total, 4);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 6);
        assert_eq!(report.errors[0].error, "物料不存在: M-404");

        let store = factory.snapshot();
        // 一仓一单
        assert_eq!(store.receipts.len(), 2);
        assert!(store.receipts.iter().all(|r| {
            r.receipt_code.starts_with("INIT-INV")
                && r.status == ReceiptStatus::Received
                && r.review_status == ReviewStatus::Approved
        }));
        let wh_a = store.receipts.iter().find(|r| r.warehouse_id == 10).unwrap();
        let wh_a_lines: Vec<_> = store
            .receipt_lines
            .iter()
            .filter(|l| l.receipt_id == wh_a.id)
            .collect();
        assert_eq!(wh_a_lines.len(), 2);
        let m1 = wh_a_lines.iter().find(|l| l.material_id == 1).unwrap();
        assert_eq!(m1.quantity, Decimal::from(100));
        assert_eq!(m1.unit_price, Decimal::from(5));
    }

    #[tokio::test]
    async fn test_load_inventory_rejects_nonpositive_quantity() {
        let tenant_id = mes_common::TenantId::new();
        let factory = seeded_factory();
        let handler = handler(factory.clone());

        let report = handler
            .handle(command(
                tenant_id,
                vec![
                    vec![json!("物料编码"), json!("仓库编码"), json!("期初数量")],
                    vec![json!("示例"), json!("示例"), json!("10")],
                    vec![json!("M-001"), json!("WH-A"), json!("0")],
                    vec![json!("M-001"), json!("WH-A"), json!("abc")],
                    vec![json!("M-001"), json!("WH-A"), json!("")],
                ],
            ))
            .await
            .unwrap();

        assert_eq!(report.success_count, 0);
        assert_eq!(report.failure_count, 3);
        assert_eq!(report.errors[0].error, "期初数量格式错误: 0");
        assert_eq!(report.errors[1].error, "期初数量格式错误: abc");
        assert_eq!(report.errors[2].error, "期初数量为空");
        assert!(factory.snapshot().receipts.is_empty());
    }

    #[tokio::test]
    async fn test_load_inventory_requires_columns() {
        let tenant_id = mes_common::TenantId::new();
        let factory = seeded_factory();
        let handler = handler(factory);

        let err = handler
            .handle(command(
                tenant_id,
                vec![
                    vec![json!("物料编码"), json!("期初数量")],
                    vec![json!("示例"), json!("10")],
                    vec![json!("M-001"), json!("5")],
                ],
            ))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("缺少必填字段"));
    }
}
