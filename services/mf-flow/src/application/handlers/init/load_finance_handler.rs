//! 期初应收应付导入处理器
//!
//! 应收应付混在一张表里，按类型列分流。一行一张单据，
//! 行级独立事务。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mes_common::{AuditInfo, TenantId, UserId};
use mes_cqrs_core::CommandHandler;
use mes_errors::AppResult;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::application::commands::init::{LoadOpeningFinanceCommand, LoadReport};
use crate::domain::coding::{allocate, system_rules, AllocationContext};
use crate::domain::documents::{FinanceDocument, FinanceKind, FinanceStatus, ReviewStatus};
use crate::domain::ports::{CustomerLookup, SupplierLookup};
use crate::domain::unit_of_work::UnitOfWorkFactory;
use crate::infrastructure::observability::record_initial_load;

use super::table::{optional, parse_date, parse_decimal, required, Column, Sheet};

const COLUMNS: &[Column] = &[
    required("类型", &["单据类型", "type"]),
    required("来源单据类型", &["source_type"]),
    required("来源单据编号", &["来源单号", "source_code"]),
    required("单据日期", &["业务日期", "business_date"]),
    optional("客户编码", &["客户代码", "customer_code"]),
    optional("供应商编码", &["供应商代码", "supplier_code"]),
    optional("应收金额", &["receivable_amount"]),
    optional("应付金额", &["payable_amount"]),
    optional("已收金额", &["received_amount"]),
    optional("已付金额", &["paid_amount"]),
    optional("到期日期", &["due_date"]),
    optional("发票号", &["invoice_number"]),
];

fn parse_kind(text: &str) -> Result<FinanceKind, String> {
    match text.to_uppercase().as_str() {
        "应收" | "RECEIVABLE" | "AR" => Ok(FinanceKind::Receivable),
        "应付" | "PAYABLE" | "AP" => Ok(FinanceKind::Payable),
        other => Err(format!("类型错误: {}，应为'应收'或'应付'", other)),
    }
}

pub struct LoadOpeningFinanceHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    customers: Arc<dyn CustomerLookup>,
    suppliers: Arc<dyn SupplierLookup>,
}

impl LoadOpeningFinanceHandler {
    pub fn new(
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        customers: Arc<dyn CustomerLookup>,
        suppliers: Arc<dyn SupplierLookup>,
    ) -> Self {
        Self {
            uow_factory,
            customers,
            suppliers,
        }
    }

    async fn load_row(
        &self,
        tenant_id: &TenantId,
        created_by: Option<UserId>,
        snapshot_label: &str,
        sheet: &Sheet,
        row: &[serde_json::Value],
    ) -> Result<(), String> {
        let kind_text = sheet
            .text(row, "类型")
            .ok_or_else(|| "类型为空（应收/应付）".to_string())?;
        let kind = parse_kind(&kind_text)?;

        let source_type = sheet
            .text(row, "来源单据类型")
            .ok_or_else(|| "来源单据类型为空".to_string())?;
        let source_code = sheet
            .text(row, "来源单据编号")
            .ok_or_else(|| "来源单据编号为空".to_string())?;

        let business_text = sheet
            .text(row, "单据日期")
            .ok_or_else(|| "单据日期为空".to_string())?;
        let business_date = parse_date(&business_text)
            .ok_or_else(|| format!("单据日期格式错误: {}", business_text))?;
        let due_date = match sheet.text(row, "到期日期") {
            Some(text) => {
                parse_date(&text).ok_or_else(|| format!("到期日期格式错误: {}", text))?
            }
            None => business_date,
        };

        let (customer, supplier, amount_column, settled_column) = match kind {
            FinanceKind::Receivable => {
                let code = sheet
                    .text(row, "客户编码")
                    .ok_or_else(|| "客户编码为空".to_string())?;
                let customer = self
                    .customers
                    .find_by_code(tenant_id, &code)
                    .await
                    .map_err(|e| e.to_string())?
                    .ok_or_else(|| format!("客户不存在: {}", code))?;
                (Some(customer), None, "应收金额", "已收金额")
            }
            FinanceKind::Payable => {
                let code = sheet
                    .text(row, "供应商编码")
                    .ok_or_else(|| "供应商编码为空".to_string())?;
                let supplier = self
                    .suppliers
                    .find_by_code(tenant_id, &code)
                    .await
                    .map_err(|e| e.to_string())?
                    .ok_or_else(|| format!("供应商不存在: {}", code))?;
                (None, Some(supplier), "应付金额", "已付金额")
            }
        };

        let amount_text = sheet
            .text(row, amount_column)
            .ok_or_else(|| format!("{}为空", amount_column))?;
        let total_amount = parse_decimal(&amount_text)
            .filter(|a| *a > Decimal::ZERO)
            .ok_or_else(|| format!("{}格式错误: {}", amount_column, amount_text))?;
        let settled_amount = match sheet.text(row, settled_column) {
            Some(text) => parse_decimal(&text)
                .ok_or_else(|| format!("{}格式错误: {}", settled_column, text))?,
            None => Decimal::ZERO,
        };
        let remaining_amount = total_amount - settled_amount;

        let invoice_number = sheet.text(row, "发票号");

        let uow = self.uow_factory.begin().await.map_err(|e| e.to_string())?;
        let today = Utc::now().date_naive();
        let (rule_code, scope) = match kind {
            FinanceKind::Receivable => (system_rules::RECEIVABLE_CODE, "INIT-AR"),
            FinanceKind::Payable => (system_rules::PAYABLE_CODE, "INIT-AP"),
        };
        let prefix = format!("{}{}", scope, today.format("%Y%m%d"));
        let context = AllocationContext::with_prefix(prefix).scoped(scope);
        let document_code = allocate(
            uow.code_rules(),
            uow.code_sequences(),
            tenant_id,
            rule_code,
            &context,
            today,
        )
        .await
        .map_err(|e| e.to_string())?;

        let notes = match kind {
            FinanceKind::Receivable => {
                format!("期初应收导入（快照时间点：{}）", snapshot_label)
            }
            FinanceKind::Payable => {
                format!("期初应付导入（快照时间点：{}）", snapshot_label)
            }
        };
        let document = FinanceDocument {
            id: 0,
            uuid: Uuid::now_v7(),
            tenant_id: *tenant_id,
            kind,
            document_code,
            customer_id: customer.as_ref().map(|c| c.id),
            customer_name: customer.as_ref().map(|c| c.name.clone()),
            supplier_id: supplier.as_ref().map(|s| s.id),
            supplier_name: supplier.as_ref().map(|s| s.name.clone()),
            source_type,
            source_id: 0,
            source_code,
            business_date,
            due_date,
            total_amount,
            settled_amount,
            remaining_amount,
            status: FinanceStatus::derive(kind, remaining_amount),
            review_status: ReviewStatus::Approved,
            has_invoice: invoice_number.is_some(),
            invoice_number,
            notes: Some(notes),
            audit_info: AuditInfo::new(created_by),
            deleted_at: None,
        };
        uow.finance_documents()
            .insert(&document)
            .await
            .map_err(|e| e.to_string())?;

        uow.commit().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl CommandHandler<LoadOpeningFinanceCommand> for LoadOpeningFinanceHandler {
    async fn handle(&self, command: LoadOpeningFinanceCommand) -> AppResult<LoadReport> {
        let sheet = Sheet::parse(&command.rows, COLUMNS)?;
        let snapshot_label = command.snapshot_time.as_deref().unwrap_or("未指定");

        let mut report = LoadReport::default();
        for (row_no, row) in sheet.rows() {
            match self
                .load_row(
                    &command.tenant_id,
                    command.created_by,
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
            "finance",
            report.success_count as u64,
            report.failure_count as u64,
        );
        info!(
            tenant_id = %command.tenant_id,
            success = report.success_count,
            failed = report.failure_count,
            "Opening receivables/payables load finished"
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
    use crate::domain::ports::{CustomerRef, SupplierRef};

    fn handler(factory: Arc<FakeUnitOfWorkFactory>) -> LoadOpeningFinanceHandler {
        let master = Arc::new(
            FakeMasterData::default()
                .with_customer(CustomerRef {
                    id: 41,
                    code: "C-001".to_string(),
                    name: "客户一".to_string(),
                })
                .with_supplier(SupplierRef {
                    id: 7,
                    code: "S-007".to_string(),
                    name: "供应商七".to_string(),
                }),
        );
        LoadOpeningFinanceHandler::new(factory, master.clone(), master)
    }

    fn seeded_factory(tenant_id: TenantId) -> Arc<FakeUnitOfWorkFactory> {
        let mut store = Store::default();
        for (id, code) in [
            (9001, system_rules::RECEIVABLE_CODE),
            (9002, system_rules::PAYABLE_CODE),
        ] {
            let mut rule = system_rule(tenant_id, code, "{SEQ:4}");
            rule.id = id;
            store.rules.push(rule);
        }
        Arc::new(FakeUnitOfWorkFactory::new(store))
    }

    fn command(tenant_id: TenantId, rows: Vec<Vec<serde_json::Value>>) -> LoadOpeningFinanceCommand {
        LoadOpeningFinanceCommand {
            tenant_id,
            rows,
            snapshot_time: None,
            created_by: None,
        }
    }

    const HEADER: [&str; 8] = [
        "类型",
        "来源单据类型",
        "来源单据编号",
        "单据日期",
        "客户编码",
        "供应商编码",
        "应收金额",
        "应付金额",
    ];

    fn header_row() -> Vec<serde_json::Value> {
        HEADER.iter().map(|h| json!(h)).collect()
    }

    #[tokio::test]
    async fn test_load_finance_routes_by_kind() {
        let tenant_id = mes_common::TenantId::new();
        let factory = seeded_factory(tenant_id);
        let handler = handler(factory.clone());

        let report = handler
            .handle(command(
                tenant_id,
                vec![
                    header_row(),
                    vec![json!("示例"); 8],
                    vec![
                        json!("应收"),
                        json!("销售订单"),
                        json!("SO-001"),
                        json!("2025-01-10"),
                        json!("C-001"),
                        json!(""),
                        json!("1000"),
                        json!(""),
                    ],
                    vec![
                        json!("AP"),
                        json!("采购订单"),
                        json!("PO-001"),
                        json!("2025-01-12"),
                        json!(""),
                        json!("S-007"),
                        json!(""),
                        json!("300"),
                    ],
                    vec![
                        json!("预收"),
                        json!("销售订单"),
                        json!("SO-002"),
                        json!("2025-01-10"),
                        json!("C-001"),
                        json!(""),
                        json!("10"),
                        json!(""),
                    ],
                ],
            ))
            .await
            .unwrap();

        assert_eq!(report.success_count, 2);
        assert_eq!(report.failure_count, 1);
        assert_eq!(report.errors[0].error, "类型错误: 预收，应为'应收'或'应付'");

        let store = factory.snapshot();
        assert_eq!(store.finance_documents.len(), 2);

        let receivable = store
            .finance_documents
            .iter()
            .find(|d| d.kind == FinanceKind::Receivable)
            .unwrap();
        assert!(receivable.document_code.starts_with("INIT-AR"));
        assert_eq!(receivable.customer_id, Some(41));
        assert_eq!(receivable.total_amount, Decimal::from(1000));
        assert_eq!(receivable.remaining_amount, Decimal::from(1000));
        assert_eq!(receivable.status, FinanceStatus::Uncollected);
        // 到期日期缺省取单据日期
        assert_eq!(receivable.due_date, receivable.business_date);

        let payable = store
            .finance_documents
            .iter()
            .find(|d| d.kind == FinanceKind::Payable)
            .unwrap();
        assert!(payable.document_code.starts_with("INIT-AP"));
        assert_eq!(payable.supplier_id, Some(7));
        assert_eq!(payable.status, FinanceStatus::Unpaid);
    }

    #[tokio::test]
    async fn test_load_finance_settled_amount_drives_status() {
        let tenant_id = mes_common::TenantId::new();
        let factory = seeded_factory(tenant_id);
        let handler = handler(factory.clone());

        let mut header = header_row();
        header.push(json!("已收金额"));
        let mut row = vec![
            json!("应收"),
            json!("销售订单"),
            json!("SO-001"),
            json!("2025-01-10"),
            json!("C-001"),
            json!(""),
            json!("1000"),
            json!(""),
        ];
        row.push(json!("1000"));

        let report = handler
            .handle(command(
                tenant_id,
                vec![header, vec![json!("示例"); 9], row],
            ))
            .await
            .unwrap();
        assert_eq!(report.success_count, 1);

        let store = factory.snapshot();
        let document = &store.finance_documents[0];
        assert_eq!(document.remaining_amount, Decimal::ZERO);
        assert_eq!(document.status, FinanceStatus::Collected);
    }

    #[tokio::test]
    async fn test_load_finance_validates_amount_and_party() {
        let tenant_id = mes_common::TenantId::new();
        let factory = seeded_factory(tenant_id);
        let handler = handler(factory.clone());

        let report = handler
            .handle(command(
                tenant_id,
                vec![
                    header_row(),
                    vec![json!("示例"); 8],
                    vec![
                        json!("应收"),
                        json!("销售订单"),
                        json!("SO-001"),
                        json!("2025-01-10"),
                        json!("C-404"),
                        json!(""),
                        json!("1000"),
                        json!(""),
                    ],
                    vec![
                        json!("应收"),
                        json!("销售订单"),
                        json!("SO-002"),
                        json!("2025-01-10"),
                        json!("C-001"),
                        json!(""),
                        json!("-5"),
                        json!(""),
                    ],
                    vec![
                        json!("应付"),
                        json!("采购订单"),
                        json!("PO-001"),
                        json!("2025/13/99"),
                        json!(""),
                        json!("S-007"),
                        json!(""),
                        json!("300"),
                    ],
                ],
            ))
            .await
            .unwrap();

        assert_eq!(report.failure_count, 3);
        assert_eq!(report.errors[0].error, "客户不存在: C-404");
        assert_eq!(report.errors[1].error, "应收金额格式错误: -5");
        assert_eq!(report.errors[2].error, "单据日期格式错误: 2025/13/99");
        assert!(factory.snapshot().finance_documents.is_empty());
    }
}
