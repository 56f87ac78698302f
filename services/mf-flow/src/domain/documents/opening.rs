//! 期初导入产生的单据

use chrono::{DateTime, NaiveDate, Utc};
use mes_common::{AuditInfo, TenantId};
use mes_domain_core::{AggregateRoot, Entity, SoftDelete};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kind::ReviewStatus;

/// 入库单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// 草稿
    Draft,
    /// 已入库
    Received,
}

impl ReceiptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Received => "received",
        }
    }

    pub fn parse(value: &str) -> mes_errors::AppResult<Self> {
        match value {
            "draft" => Ok(Self::Draft),
            "received" => Ok(Self::Received),
            other => Err(mes_errors::AppError::validation(format!(
                "unknown receipt status: {}",
                other
            ))),
        }
    }
}

/// 采购入库单聚合根
///
/// 期初库存导入按仓库分组生成，一仓一单。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    /// 数据库 ID，插入前为 0
    pub id: i64,
    /// 外部标识
    pub uuid: Uuid,
    /// 租户 ID
    pub tenant_id: TenantId,
    /// 入库单号
    pub receipt_code: String,
    /// 仓库 ID
    pub warehouse_id: i64,
    /// 仓库编码快照
    pub warehouse_code: String,
    /// 仓库名称快照
    pub warehouse_name: String,
    /// 来源单号
    pub source_order_code: String,
    /// 供应商 ID
    pub supplier_id: i64,
    /// 供应商名称快照
    pub supplier_name: String,
    /// 单据状态
    pub status: ReceiptStatus,
    /// 审核状态
    pub review_status: ReviewStatus,
    /// 入库时间
    pub receipt_time: DateTime<Utc>,
    /// 备注
    pub notes: Option<String>,
    /// 审计信息
    pub audit_info: AuditInfo,
    /// 软删除时间
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for PurchaseReceipt {
    type Id = i64;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for PurchaseReceipt {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl SoftDelete for PurchaseReceipt {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// 入库单明细行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptLine {
    /// 数据库 ID
    pub id: i64,
    /// 所属入库单 ID
    pub receipt_id: i64,
    /// 物料 ID
    pub material_id: i64,
    /// 物料编码快照
    pub material_code: String,
    /// 物料名称快照
    pub material_name: String,
    /// 计量单位
    pub unit: Option<String>,
    /// 入库数量
    pub quantity: Decimal,
    /// 单价
    pub unit_price: Decimal,
    /// 行金额
    pub total_amount: Decimal,
    /// 批次号
    pub batch_number: Option<String>,
    /// 库位编码
    pub location_code: Option<String>,
}

/// 往来单据方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinanceKind {
    /// 应收
    Receivable,
    /// 应付
    Payable,
}

impl FinanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receivable => "receivable",
            Self::Payable => "payable",
        }
    }

    pub fn parse(value: &str) -> mes_errors::AppResult<Self> {
        match value {
            "receivable" => Ok(Self::Receivable),
            "payable" => Ok(Self::Payable),
            other => Err(mes_errors::AppError::validation(format!(
                "unknown finance kind: {}",
                other
            ))),
        }
    }
}

/// 往来单据结算状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinanceStatus {
    /// 未收款
    Uncollected,
    /// 已收款
    Collected,
    /// 未付款
    Unpaid,
    /// 已付款
    Paid,
}

impl FinanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uncollected => "uncollected",
            Self::Collected => "collected",
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
        }
    }

    pub fn parse(value: &str) -> mes_errors::AppResult<Self> {
        match value {
            "uncollected" => Ok(Self::Uncollected),
            "collected" => Ok(Self::Collected),
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            other => Err(mes_errors::AppError::validation(format!(
                "unknown finance status: {}",
                other
            ))),
        }
    }

    /// 按方向与剩余金额推导结算状态
    pub fn derive(kind: FinanceKind, remaining: Decimal) -> Self {
        match (kind, remaining > Decimal::ZERO) {
            (FinanceKind::Receivable, true) => Self::Uncollected,
            (FinanceKind::Receivable, false) => Self::Collected,
            (FinanceKind::Payable, true) => Self::Unpaid,
            (FinanceKind::Payable, false) => Self::Paid,
        }
    }
}

/// 期初应收应付单据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceDocument {
    /// 数据库 ID，插入前为 0
    pub id: i64,
    /// 外部标识
    pub uuid: Uuid,
    /// 租户 ID
    pub tenant_id: TenantId,
    /// 单据方向
    pub kind: FinanceKind,
    /// 单据编号
    pub document_code: String,
    /// 客户 ID（应收）
    pub customer_id: Option<i64>,
    /// 客户名称快照
    pub customer_name: Option<String>,
    /// 供应商 ID（应付）
    pub supplier_id: Option<i64>,
    /// 供应商名称快照
    pub supplier_name: Option<String>,
    /// 来源单据类型
    pub source_type: String,
    /// 来源单据 ID
    pub source_id: i64,
    /// 来源单据编号
    pub source_code: String,
    /// 业务日期
    pub business_date: NaiveDate,
    /// 到期日期
    pub due_date: NaiveDate,
    /// 单据总金额
    pub total_amount: Decimal,
    /// 已结算金额
    pub settled_amount: Decimal,
    /// 剩余金额
    pub remaining_amount: Decimal,
    /// 结算状态
    pub status: FinanceStatus,
    /// 审核状态
    pub review_status: ReviewStatus,
    /// 是否已开票
    pub has_invoice: bool,
    /// 发票号
    pub invoice_number: Option<String>,
    /// 备注
    pub notes: Option<String>,
    /// 审计信息
    pub audit_info: AuditInfo,
    /// 软删除时间
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for FinanceDocument {
    type Id = i64;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for FinanceDocument {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl SoftDelete for FinanceDocument {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}
