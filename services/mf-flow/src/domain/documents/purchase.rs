//! 采购单与采购申请聚合根

use chrono::{DateTime, NaiveDate, Utc};
use mes_common::{AuditInfo, TenantId};
use mes_domain_core::{AggregateRoot, Entity, SoftDelete};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 采购单据状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// 草稿
    Draft,
    /// 已确认
    Confirmed,
    /// 已取消
    Cancelled,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> mes_errors::AppResult<Self> {
        match value {
            "draft" => Ok(Self::Draft),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(mes_errors::AppError::validation(format!(
                "unknown purchase status: {}",
                other
            ))),
        }
    }
}

/// 采购单聚合根
///
/// 需求计算下推按物料逐单生成，每单一行明细。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// 数据库 ID，插入前为 0
    pub id: i64,
    /// 外部标识
    pub uuid: Uuid,
    /// 租户 ID
    pub tenant_id: TenantId,
    /// 采购单号
    pub order_code: String,
    /// 采购单名称
    pub order_name: Option<String>,
    /// 供应商 ID
    pub supplier_id: i64,
    /// 供应商名称快照
    pub supplier_name: String,
    /// 下单日期
    pub order_date: NaiveDate,
    /// 交货日期
    pub delivery_date: Option<NaiveDate>,
    /// 单据状态
    pub status: PurchaseStatus,
    /// 采购总金额
    pub total_amount: Decimal,
    /// 备注
    pub remarks: Option<String>,
    /// 审计信息
    pub audit_info: AuditInfo,
    /// 软删除时间
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for PurchaseOrder {
    type Id = i64;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for PurchaseOrder {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl SoftDelete for PurchaseOrder {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// 采购单明细行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    /// 数据库 ID
    pub id: i64,
    /// 所属采购单 ID
    pub order_id: i64,
    /// 物料 ID
    pub material_id: i64,
    /// 物料编码快照
    pub material_code: String,
    /// 物料名称快照
    pub material_name: String,
    /// 物料规格
    pub material_spec: Option<String>,
    /// 计量单位
    pub unit: String,
    /// 采购数量
    pub ordered_quantity: Decimal,
    /// 采购单价
    pub unit_price: Decimal,
    /// 行金额
    pub total_price: Decimal,
    /// 需求日期
    pub required_date: Option<NaiveDate>,
    /// 来源单据类型
    pub source_type: Option<String>,
    /// 来源单据 ID
    pub source_id: Option<i64>,
    /// 行备注
    pub remarks: Option<String>,
}

/// 采购申请聚合根
///
/// 需求计算下推将全部外购行打包成一张申请。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRequisition {
    /// 数据库 ID，插入前为 0
    pub id: i64,
    /// 外部标识
    pub uuid: Uuid,
    /// 租户 ID
    pub tenant_id: TenantId,
    /// 申请单号
    pub requisition_code: String,
    /// 申请名称
    pub requisition_name: String,
    /// 单据状态
    pub status: PurchaseStatus,
    /// 申请日期
    pub requisition_date: NaiveDate,
    /// 来源单据类型
    pub source_type: String,
    /// 来源单据 ID
    pub source_id: i64,
    /// 来源单据编码快照
    pub source_code: String,
    /// 备注
    pub remarks: Option<String>,
    /// 审计信息
    pub audit_info: AuditInfo,
    /// 软删除时间
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for PurchaseRequisition {
    type Id = i64;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for PurchaseRequisition {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl SoftDelete for PurchaseRequisition {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// 采购申请明细行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequisitionLine {
    /// 数据库 ID
    pub id: i64,
    /// 所属申请 ID
    pub requisition_id: i64,
    /// 物料 ID
    pub material_id: i64,
    /// 物料编码快照
    pub material_code: String,
    /// 物料名称快照
    pub material_name: String,
    /// 物料规格
    pub material_spec: Option<String>,
    /// 计量单位
    pub unit: String,
    /// 申请数量
    pub quantity: Decimal,
    /// 建议供应商 ID，取物料默认供应商
    pub supplier_id: Option<i64>,
    /// 需求日期
    pub required_date: Option<NaiveDate>,
    /// 来源计算明细行 ID
    pub computation_line_id: Option<i64>,
}
