//! 需求计算聚合根

use chrono::{DateTime, NaiveDate, Utc};
use mes_common::{AuditInfo, TenantId};
use mes_domain_core::{AggregateRoot, Entity, SoftDelete};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kind::{BusinessMode, ComputationType, MaterialSource};

/// 需求计算状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputationStatus {
    /// 待计算
    Pending,
    /// 计算中
    Running,
    /// 已完成
    Completed,
    /// 计算失败
    Failed,
}

impl ComputationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> mes_errors::AppResult<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(mes_errors::AppError::validation(format!(
                "unknown computation status: {}",
                other
            ))),
        }
    }
}

/// 需求计算聚合根
///
/// 由需求下推创建，初始状态为待计算。MRP/LRP 的执行不在本服务内，
/// 明细行由计算引擎写入后供后续下推消费。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandComputation {
    /// 数据库 ID，插入前为 0
    pub id: i64,
    /// 外部标识
    pub uuid: Uuid,
    /// 租户 ID
    pub tenant_id: TenantId,
    /// 计算编码
    pub computation_code: String,
    /// 来源需求 ID
    pub demand_id: i64,
    /// 来源需求编码快照
    pub demand_code: String,
    /// 业务模式，继承自需求
    pub business_mode: BusinessMode,
    /// 计算类型
    pub computation_type: ComputationType,
    /// 计算参数
    pub computation_params: serde_json::Value,
    /// 计算状态
    pub status: ComputationStatus,
    /// 备注
    pub remarks: Option<String>,
    /// 审计信息
    pub audit_info: AuditInfo,
    /// 软删除时间
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for DemandComputation {
    type Id = i64;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for DemandComputation {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl SoftDelete for DemandComputation {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// 需求计算明细行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationLine {
    /// 数据库 ID
    pub id: i64,
    /// 所属计算 ID
    pub computation_id: i64,
    /// 物料 ID
    pub material_id: i64,
    /// 物料编码快照
    pub material_code: String,
    /// 物料名称快照
    pub material_name: String,
    /// 物料规格
    pub material_spec: Option<String>,
    /// 计量单位
    pub unit: Option<String>,
    /// 物料来源
    pub material_source: MaterialSource,
    /// 需求数量
    pub required_quantity: Decimal,
    /// 可用库存
    pub available_quantity: Decimal,
    /// 安全库存
    pub safety_stock: Decimal,
    /// 毛需求
    pub gross_requirement: Decimal,
    /// 净需求
    pub net_requirement: Decimal,
    /// 建议工单数量
    pub suggested_work_order_quantity: Decimal,
    /// 计划生产数量
    pub planned_production: Decimal,
    /// 建议采购数量
    pub suggested_purchase_order_quantity: Decimal,
    /// 计划采购数量
    pub planned_procurement: Decimal,
    /// 交付日期
    pub delivery_date: Option<NaiveDate>,
    /// 生产开始日期
    pub production_start_date: Option<NaiveDate>,
    /// 生产完成日期
    pub production_completion_date: Option<NaiveDate>,
    /// 采购开始日期
    pub procurement_start_date: Option<NaiveDate>,
    /// 采购完成日期
    pub procurement_completion_date: Option<NaiveDate>,
}

impl ComputationLine {
    /// 是否需要生成工单
    pub fn needs_production(&self) -> bool {
        self.suggested_work_order_quantity.max(self.planned_production) > Decimal::ZERO
    }

    /// 是否需要生成采购单
    pub fn needs_procurement(&self) -> bool {
        self.planned_procurement > Decimal::ZERO
    }

    /// 工单数量：优先建议值，建议为零时退回计划值
    pub fn production_quantity(&self) -> Decimal {
        if self.suggested_work_order_quantity > Decimal::ZERO {
            self.suggested_work_order_quantity
        } else {
            self.planned_production
        }
    }

    /// 采购数量：优先建议值，建议为零时退回计划值
    pub fn procurement_quantity(&self) -> Decimal {
        if self.suggested_purchase_order_quantity > Decimal::ZERO {
            self.suggested_purchase_order_quantity
        } else {
            self.planned_procurement
        }
    }

    /// 行上所有已填写的里程碑日期
    pub fn milestones(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        [
            self.delivery_date,
            self.production_start_date,
            self.production_completion_date,
            self.procurement_start_date,
            self.procurement_completion_date,
        ]
        .into_iter()
        .flatten()
    }
}
