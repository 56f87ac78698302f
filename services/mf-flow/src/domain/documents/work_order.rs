//! 工单聚合根

use chrono::{DateTime, NaiveDate, Utc};
use mes_common::{AuditInfo, TenantId};
use mes_domain_core::{AggregateRoot, Entity, SoftDelete};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kind::BusinessMode;

/// 工单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    /// 草稿
    Draft,
    /// 生产中
    InProgress,
    /// 已完工
    Completed,
}

impl WorkOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> mes_errors::AppResult<Self> {
        match value {
            "draft" => Ok(Self::Draft),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(mes_errors::AppError::validation(format!(
                "unknown work order status: {}",
                other
            ))),
        }
    }
}

/// 工单优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderPriority {
    /// 低
    Low,
    /// 普通
    Normal,
    /// 高
    High,
    /// 紧急
    Urgent,
}

impl WorkOrderPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> mes_errors::AppResult<Self> {
        match value {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(mes_errors::AppError::validation(format!(
                "unknown work order priority: {}",
                other
            ))),
        }
    }
}

impl Default for WorkOrderPriority {
    fn default() -> Self {
        Self::Normal
    }
}

/// 工序执行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// 待开工
    Pending,
    /// 加工中
    InProgress,
    /// 已完成
    Completed,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> mes_errors::AppResult<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(mes_errors::AppError::validation(format!(
                "unknown operation status: {}",
                other
            ))),
        }
    }
}

/// 工单聚合根
///
/// 推拉下推与期初在制品导入都会创建工单，
/// 来源字段记录其出处。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    /// 数据库 ID，插入前为 0
    pub id: i64,
    /// 外部标识
    pub uuid: Uuid,
    /// 租户 ID
    pub tenant_id: TenantId,
    /// 工单编号
    pub code: String,
    /// 工单名称
    pub name: String,
    /// 产品物料 ID
    pub material_id: i64,
    /// 产品编码快照
    pub material_code: String,
    /// 产品名称快照
    pub material_name: String,
    /// 工单数量
    pub quantity: Decimal,
    /// 生产模式
    pub production_mode: BusinessMode,
    /// 工单状态
    pub status: WorkOrderStatus,
    /// 优先级
    pub priority: WorkOrderPriority,
    /// 计划开始日期
    pub planned_start_date: Option<NaiveDate>,
    /// 计划完成日期
    pub planned_end_date: Option<NaiveDate>,
    /// 实际开工时间
    pub actual_start_date: Option<DateTime<Utc>>,
    /// 车间 ID
    pub workshop_id: Option<i64>,
    /// 车间名称快照
    pub workshop_name: Option<String>,
    /// 完工数量
    pub completed_quantity: Decimal,
    /// 合格数量
    pub qualified_quantity: Decimal,
    /// 不合格数量
    pub unqualified_quantity: Decimal,
    /// 来源单据类型
    pub source_type: Option<String>,
    /// 来源单据 ID
    pub source_id: Option<i64>,
    /// 来源单据编码快照
    pub source_code: Option<String>,
    /// 备注
    pub remarks: Option<String>,
    /// 审计信息
    pub audit_info: AuditInfo,
    /// 软删除时间
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for WorkOrder {
    type Id = i64;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for WorkOrder {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl SoftDelete for WorkOrder {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// 工单工序行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrderOperation {
    /// 数据库 ID
    pub id: i64,
    /// 所属工单 ID
    pub work_order_id: i64,
    /// 工序 ID
    pub operation_id: i64,
    /// 工序编码快照
    pub operation_code: String,
    /// 工序名称快照
    pub operation_name: String,
    /// 工序顺序号
    pub sequence: i32,
    /// 执行状态
    pub status: OperationStatus,
    /// 实际开工时间
    pub actual_start_date: Option<DateTime<Utc>>,
    /// 行备注
    pub remarks: Option<String>,
}
