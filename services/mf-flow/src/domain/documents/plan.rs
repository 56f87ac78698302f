//! 生产计划聚合根

use chrono::{DateTime, NaiveDate, Utc};
use mes_common::{AuditInfo, TenantId};
use mes_domain_core::{AggregateRoot, Entity, SoftDelete};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kind::{ComputationType, MaterialSource};

/// 生产计划状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// 草稿
    Draft,
    /// 已审核
    Audited,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Audited => "audited",
        }
    }

    pub fn parse(value: &str) -> mes_errors::AppResult<Self> {
        match value {
            "draft" => Ok(Self::Draft),
            "audited" => Ok(Self::Audited),
            other => Err(mes_errors::AppError::validation(format!(
                "unknown plan status: {}",
                other
            ))),
        }
    }
}

/// 计划行建议行动
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// 生产
    Produce,
    /// 采购
    Purchase,
}

impl SuggestedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Produce => "produce",
            Self::Purchase => "purchase",
        }
    }

    pub fn parse(value: &str) -> mes_errors::AppResult<Self> {
        match value {
            "produce" => Ok(Self::Produce),
            "purchase" => Ok(Self::Purchase),
            other => Err(mes_errors::AppError::validation(format!(
                "unknown suggested action: {}",
                other
            ))),
        }
    }
}

/// 计划行执行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// 未执行
    Pending,
    /// 已执行
    Executed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Executed => "executed",
        }
    }

    pub fn parse(value: &str) -> mes_errors::AppResult<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "executed" => Ok(Self::Executed),
            other => Err(mes_errors::AppError::validation(format!(
                "unknown execution status: {}",
                other
            ))),
        }
    }
}

/// 生产计划聚合根
///
/// 由需求计算按（物料，物料来源）聚合下推生成。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionPlan {
    /// 数据库 ID，插入前为 0
    pub id: i64,
    /// 外部标识
    pub uuid: Uuid,
    /// 租户 ID
    pub tenant_id: TenantId,
    /// 计划编码
    pub plan_code: String,
    /// 计划名称
    pub plan_name: String,
    /// 计划类型，继承计算类型
    pub plan_type: ComputationType,
    /// 来源单据类型
    pub source_type: String,
    /// 来源单据 ID
    pub source_id: i64,
    /// 来源单据编码快照
    pub source_code: String,
    /// 计划开始日期
    pub plan_start_date: Option<NaiveDate>,
    /// 计划结束日期
    pub plan_end_date: Option<NaiveDate>,
    /// 计划状态
    pub status: PlanStatus,
    /// 备注
    pub remarks: Option<String>,
    /// 审计信息
    pub audit_info: AuditInfo,
    /// 软删除时间
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for ProductionPlan {
    type Id = i64;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for ProductionPlan {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl SoftDelete for ProductionPlan {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// 生产计划明细行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanLine {
    /// 数据库 ID
    pub id: i64,
    /// 所属计划 ID
    pub plan_id: i64,
    /// 物料 ID
    pub material_id: i64,
    /// 物料编码快照
    pub material_code: String,
    /// 物料名称快照
    pub material_name: String,
    /// 物料来源
    pub material_source: MaterialSource,
    /// 计划数量
    pub planned_quantity: Decimal,
    /// 建议行动
    pub suggested_action: SuggestedAction,
    /// 工单数量
    pub work_order_quantity: Decimal,
    /// 采购数量
    pub purchase_order_quantity: Decimal,
    /// 执行状态
    pub execution_status: ExecutionStatus,
    /// 执行生成的工单 ID
    pub work_order_id: Option<i64>,
    /// 执行生成的采购单 ID
    pub purchase_order_id: Option<i64>,
    /// 行备注
    pub notes: Option<String>,
}

impl PlanLine {
    /// 是否可下推工单
    pub fn can_push_work_order(&self) -> bool {
        self.suggested_action == SuggestedAction::Produce
            && self.work_order_quantity > Decimal::ZERO
    }

    /// 记录执行生成的工单
    pub fn mark_executed(&mut self, work_order_id: i64) {
        self.execution_status = ExecutionStatus::Executed;
        self.work_order_id = Some(work_order_id);
    }
}
