//! 需求单聚合根

use chrono::{DateTime, NaiveDate, Utc};
use mes_common::{AuditInfo, TenantId};
use mes_domain_core::{AggregateRoot, Entity, SoftDelete};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kind::{BusinessMode, ReviewStatus};

/// 需求单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandStatus {
    /// 草稿
    Draft,
    /// 已审核
    Audited,
}

impl DemandStatus {
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
                "unknown demand status: {}",
                other
            ))),
        }
    }
}

/// 需求单聚合根
///
/// 推拉网络的根单据。下推产生需求计算后在本单上记录标记与回链，
/// 同一需求不会重复下推，除非其计算结果已被删除。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demand {
    /// 数据库 ID，插入前为 0
    pub id: i64,
    /// 外部标识
    pub uuid: Uuid,
    /// 租户 ID
    pub tenant_id: TenantId,
    /// 需求编码
    pub demand_code: String,
    /// 需求名称
    pub demand_name: String,
    /// 业务模式
    pub business_mode: BusinessMode,
    /// 需求开始日期
    pub start_date: NaiveDate,
    /// 需求结束日期
    pub end_date: Option<NaiveDate>,
    /// 客户 ID（MTO 场景）
    pub customer_id: Option<i64>,
    /// 客户名称快照
    pub customer_name: Option<String>,
    /// 订单日期
    pub order_date: Option<NaiveDate>,
    /// 交付日期
    pub delivery_date: Option<NaiveDate>,
    /// 需求总数量
    pub total_quantity: Decimal,
    /// 单据状态
    pub status: DemandStatus,
    /// 审核状态
    pub review_status: ReviewStatus,
    /// 是否已下推需求计算
    pub pushed_to_computation: bool,
    /// 下推生成的计算 ID
    pub computation_id: Option<i64>,
    /// 下推生成的计算编码
    pub computation_code: Option<String>,
    /// 备注
    pub remarks: Option<String>,
    /// 审计信息
    pub audit_info: AuditInfo,
    /// 软删除时间
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Demand {
    /// 记录下推结果
    pub fn mark_pushed(&mut self, computation_id: i64, computation_code: String) {
        self.pushed_to_computation = true;
        self.computation_id = Some(computation_id);
        self.computation_code = Some(computation_code);
    }
}

impl Entity for Demand {
    type Id = i64;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Demand {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl SoftDelete for Demand {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}
