//! 单据关联边
//!
//! 推拉网络的有向边。边只增不改，删除走软删除；
//! 去重判断永远排除已软删除的边。

use chrono::{DateTime, Utc};
use mes_common::{AuditInfo, TenantId};
use mes_domain_core::{AggregateRoot, Entity, SoftDelete};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::documents::{BusinessMode, DocKind};

/// 关联方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationMode {
    /// 下推：源单据生成目标单据
    Push,
    /// 上拉：仅建立关联，不生成单据
    Pull,
}

impl RelationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Pull => "pull",
        }
    }

    pub fn parse(value: &str) -> mes_errors::AppResult<Self> {
        match value {
            "push" => Ok(Self::Push),
            "pull" => Ok(Self::Pull),
            other => Err(mes_errors::AppError::validation(format!(
                "unknown relation mode: {}",
                other
            ))),
        }
    }
}

/// 允许的推拉转换对（源类型，目标类型）
pub const ALLOWED_TRANSITIONS: [(DocKind, DocKind); 6] = [
    (DocKind::Demand, DocKind::DemandComputation),
    (DocKind::DemandComputation, DocKind::ProductionPlan),
    (DocKind::DemandComputation, DocKind::WorkOrder),
    (DocKind::DemandComputation, DocKind::PurchaseOrder),
    (DocKind::DemandComputation, DocKind::PurchaseRequisition),
    (DocKind::ProductionPlan, DocKind::WorkOrder),
];

/// 源目标对是否在允许的转换表内
pub fn transition_allowed(source: DocKind, target: DocKind) -> bool {
    ALLOWED_TRANSITIONS
        .iter()
        .any(|(s, t)| *s == source && *t == target)
}

/// 下推边的关联描述
pub fn push_description(source: DocKind, target: DocKind) -> String {
    format!("从{}下推到{}", source.display_name(), target.display_name())
}

/// 上拉边的关联描述，沿用类型标识而非中文名
pub fn pull_description(source: DocKind, target: DocKind) -> String {
    format!("从{}上拉到{}", target.as_str(), source.as_str())
}

/// 单据关联边
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocRelation {
    /// 数据库 ID，插入前为 0
    pub id: i64,
    /// 外部标识
    pub uuid: Uuid,
    /// 租户 ID
    pub tenant_id: TenantId,
    /// 源单据类型
    pub source_kind: DocKind,
    /// 源单据 ID
    pub source_id: i64,
    /// 源单据编码快照
    pub source_code: String,
    /// 源单据名称快照
    pub source_name: Option<String>,
    /// 目标单据类型
    pub target_kind: DocKind,
    /// 目标单据 ID
    pub target_id: i64,
    /// 目标单据编码快照
    pub target_code: String,
    /// 目标单据名称快照
    pub target_name: Option<String>,
    /// 关联类型，当前固定为 source
    pub relation_type: String,
    /// 关联方向
    pub relation_mode: RelationMode,
    /// 关联描述
    pub relation_desc: String,
    /// 业务模式快照
    pub business_mode: Option<BusinessMode>,
    /// 根需求锚点
    pub demand_id: Option<i64>,
    /// 审计信息
    pub audit_info: AuditInfo,
    /// 软删除时间
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for DocRelation {
    type Id = i64;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for DocRelation {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl SoftDelete for DocRelation {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}
