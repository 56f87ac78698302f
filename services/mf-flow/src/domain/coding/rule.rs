//! 编码规则聚合根
//!
//! 规则按 (租户, code) 唯一。系统内置规则由下推编排和期初导入使用，
//! 只影响删除权限，分配行为与用户规则一致。

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use mes_common::{AuditInfo, TenantId, UserId};
use mes_domain_core::{AggregateRoot, Entity, SoftDelete};
use mes_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::template::CodeTemplate;

/// 系统内置规则编码
pub mod system_rules {
    pub const DEMAND_COMPUTATION_CODE: &str = "DEMAND_COMPUTATION_CODE";
    pub const PRODUCTION_PLAN_CODE: &str = "PRODUCTION_PLAN_CODE";
    pub const WORK_ORDER_CODE: &str = "WORK_ORDER_CODE";
    pub const PURCHASE_ORDER_CODE: &str = "PURCHASE_ORDER_CODE";
    pub const PURCHASE_REQUISITION_CODE: &str = "PURCHASE_REQUISITION_CODE";
    pub const PURCHASE_RECEIPT_CODE: &str = "PURCHASE_RECEIPT_CODE";
    pub const RECEIVABLE_CODE: &str = "RECEIVABLE_CODE";
    pub const PAYABLE_CODE: &str = "PAYABLE_CODE";
}

/// 序列号重置策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// 从不重置
    Never,
    /// 每日重置
    Daily,
    /// 每月重置
    Monthly,
    /// 每年重置
    Yearly,
}

impl Default for ResetPolicy {
    fn default() -> Self {
        Self::Never
    }
}

impl ResetPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "never" => Ok(Self::Never),
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(AppError::validation(format!(
                "unknown reset policy: {}",
                other
            ))),
        }
    }

    /// 判断自上次重置以来是否进入了新的日历窗口
    ///
    /// `last_reset` 为空视作未进入任何窗口，需要重置（新建的计数器
    /// 当前值为 0，重置只是补记窗口起点）。
    pub fn window_changed(&self, last_reset: Option<NaiveDate>, today: NaiveDate) -> bool {
        if matches!(self, Self::Never) {
            return false;
        }
        let Some(last) = last_reset else {
            return true;
        };
        match self {
            Self::Never => false,
            Self::Daily => last != today,
            Self::Monthly => (last.year(), last.month()) != (today.year(), today.month()),
            Self::Yearly => last.year() != today.year(),
        }
    }
}

/// 编码规则聚合根
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeRule {
    /// 规则 ID（入库后分配）
    pub id: i64,
    /// 规则 UUID
    pub uuid: Uuid,
    /// 租户 ID
    pub tenant_id: TenantId,
    /// 规则编码（租户内唯一）
    pub code: String,
    /// 规则名称
    pub name: String,
    /// 编码模板表达式
    pub template: String,
    /// 序列号起始值，每个窗口第一次分配发放该值
    pub seq_start: i64,
    /// 序列号步长
    pub seq_step: i64,
    /// 序列号默认宽度，模板中裸 `{SEQ}` 生效
    pub seq_width: i64,
    /// 序列号重置策略
    pub reset_policy: ResetPolicy,
    /// 是否系统内置规则
    pub is_system: bool,
    /// 是否启用
    pub is_active: bool,
    /// 规则说明
    pub description: Option<String>,
    /// 审计信息
    pub audit_info: AuditInfo,
    /// 软删除时间
    pub deleted_at: Option<DateTime<Utc>>,
}

impl CodeRule {
    /// 创建新规则
    ///
    /// 模板在此处解析校验，起始值非负、步长与宽度必须为正。
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: TenantId,
        code: String,
        name: String,
        template: String,
        seq_start: i64,
        seq_step: i64,
        seq_width: i64,
        reset_policy: ResetPolicy,
        description: Option<String>,
        created_by: Option<UserId>,
    ) -> AppResult<Self> {
        if code.trim().is_empty() {
            return Err(AppError::validation("rule code cannot be empty"));
        }
        if name.trim().is_empty() {
            return Err(AppError::validation("rule name cannot be empty"));
        }
        Self::validate_sequencing(seq_start, seq_step, seq_width)?;
        CodeTemplate::parse(&template)?;

        Ok(Self {
            id: 0,
            uuid: Uuid::now_v7(),
            tenant_id,
            code,
            name,
            template,
            seq_start,
            seq_step,
            seq_width,
            reset_policy,
            is_system: false,
            is_active: true,
            description,
            audit_info: AuditInfo::new(created_by),
            deleted_at: None,
        })
    }

    fn validate_sequencing(seq_start: i64, seq_step: i64, seq_width: i64) -> AppResult<()> {
        if seq_start < 0 {
            return Err(AppError::validation(format!(
                "seq_start must not be negative, got {}",
                seq_start
            )));
        }
        if seq_step < 1 {
            return Err(AppError::validation(format!(
                "seq_step must be positive, got {}",
                seq_step
            )));
        }
        if seq_width < 1 {
            return Err(AppError::validation(format!(
                "seq_width must be at least 1, got {}",
                seq_width
            )));
        }
        Ok(())
    }

    /// 标记为系统内置规则
    pub fn as_system(mut self) -> Self {
        self.is_system = true;
        self
    }

    /// 解析模板
    pub fn parsed_template(&self) -> AppResult<CodeTemplate> {
        CodeTemplate::parse(&self.template)
    }

    /// 更新模板，保存前重新解析校验
    pub fn update_template(&mut self, template: String) -> AppResult<()> {
        CodeTemplate::parse(&template)?;
        self.template = template;
        Ok(())
    }

    /// 更新序列号参数
    pub fn update_sequencing(
        &mut self,
        seq_start: i64,
        seq_step: i64,
        seq_width: i64,
    ) -> AppResult<()> {
        Self::validate_sequencing(seq_start, seq_step, seq_width)?;
        self.seq_start = seq_start;
        self.seq_step = seq_step;
        self.seq_width = seq_width;
        Ok(())
    }

    /// 计数器种子值，发放下一个值恰为 `seq_start`
    pub fn counter_seed(&self) -> i64 {
        self.seq_start - self.seq_step
    }

    /// 系统规则不可删除
    pub fn is_deletable(&self) -> bool {
        !self.is_system
    }
}

impl Entity for CodeRule {
    type Id = i64;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for CodeRule {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}

impl SoftDelete for CodeRule {
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}

/// 序列号计数器行
///
/// 按 (规则, 租户, 分区键) 唯一，首次分配时自动创建。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSequence {
    pub id: i64,
    pub rule_id: i64,
    pub tenant_id: TenantId,
    /// 计数器分区键，空串表示规则级全局计数
    pub scope_key: String,
    /// 当前值（上一次发放的后增量值，新建种子为起始值减步长）
    pub current_value: i64,
    /// 上次重置日期
    pub last_reset: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_rule_validates_template_and_sequencing() {
        let tenant = TenantId::new();
        let rule = CodeRule::new(
            tenant,
            "WORK_ORDER_CODE".to_string(),
            "工单编码".to_string(),
            "{SEQ:4}".to_string(),
            1,
            1,
            4,
            ResetPolicy::Never,
            None,
            None,
        )
        .unwrap();
        assert!(rule.is_active);
        assert!(!rule.is_system);
        assert!(rule.is_deletable());
        assert_eq!(rule.counter_seed(), 0);

        let err = CodeRule::new(
            tenant,
            "X".to_string(),
            "坏模板".to_string(),
            "{NOPE}".to_string(),
            1,
            1,
            4,
            ResetPolicy::Never,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidTemplate(_)));

        let err = CodeRule::new(
            tenant,
            "X".to_string(),
            "坏步长".to_string(),
            "{SEQ}".to_string(),
            1,
            0,
            4,
            ResetPolicy::Never,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = CodeRule::new(
            tenant,
            "X".to_string(),
            "坏宽度".to_string(),
            "{SEQ}".to_string(),
            1,
            1,
            0,
            ResetPolicy::Never,
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_counter_seed_honors_start_and_step() {
        let mut rule = CodeRule::new(
            TenantId::new(),
            "PAYABLE_CODE".to_string(),
            "应付编码".to_string(),
            "{SEQ:3}".to_string(),
            100,
            5,
            3,
            ResetPolicy::Never,
            None,
            None,
        )
        .unwrap();
        // 下一次发放 95 + 5 = 100
        assert_eq!(rule.counter_seed(), 95);

        rule.update_sequencing(1, 2, 3).unwrap();
        assert_eq!(rule.counter_seed(), -1);
        assert!(rule.update_sequencing(-1, 1, 4).is_err());
    }

    #[test]
    fn test_system_rule_not_deletable() {
        let rule = CodeRule::new(
            TenantId::new(),
            "PURCHASE_ORDER_CODE".to_string(),
            "采购单编码".to_string(),
            "{SEQ:4}".to_string(),
            1,
            1,
            4,
            ResetPolicy::Never,
            None,
            None,
        )
        .unwrap()
        .as_system();
        assert!(!rule.is_deletable());
    }

    #[test]
    fn test_reset_window_never() {
        let policy = ResetPolicy::Never;
        assert!(!policy.window_changed(None, date(2025, 1, 14)));
        assert!(!policy.window_changed(Some(date(2020, 1, 1)), date(2025, 1, 14)));
    }

    #[test]
    fn test_reset_window_daily() {
        let policy = ResetPolicy::Daily;
        assert!(policy.window_changed(None, date(2025, 1, 14)));
        assert!(!policy.window_changed(Some(date(2025, 1, 14)), date(2025, 1, 14)));
        assert!(policy.window_changed(Some(date(2025, 1, 13)), date(2025, 1, 14)));
    }

    #[test]
    fn test_reset_window_monthly() {
        let policy = ResetPolicy::Monthly;
        assert!(!policy.window_changed(Some(date(2025, 1, 1)), date(2025, 1, 31)));
        assert!(policy.window_changed(Some(date(2025, 1, 31)), date(2025, 2, 1)));
    }

    #[test]
    fn test_reset_window_yearly() {
        let policy = ResetPolicy::Yearly;
        assert!(!policy.window_changed(Some(date(2025, 1, 1)), date(2025, 12, 31)));
        assert!(policy.window_changed(Some(date(2025, 12, 31)), date(2026, 1, 1)));
    }

    #[test]
    fn test_reset_policy_roundtrip() {
        for policy in [
            ResetPolicy::Never,
            ResetPolicy::Daily,
            ResetPolicy::Monthly,
            ResetPolicy::Yearly,
        ] {
            assert_eq!(ResetPolicy::parse(policy.as_str()).unwrap(), policy);
        }
        assert!(ResetPolicy::parse("weekly").is_err());
    }
}
