//! 编码规则维护命令

use chrono::{DateTime, Utc};
use mes_common::{TenantId, UserId};
use mes_cqrs_core::Command;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::coding::CodeRule;

/// 创建编码规则命令
#[derive(Debug, Clone)]
pub struct CreateCodeRuleCommand {
    pub tenant_id: TenantId,
    pub code: String,
    pub name: String,
    pub template: String,
    pub seq_start: i64,
    pub seq_step: i64,
    pub seq_width: i64,
    pub reset_policy: String,
    pub description: Option<String>,
    pub created_by: Option<UserId>,
}

impl Command for CreateCodeRuleCommand {
    type Result = CodeRuleView;
}

/// 更新编码规则命令
///
/// 字段为空表示保持原值；系统规则允许修改但不允许删除。
#[derive(Debug, Clone)]
pub struct UpdateCodeRuleCommand {
    pub tenant_id: TenantId,
    pub id: i64,
    pub name: Option<String>,
    pub template: Option<String>,
    pub seq_start: Option<i64>,
    pub seq_step: Option<i64>,
    pub seq_width: Option<i64>,
    pub reset_policy: Option<String>,
    pub is_active: Option<bool>,
    pub description: Option<String>,
    pub updated_by: Option<UserId>,
}

impl Command for UpdateCodeRuleCommand {
    type Result = CodeRuleView;
}

/// 删除编码规则命令
#[derive(Debug, Clone)]
pub struct DeleteCodeRuleCommand {
    pub tenant_id: TenantId,
    pub id: i64,
}

impl Command for DeleteCodeRuleCommand {
    type Result = ();
}

/// 规则对外视图
#[derive(Debug, Clone, Serialize)]
pub struct CodeRuleView {
    pub id: i64,
    pub uuid: Uuid,
    pub code: String,
    pub name: String,
    pub template: String,
    pub seq_start: i64,
    pub seq_step: i64,
    pub seq_width: i64,
    pub reset_policy: String,
    pub is_system: bool,
    pub is_active: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CodeRule> for CodeRuleView {
    fn from(rule: CodeRule) -> Self {
        Self {
            id: rule.id,
            uuid: rule.uuid,
            code: rule.code,
            name: rule.name,
            template: rule.template,
            seq_start: rule.seq_start,
            seq_step: rule.seq_step,
            seq_width: rule.seq_width,
            reset_policy: rule.reset_policy.as_str().to_string(),
            is_system: rule.is_system,
            is_active: rule.is_active,
            description: rule.description,
            created_at: rule.audit_info.created_at,
            updated_at: rule.audit_info.updated_at,
        }
    }
}
