//! 编码规则维护处理器

use std::sync::Arc;

use async_trait::async_trait;
use mes_cqrs_core::CommandHandler;
use mes_errors::{AppError, AppResult};
use tracing::info;

use crate::application::commands::coding::{
    CodeRuleView, CreateCodeRuleCommand, DeleteCodeRuleCommand, UpdateCodeRuleCommand,
};
use crate::domain::coding::{CodeRule, ResetPolicy};
use crate::domain::unit_of_work::UnitOfWorkFactory;

/// 创建编码规则处理器
pub struct CreateCodeRuleHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl CreateCodeRuleHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }
}

#[async_trait]
impl CommandHandler<CreateCodeRuleCommand> for CreateCodeRuleHandler {
    async fn handle(&self, command: CreateCodeRuleCommand) -> AppResult<CodeRuleView> {
        let uow = self.uow_factory.begin().await?;

        if uow
            .code_rules()
            .exists_by_code(&command.tenant_id, &command.code)
            .await?
        {
            return Err(AppError::conflict(format!(
                "编码规则已存在: {}",
                command.code
            )));
        }

        let reset_policy = ResetPolicy::parse(&command.reset_policy)?;
        let mut rule = CodeRule::new(
            command.tenant_id,
            command.code,
            command.name,
            command.template,
            command.seq_start,
            command.seq_step,
            command.seq_width,
            reset_policy,
            command.description,
            command.created_by,
        )?;
        rule.id = uow.code_rules().insert(&rule).await?;
        uow.commit().await?;

        info!(tenant_id = %rule.tenant_id, rule_code = %rule.code, "Code rule created");
        Ok(rule.into())
    }
}

/// 更新编码规则处理器
pub struct UpdateCodeRuleHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl UpdateCodeRuleHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }
}

#[async_trait]
impl CommandHandler<UpdateCodeRuleCommand> for UpdateCodeRuleHandler {
    async fn handle(&self, command: UpdateCodeRuleCommand) -> AppResult<CodeRuleView> {
        let uow = self.uow_factory.begin().await?;

        let mut rule = uow
            .code_rules()
            .find_by_id(&command.tenant_id, command.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("编码规则不存在: {}", command.id)))?;

        if let Some(name) = command.name {
            if name.trim().is_empty() {
                return Err(AppError::validation("rule name cannot be empty"));
            }
            rule.name = name;
        }
        if let Some(template) = command.template {
            rule.update_template(template)?;
        }
        let seq_start = command.seq_start.unwrap_or(rule.seq_start);
        let seq_step = command.seq_step.unwrap_or(rule.seq_step);
        let seq_width = command.seq_width.unwrap_or(rule.seq_width);
        rule.update_sequencing(seq_start, seq_step, seq_width)?;
        if let Some(reset_policy) = command.reset_policy.as_deref() {
            rule.reset_policy = ResetPolicy::parse(reset_policy)?;
        }
        if let Some(is_active) = command.is_active {
            rule.is_active = is_active;
        }
        if command.description.is_some() {
            rule.description = command.description;
        }
        rule.audit_info.update(command.updated_by);

        uow.code_rules().update(&rule).await?;
        uow.commit().await?;

        info!(tenant_id = %rule.tenant_id, rule_code = %rule.code, "Code rule updated");
        Ok(rule.into())
    }
}

/// 删除编码规则处理器
///
/// 系统内置规则拒绝删除，其余走软删除。
pub struct DeleteCodeRuleHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl DeleteCodeRuleHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }
}

#[async_trait]
impl CommandHandler<DeleteCodeRuleCommand> for DeleteCodeRuleHandler {
    async fn handle(&self, command: DeleteCodeRuleCommand) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;

        let rule = uow
            .code_rules()
            .find_by_id(&command.tenant_id, command.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("编码规则不存在: {}", command.id)))?;
        if !rule.is_deletable() {
            return Err(AppError::precondition_failed(format!(
                "系统内置规则不可删除: {}",
                rule.code
            )));
        }

        uow.code_rules()
            .soft_delete(&command.tenant_id, command.id)
            .await?;
        uow.commit().await?;

        info!(tenant_id = %command.tenant_id, rule_code = %rule.code, "Code rule deleted");
        Ok(())
    }
}
