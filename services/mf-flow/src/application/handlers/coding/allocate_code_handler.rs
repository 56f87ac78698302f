//! 编码分配处理器
//!
//! 计数器行抢锁失败映射为 `AllocationContention`，整个事务丢弃后
//! 以全新事务重试，最多三次，间隔做有界退避。

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mes_common::{with_conditional_retry, RetryConfig};
use mes_cqrs_core::CommandHandler;
use mes_errors::{AppError, AppResult};
use tracing::info;

use crate::application::commands::coding::AllocateCodeCommand;
use crate::domain::coding::{allocate, AllocationContext};
use crate::domain::unit_of_work::UnitOfWorkFactory;
use crate::infrastructure::observability::{record_allocation_retry, record_code_allocated};

pub struct AllocateCodeHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    retry: RetryConfig,
}

impl AllocateCodeHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self {
            uow_factory,
            retry: RetryConfig::default(),
        }
    }

    async fn allocate_once(&self, command: &AllocateCodeCommand) -> AppResult<String> {
        let context = AllocationContext {
            prefix: command.prefix.clone(),
            scope_key: command.scope_key.clone(),
            dict: command.dict.clone(),
        };

        let uow = self.uow_factory.begin().await?;
        let code = allocate(
            uow.code_rules(),
            uow.code_sequences(),
            &command.tenant_id,
            &command.rule_code,
            &context,
            Utc::now().date_naive(),
        )
        .await?;
        uow.commit().await?;
        Ok(code)
    }
}

#[async_trait]
impl CommandHandler<AllocateCodeCommand> for AllocateCodeHandler {
    async fn handle(&self, command: AllocateCodeCommand) -> AppResult<String> {
        let attempts = AtomicU32::new(0);
        let result = with_conditional_retry(
            &self.retry,
            "allocate_code",
            || {
                if attempts.fetch_add(1, Ordering::Relaxed) > 0 {
                    record_allocation_retry(&command.rule_code);
                }
                self.allocate_once(&command)
            },
            AppError::is_contention,
        )
        .await;

        record_code_allocated(&command.rule_code, result.is_ok());
        let code = result?;

        info!(
            tenant_id = %command.tenant_id,
            rule_code = %command.rule_code,
            code = %code,
            "Code allocated"
        );
        Ok(code)
    }
}
