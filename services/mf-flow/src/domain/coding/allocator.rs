//! 序列号分配
//!
//! 分配在调用方的事务内完成：计数器行 upsert、行级锁抢占、重置窗口
//! 判断、后增量取值、模板渲染。抢锁失败由仓储层映射为
//! `AllocationContention`，调用方以全新事务整体重试。

use std::collections::HashMap;

use chrono::NaiveDate;
use mes_common::TenantId;
use mes_errors::{AppError, AppResult};

use crate::domain::repositories::coding::{CodeRuleRepository, CodeSequenceRepository};

/// 分配上下文
#[derive(Debug, Clone, Default)]
pub struct AllocationContext {
    /// 编码前缀，非空时与渲染结果以 '-' 连接
    pub prefix: Option<String>,
    /// 计数器分区键，缺省使用规则级全局计数
    pub scope_key: Option<String>,
    /// DICT 变量取值
    pub dict: HashMap<String, String>,
}

impl AllocationContext {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    pub fn scoped(mut self, scope_key: impl Into<String>) -> Self {
        self.scope_key = Some(scope_key.into());
        self
    }

    pub fn scope_key(&self) -> &str {
        self.scope_key.as_deref().unwrap_or("")
    }
}

/// 分配一个新编码
///
/// 同一 (规则, 租户, 分区键) 上的并发分配由计数器行的行级锁串行化，
/// 任何两次成功分配不会观察到相同的后增量值。
pub async fn allocate(
    rules: &dyn CodeRuleRepository,
    sequences: &dyn CodeSequenceRepository,
    tenant_id: &TenantId,
    rule_code: &str,
    context: &AllocationContext,
    today: NaiveDate,
) -> AppResult<String> {
    let rule = rules
        .find_by_code(tenant_id, rule_code)
        .await?
        .ok_or_else(|| AppError::rule_not_found(rule_code.to_string()))?;
    // 停用与不存在对调用方等价：规则当前不可用
    if !rule.is_active {
        return Err(AppError::rule_not_found(rule_code.to_string()));
    }
    let template = rule.parsed_template()?;

    let scope_key = context.scope_key();
    sequences
        .ensure(rule.id, tenant_id, scope_key, rule.counter_seed())
        .await?;
    let counter = sequences.lock(rule.id, tenant_id, scope_key).await?;

    // 窗口翻转时回到种子值，发放的第一个值即 seq_start
    let (base, last_reset) = if rule
        .reset_policy
        .window_changed(counter.last_reset, today)
    {
        (rule.counter_seed(), Some(today))
    } else {
        (counter.current_value, counter.last_reset)
    };
    let next = base + rule.seq_step;
    sequences.update(counter.id, next, last_reset).await?;

    let width = rule.seq_width.max(1) as usize;
    let rendered = template.render(today, next, width, &context.dict)?;
    Ok(match context.prefix.as_deref() {
        Some(prefix) if !prefix.is_empty() => format!("{}-{}", prefix, rendered),
        _ => rendered,
    })
}
