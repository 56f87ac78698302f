//! 编码规则查询处理器

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mes_common::PagedResult;
use mes_cqrs_core::QueryHandler;
use mes_errors::AppResult;

use crate::application::commands::coding::CodeRuleView;
use crate::application::queries::coding::{GetCodeRuleQuery, ListCodeRulesQuery, PreviewCodeQuery};
use crate::domain::coding::CodeTemplate;
use crate::domain::repositories::coding::CodeRuleRepository;

/// 分页列出编码规则处理器
pub struct ListCodeRulesHandler {
    rules: Arc<dyn CodeRuleRepository>,
}

impl ListCodeRulesHandler {
    pub fn new(rules: Arc<dyn CodeRuleRepository>) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl QueryHandler<ListCodeRulesQuery> for ListCodeRulesHandler {
    async fn handle(&self, query: ListCodeRulesQuery) -> AppResult<PagedResult<CodeRuleView>> {
        let (rules, total) = self
            .rules
            .list(&query.tenant_id, &query.pagination)
            .await?;
        Ok(PagedResult {
            items: rules.into_iter().map(CodeRuleView::from).collect(),
            total: total as u64,
            page: query.pagination.page,
            page_size: query.pagination.page_size,
        })
    }
}

/// 按 ID 获取编码规则处理器
pub struct GetCodeRuleHandler {
    rules: Arc<dyn CodeRuleRepository>,
}

impl GetCodeRuleHandler {
    pub fn new(rules: Arc<dyn CodeRuleRepository>) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl QueryHandler<GetCodeRuleQuery> for GetCodeRuleHandler {
    async fn handle(&self, query: GetCodeRuleQuery) -> AppResult<Option<CodeRuleView>> {
        let rule = self.rules.find_by_id(&query.tenant_id, query.id).await?;
        Ok(rule.map(CodeRuleView::from))
    }
}

/// 模板预览处理器
///
/// 按当日日期与 seq_start 展开模板，不触碰任何计数器。
pub struct PreviewCodeHandler;

#[async_trait]
impl QueryHandler<PreviewCodeQuery> for PreviewCodeHandler {
    async fn handle(&self, query: PreviewCodeQuery) -> AppResult<String> {
        let template = CodeTemplate::parse(&query.template)?;
        let width = query.seq_width.max(1) as usize;
        let rendered = template.render(
            Utc::now().date_naive(),
            query.seq_start,
            width,
            &query.dict,
        )?;
        Ok(match query.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{}-{}", prefix, rendered),
            _ => rendered,
        })
    }
}
