//! 编码规则查询

use std::collections::HashMap;

use mes_common::{PagedResult, Pagination, TenantId};
use mes_cqrs_core::Query;

use crate::application::commands::coding::CodeRuleView;

/// 分页列出编码规则
#[derive(Debug, Clone)]
pub struct ListCodeRulesQuery {
    pub tenant_id: TenantId,
    pub pagination: Pagination,
}

impl Query for ListCodeRulesQuery {
    type Result = PagedResult<CodeRuleView>;
}

/// 按 ID 获取编码规则
#[derive(Debug, Clone)]
pub struct GetCodeRuleQuery {
    pub tenant_id: TenantId,
    pub id: i64,
}

impl Query for GetCodeRuleQuery {
    type Result = Option<CodeRuleView>;
}

/// 预览模板展开结果，不消耗序列号
#[derive(Debug, Clone)]
pub struct PreviewCodeQuery {
    pub template: String,
    pub seq_start: i64,
    pub seq_width: i64,
    pub prefix: Option<String>,
    pub dict: HashMap<String, String>,
}

impl Query for PreviewCodeQuery {
    type Result = String;
}
