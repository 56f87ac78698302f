//! 编码分配命令

use std::collections::HashMap;

use mes_common::TenantId;
use mes_cqrs_core::Command;

/// 分配一个新编码
#[derive(Debug, Clone)]
pub struct AllocateCodeCommand {
    pub tenant_id: TenantId,
    pub rule_code: String,
    pub prefix: Option<String>,
    pub scope_key: Option<String>,
    pub dict: HashMap<String, String>,
}

impl Command for AllocateCodeCommand {
    type Result = String;
}
