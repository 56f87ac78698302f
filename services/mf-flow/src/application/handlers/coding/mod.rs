//! 编码规则处理器

mod allocate_code_handler;
mod rule_admin_handlers;
mod rule_query_handlers;

pub use allocate_code_handler::AllocateCodeHandler;
pub use rule_admin_handlers::{
    CreateCodeRuleHandler, DeleteCodeRuleHandler, UpdateCodeRuleHandler,
};
pub use rule_query_handlers::{GetCodeRuleHandler, ListCodeRulesHandler, PreviewCodeHandler};
