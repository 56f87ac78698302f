//! 编码规则命令

mod allocate_code_command;
mod rule_commands;

pub use allocate_code_command::AllocateCodeCommand;
pub use rule_commands::{
    CodeRuleView, CreateCodeRuleCommand, DeleteCodeRuleCommand, UpdateCodeRuleCommand,
};
