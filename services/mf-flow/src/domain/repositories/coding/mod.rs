//! 编码规则仓储接口

mod code_rule_repository;
mod code_sequence_repository;

pub use code_rule_repository::CodeRuleRepository;
pub use code_sequence_repository::CodeSequenceRepository;
