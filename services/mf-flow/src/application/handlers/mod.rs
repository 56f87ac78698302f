//! 命令与查询处理器

pub mod coding;
pub mod init;
pub mod orchestrator;
pub mod relations;
