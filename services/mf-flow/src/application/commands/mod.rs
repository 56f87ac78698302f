//! 命令定义

pub mod coding;
pub mod init;
pub mod orchestrator;
