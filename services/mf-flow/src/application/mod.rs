//! 应用层
//!
//! 命令、查询与处理器。处理器持有 `Arc<dyn …>` 端口，
//! 自己开启和提交 UnitOfWork。

pub mod commands;
pub mod handlers;
pub mod queries;
