//! 查询定义

pub mod coding;
pub mod relations;
