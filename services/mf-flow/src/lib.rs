//! mf-flow — 单据推拉编排服务
//!
//! 覆盖编码分配、单据关联、推拉编排与期初数据导入。

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
