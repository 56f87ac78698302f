//! 领域层
//!
//! 聚合、仓储接口与纯领域逻辑，不依赖任何基础设施。

pub mod coding;
pub mod documents;
pub mod ports;
pub mod registry;
pub mod relations;
pub mod repositories;
pub mod unit_of_work;
