//! PostgreSQL 持久化
//!
//! 事务感知的 Repository（供 UnitOfWork 使用）与基于连接池的
//! 只读 Repository（供查询处理器使用）共用 `rows` 中的行映射。

mod migrations;
mod postgres_repositories;
mod postgres_unit_of_work;
mod rows;
mod tx_repositories;

pub use migrations::migrations;
pub use postgres_repositories::{PostgresCodeRuleRepository, PostgresRelationRepository};
pub use postgres_unit_of_work::PostgresUnitOfWorkFactory;
