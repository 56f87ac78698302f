//! mes-domain-core - 跨 context 的领域核心类型
//!
//! 包含极少数需要跨 bounded context 共享的实体抽象

mod entity;

pub use entity::*;

// Re-export common types
pub use mes_common::{AuditInfo, TenantId, UserId};
