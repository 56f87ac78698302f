//! 实体基础 trait

use chrono::{DateTime, Utc};
use mes_common::AuditInfo;

/// 实体 trait
pub trait Entity {
    type Id;

    fn id(&self) -> &Self::Id;
}

/// 聚合根 trait
pub trait AggregateRoot: Entity {
    fn audit_info(&self) -> &AuditInfo;
    fn audit_info_mut(&mut self) -> &mut AuditInfo;
}

/// 软删除 trait
///
/// 删除通过可空时间戳表达，"存在"即时间戳为空。
/// 去重查询必须排除已软删除的记录，移除误建的目标单据会重新
/// 打开对应的下推名额。
pub trait SoftDelete {
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}
