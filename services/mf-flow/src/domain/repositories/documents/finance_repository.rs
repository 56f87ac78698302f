//! 应收应付单据仓储接口

use async_trait::async_trait;
use mes_errors::AppResult;

use crate::domain::documents::FinanceDocument;

/// 应收应付单据仓储
///
/// 只由期初应收应付导入写入。
#[async_trait]
pub trait FinanceRepository: Send + Sync {
    /// 插入单据，返回数据库生成的 ID
    async fn insert(&self, document: &FinanceDocument) -> AppResult<i64>;
}
