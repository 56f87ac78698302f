//! 采购入库单仓储接口

use async_trait::async_trait;
use mes_errors::AppResult;

use crate::domain::documents::{PurchaseReceipt, ReceiptLine};

/// 采购入库单仓储
///
/// 只由期初库存导入写入。
#[async_trait]
pub trait ReceiptRepository: Send + Sync {
    /// 插入入库单头，返回数据库生成的 ID
    async fn insert(&self, receipt: &PurchaseReceipt) -> AppResult<i64>;

    /// 插入入库单行
    async fn insert_line(&self, line: &ReceiptLine) -> AppResult<i64>;
}
