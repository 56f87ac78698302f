//! 期初导入处理器

mod load_finance_handler;
mod load_inventory_handler;
mod load_wip_handler;
mod table;

pub use load_finance_handler::LoadOpeningFinanceHandler;
pub use load_inventory_handler::LoadOpeningInventoryHandler;
pub use load_wip_handler::LoadOpeningWipHandler;

/// 外部编码映射的来源系统标识
pub(crate) const EXTERNAL_SYSTEM: &str = "期初数据导入";
