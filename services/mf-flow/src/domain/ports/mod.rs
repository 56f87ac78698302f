//! 对外依赖端口
//!
//! 主数据归属其他服务，这里只声明只读查询端口，由基础设施层实现。

mod master_data;

pub use master_data::{
    CodeMappingPort, CustomerLookup, CustomerRef, MaterialLookup, MaterialRef, OperationLookup,
    OperationRef, SupplierLookup, SupplierRef, WarehouseLookup, WarehouseRef, WorkshopLookup,
    WorkshopRef,
};
