//! 单据关联查询处理器

mod relation_query_handlers;

pub use relation_query_handlers::{DemandTraceHandler, DocumentRelationsHandler};
