//! 编码规则与序列号分配

mod allocator;
mod rule;
mod template;

pub use allocator::*;
pub use rule::*;
pub use template::*;
