//! 基础设施层

pub mod master_data;
pub mod observability;
pub mod persistence;
