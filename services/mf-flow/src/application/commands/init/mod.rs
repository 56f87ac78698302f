//! 期初导入命令

mod load_commands;

pub use load_commands::{
    LoadOpeningFinanceCommand, LoadOpeningInventoryCommand, LoadOpeningWipCommand, LoadReport,
    RowFailure,
};
