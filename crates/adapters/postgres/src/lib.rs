//! mes-adapter-postgres - PostgreSQL 适配器

mod connection;
mod migration;
mod retry;
mod transaction;

pub use connection::*;
pub use migration::*;
pub use retry::*;
pub use transaction::*;
