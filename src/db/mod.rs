//! Database layer: bootstrap, pool and user stores.

mod bootstrap;
mod memory;
mod pool;
mod repositories;
mod store;

pub use bootstrap::{bootstrap, BootstrapError};
pub use memory::MemoryUserStore;
pub use pool::{create_pool, DbPool};
pub use repositories::PgUserStore;
pub use store::{StoreError, StoreResult, UserStore};
