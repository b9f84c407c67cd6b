//! Infrastructure layer: PostgreSQL pool and user persistence.

pub mod db;
mod error;
pub mod users;

pub use db::{Database, PoolConfig};
pub use users::PostgresUserStore;
