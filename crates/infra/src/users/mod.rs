//! User persistence adapters.

pub mod postgres;

pub use postgres::PostgresUserStore;
