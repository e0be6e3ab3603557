//! # sitegate-database
//!
//! PostgreSQL connection management, embedded migrations and the
//! repository backing persistent visitor records.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
