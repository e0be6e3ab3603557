//! Visitor bookkeeping entities.

pub mod model;

pub use model::{VisitorKey, VisitorRecord};
