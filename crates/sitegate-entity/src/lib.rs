//! # sitegate-entity
//!
//! Domain entity models for SiteGate. Database entities additionally
//! derive `sqlx::FromRow`.

pub mod user;
pub mod visitor;
