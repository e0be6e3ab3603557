//! Route handlers organized by domain.

pub mod admin;
pub mod csrf;
pub mod health;
pub mod pages;
pub mod ws;
