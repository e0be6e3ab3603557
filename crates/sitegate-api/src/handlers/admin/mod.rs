//! Handlers behind authenticated route classes.

pub mod identity;
pub mod live;
pub mod visitors;
