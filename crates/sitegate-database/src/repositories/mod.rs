//! Repository implementations for SiteGate entities.

pub mod visitor;

pub use visitor::VisitorRepository;
