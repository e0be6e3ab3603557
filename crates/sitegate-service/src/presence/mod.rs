//! Visitor tracking for human page traffic.

pub mod memory;
pub mod sighting;
pub mod store;
pub mod tracker;

pub use memory::MemoryVisitorStore;
pub use sighting::PathFilter;
pub use store::{VisitorStore, build_visitor_store};
pub use tracker::PresenceTracker;
