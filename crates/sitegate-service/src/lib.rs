//! # sitegate-service
//!
//! Service layer for SiteGate. Currently hosts visitor tracking: deciding
//! which requests count as page views, deriving a visitor key, and
//! recording sightings without ever holding up the response.
//!
//! Services follow constructor injection; stores are provided as
//! `Arc<dyn VisitorStore>`.

pub mod presence;

pub use presence::{MemoryVisitorStore, PathFilter, PresenceTracker, VisitorStore};
