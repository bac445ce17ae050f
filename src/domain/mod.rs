//! Domain Layer
//!
//! Value objects and ports shared by the synchronizer and its adapters.

pub mod ports;

pub use ports::{ResourceLister, ResourceScope};
