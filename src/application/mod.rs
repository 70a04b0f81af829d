//! Application layer: the post store and the seams it drives.

pub mod error;
pub mod fetch;
pub mod metrics;
pub mod navigation;
pub mod repos;
pub mod store;
