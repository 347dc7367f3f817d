//! Capacity bounded caches shared by optimizer runs.
mod gdfs;
pub use gdfs::*;
mod plan;
pub use plan::*;
