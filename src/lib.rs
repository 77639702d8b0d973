//! Client for the BunnyCDN storage and purge APIs
//!
//! Lists, probes, downloads, uploads and deletes files in a single storage
//! zone, and purges their public URLs from the edge cache.

pub mod error;
pub mod models;
pub mod storage;

pub use error::{Error, Result};
pub use models::{Config, ListingEntry, Upload};
pub use storage::{MockStorageClient, StorageClient, StorageService};
