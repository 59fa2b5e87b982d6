//! # Dataset Module
//!
//! Provider datasets: one SQLite file per configured provider, opened read-only
//! for serving and swapped in place after each full reimport.

pub mod errors;
pub mod handle;
pub mod registry;

pub use errors::{DatasetError, DatasetResult};
pub use handle::DatasetHandle;
pub use registry::DatasetRegistry;
