//! Storage layer: categorized on-disk persistence for fetched payloads.

mod error;
pub use error::StoreError;

mod disk;
pub use disk::{Artifact, Category, DataStore, Format};
