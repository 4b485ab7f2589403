//! Catalog entries: shape, classification, normalization, storage.

pub mod classify;
pub mod convert;
pub mod entry;
pub mod store;

pub use classify::{APPLICATION_TOPIC, CATEGORY_TOPICS, PACKAGE_TOPIC};
pub use convert::to_catalog_entry;
pub use entry::{CatalogEntry, Dependency, OwnerProfile, Release, ReleaseAsset, RepoType};
pub use store::CatalogStore;
