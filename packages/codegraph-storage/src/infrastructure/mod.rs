//! Infrastructure layer - Storage adapters

pub mod fs;

pub use fs::FilesystemSnapshotStore;
