//! Mediascout Test Utilities
//!
//! Synthetic trees for browser tests: archive listings replayed as trees
//! ([`ManifestTree`]) and in-memory folders ([`MemTree`]).
//!
//! # Usage
//!
//! ```rust,ignore
//! use mediascout_test_utils::MemTree;
//!
//! let tree = MemTree::new("MemFS")
//!     .add_file("photos/img.jpg")
//!     .add_file("photos/img.jpg.xmp")
//!     .shared();
//! ```

pub mod manifest;
pub mod memory;

// Re-exports for convenience
pub use manifest::{scan_manifest, scan_manifest_file, scan_manifest_str, ManifestTree};
pub use memory::MemTree;
