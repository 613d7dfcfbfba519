//! Output directory storage
//!
//! Converted files live in a single local directory. [`OutputStore`] owns
//! that directory together with the ordered set of filenames produced since
//! the last clear, which is what the archive export reads.

pub mod error;
pub mod local;

pub use error::{StorageError, StorageResult};
pub use local::OutputStore;
