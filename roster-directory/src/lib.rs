//! # roster-directory
//!
//! The remote worker directory: the [`WorkerDirectory`] trait, the
//! [`TaskRouterClient`] that speaks to the service, and an
//! [`InMemoryDirectory`] for tests.

pub mod directory;
pub mod error;
pub mod memory;
pub mod taskrouter;

pub use directory::{AccountInfo, WorkerDirectory, WorkerUpdate};
pub use error::{DirectoryError, ErrorKind};
pub use memory::{DirectoryCall, InMemoryDirectory};
pub use taskrouter::TaskRouterClient;
