//! The worker directory seam.

use roster_core::{RemoteWorker, WorkerName, WorkerSid};

use crate::error::DirectoryError;

/// Account the credentials resolve to, shown before anything runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub sid: String,
    pub friendly_name: String,
}

/// Fields of a worker update. `None` fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerUpdate {
    /// Complete replacement attribute JSON.
    pub attributes: Option<String>,
    pub activity_sid: Option<String>,
}

impl WorkerUpdate {
    pub fn attributes(json: impl Into<String>) -> Self {
        Self {
            attributes: Some(json.into()),
            activity_sid: None,
        }
    }

    pub fn activity(sid: impl Into<String>) -> Self {
        Self {
            attributes: None,
            activity_sid: Some(sid.into()),
        }
    }
}

/// Remote store of workers, keyed by display name and service id.
///
/// Calls are blocking and issued one at a time by the driver.
pub trait WorkerDirectory {
    fn account(&self) -> Result<AccountInfo, DirectoryError>;

    /// Every worker in the workspace, fetched `page_size` at a time.
    fn list_workers(&self, page_size: u32) -> Result<Vec<RemoteWorker>, DirectoryError>;

    fn create_worker(
        &self,
        friendly_name: &WorkerName,
        attributes: &str,
    ) -> Result<RemoteWorker, DirectoryError>;

    fn update_worker(
        &self,
        sid: &WorkerSid,
        update: &WorkerUpdate,
    ) -> Result<RemoteWorker, DirectoryError>;
}
