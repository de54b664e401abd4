//! In-process directory for tests.
//!
//! Behaves like the service for the calls the driver makes: creating an
//! existing name is a conflict, updating an unknown sid is a 404. Every call
//! is recorded, and failures can be injected per worker.

use std::cell::RefCell;
use std::collections::HashMap;

use roster_core::{RemoteWorker, WorkerName, WorkerSid};

use crate::directory::{AccountInfo, WorkerDirectory, WorkerUpdate};
use crate::error::{DirectoryError, CODE_CONFLICT};

/// One recorded directory call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryCall {
    Account,
    List { page_size: u32 },
    Create { name: WorkerName, attributes: String },
    Update { sid: WorkerSid, update: WorkerUpdate },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum FailureKey {
    Create(WorkerName),
    Attributes(WorkerSid),
    Activity(WorkerSid),
}

#[derive(Debug, Default)]
struct State {
    workers: Vec<RemoteWorker>,
    calls: Vec<DirectoryCall>,
    failures: HashMap<FailureKey, DirectoryError>,
    next_id: u32,
}

#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    state: RefCell<State>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a worker with the given raw attribute JSON.
    pub fn with_worker(self, name: &str, attributes: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let sid = WorkerSid::from(format!("WK{:032}", state.next_id));
            state.workers.push(RemoteWorker {
                sid,
                friendly_name: WorkerName::from(name),
                attributes: attributes.to_string(),
                activity_sid: None,
            });
        }
        self
    }

    pub fn fail_create(&self, name: &str, error: DirectoryError) {
        self.state
            .borrow_mut()
            .failures
            .insert(FailureKey::Create(WorkerName::from(name)), error);
    }

    pub fn fail_attribute_update(&self, name: &str, error: DirectoryError) {
        if let Some(sid) = self.sid_of(name) {
            self.state
                .borrow_mut()
                .failures
                .insert(FailureKey::Attributes(sid), error);
        }
    }

    pub fn fail_activity_update(&self, name: &str, error: DirectoryError) {
        if let Some(sid) = self.sid_of(name) {
            self.state
                .borrow_mut()
                .failures
                .insert(FailureKey::Activity(sid), error);
        }
    }

    pub fn sid_of(&self, name: &str) -> Option<WorkerSid> {
        self.worker(name).map(|w| w.sid)
    }

    pub fn worker(&self, name: &str) -> Option<RemoteWorker> {
        self.state
            .borrow()
            .workers
            .iter()
            .find(|w| w.friendly_name.0 == name)
            .cloned()
    }

    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.state.borrow().calls.clone()
    }

    /// Calls that change remote state.
    pub fn write_calls(&self) -> Vec<DirectoryCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, DirectoryCall::Create { .. } | DirectoryCall::Update { .. }))
            .collect()
    }
}

impl WorkerDirectory for InMemoryDirectory {
    fn account(&self) -> Result<AccountInfo, DirectoryError> {
        self.state.borrow_mut().calls.push(DirectoryCall::Account);
        Ok(AccountInfo {
            sid: "AC00000000000000000000000000000000".to_string(),
            friendly_name: "In-memory account".to_string(),
        })
    }

    fn list_workers(&self, page_size: u32) -> Result<Vec<RemoteWorker>, DirectoryError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(DirectoryCall::List { page_size });
        Ok(state.workers.clone())
    }

    fn create_worker(
        &self,
        friendly_name: &WorkerName,
        attributes: &str,
    ) -> Result<RemoteWorker, DirectoryError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(DirectoryCall::Create {
            name: friendly_name.clone(),
            attributes: attributes.to_string(),
        });
        if let Some(err) = state
            .failures
            .get(&FailureKey::Create(friendly_name.clone()))
        {
            return Err(err.clone());
        }
        if state.workers.iter().any(|w| &w.friendly_name == friendly_name) {
            return Err(DirectoryError::Conflict {
                code: CODE_CONFLICT,
                message: format!("Worker {friendly_name} already exists"),
            });
        }
        state.next_id += 1;
        let worker = RemoteWorker {
            sid: WorkerSid::from(format!("WK{:032}", state.next_id)),
            friendly_name: friendly_name.clone(),
            attributes: attributes.to_string(),
            activity_sid: None,
        };
        state.workers.push(worker.clone());
        Ok(worker)
    }

    fn update_worker(
        &self,
        sid: &WorkerSid,
        update: &WorkerUpdate,
    ) -> Result<RemoteWorker, DirectoryError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(DirectoryCall::Update {
            sid: sid.clone(),
            update: update.clone(),
        });
        if update.attributes.is_some() {
            if let Some(err) = state.failures.get(&FailureKey::Attributes(sid.clone())) {
                return Err(err.clone());
            }
        }
        if update.activity_sid.is_some() {
            if let Some(err) = state.failures.get(&FailureKey::Activity(sid.clone())) {
                return Err(err.clone());
            }
        }
        let worker = state
            .workers
            .iter_mut()
            .find(|w| &w.sid == sid)
            .ok_or_else(|| DirectoryError::Api {
                status: 404,
                code: Some(20404),
                message: format!("Worker {sid} not found"),
                more_info: None,
            })?;
        if let Some(attributes) = &update.attributes {
            worker.attributes = attributes.clone();
        }
        if let Some(activity) = &update.activity_sid {
            worker.activity_sid = Some(activity.clone());
        }
        Ok(worker.clone())
    }
}
