//! Twilio TaskRouter REST client.
//!
//! | Call            | Request                                                    |
//! |-----------------|------------------------------------------------------------|
//! | `account`       | `GET  {api}/2010-04-01/Accounts/{account}.json`            |
//! | `list_workers`  | `GET  {taskrouter}/v1/Workspaces/{ws}/Workers?PageSize=N`  |
//! | `create_worker` | `POST {taskrouter}/v1/Workspaces/{ws}/Workers`             |
//! | `update_worker` | `POST {taskrouter}/v1/Workspaces/{ws}/Workers/{sid}`       |
//!
//! Writes are form-encoded. Listing follows `meta.next_page_url` until the
//! service stops returning one.

use std::time::Duration;

use base64::Engine;
use serde::Deserialize;

use roster_core::{RemoteWorker, RunConfig, WorkerName, WorkerSid};

use crate::directory::{AccountInfo, WorkerDirectory, WorkerUpdate};
use crate::error::DirectoryError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WorkerResource {
    sid: String,
    friendly_name: String,
    #[serde(default)]
    attributes: Option<String>,
    #[serde(default)]
    activity_sid: Option<String>,
}

impl From<WorkerResource> for RemoteWorker {
    fn from(w: WorkerResource) -> Self {
        RemoteWorker {
            sid: WorkerSid::from(w.sid),
            friendly_name: WorkerName::from(w.friendly_name),
            attributes: w.attributes.unwrap_or_else(|| "{}".to_string()),
            activity_sid: w.activity_sid,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PageMeta {
    #[serde(default)]
    next_page_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorkerPage {
    #[serde(default)]
    workers: Vec<WorkerResource>,
    #[serde(default)]
    meta: PageMeta,
}

#[derive(Debug, Deserialize)]
struct AccountResource {
    sid: String,
    friendly_name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u32>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    more_info: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blocking TaskRouter client for one workspace.
pub struct TaskRouterClient {
    agent: ureq::Agent,
    authorization: String,
    account_sid: String,
    workers_url: String,
    api_url: String,
}

impl TaskRouterClient {
    pub fn new(config: &RunConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        let credentials = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", config.account_sid, config.auth_token));
        Self {
            agent,
            authorization: format!("Basic {credentials}"),
            account_sid: config.account_sid.clone(),
            workers_url: format!(
                "{}/v1/Workspaces/{}/Workers",
                config.taskrouter_url.trim_end_matches('/'),
                config.workspace_sid
            ),
            api_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }

    fn get(&self, url: &str) -> ureq::Request {
        self.agent
            .get(url)
            .set("Authorization", &self.authorization)
            .set("Accept", "application/json")
    }

    fn post(&self, url: &str) -> ureq::Request {
        self.agent
            .post(url)
            .set("Authorization", &self.authorization)
            .set("Accept", "application/json")
    }
}

/// Turn a ureq result into a response or a typed directory error.
fn check(result: Result<ureq::Response, ureq::Error>) -> Result<ureq::Response, DirectoryError> {
    match result {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(status, response)) => {
            let body: ErrorBody = response.into_json().unwrap_or_default();
            Err(DirectoryError::from_response(
                status,
                body.code,
                body.message,
                body.more_info,
            ))
        }
        Err(ureq::Error::Transport(transport)) => {
            Err(DirectoryError::Transport(transport.to_string()))
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(response: ureq::Response) -> Result<T, DirectoryError> {
    response
        .into_json()
        .map_err(|e| DirectoryError::Decode(e.to_string()))
}

impl WorkerDirectory for TaskRouterClient {
    fn account(&self) -> Result<AccountInfo, DirectoryError> {
        let url = format!("{}/2010-04-01/Accounts/{}.json", self.api_url, self.account_sid);
        let account: AccountResource = decode(check(self.get(&url).call())?)?;
        Ok(AccountInfo {
            sid: account.sid,
            friendly_name: account.friendly_name,
        })
    }

    fn list_workers(&self, page_size: u32) -> Result<Vec<RemoteWorker>, DirectoryError> {
        let mut workers = Vec::new();
        let first = self
            .get(&self.workers_url)
            .query("PageSize", &page_size.to_string());
        let mut page: WorkerPage = decode(check(first.call())?)?;
        loop {
            tracing::debug!("fetched page of {} workers", page.workers.len());
            workers.extend(page.workers.into_iter().map(RemoteWorker::from));
            match page.meta.next_page_url.filter(|u| !u.is_empty()) {
                Some(next) => page = decode(check(self.get(&next).call())?)?,
                None => break,
            }
        }
        Ok(workers)
    }

    fn create_worker(
        &self,
        friendly_name: &WorkerName,
        attributes: &str,
    ) -> Result<RemoteWorker, DirectoryError> {
        let form = [("FriendlyName", friendly_name.0.as_str()), ("Attributes", attributes)];
        let resource: WorkerResource =
            decode(check(self.post(&self.workers_url).send_form(&form))?)?;
        Ok(resource.into())
    }

    fn update_worker(
        &self,
        sid: &WorkerSid,
        update: &WorkerUpdate,
    ) -> Result<RemoteWorker, DirectoryError> {
        let mut form: Vec<(&str, &str)> = Vec::with_capacity(2);
        if let Some(attributes) = update.attributes.as_deref() {
            form.push(("Attributes", attributes));
        }
        if let Some(activity) = update.activity_sid.as_deref() {
            form.push(("ActivitySid", activity));
        }
        let url = format!("{}/{}", self.workers_url, sid.0);
        let resource: WorkerResource = decode(check(self.post(&url).send_form(&form))?)?;
        Ok(resource.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RunConfig {
        RunConfig {
            account_sid: "AC1".to_string(),
            auth_token: "secret".to_string(),
            workspace_sid: "WS1".to_string(),
            temp_activity_sid: "WA1".to_string(),
            offline_activity_sid: "WA2".to_string(),
            page_size: 1000,
            taskrouter_url: "https://taskrouter.example/".to_string(),
            api_url: "https://api.example".to_string(),
        }
    }

    #[test]
    fn urls_are_built_from_config() {
        let client = TaskRouterClient::new(&config());
        assert_eq!(
            client.workers_url,
            "https://taskrouter.example/v1/Workspaces/WS1/Workers"
        );
        assert_eq!(client.api_url, "https://api.example");
    }

    #[test]
    fn basic_auth_header_encodes_credentials() {
        let client = TaskRouterClient::new(&config());
        assert_eq!(client.authorization, "Basic QUMxOnNlY3JldA==");
    }

    #[test]
    fn worker_resource_without_attributes_gets_empty_object() {
        let resource: WorkerResource =
            serde_json::from_str(r#"{"sid":"WK1","friendly_name":"Jo","attributes":null}"#)
                .expect("decode");
        let worker = RemoteWorker::from(resource);
        assert_eq!(worker.attributes, "{}");
        assert_eq!(worker.activity_sid, None);
    }
}
