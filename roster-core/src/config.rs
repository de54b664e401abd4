//! Run configuration.
//!
//! Settings come from an optional YAML file and the process environment;
//! environment values win. Resolution takes the environment as a lookup
//! closure so tests never touch the real process environment.
//!
//! ```yaml
//! # ~/.roster/config.yaml
//! account_sid: ACxxxxxxxx
//! auth_token: secret
//! workspace_sid: WSxxxxxxxx
//! temp_activity_sid: WAxxxxxxxx
//! offline_activity_sid: WAxxxxxxxx
//! page_size: 1000
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{io_err, CoreError};

pub const DEFAULT_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_TASKROUTER_URL: &str = "https://taskrouter.twilio.com";
pub const DEFAULT_API_URL: &str = "https://api.twilio.com";

/// Environment variable names.
pub mod env {
    pub const ACCOUNT_SID: &str = "ACCOUNT_SID";
    pub const AUTH_TOKEN: &str = "AUTH_TOKEN";
    pub const WORKSPACE_SID: &str = "TR_WORKSPACE_SID";
    pub const TEMP_ACTIVITY_SID: &str = "TEMP_ACTIVITY_SID";
    pub const OFFLINE_ACTIVITY_SID: &str = "OFFLINE_ACTIVITY_SID";
    pub const PAGE_SIZE: &str = "ROSTER_PAGE_SIZE";
    pub const TASKROUTER_URL: &str = "ROSTER_TASKROUTER_URL";
    pub const API_URL: &str = "ROSTER_API_URL";
}

/// On-disk form; every key optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub workspace_sid: Option<String>,
    pub temp_activity_sid: Option<String>,
    pub offline_activity_sid: Option<String>,
    pub page_size: Option<u32>,
    pub taskrouter_url: Option<String>,
    pub api_url: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub workspace_sid: String,
    /// Transitional activity used for the departure flip.
    pub temp_activity_sid: String,
    /// Final activity of the departure flip.
    pub offline_activity_sid: String,
    pub page_size: u32,
    pub taskrouter_url: String,
    pub api_url: String,
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("workspace_sid", &self.workspace_sid)
            .field("temp_activity_sid", &self.temp_activity_sid)
            .field("offline_activity_sid", &self.offline_activity_sid)
            .field("page_size", &self.page_size)
            .field("taskrouter_url", &self.taskrouter_url)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl RunConfig {
    /// Merge a config file (if any) with environment values from `lookup`.
    /// Empty environment values count as unset.
    pub fn resolve<F>(file: Option<ConfigFile>, lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();
        let pick = |key: &'static str, from_file: Option<String>| {
            lookup(key).filter(|v| !v.is_empty()).or(from_file)
        };
        let required = |key: &'static str, from_file: Option<String>| {
            pick(key, from_file).ok_or(CoreError::MissingSetting { key })
        };

        let page_size = match lookup(env::PAGE_SIZE).filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(CoreError::InvalidSetting {
                    key: env::PAGE_SIZE,
                    value: raw,
                })?,
            None => file.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        };

        Ok(Self {
            account_sid: required(env::ACCOUNT_SID, file.account_sid)?,
            auth_token: required(env::AUTH_TOKEN, file.auth_token)?,
            workspace_sid: required(env::WORKSPACE_SID, file.workspace_sid)?,
            temp_activity_sid: required(env::TEMP_ACTIVITY_SID, file.temp_activity_sid)?,
            offline_activity_sid: required(env::OFFLINE_ACTIVITY_SID, file.offline_activity_sid)?,
            page_size,
            taskrouter_url: pick(env::TASKROUTER_URL, file.taskrouter_url)
                .unwrap_or_else(|| DEFAULT_TASKROUTER_URL.to_string()),
            api_url: pick(env::API_URL, file.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        })
    }
}

/// `<home>/.roster/config.yaml`. Pure, no I/O.
pub fn default_config_path_at(home: &Path) -> PathBuf {
    home.join(".roster").join("config.yaml")
}

/// `default_config_path_at` convenience wrapper; `None` without a home directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| default_config_path_at(&home))
}

/// Parse a YAML config file.
pub fn load_file_at(path: &Path) -> Result<ConfigFile, CoreError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|source| CoreError::Config {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn full_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (env::ACCOUNT_SID, "AC1".to_string()),
            (env::AUTH_TOKEN, "tok".to_string()),
            (env::WORKSPACE_SID, "WS1".to_string()),
            (env::TEMP_ACTIVITY_SID, "WA-temp".to_string()),
            (env::OFFLINE_ACTIVITY_SID, "WA-off".to_string()),
        ])
    }

    #[test]
    fn environment_alone_is_enough() {
        let vars = full_env();
        let cfg = RunConfig::resolve(None, |k| vars.get(k).cloned()).expect("resolve");
        assert_eq!(cfg.workspace_sid, "WS1");
        assert_eq!(cfg.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(cfg.taskrouter_url, DEFAULT_TASKROUTER_URL);
    }

    #[test]
    fn environment_overrides_file() {
        let vars = full_env();
        let file = ConfigFile {
            workspace_sid: Some("WS-file".to_string()),
            page_size: Some(50),
            ..ConfigFile::default()
        };
        let cfg = RunConfig::resolve(Some(file), |k| vars.get(k).cloned()).expect("resolve");
        assert_eq!(cfg.workspace_sid, "WS1");
        assert_eq!(cfg.page_size, 50);
    }

    #[test]
    fn missing_key_is_named() {
        let mut vars = full_env();
        vars.remove(env::OFFLINE_ACTIVITY_SID);
        let err = RunConfig::resolve(None, |k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("OFFLINE_ACTIVITY_SID"), "{err}");
    }

    #[test]
    fn bad_page_size_is_rejected() {
        let mut vars = full_env();
        vars.insert(env::PAGE_SIZE, "0".to_string());
        let err = RunConfig::resolve(None, |k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSetting { .. }));
    }

    #[test]
    fn debug_hides_token() {
        let vars = full_env();
        let cfg = RunConfig::resolve(None, |k| vars.get(k).cloned()).expect("resolve");
        let shown = format!("{cfg:?}");
        assert!(!shown.contains("tok\""));
        assert!(shown.contains("<redacted>"));
    }

    #[test]
    fn default_path_is_under_home() {
        let path = default_config_path_at(Path::new("/home/op"));
        assert!(path.ends_with(".roster/config.yaml"));
    }
}
