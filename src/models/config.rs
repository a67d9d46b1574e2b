// Backend configuration models (owned by the backend, read via `load_config`)
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub ssh: SshConfig,
    pub remote: RemoteConfig,
    pub polling: PollingConfig,
    #[serde(default)]
    pub gurobi: GurobiConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SshConfig {
    pub host: String,
    pub user: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub key_path: String,
}

fn default_port() -> u16 {
    22
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base directory on the worker host, shared by every project
    pub remote_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollingConfig {
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GurobiConfig {
    #[serde(default)]
    pub home: String,
    #[serde(default)]
    pub license_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolsConfig {
    #[serde(default = "default_uv_path")]
    pub uv_path: String,
}

fn default_uv_path() -> String {
    "~/.local/bin/uv".to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            uv_path: default_uv_path(),
        }
    }
}

impl AppConfig {
    pub fn remote_project_path(&self, project_name: &str) -> String {
        format!("{}/projects/{}", self.remote.remote_base, project_name)
    }

    pub fn remote_jobs_path(&self) -> String {
        format!("{}/jobs", self.remote.remote_base)
    }

    pub fn remote_results_path(&self) -> String {
        format!("{}/results", self.remote.remote_base)
    }
}
