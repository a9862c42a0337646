//! HTTP client for the tracker's REST API (versions, issue search, field list).

use relscan_core::{DateRange, ReleaseWindow, select_releases};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

/// Server-side cap on `maxResults` for the search endpoint.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Connection settings for [`TrackerClient`].
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Instance root, e.g. `https://tracker.example.com` (trailing slash optional).
    pub base_url: String,
    /// REST API version segment, `2` or `3`.
    pub api_version: String,
    pub username: Option<String>,
    pub secret: Option<String>,
    /// Skip TLS certificate validation (self-signed on-prem instances).
    pub accept_invalid_certs: bool,
    pub page_size: u32,
}

impl TrackerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: "2".to_string(),
            username: None,
            secret: None,
            accept_invalid_certs: false,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of `/search` results.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub max_results: u64,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub issues: Vec<Value>,
    /// Field id → display name, present with `expand=names`.
    #[serde(default)]
    pub names: Map<String, Value>,
}

/// An entry of `/field`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FieldDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub schema: Option<FieldSchema>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FieldSchema {
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// HTTP client for the tracker's release and search endpoints.
pub struct TrackerClient {
    client: reqwest::Client,
    api_root: String,
    username: Option<String>,
    secret: Option<String>,
    page_size: u32,
}

impl TrackerClient {
    pub fn new(config: TrackerConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        Ok(Self {
            client,
            api_root: format!(
                "{}/rest/api/{}",
                config.base_url.trim_end_matches('/'),
                config.api_version
            ),
            username: config.username,
            secret: config.secret,
            page_size: config.page_size.max(1),
        })
    }

    /// All versions of a project.
    pub async fn project_versions(&self, project_key: &str) -> Result<Vec<Value>, SyncError> {
        let url = format!("{}/project/{}/versions", self.api_root, project_key);
        info!(project = project_key, "fetching project versions");
        let versions: Vec<Value> = self.get_json(&url, &[]).await?;
        info!(project = project_key, count = versions.len(), "fetched versions");
        Ok(versions)
    }

    /// Versions of a project released inside `range`.
    pub async fn released_versions(
        &self,
        project_key: &str,
        range: &DateRange,
    ) -> Result<Vec<ReleaseWindow>, SyncError> {
        let versions = self.project_versions(project_key).await?;
        let selected = select_releases(project_key, &versions, range);
        info!(
            project = project_key,
            released = selected.len(),
            "selected releases in window"
        );
        Ok(selected)
    }

    /// Run a JQL search, following pagination until the result set is exhausted.
    pub async fn search_issues(&self, jql: &str, fields: &[String]) -> Result<Vec<Value>, SyncError> {
        let url = format!("{}/search", self.api_root);
        let fields = fields.join(",");
        let page_size = self.page_size.to_string();
        let mut issues = Vec::new();
        let mut start_at: u64 = 0;

        loop {
            let start = start_at.to_string();
            let query = [
                ("jql", jql),
                ("fields", fields.as_str()),
                ("startAt", start.as_str()),
                ("maxResults", page_size.as_str()),
            ];
            let page: SearchPage = self.get_json(&url, &query).await?;
            let received = page.issues.len();
            debug!(jql, start_at, received, total = ?page.total, "search page");
            issues.extend(page.issues);

            // The server may cap maxResults below what was asked for.
            let effective = match page.max_results {
                0 => u64::from(self.page_size),
                n => n,
            };
            match next_start(start_at, received, effective, page.total) {
                Some(next) => start_at = next,
                None => break,
            }
        }

        info!(jql, count = issues.len(), "search complete");
        Ok(issues)
    }

    /// Most recent issues of a project with the `names` expansion, for field discovery.
    pub async fn sample_issues(&self, project_key: &str, max: u32) -> Result<SearchPage, SyncError> {
        let url = format!("{}/search", self.api_root);
        let jql = format!("project = {} ORDER BY created DESC", quote_jql(project_key));
        let max = max.to_string();
        let query = [
            ("jql", jql.as_str()),
            ("maxResults", max.as_str()),
            ("fields", "customfield_*,summary,issuetype"),
            ("expand", "names"),
        ];
        info!(project = project_key, "sampling issues for field discovery");
        self.get_json(&url, &query).await
    }

    /// Every field definition known to the instance.
    pub async fn fields(&self) -> Result<Vec<FieldDefinition>, SyncError> {
        let url = format!("{}/field", self.api_root);
        let fields: Vec<FieldDefinition> = self.get_json(&url, &[]).await?;
        info!(count = fields.len(), "fetched field definitions");
        Ok(fields)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SyncError> {
        let mut req = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query);
        if let Some(user) = &self.username {
            req = req.basic_auth(user, self.secret.as_ref());
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Offset of the next page, or `None` when the last page has been read.
///
/// Stops on an empty or short page, or once `total` is reached.
pub fn next_start(start_at: u64, received: usize, page_size: u64, total: Option<u64>) -> Option<u64> {
    if received == 0 || (received as u64) < page_size {
        return None;
    }
    let next = start_at + received as u64;
    match total {
        Some(total) if next >= total => None,
        _ => Some(next),
    }
}

/// Quote a value as a JQL string literal.
pub fn quote_jql(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// JQL selecting a project's issues fixed in one version.
pub fn fix_version_jql(project_key: &str, version_name: &str) -> String {
    format!(
        "project = {} AND fixVersion = {}",
        quote_jql(project_key),
        quote_jql(version_name)
    )
}
