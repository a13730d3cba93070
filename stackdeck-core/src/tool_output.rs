//! Parsing of the orchestration tool's machine-readable output.
//!
//! With `--json-output` the tool prints one JSON object per line; the payload
//! we want is the `raw` field of the last object that carries one.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::model::{ProjectDetail, ProjectStatus, ProjectSummary, ServiceInfo};

#[derive(Deserialize)]
struct Envelope<T> {
    raw: T,
}

/// Find the `raw` payload, scanning from the last line up.
fn raw_payload<T: DeserializeOwned>(output: &str) -> Result<T, serde_json::Error> {
    for line in output.lines().rev() {
        let line = line.trim();
        if !line.starts_with('{') {
            continue;
        }
        if let Ok(mut value) = serde_json::from_str::<serde_json::Value>(line) {
            if let Some(raw) = value.get_mut("raw") {
                return serde_json::from_value(raw.take());
            }
        }
    }
    // Nothing usable line by line; parse the whole text so the error says why.
    serde_json::from_str::<Envelope<T>>(output).map(|e| e.raw)
}

#[derive(Deserialize)]
struct ListEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default, rename = "type")]
    project_type: String,
    #[serde(default)]
    primary_url: String,
    #[serde(default)]
    httpsurl: String,
    #[serde(default)]
    approot: PathBuf,
}

pub fn parse_project_list(output: &str) -> Result<Vec<ProjectSummary>, serde_json::Error> {
    let entries: Option<Vec<ListEntry>> = raw_payload(output)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|e| ProjectSummary {
            name: e.name,
            status: ProjectStatus::parse(&e.status),
            project_type: e.project_type,
            url: if e.primary_url.is_empty() {
                e.httpsurl
            } else {
                e.primary_url
            },
            root: e.approot,
        })
        .collect())
}

#[derive(Deserialize, Default)]
struct DbInfo {
    #[serde(default)]
    published_port: Option<u16>,
}

#[derive(Deserialize)]
struct ServiceEntry {
    #[serde(default)]
    status: String,
}

#[derive(Deserialize)]
struct Describe {
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default, rename = "type")]
    project_type: String,
    #[serde(default)]
    php_version: String,
    #[serde(default)]
    webserver_type: String,
    #[serde(default)]
    nodejs_version: String,
    #[serde(default)]
    docroot: String,
    #[serde(default)]
    database_type: String,
    #[serde(default)]
    database_version: String,
    #[serde(default)]
    xdebug_enabled: bool,
    #[serde(default)]
    performance_mode: String,
    #[serde(default)]
    urls: Vec<String>,
    #[serde(default)]
    mailpit_https_url: String,
    #[serde(default)]
    mailpit_url: String,
    #[serde(default)]
    dbinfo: DbInfo,
    #[serde(default)]
    services: BTreeMap<String, ServiceEntry>,
}

/// Build a detail snapshot from `describe` output. Add-ons are filled in separately.
pub fn parse_describe(output: &str, root: &Path) -> Result<ProjectDetail, serde_json::Error> {
    let d: Describe = raw_payload(output)?;
    let mail_url = if d.mailpit_https_url.is_empty() {
        d.mailpit_url
    } else {
        d.mailpit_https_url
    };
    Ok(ProjectDetail {
        name: d.name,
        status: ProjectStatus::parse(&d.status),
        project_type: d.project_type,
        php_version: d.php_version,
        webserver_type: d.webserver_type,
        nodejs_version: d.nodejs_version,
        docroot: d.docroot,
        database_type: d.database_type,
        database_version: d.database_version,
        debug_enabled: d.xdebug_enabled,
        performance_mode: d.performance_mode,
        urls: d.urls,
        mail_url,
        db_published_port: d
            .dbinfo
            .published_port
            .map(|port| format!("127.0.0.1:{}", port))
            .unwrap_or_default(),
        addons: Vec::new(),
        services: d
            .services
            .into_iter()
            .map(|(name, svc)| ServiceInfo {
                name,
                status: svc.status,
            })
            .collect(),
        root: root.to_path_buf(),
    })
}

#[derive(Deserialize)]
struct AddonEntry {
    #[serde(alias = "Name")]
    name: String,
}

pub fn parse_addons(output: &str) -> Result<Vec<String>, serde_json::Error> {
    let entries: Option<Vec<AddonEntry>> = raw_payload(output)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|a| a.name)
        .collect())
}

/// Read the debugger state from the toggle command's own text.
///
/// The tool prints "enabled" or "disabled"; the substring check means any
/// output mentioning "enabled" counts as on.
pub fn debug_enabled(output: &str) -> bool {
    output.to_lowercase().contains("enabled")
}

/// The last non-empty line, trimmed. Used as the user-facing error of a failed run.
pub fn last_nonempty_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rev().find(|l| !l.is_empty())
}
