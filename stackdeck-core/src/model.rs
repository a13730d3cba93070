use std::cmp::Ordering;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProjectStatus {
    Running,
    Stopped,
    Paused,
    #[default]
    Unknown,
}

impl ProjectStatus {
    /// Parse the status tag reported by the orchestration tool.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "running" => Self::Running,
            "stopped" => Self::Stopped,
            "paused" => Self::Paused,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Paused => "paused",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the project list. Replaced wholesale on every refresh.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectSummary {
    pub name: String,
    pub status: ProjectStatus,
    pub project_type: String,
    pub url: String,
    pub root: PathBuf,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceInfo {
    pub name: String,
    pub status: String,
}

/// Full description of a single project, loaded on entering the detail view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectDetail {
    pub name: String,
    pub status: ProjectStatus,
    pub project_type: String,
    pub php_version: String,
    pub webserver_type: String,
    pub nodejs_version: String,
    pub docroot: String,
    pub database_type: String,
    pub database_version: String,
    pub debug_enabled: bool,
    pub performance_mode: String,
    pub urls: Vec<String>,
    /// Mail catcher URL, empty when the project has none.
    pub mail_url: String,
    /// Host-side database address, e.g. `127.0.0.1:32768`.
    pub db_published_port: String,
    pub addons: Vec<String>,
    pub services: Vec<ServiceInfo>,
    pub root: PathBuf,
}

impl ProjectDetail {
    pub fn primary_url(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }

    /// Rows the detail view draws for this snapshot, before wrapping.
    pub fn line_count(&self) -> u16 {
        // Leading blank, four grid rows, trailing blank.
        let mut rows = 6;
        if !self.urls.is_empty() {
            rows += self.urls.len() + 2;
        }
        rows += usize::from(!self.mail_url.is_empty());
        rows += usize::from(!self.db_published_port.is_empty());
        rows += usize::from(!self.addons.is_empty());
        if !self.services.is_empty() {
            rows += 3;
        }
        u16::try_from(rows).unwrap_or(u16::MAX)
    }

    /// `type:version` for the database, or just the type when the version is unknown.
    pub fn database_label(&self) -> String {
        if self.database_version.is_empty() {
            self.database_type.clone()
        } else {
            format!("{}:{}", self.database_type, self.database_version)
        }
    }
}

fn service_rank(name: &str) -> u8 {
    match name {
        "web" => 0,
        "db" => 1,
        _ => 2,
    }
}

/// Services sorted web first, db second, the rest alphabetically.
pub fn sort_services(services: &[ServiceInfo]) -> Vec<ServiceInfo> {
    let mut sorted = services.to_vec();
    sorted.sort_by(|a, b| match service_rank(&a.name).cmp(&service_rank(&b.name)) {
        Ordering::Equal => a.name.cmp(&b.name),
        other => other,
    });
    sorted
}
