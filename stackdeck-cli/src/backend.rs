//! Backend trait for the orchestration tool
//!
//! Everything the dashboard learns about projects comes from invoking the
//! tool as a subprocess. The trait is the seam between the task executor and
//! the real executable.

use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use stackdeck_core::config::{DashboardConfig, RouterProbe};
use stackdeck_core::model::{ProjectDetail, ProjectSummary};
use stackdeck_core::stream::{StreamHandle, StreamId, StreamKind};
use stackdeck_core::tool_output;

use crate::error::TaskError;
use crate::pipeline;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Human-readable name of the backing executable
    fn name(&self) -> &str;

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, TaskError>;

    /// Describe one project. Fails before spawning anything if `root` is gone.
    async fn describe(&self, root: &Path) -> Result<ProjectDetail, TaskError>;

    /// Aggregate router health tag, verbatim. Empty when it cannot be determined.
    async fn router_status(&self) -> String;

    /// Toggle the debugger and return whether it ended up enabled.
    async fn toggle_debug(&self, root: &Path) -> Result<bool, TaskError>;

    /// Launch a streamed subcommand.
    fn stream(
        &self,
        id: StreamId,
        kind: StreamKind,
        dir: Option<&Path>,
        args: &[String],
    ) -> Result<StreamHandle, TaskError>;

    /// Build a subcommand that will take over the terminal.
    fn command(&self, dir: Option<&Path>, args: &[String]) -> Command;
}

/// Invokes the orchestration executable found on `PATH`.
#[derive(Clone, Debug)]
pub struct ToolBackend {
    tool: String,
    no_tui_env: String,
    router: RouterProbe,
}

impl ToolBackend {
    pub fn new(tool: impl Into<String>, no_tui_env: impl Into<String>, router: RouterProbe) -> Self {
        Self {
            tool: tool.into(),
            no_tui_env: no_tui_env.into(),
            router,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(&config.tool, &config.no_tui_env, config.router.clone())
    }

    /// Run to completion. A failed exit uses the last stderr line as its message.
    async fn capture(&self, mut cmd: Command) -> Result<Output, TaskError> {
        let program = cmd.as_std().get_program().to_string_lossy().into_owned();
        let output = cmd
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|e| TaskError::spawn(&program, e))?;
        if output.status.success() {
            return Ok(output);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        match tool_output::last_nonempty_line(&stderr) {
            Some(line) => Err(TaskError::Failed(line.to_string())),
            None => Err(TaskError::ExitStatus {
                status: output.status,
            }),
        }
    }

    async fn installed_addons(&self, root: &Path) -> Result<Vec<String>, TaskError> {
        let args = ["add-on", "list", "--installed", "--json-output"].map(String::from);
        let output = self.capture(self.command(Some(root), &args)).await?;
        Ok(tool_output::parse_addons(&String::from_utf8_lossy(
            &output.stdout,
        ))?)
    }
}

#[async_trait]
impl Backend for ToolBackend {
    fn name(&self) -> &str {
        &self.tool
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>, TaskError> {
        let args = ["list", "--json-output"].map(String::from);
        let output = self.capture(self.command(None, &args)).await?;
        let projects = tool_output::parse_project_list(&String::from_utf8_lossy(&output.stdout))?;
        debug!(count = projects.len(), "listed projects");
        Ok(projects)
    }

    async fn describe(&self, root: &Path) -> Result<ProjectDetail, TaskError> {
        if !tokio::fs::try_exists(root).await? {
            return Err(TaskError::ProjectMissing {
                root: root.to_path_buf(),
            });
        }

        let args = ["describe", "--json-output"].map(String::from);
        let output = self.capture(self.command(Some(root), &args)).await?;
        let mut detail = tool_output::parse_describe(&String::from_utf8_lossy(&output.stdout), root)?;

        // Add-ons are decoration; a failure here must not hide the detail.
        match self.installed_addons(root).await {
            Ok(addons) => detail.addons = addons,
            Err(e) => warn!(root = %root.display(), error = %e, "failed to list add-ons"),
        }
        Ok(detail)
    }

    async fn router_status(&self) -> String {
        let mut cmd = Command::new(&self.router.program);
        cmd.args(&self.router.args);
        match self.capture(cmd).await {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim().to_string(),
            Err(e) => {
                debug!(error = %e, "router status unavailable");
                String::new()
            }
        }
    }

    async fn toggle_debug(&self, root: &Path) -> Result<bool, TaskError> {
        let args = ["xdebug", "toggle"].map(String::from);
        let output = self.capture(self.command(Some(root), &args)).await?;
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(tool_output::debug_enabled(&combined))
    }

    fn stream(
        &self,
        id: StreamId,
        kind: StreamKind,
        dir: Option<&Path>,
        args: &[String],
    ) -> Result<StreamHandle, TaskError> {
        pipeline::spawn_stream(id, kind, self.command(dir, args))
    }

    fn command(&self, dir: Option<&Path>, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.tool);
        cmd.args(args);
        cmd.env(&self.no_tui_env, "true");
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}
