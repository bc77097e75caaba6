//! `cron` command: run a registered job by name.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::services::JobRegistry;

#[derive(Debug, Serialize)]
pub struct JobListOutput {
    pub jobs: Vec<String>,
}

impl CommandOutput for JobListOutput {
    fn to_human(&self) -> String {
        let mut lines = vec!["Available jobs:".to_string()];
        lines.extend(self.jobs.iter().map(|name| format!("  {name}")));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct JobRunOutput {
    pub success: bool,
    pub job: String,
}

impl CommandOutput for JobRunOutput {
    fn to_human(&self) -> String {
        format!("Job {} finished", self.job)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(jobs: &JobRegistry, job: Option<String>, json_mode: bool) -> Result<()> {
    let Some(job) = job else {
        let out = JobListOutput {
            jobs: jobs.names().into_iter().map(str::to_string).collect(),
        };
        output(&out, json_mode);
        return Ok(());
    };

    jobs.run(&job).await.context(format!("Job {job} failed"))?;
    output(&JobRunOutput { success: true, job }, json_mode);
    Ok(())
}
