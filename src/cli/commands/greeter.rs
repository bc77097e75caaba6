//! Greeter CLI commands.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::{Greeter, Page};
use crate::services::GreeterService;

#[derive(Debug, Serialize)]
pub struct GreeterOutput {
    pub id: i32,
    pub name: String,
    pub view_num: i32,
    pub status: i32,
    pub create_time: i64,
    pub create_datetime: String,
    pub update_datetime: String,
}

impl From<&Greeter> for GreeterOutput {
    fn from(g: &Greeter) -> Self {
        Self {
            id: g.id,
            name: g.name.clone(),
            view_num: g.view_num,
            status: g.status,
            create_time: g.create_time,
            create_datetime: g.create_datetime.clone(),
            update_datetime: g.update_datetime.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GreeterDetailOutput {
    pub greeter: Option<GreeterOutput>,
    pub id: i32,
}

impl CommandOutput for GreeterDetailOutput {
    fn to_human(&self) -> String {
        let Some(g) = &self.greeter else {
            return format!("Greeter {} not found.", self.id);
        };
        [
            format!("Greeter: {}", g.id),
            format!("Name: {}", g.name),
            format!("Status: {}", g.status),
            format!("Views: {}", g.view_num),
            format!("Created: {}", g.create_datetime),
            format!("Updated: {}", g.update_datetime),
        ]
        .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct GreeterListOutput {
    pub greeters: Vec<GreeterOutput>,
    pub total: u64,
    pub total_page: u64,
    pub cur_page: u32,
}

impl From<Page<Greeter>> for GreeterListOutput {
    fn from(page: Page<Greeter>) -> Self {
        Self {
            greeters: page.items.iter().map(GreeterOutput::from).collect(),
            total: page.total,
            total_page: page.total_page,
            cur_page: page.cur_page,
        }
    }
}

impl CommandOutput for GreeterListOutput {
    fn to_human(&self) -> String {
        if self.greeters.is_empty() {
            return format!("No greeters found (page {}/{}).", self.cur_page, self.total_page);
        }

        let mut lines = vec![format!(
            "Page {}/{} ({} greeter(s) in total):\n",
            self.cur_page, self.total_page, self.total
        )];
        lines.push(format!("{:<10} {:<24} {:<8} {:<8} {:<19}", "ID", "NAME", "STATUS", "VIEWS", "CREATED"));
        lines.push("-".repeat(73));

        for g in &self.greeters {
            lines.push(format!(
                "{:<10} {:<24} {:<8} {:<8} {:<19}",
                g.id,
                truncate(&g.name, 24),
                g.status,
                g.view_num,
                g.create_datetime,
            ));
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct GreeterActionOutput {
    pub success: bool,
    pub message: String,
    pub affected: Option<u64>,
    pub greeter: Option<GreeterOutput>,
}

impl CommandOutput for GreeterActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct GreeterCountOutput {
    pub status: i32,
    pub count: i64,
}

impl CommandOutput for GreeterCountOutput {
    fn to_human(&self) -> String {
        format!("{} greeter(s) with status {}", self.count, self.status)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn create(service: &GreeterService, name: String, status: i32, json_mode: bool) -> Result<()> {
    let created = service.create(Greeter::new(name).with_status(status)).await?;
    let out = GreeterActionOutput {
        success: true,
        message: format!("Greeter created: {}", created.id),
        affected: Some(1),
        greeter: Some(GreeterOutput::from(&created)),
    };
    output(&out, json_mode);
    Ok(())
}

pub async fn get(service: &GreeterService, id: i32, json_mode: bool) -> Result<()> {
    let found = service.get_by_id(id).await?;
    let out = GreeterDetailOutput {
        greeter: found.as_ref().map(GreeterOutput::from),
        id,
    };
    output(&out, json_mode);
    Ok(())
}

pub async fn list(
    service: &GreeterService,
    status: i32,
    last_id: i32,
    page_size: i32,
    page: i32,
    json_mode: bool,
) -> Result<()> {
    let page = service.get_list(status, last_id, page_size, page).await?;
    output(&GreeterListOutput::from(page), json_mode);
    Ok(())
}

pub async fn update_status(service: &GreeterService, id: i32, status: i32, json_mode: bool) -> Result<()> {
    let affected = service.update_status(id, status).await?;
    let out = GreeterActionOutput {
        success: true,
        message: format!("Greeter {id} status set to {status}"),
        affected: Some(affected),
        greeter: None,
    };
    output(&out, json_mode);
    Ok(())
}

pub async fn incr(service: &GreeterService, id: i32, delta: i32, column: &str, json_mode: bool) -> Result<()> {
    let affected = service.update_count(id, delta, column).await?;
    let out = GreeterActionOutput {
        success: true,
        message: format!("Greeter {id} {column} changed by {delta}"),
        affected: Some(affected),
        greeter: None,
    };
    output(&out, json_mode);
    Ok(())
}

pub async fn delete(service: &GreeterService, id: i32, json_mode: bool) -> Result<()> {
    let affected = service.delete_by_id(id).await?;
    let out = GreeterActionOutput {
        success: true,
        message: format!("Greeter {id} deleted"),
        affected: Some(affected),
        greeter: None,
    };
    output(&out, json_mode);
    Ok(())
}

pub async fn count(service: &GreeterService, status: i32, json_mode: bool) -> Result<()> {
    let count = service.repository().count_by_status(status).await?;
    output(&GreeterCountOutput { status, count }, json_mode);
    Ok(())
}
