//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

pub use commands::AppContext;
pub use types::{Cli, Commands};

use crate::services::ServiceError;

/// Run one parsed command against freshly built clients.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let context = AppContext::bootstrap(cli.config.as_deref()).await?;
    let result = context.dispatch(cli.command, cli.json).await;
    context.shutdown().await?;
    result
}

/// Print `err` in the selected format and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let code = err.downcast_ref::<ServiceError>().map(|e| e.code.code());
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "code": code,
            "error": err.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
