//! Greeter CLI entry point.

use clap::Parser;

use greeter::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = greeter::cli::run(cli).await {
        greeter::cli::handle_error(err, json_mode);
    }
}
