use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use jobflow::app::{self, App};
use jobflow::cli::{Cli, Command};
use jobflow::config::JobflowConfig;
use jobflow::remote::{InMemoryBoard, RestClient};
use jobflow::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging(cli.verbose)?;

    if matches!(cli.command, Command::Demo) {
        app::demo().await?;
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => JobflowConfig::load_from(path)?,
        None => JobflowConfig::load()?,
    };

    // CLI flags override the configured identity.
    let mut identity = config.identity.clone();
    if let Some(user) = cli.user {
        identity.user_id = user;
    }
    if let Some(role) = cli.role {
        identity.role = Some(role);
    }
    debug!(user = %identity.user_id, role = identity.role_name(), offline = cli.offline, "starting");

    if cli.offline {
        let board = Arc::new(InMemoryBoard::seeded());
        App::new(board, identity).run(cli.command).await?;
    } else {
        let client = RestClient::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.request_timeout(),
        )?
        .with_access_token(config.access_token.clone());
        App::new(Arc::new(client), identity).run(cli.command).await?;
    }
    Ok(())
}
