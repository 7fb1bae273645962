use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, info, warn, Level};

use gavel_bot::event::CommentEvent;
use gavel_bot::github::GitHubClient;
use gavel_bot::settings::Settings;
use gavel_core::command::{tokenize, Command};
use gavel_core::config::ConfigDocument;
use gavel_core::executor::execute;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    if let Err(e) = run().await {
        error!("Invocation failed: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let settings = Settings::from_env()?;

    if settings.event_name != "issue_comment" {
        warn!(
            "Only issue_comment events are supported, got \"{}\"",
            settings.event_name
        );
        return Ok(());
    }

    let raw = fs::read_to_string(&settings.event_path).with_context(|| {
        format!(
            "Failed to read event payload from {}",
            settings.event_path.display()
        )
    })?;
    let event: CommentEvent =
        serde_json::from_str(&raw).context("Failed to parse event payload")?;

    let Some(invocation) = event.into_invocation() else {
        return Ok(());
    };

    let Some(command) = tokenize(&invocation.command_line) else {
        debug!("Command line is empty after tokenization");
        return Ok(());
    };
    info!("Command \"{}\" with args {:?}", command.name, command.args);

    let client = GitHubClient::new(
        &settings.api_url,
        &settings.token,
        &settings.owner,
        &settings.repo,
    )?;

    let content = match &settings.config_file {
        Some(path) => client.fetch_file_content(path).await?,
        None => None,
    };
    let document = ConfigDocument::from_fetched(content.as_deref())?;

    let actions = document.resolve(invocation.target.kind, &command.name);
    if actions.is_empty() {
        info!("No actions configured for \"{}\"", command.name);
    }

    execute(&client, &actions, &command, &invocation.target).await?;

    if let Some(output_path) = &settings.output_path {
        write_outputs(output_path, &command)?;
    }

    Ok(())
}

/// Expose the resolved command and its joined arguments as step outputs.
fn write_outputs(path: &Path, command: &Command) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open output file {}", path.display()))?;

    writeln!(file, "command={}", command.name)?;
    writeln!(file, "args={}", command.joined_args())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_outputs_appends_command_and_args() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");

        let command = tokenize("label bug triage").unwrap();
        write_outputs(&path, &command).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "command=label\nargs=bug triage\n");
    }
}
