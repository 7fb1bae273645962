use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "https://api.github.com";

/// Invocation settings, read once from the environment.
#[derive(Clone)]
pub struct Settings {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub event_name: String,
    pub event_path: PathBuf,
    /// Repo-relative path of the command configuration file; unset means the
    /// empty document.
    pub config_file: Option<String>,
    pub api_url: String,
    /// Step output file; outputs are skipped when unset.
    pub output_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let token = action_input("github_token")
            .or_else(|| non_empty(env::var("GITHUB_TOKEN").ok()))
            .context("GITHUB_TOKEN (or the github_token input) is required")?;

        let repository = env::var("GITHUB_REPOSITORY")
            .context("GITHUB_REPOSITORY environment variable is required")?;
        let (owner, repo) = parse_repository(&repository)?;

        let event_name = env::var("GITHUB_EVENT_NAME")
            .context("GITHUB_EVENT_NAME environment variable is required")?;

        let event_path = env::var("GITHUB_EVENT_PATH")
            .map(PathBuf::from)
            .context("GITHUB_EVENT_PATH environment variable is required")?;

        let config_file =
            action_input("config_file").or_else(|| non_empty(env::var("CONFIG_FILE").ok()));

        let api_url = non_empty(env::var("GITHUB_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let output_path = env::var("GITHUB_OUTPUT").ok().map(PathBuf::from);

        Ok(Settings {
            token,
            owner,
            repo,
            event_name,
            event_path,
            config_file,
            api_url,
            output_path,
        })
    }
}

/// Read an action input from its `INPUT_*` environment variable, treating
/// empty and whitespace-only values as unset.
fn action_input(name: &str) -> Option<String> {
    let key = format!("INPUT_{}", name.to_uppercase());
    non_empty(env::var(key).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Split an `owner/repo` slug into its parts.
fn parse_repository(value: &str) -> Result<(String, String)> {
    let Some((owner, repo)) = value.split_once('/') else {
        bail!("GITHUB_REPOSITORY must be of the form owner/repo, got \"{value}\"");
    };

    if owner.is_empty() || repo.is_empty() {
        bail!("GITHUB_REPOSITORY must be of the form owner/repo, got \"{value}\"");
    }

    Ok((owner.to_string(), repo.to_string()))
}
