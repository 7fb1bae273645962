//! GitHub REST/GraphQL client implementing the executor's capability
//! surface.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info};

use gavel_core::config::LockReason;
use gavel_core::ops::IssueOps;
use gavel_core::target::{IssueState, TargetRef};

const USER_AGENT: &str = concat!("gavel/", env!("CARGO_PKG_VERSION"));

const PIN_MUTATION: &str = "mutation ($input: PinIssueInput!) { \
     pinIssue(input: $input) { issue { id } } }";
const UNPIN_MUTATION: &str = "mutation ($input: UnpinIssueInput!) { \
     unpinIssue(input: $input) { issue { id } } }";

pub struct GitHubClient {
    client: Client,
    api_url: String,
    token: String,
    owner: String,
    repo: String,
}

#[derive(Debug, Serialize)]
struct CreateCommentRequest<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct CommentResponse {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct FileContentsResponse {
    content: String,
}

impl GitHubClient {
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
        })
    }

    fn issue_url(&self, target: &TargetRef, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}{}",
            self.api_url, self.owner, self.repo, target.number, suffix
        )
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
    }

    /// Send a request and fail with the response body on a non-success
    /// status.
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = self
            .authed(request)
            .send()
            .await
            .with_context(|| format!("Failed to send {what} request"))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .context("Failed to read error response body")?;
            error!("GitHub API error ({what}): {status} - {error_text}");
            return Err(anyhow!("GitHub API error ({what}): {status} - {error_text}"));
        }

        Ok(response)
    }

    async fn graphql(&self, query: &str, variables: serde_json::Value, what: &str) -> Result<()> {
        let url = format!("{}/graphql", self.api_url);
        let response = self
            .send(
                self.client
                    .post(&url)
                    .json(&json!({ "query": query, "variables": variables })),
                what,
            )
            .await?;

        // GraphQL failures come back as 200 with an errors array.
        let body: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse GraphQL response")?;
        if let Some(errors) = body.get("errors") {
            error!("GitHub GraphQL error ({what}): {errors}");
            return Err(anyhow!("GitHub GraphQL error ({what}): {errors}"));
        }

        Ok(())
    }

    fn label_url(&self, target: &TargetRef, label: &str) -> Result<Url> {
        let mut url = Url::parse(&self.issue_url(target, "/labels"))
            .context("Failed to parse labels URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("API base URL cannot carry path segments"))?
            .push(label);
        Ok(url)
    }

    /// Read a repository file, base64-decoded. Absence is `None`, never an
    /// error; any other failure propagates.
    pub async fn fetch_file_content(&self, path: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url, self.owner, self.repo, path
        );

        info!("Fetching \"{path}\" from {}/{}", self.owner, self.repo);

        let response = self
            .authed(self.client.get(&url))
            .send()
            .await
            .context("Failed to send file contents request")?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("File \"{path}\" not found");
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .context("Failed to read error response body")?;
            error!("GitHub API error fetching file: {status} - {error_text}");
            return Err(anyhow!(
                "GitHub API error fetching file: {status} - {error_text}"
            ));
        }

        let file: FileContentsResponse = response
            .json()
            .await
            .context("Failed to parse file contents response")?;

        let decoded = general_purpose::STANDARD
            .decode(file.content.replace('\n', ""))
            .context("Failed to decode base64 file content")?;
        let content = String::from_utf8(decoded).context("File content is not valid UTF-8")?;

        Ok(Some(content))
    }
}

#[async_trait]
impl IssueOps for GitHubClient {
    async fn create_comment(&self, target: &TargetRef, body: &str) -> Result<u64> {
        let url = self.issue_url(target, "/comments");
        let response = self
            .send(
                self.client.post(&url).json(&CreateCommentRequest { body }),
                "create comment",
            )
            .await?;

        let comment: CommentResponse = response
            .json()
            .await
            .context("Failed to parse comment response")?;
        info!("Created comment {}", comment.id);

        Ok(comment.id)
    }

    async fn add_reaction(&self, comment_id: u64, reaction: &str) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/issues/comments/{}/reactions",
            self.api_url, self.owner, self.repo, comment_id
        );
        self.send(
            self.client.post(&url).json(&json!({ "content": reaction })),
            "add reaction",
        )
        .await?;
        Ok(())
    }

    async fn set_state(&self, target: &TargetRef, state: IssueState) -> Result<()> {
        let url = self.issue_url(target, "");
        self.send(
            self.client
                .patch(&url)
                .json(&json!({ "state": state.as_str() })),
            "update state",
        )
        .await?;
        Ok(())
    }

    async fn lock(&self, target: &TargetRef, reason: Option<LockReason>) -> Result<()> {
        let url = self.issue_url(target, "/lock");
        let request = match reason {
            Some(reason) => self
                .client
                .put(&url)
                .json(&json!({ "lock_reason": reason.as_str() })),
            None => self.client.put(&url),
        };
        self.send(request, "lock").await?;
        Ok(())
    }

    async fn unlock(&self, target: &TargetRef) -> Result<()> {
        let url = self.issue_url(target, "/lock");
        self.send(self.client.delete(&url), "unlock").await?;
        Ok(())
    }

    async fn add_labels(&self, target: &TargetRef, labels: &[String]) -> Result<()> {
        let url = self.issue_url(target, "/labels");
        self.send(
            self.client.post(&url).json(&json!({ "labels": labels })),
            "add labels",
        )
        .await?;
        Ok(())
    }

    async fn remove_label(&self, target: &TargetRef, label: &str) -> Result<()> {
        let url = self.label_url(target, label)?;
        self.send(self.client.delete(url), "remove label").await?;
        Ok(())
    }

    async fn add_assignees(&self, target: &TargetRef, assignees: &[String]) -> Result<()> {
        let url = self.issue_url(target, "/assignees");
        self.send(
            self.client
                .post(&url)
                .json(&json!({ "assignees": assignees })),
            "add assignees",
        )
        .await?;
        Ok(())
    }

    async fn remove_assignees(&self, target: &TargetRef, assignees: &[String]) -> Result<()> {
        let url = self.issue_url(target, "/assignees");
        self.send(
            self.client
                .delete(&url)
                .json(&json!({ "assignees": assignees })),
            "remove assignees",
        )
        .await?;
        Ok(())
    }

    async fn pin(&self, target: &TargetRef) -> Result<()> {
        self.graphql(
            PIN_MUTATION,
            json!({ "input": { "issueId": target.node_id } }),
            "pin",
        )
        .await
    }

    async fn unpin(&self, target: &TargetRef) -> Result<()> {
        self.graphql(
            UNPIN_MUTATION,
            json!({ "input": { "issueId": target.node_id } }),
            "unpin",
        )
        .await
    }

    async fn dispatch_event(&self, event_type: &str, payload: serde_json::Value) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/dispatches",
            self.api_url, self.owner, self.repo
        );
        self.send(
            self.client.post(&url).json(&json!({
                "event_type": event_type,
                "client_payload": payload,
            })),
            "repository dispatch",
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gavel_core::target::TargetKind;

    fn client() -> GitHubClient {
        GitHubClient::new("https://api.github.com", "token", "octo", "repo").unwrap()
    }

    fn target() -> TargetRef {
        TargetRef {
            number: 7,
            node_id: "I_x".to_string(),
            kind: TargetKind::Issue,
            state: IssueState::Open,
            locked: false,
            active_lock_reason: None,
            labels: Vec::new(),
            assignees: Vec::new(),
            author_login: "a".to_string(),
        }
    }

    #[test]
    fn test_issue_url_shape() {
        assert_eq!(
            client().issue_url(&target(), "/comments"),
            "https://api.github.com/repos/octo/repo/issues/7/comments"
        );
    }

    #[test]
    fn test_trailing_slash_in_api_url_is_trimmed() {
        let client = GitHubClient::new("https://api.github.com/", "t", "o", "r").unwrap();
        assert_eq!(
            client.issue_url(&target(), ""),
            "https://api.github.com/repos/o/r/issues/7"
        );
    }

    #[test]
    fn test_label_url_percent_encodes_the_name() {
        let url = client().label_url(&target(), "help wanted").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octo/repo/issues/7/labels/help%20wanted"
        );
    }
}
