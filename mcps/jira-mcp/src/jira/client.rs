//! Jira client adapter
//!
//! Wraps `reqwest` with the workspace's authentication and the REST v2 path
//! layout. Construction never touches the network; the connection is proven
//! by [`JiraClient::test_connection`].

use std::time::Duration;

use reqwest::{multipart::Form, Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};
use url::Url;

use super::error::{ClientError, ClientResult, JiraError, JiraResult};
use super::types::{Project, ServerInfo, UserRef};
use super::views::{ConnectionInfo, IssueTypeView, ProjectSummary, ProjectView, UserSummary};
use crate::workspace::{AuthType, Credentials};

/// User agent sent with every request
pub fn user_agent() -> String {
    format!("jira-mcp/{}", env!("CARGO_PKG_VERSION"))
}

/// The JSON Jira expects wherever a user is referenced
///
/// Cloud addresses users by `accountId`, Server/Data Center by `name`.
pub fn user_field(auth_type: AuthType, user: &str) -> Value {
    match auth_type {
        AuthType::Cloud => json!({ "accountId": user }),
        AuthType::Pat => json!({ "name": user }),
    }
}

/// Authenticated REST client bound to one workspace
#[derive(Clone)]
pub struct JiraClient {
    http: Client,
    api_base: Url,
    site_url: String,
    workspace: String,
    identity: String,
    secret: String,
    auth_type: AuthType,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("workspace", &self.workspace)
            .field("site_url", &self.site_url)
            .field("auth_type", &self.auth_type)
            .finish_non_exhaustive()
    }
}

impl JiraClient {
    pub fn new(credentials: &Credentials, timeout: Duration) -> ClientResult<Self> {
        if credentials.auth_type == AuthType::Cloud && credentials.identity.is_empty() {
            return Err(ClientError::Config(format!(
                "workspace '{}' uses cloud auth but has no email",
                credentials.workspace
            )));
        }

        let api_base = Url::parse(&format!(
            "{}/rest/api/2/",
            credentials.site_url.trim_end_matches('/')
        ))
        .map_err(|e| ClientError::Config(format!("invalid site URL: {e}")))?;
        if api_base.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "invalid site URL: {}",
                credentials.site_url
            )));
        }

        let http = Client::builder()
            .user_agent(user_agent())
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base,
            site_url: credentials.site_url.trim_end_matches('/').to_string(),
            workspace: credentials.workspace.clone(),
            identity: credentials.identity.clone(),
            secret: credentials.api_token.clone(),
            auth_type: credentials.auth_type,
        })
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    pub fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    /// Assignee/reporter JSON for this workspace's deployment
    pub fn user_field(&self, user: &str) -> Value {
        user_field(self.auth_type, user)
    }

    // ------------------------------------------------------------------------
    // Client adapter operations
    // ------------------------------------------------------------------------

    /// Fetch server metadata to prove URL and credentials work
    pub async fn test_connection(&self) -> ClientResult<ConnectionInfo> {
        let info: ServerInfo = self
            .get(&["serverInfo"], &[])
            .await
            .map_err(|e| e.client("connect to Jira"))?;
        Ok(ConnectionInfo::from_server_info(info, &self.site_url))
    }

    /// Profile of the authenticated user
    pub async fn get_current_user(&self) -> ClientResult<UserSummary> {
        let user: UserRef = self
            .get(&["myself"], &[])
            .await
            .map_err(|e| e.client("get current user"))?;
        Ok(UserSummary::from(&user))
    }

    pub async fn search_users(&self, query: &str, limit: u32) -> ClientResult<Vec<UserSummary>> {
        let key = match self.auth_type {
            AuthType::Cloud => "query",
            AuthType::Pat => "username",
        };
        let users: Vec<UserRef> = self
            .get(
                &["user", "search"],
                &[(key, query.to_string()), ("maxResults", limit.to_string())],
            )
            .await
            .map_err(|e| e.client("search users"))?;
        Ok(users.iter().map(UserSummary::from).collect())
    }

    pub async fn get_projects(&self) -> ClientResult<Vec<ProjectSummary>> {
        let projects: Vec<Project> = self
            .get(&["project"], &[])
            .await
            .map_err(|e| e.client("get projects"))?;
        Ok(projects.iter().map(ProjectSummary::from).collect())
    }

    pub async fn get_project(&self, key: &str) -> ClientResult<ProjectView> {
        let project: Project = self
            .get(&["project", key], &[])
            .await
            .map_err(|e| e.client(format!("get project {key}")))?;
        Ok(ProjectView::from(&project))
    }

    pub async fn get_issue_types(&self, key: &str) -> ClientResult<Vec<IssueTypeView>> {
        let project: Project = self
            .get(&["project", key], &[])
            .await
            .map_err(|e| e.client(format!("get issue types for {key}")))?;
        Ok(project.issue_types.iter().map(IssueTypeView::from).collect())
    }

    // ------------------------------------------------------------------------
    // REST plumbing shared with the issue adapter
    // ------------------------------------------------------------------------

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.endpoint(segments))
            .header(reqwest::header::ACCEPT, "application/json");
        match self.auth_type {
            AuthType::Cloud => builder.basic_auth(&self.identity, Some(&self.secret)),
            AuthType::Pat => builder.bearer_auth(&self.secret),
        }
    }

    /// Send a request and return the body of a successful response
    async fn send(&self, builder: RequestBuilder) -> JiraResult<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "Jira response");

        if status.is_success() {
            Ok(body)
        } else {
            Err(JiraError::from_response(status, &body))
        }
    }

    #[instrument(skip(self, query), fields(workspace = %self.workspace))]
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> JiraResult<T> {
        let body = self
            .send(self.request(Method::GET, segments).query(query))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    #[instrument(skip(self, payload), fields(workspace = %self.workspace))]
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        payload: &B,
    ) -> JiraResult<T> {
        let body = self
            .send(self.request(Method::POST, segments).json(payload))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST where Jira answers with an empty body (201/204)
    #[instrument(skip(self, payload), fields(workspace = %self.workspace))]
    pub(crate) async fn post_empty<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        payload: &B,
    ) -> JiraResult<()> {
        self.send(self.request(Method::POST, segments).json(payload))
            .await
            .map(|_| ())
    }

    #[instrument(skip(self, payload), fields(workspace = %self.workspace))]
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        payload: &B,
    ) -> JiraResult<T> {
        let body = self
            .send(self.request(Method::PUT, segments).json(payload))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// PUT where Jira answers with an empty body (204)
    #[instrument(skip(self, payload), fields(workspace = %self.workspace))]
    pub(crate) async fn put_empty<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        payload: &B,
    ) -> JiraResult<()> {
        self.send(self.request(Method::PUT, segments).json(payload))
            .await
            .map(|_| ())
    }

    #[instrument(skip(self), fields(workspace = %self.workspace))]
    pub(crate) async fn delete(&self, segments: &[&str]) -> JiraResult<()> {
        self.send(self.request(Method::DELETE, segments))
            .await
            .map(|_| ())
    }

    /// Multipart upload; Jira rejects these without the XSRF opt-out header
    #[instrument(skip(self, form), fields(workspace = %self.workspace))]
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        form: Form,
    ) -> JiraResult<T> {
        let body = self
            .send(
                self.request(Method::POST, segments)
                    .header("X-Atlassian-Token", "no-check")
                    .multipart(form),
            )
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}
