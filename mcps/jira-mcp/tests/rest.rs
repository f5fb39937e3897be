//! Issue operations against a local stand-in for the Jira REST API
//!
//! The stand-in answers canned JSON per (method, path) and records every
//! request it receives, so tests can check what the adapter sends.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use jira_mcp::jira::{IssueError, IssueOperations, JiraClient};
use jira_mcp::workspace::Credentials;
use jira_mcp::AuthType;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    query: Option<String>,
    body: Value,
}

type Routes = Arc<dyn Fn(&str, &str) -> (u16, String) + Send + Sync>;
type Log = Arc<Mutex<Vec<Recorded>>>;

fn not_found() -> (u16, String) {
    (404, json!({ "errorMessages": ["Issue does not exist"] }).to_string())
}

async fn serve_fake(routes: Routes) -> (String, Log) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let accept_log = log.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let routes = routes.clone();
            let log = accept_log.clone();
            tokio::spawn(async move {
                let _ = answer(stream, routes, log).await;
            });
        }
    });

    (format!("http://{addr}"), log)
}

async fn answer(mut stream: TcpStream, routes: Routes, log: Log) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();
    let length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let end = buf.len().min(head_end + length);
    let body = serde_json::from_slice(&buf[head_end..end]).unwrap_or(Value::Null);

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (target.clone(), None),
    };
    let (status, payload) = routes(&method, &path);
    log.lock().unwrap().push(Recorded {
        method,
        path,
        query,
        body,
    });

    let response = if status == 204 {
        "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string()
    } else {
        let reason = match status {
            200 => "OK",
            201 => "Created",
            404 => "Not Found",
            _ => "Error",
        };
        format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
            payload.len()
        )
    };
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn operations(site_url: &str, auth_type: AuthType) -> IssueOperations {
    let credentials = Credentials {
        workspace: "acme".into(),
        site_url: site_url.into(),
        identity: "me@acme.com".into(),
        api_token: "tokentokentoken".into(),
        auth_type,
    };
    let client = JiraClient::new(&credentials, Duration::from_secs(5)).unwrap();
    IssueOperations::new(client, "Sub-task")
}

fn issue(key: &str, status: &str) -> String {
    json!({
        "id": "10002",
        "key": key,
        "fields": {
            "summary": "Checkout fails",
            "status": { "name": status },
            "issuetype": { "name": "Bug" },
            "project": { "key": "ED" }
        }
    })
    .to_string()
}

fn recorded(log: &Log) -> Vec<Recorded> {
    log.lock().unwrap().clone()
}

#[tokio::test]
async fn test_transition_posts_id_and_comment_then_refetches() {
    let routes: Routes = Arc::new(|method, path| match (method, path) {
        ("GET", "/rest/api/2/issue/ED-1/transitions") => (
            200,
            json!({ "transitions": [
                { "id": "11", "name": "To Do" },
                { "id": "21", "name": "In Progress" }
            ] })
            .to_string(),
        ),
        ("POST", "/rest/api/2/issue/ED-1/transitions") => (204, String::new()),
        ("GET", "/rest/api/2/issue/ED-1") => (200, issue("ED-1", "In Progress")),
        _ => not_found(),
    });
    let (site, log) = serve_fake(routes).await;

    let view = operations(&site, AuthType::Pat)
        .transition_issue("ED-1", "in progress", Some("Starting now"))
        .await
        .unwrap();
    assert_eq!(view.status, "In Progress");

    let requests = recorded(&log);
    let calls: Vec<(&str, &str)> = requests
        .iter()
        .map(|r| (r.method.as_str(), r.path.as_str()))
        .collect();
    assert_eq!(
        calls,
        [
            ("GET", "/rest/api/2/issue/ED-1/transitions"),
            ("POST", "/rest/api/2/issue/ED-1/transitions"),
            ("GET", "/rest/api/2/issue/ED-1"),
        ]
    );
    assert_eq!(
        requests[1].body,
        json!({
            "transition": { "id": "21" },
            "update": { "comment": [{ "add": { "body": "Starting now" } }] }
        })
    );
}

#[tokio::test]
async fn test_unknown_transition_sends_nothing() {
    let routes: Routes = Arc::new(|method, path| match (method, path) {
        ("GET", "/rest/api/2/issue/ED-1/transitions") => (
            200,
            json!({ "transitions": [{ "id": "31", "name": "Done" }] }).to_string(),
        ),
        _ => not_found(),
    });
    let (site, log) = serve_fake(routes).await;

    let err = operations(&site, AuthType::Pat)
        .transition_issue("ED-1", "bogus", None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Available: Done"));
    assert_eq!(recorded(&log).len(), 1);
}

#[tokio::test]
async fn test_search_endpoint_follows_deployment() {
    let routes: Routes = Arc::new(|method, path| match (method, path) {
        ("POST", "/rest/api/2/search/jql") | ("POST", "/rest/api/2/search") => (
            200,
            format!(r#"{{"issues":[{}]}}"#, issue("ED-1", "To Do")),
        ),
        _ => not_found(),
    });
    let (site, log) = serve_fake(routes).await;

    let cloud = operations(&site, AuthType::Cloud)
        .search_issues("project = ED", 20, None)
        .await
        .unwrap();
    assert_eq!(cloud.len(), 1);
    assert_eq!(cloud[0].url, format!("{site}/browse/ED-1"));

    operations(&site, AuthType::Pat)
        .search_issues("project = ED", 5, Some(vec!["summary".into()]))
        .await
        .unwrap();

    let requests = recorded(&log);
    assert_eq!(requests[0].path, "/rest/api/2/search/jql");
    assert_eq!(requests[0].body["jql"], "project = ED");
    assert_eq!(requests[0].body["maxResults"], 20);
    assert_eq!(requests[0].body["fields"][0], "summary");
    assert_eq!(requests[1].path, "/rest/api/2/search");
    assert_eq!(requests[1].body["fields"], json!(["summary"]));
}

#[tokio::test]
async fn test_create_subtask_uses_parent_project() {
    let routes: Routes = Arc::new(|method, path| match (method, path) {
        ("GET", "/rest/api/2/issue/ED-1") => (200, issue("ED-1", "In Progress")),
        ("POST", "/rest/api/2/issue") => (201, json!({ "id": "10010", "key": "ED-7" }).to_string()),
        ("GET", "/rest/api/2/issue/ED-7") => (200, issue("ED-7", "To Do")),
        _ => not_found(),
    });
    let (site, log) = serve_fake(routes).await;

    let created = operations(&site, AuthType::Cloud)
        .create_subtask(jira_mcp::jira::NewSubtask {
            parent_key: "ED-1".into(),
            summary: "Write tests".into(),
            description: None,
            assignee: Some("5b10".into()),
        })
        .await
        .unwrap();
    assert_eq!(created.key, "ED-7");

    let requests = recorded(&log);
    assert_eq!(requests[0].query.as_deref(), Some("fields=project"));
    let fields = &requests[1].body["fields"];
    assert_eq!(fields["project"], json!({ "key": "ED" }));
    assert_eq!(fields["issuetype"], json!({ "name": "Sub-task" }));
    assert_eq!(fields["parent"], json!({ "key": "ED-1" }));
    assert_eq!(fields["assignee"], json!({ "accountId": "5b10" }));
    assert_eq!(requests[2].path, "/rest/api/2/issue/ED-7");
}

#[tokio::test]
async fn test_remote_error_text_is_kept() {
    let routes: Routes = Arc::new(|_, _| not_found());
    let (site, _log) = serve_fake(routes).await;

    let err = operations(&site, AuthType::Pat)
        .get_issue("ED-404")
        .await
        .unwrap_err();
    match err {
        IssueError::Remote { action, message } => {
            assert_eq!(action, "get issue ED-404");
            assert_eq!(message, "Issue does not exist");
        }
        other => panic!("unexpected error: {other}"),
    }
}
