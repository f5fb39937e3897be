//! Markdown-ish text rendering for tool replies

use std::fmt::Write;

use crate::jira::{
    AttachmentView, CommentView, ConnectionInfo, IssueTypeView, IssueView, LinkDirection,
    LinkView, ProjectSummary, ProjectView, Transition, UserSummary,
};
use crate::workspace::{AuthType, WorkspaceRecord, WorkspaceSummary};

pub(crate) const ADD_WORKSPACE_EXAMPLE: &str = "jira_workspace(operation=\"add_workspace\", workspace_name=\"mycompany\", site_url=\"mycompany.atlassian.net\", email=\"your.email@company.com\", api_token=\"YOUR_API_TOKEN\")";

fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("N/A")
}

fn identity_label(auth_type: AuthType) -> &'static str {
    match auth_type {
        AuthType::Cloud => "Email",
        AuthType::Pat => "Username",
    }
}

pub(crate) fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

// ============================================================================
// Workspaces and users
// ============================================================================

pub(crate) fn no_workspaces() -> String {
    format!(
        "ℹ️ **No Workspaces Configured**\n\nAdd a workspace to get started:\n```\n{ADD_WORKSPACE_EXAMPLE}\n```"
    )
}

pub(crate) fn workspace_list(workspaces: &[WorkspaceSummary]) -> String {
    let mut out = String::from("📋 **Configured Jira Workspaces**\n\n");
    for ws in workspaces {
        let icon = if ws.active { "✓" } else { "○" };
        let label = if ws.active { " (ACTIVE)" } else { "" };
        let _ = writeln!(out, "{icon} **{}**{label}", ws.name);
        let _ = writeln!(out, "  └─ Site: {}", ws.site_url);
        let _ = writeln!(
            out,
            "  └─ {}: {}",
            identity_label(ws.auth_type),
            or_na(Some(ws.identity.as_str()))
        );
        let _ = writeln!(out, "  └─ Auth: {}", ws.auth_type);
        let _ = writeln!(out, "  └─ Created: {}", ws.created.to_rfc3339());
        if let Some(validated) = ws.last_validated {
            let _ = writeln!(out, "  └─ Last validated: {}", validated.to_rfc3339());
        }
        out.push('\n');
    }
    let _ = write!(out, "**Total workspaces**: {}", workspaces.len());
    out
}

pub(crate) fn active_workspace(record: &WorkspaceRecord) -> String {
    let mut out = format!("✓ **Active Workspace**: {}\n\n", record.name);
    let _ = writeln!(out, "**Site URL**: {}", record.site_url);
    let _ = writeln!(
        out,
        "**{}**: {}",
        identity_label(record.auth_type),
        or_na(Some(record.identity.as_str()))
    );
    let _ = writeln!(out, "**Auth Type**: {}", record.auth_type);
    let _ = write!(out, "**Created**: {}", record.created.to_rfc3339());
    if let Some(validated) = record.last_validated {
        let _ = write!(out, "\n**Last Validated**: {}", validated.to_rfc3339());
    }
    out
}

pub(crate) fn user(title: &str, user: &UserSummary) -> String {
    format!(
        "👤 **{title}**\n\n**Name**: {}\n**Email**: {}\n**Account ID**: {}\n**Status**: {}",
        user.display_name,
        or_na(user.email.as_deref()),
        user.account_id,
        if user.active { "Active" } else { "Inactive" }
    )
}

pub(crate) fn user_list(query: &str, users: &[UserSummary]) -> String {
    if users.is_empty() {
        return format!("ℹ️ **No users found** matching '{query}'");
    }
    let mut out = format!("👥 **User Search Results** (query: '{query}')\n\n");
    for user in users {
        let icon = if user.active { "✓" } else { "○" };
        let _ = writeln!(out, "{icon} **{}**", user.display_name);
        let _ = writeln!(out, "  └─ Email: {}", or_na(user.email.as_deref()));
        let _ = writeln!(out, "  └─ Account ID: {}\n", user.account_id);
    }
    let _ = write!(out, "**Total results**: {}", users.len());
    out
}

pub(crate) fn connection(info: &ConnectionInfo) -> String {
    format!(
        "**Jira Server**: {}\n**Jira Version**: {}\n**Base URL**: {}",
        info.server_title, info.version, info.base_url
    )
}

// ============================================================================
// Projects
// ============================================================================

pub(crate) fn project_list(projects: &[ProjectSummary]) -> String {
    if projects.is_empty() {
        return "ℹ️ **No projects found**".to_string();
    }
    let mut out = String::from("📁 **Jira Projects**\n\n");
    for project in projects {
        let _ = writeln!(
            out,
            "• **{}** - {} (id: {}, type: {})",
            project.key,
            project.name,
            project.id,
            or_na(project.project_type.as_deref())
        );
    }
    let _ = write!(out, "\n**Total projects**: {}", projects.len());
    out
}

pub(crate) fn issue_types(project_key: &str, types: &[IssueTypeView]) -> String {
    if types.is_empty() {
        return format!("ℹ️ **No issue types found** for project {project_key}");
    }
    let mut out = format!("🏷️ **Issue Types for {project_key}**\n\n");
    for kind in types {
        let subtask = if kind.subtask { " (subtask)" } else { "" };
        let _ = writeln!(out, "• **{}**{subtask} (id: {})", kind.name, kind.id);
        if let Some(description) = &kind.description {
            let _ = writeln!(out, "  └─ {description}");
        }
    }
    out.truncate(out.trim_end().len());
    out
}

pub(crate) fn project_detail(project: &ProjectView) -> String {
    let summary = &project.summary;
    let mut out = format!("📁 **{}** - {}\n\n", summary.key, summary.name);
    let _ = writeln!(out, "**ID**: {}", summary.id);
    let _ = writeln!(out, "**Type**: {}", or_na(summary.project_type.as_deref()));
    let _ = writeln!(out, "**Lead**: {}", or_na(project.lead.as_deref()));
    if let Some(description) = &project.description {
        let _ = writeln!(out, "**Description**: {description}");
    }
    out.push('\n');
    out.push_str(&issue_types(&summary.key, &project.issue_types));
    out
}

// ============================================================================
// Issues
// ============================================================================

fn issue_line(out: &mut String, issue: &IssueView) {
    let _ = writeln!(out, "• **{}**: {}", issue.key, issue.summary);
    let _ = writeln!(
        out,
        "  └─ Status: {} | Type: {} | Assignee: {}",
        issue.status,
        or_na(Some(issue.issue_type.as_str())),
        issue.assignee.as_deref().unwrap_or("Unassigned")
    );
}

pub(crate) fn issue_list(jql: &str, issues: &[IssueView]) -> String {
    if issues.is_empty() {
        return format!("ℹ️ **No issues found** for JQL: `{jql}`");
    }
    let mut out = format!("🔍 **Search Results** (JQL: `{jql}`)\n\n");
    for issue in issues {
        issue_line(&mut out, issue);
    }
    let _ = write!(out, "\n**Total results**: {}", issues.len());
    out
}

pub(crate) fn issue_detail(title: &str, issue: &IssueView) -> String {
    let mut out = format!("{title}\n\n**{}**: {}\n", issue.key, issue.summary);
    let _ = writeln!(out, "**URL**: {}", issue.url);
    let _ = writeln!(out, "**Project**: {}", or_na(Some(issue.project.as_str())));
    let _ = writeln!(out, "**Type**: {}", issue.issue_type);
    let _ = writeln!(out, "**Status**: {}", issue.status);
    let _ = writeln!(out, "**Priority**: {}", or_na(issue.priority.as_deref()));
    let _ = writeln!(
        out,
        "**Assignee**: {}",
        issue.assignee.as_deref().unwrap_or("Unassigned")
    );
    let _ = writeln!(out, "**Reporter**: {}", or_na(issue.reporter.as_deref()));
    let _ = writeln!(out, "**Created**: {}", or_na(issue.created.as_deref()));
    let _ = writeln!(out, "**Updated**: {}", or_na(issue.updated.as_deref()));
    if !issue.labels.is_empty() {
        let _ = writeln!(out, "**Labels**: {}", issue.labels.join(", "));
    }
    if !issue.components.is_empty() {
        let _ = writeln!(out, "**Components**: {}", issue.components.join(", "));
    }
    if !issue.fix_versions.is_empty() {
        let _ = writeln!(out, "**Fix Versions**: {}", issue.fix_versions.join(", "));
    }
    if let Some(description) = &issue.description {
        let _ = write!(out, "\n**Description**:\n{description}");
    }
    out.truncate(out.trim_end().len());
    out
}

pub(crate) fn transitions(key: &str, transitions: &[Transition]) -> String {
    if transitions.is_empty() {
        return format!("ℹ️ **No transitions available** for {key}");
    }
    let mut out = format!("🔀 **Available Transitions for {key}**\n\n");
    for transition in transitions {
        let target = transition
            .to
            .as_ref()
            .map(|to| format!(" → {}", to.name))
            .unwrap_or_default();
        let _ = writeln!(out, "• **{}** (id: {}){target}", transition.name, transition.id);
    }
    out.truncate(out.trim_end().len());
    out
}

fn comment_block(out: &mut String, comment: &CommentView) {
    let _ = writeln!(
        out,
        "💬 **{}** ({}) [id: {}]",
        comment.author,
        or_na(comment.created.as_deref()),
        comment.id
    );
    if comment.updated.is_some() && comment.updated != comment.created {
        let _ = writeln!(out, "  (edited {})", or_na(comment.updated.as_deref()));
    }
    let _ = writeln!(out, "{}\n", comment.body);
}

pub(crate) fn comments(key: &str, comments: &[CommentView]) -> String {
    if comments.is_empty() {
        return format!("ℹ️ **No comments** on {key}");
    }
    let mut out = format!("💬 **Comments on {key}** ({})\n\n", comments.len());
    for comment in comments {
        comment_block(&mut out, comment);
    }
    out.truncate(out.trim_end().len());
    out
}

pub(crate) fn comment(title: &str, comment: &CommentView) -> String {
    let mut out = format!("{title}\n\n");
    comment_block(&mut out, comment);
    out.truncate(out.trim_end().len());
    out
}

pub(crate) fn attachments(key: &str, attachments: &[AttachmentView]) -> String {
    if attachments.is_empty() {
        return format!("ℹ️ **No attachments** on {key}");
    }
    let mut out = format!("📎 **Attachments on {key}** ({})\n\n", attachments.len());
    for attachment in attachments {
        let _ = writeln!(
            out,
            "• **{}** (id: {}, {}, {})",
            attachment.filename,
            attachment.id,
            human_size(attachment.size),
            attachment.mime_type
        );
        let _ = writeln!(
            out,
            "  └─ Added by {} on {}",
            attachment.author,
            or_na(attachment.created.as_deref())
        );
        if let Some(url) = &attachment.content_url {
            let _ = writeln!(out, "  └─ {url}");
        }
    }
    out.truncate(out.trim_end().len());
    out
}

pub(crate) fn links(key: &str, links: &[LinkView]) -> String {
    if links.is_empty() {
        return format!("ℹ️ **No links** on {key}");
    }
    let mut out = format!("🔗 **Links on {key}** ({})\n\n", links.len());
    for link in links {
        let arrow = match link.direction {
            LinkDirection::Inward => "←",
            LinkDirection::Outward => "→",
        };
        let _ = writeln!(
            out,
            "{arrow} {} **{}**: {} [{} link, id: {}]",
            link.relation, link.related_issue_key, link.related_summary, link.link_type, link.id
        );
    }
    out.truncate(out.trim_end().len());
    out
}

pub(crate) fn subtasks(parent: &str, subtasks: &[IssueView]) -> String {
    if subtasks.is_empty() {
        return format!("ℹ️ **No subtasks** under {parent}");
    }
    let mut out = format!("🧩 **Subtasks of {parent}** ({})\n\n", subtasks.len());
    for subtask in subtasks {
        issue_line(&mut out, subtask);
    }
    out.truncate(out.trim_end().len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_workspace_list_marks_active() {
        let now = Utc::now();
        let text = workspace_list(&[
            WorkspaceSummary {
                name: "acme".into(),
                site_url: "https://acme.atlassian.net".into(),
                identity: "me@acme.com".into(),
                auth_type: AuthType::Cloud,
                active: true,
                created: now,
                last_validated: None,
            },
            WorkspaceSummary {
                name: "internal".into(),
                site_url: "https://jira.internal".into(),
                identity: String::new(),
                auth_type: AuthType::Pat,
                active: false,
                created: now,
                last_validated: Some(now),
            },
        ]);
        assert!(text.contains("✓ **acme** (ACTIVE)"));
        assert!(text.contains("○ **internal**"));
        assert!(text.contains("Username: N/A"));
        assert!(text.contains("Last validated"));
        assert!(text.ends_with("**Total workspaces**: 2"));
    }

    #[test]
    fn test_transitions_show_targets() {
        let transitions: Vec<Transition> = serde_json::from_value(serde_json::json!([
            { "id": "21", "name": "Start", "to": { "name": "In Progress" } }
        ]))
        .unwrap();
        let text = super::transitions("ED-1", &transitions);
        assert!(text.contains("**Start** (id: 21) → In Progress"));
    }
}
