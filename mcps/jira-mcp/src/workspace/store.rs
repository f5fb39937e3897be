//! File-backed workspace store
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/workspaces/<name>.json   one record per workspace, mode 0600
//! <root>/active_workspace         name of the active workspace
//! ```
//!
//! Records are read once by [`WorkspaceStore::load`]; later edits made by
//! other processes are not observed until the next load. Every write goes
//! through a temp file and a rename, but a record write and the pointer
//! update that follows it are still two separate steps.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::error::{WorkspaceError, WorkspaceResult};
use super::types::{
    normalize_site_url, validate_workspace_name, AuthType, Credentials, NewWorkspace,
    RemoveOutcome, SwitchOutcome, WorkspaceRecord, WorkspaceSummary, MIN_SECRET_LEN,
};

const WORKSPACES_DIR: &str = "workspaces";
const ACTIVE_FILE: &str = "active_workspace";

/// Named Jira credential profiles plus the active-workspace pointer
#[derive(Debug)]
pub struct WorkspaceStore {
    root: PathBuf,
    /// Keyed by name; iteration order is lexicographic
    records: BTreeMap<String, WorkspaceRecord>,
    active: Option<String>,
}

impl WorkspaceStore {
    /// Load every record and the active pointer from `root`
    ///
    /// Creates the directory layout if missing. Unreadable record files are
    /// logged and skipped; a pointer naming an unknown workspace is ignored.
    pub fn load(root: impl Into<PathBuf>) -> WorkspaceResult<Self> {
        let root = root.into();
        let dir = root.join(WORKSPACES_DIR);
        fs::create_dir_all(&dir).map_err(|e| WorkspaceError::io(&dir, e))?;

        let mut records = BTreeMap::new();
        let entries = fs::read_dir(&dir).map_err(|e| WorkspaceError::io(&dir, e))?;
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    error!("Failed to read entry in {}: {e}", dir.display());
                    continue;
                }
            };
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(str::to_owned) else {
                continue;
            };

            match read_record(&path) {
                Ok(mut record) => {
                    if record.name != stem {
                        warn!(
                            "Record {} names workspace '{}', using file name '{stem}'",
                            path.display(),
                            record.name
                        );
                        record.name = stem.clone();
                    }
                    debug!("Loaded workspace: {stem}");
                    records.insert(stem, record);
                }
                Err(e) => error!("Failed to load workspace from {}: {e}", path.display()),
            }
        }

        let active = read_pointer(&root.join(ACTIVE_FILE)).and_then(|name| {
            if records.contains_key(&name) {
                info!("Active workspace: {name}");
                Some(name)
            } else {
                warn!("Active workspace '{name}' not found in registry");
                None
            }
        });

        Ok(Self {
            root,
            records,
            active,
        })
    }

    /// Path of the record file for `name`
    pub fn record_path(&self, name: &str) -> PathBuf {
        self.root.join(WORKSPACES_DIR).join(format!("{name}.json"))
    }

    fn pointer_path(&self) -> PathBuf {
        self.root.join(ACTIVE_FILE)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Register a new workspace
    ///
    /// The first workspace ever stored becomes active; later additions leave
    /// the pointer alone.
    pub fn add_workspace(&mut self, new: NewWorkspace) -> WorkspaceResult<WorkspaceSummary> {
        validate_workspace_name(&new.name)?;
        if self.records.contains_key(&new.name) {
            return Err(WorkspaceError::Validation(format!(
                "Workspace '{}' already exists. Use a different name or remove the existing workspace first.",
                new.name
            )));
        }

        let site_url = normalize_site_url(&new.site_url)?;
        let identity = new.identity.trim().to_string();
        if new.auth_type == AuthType::Cloud {
            if identity.is_empty() {
                return Err(WorkspaceError::Validation(
                    "Email is required for cloud authentication".to_string(),
                ));
            }
            if !identity.contains('@') {
                return Err(WorkspaceError::Validation(format!(
                    "Invalid email address: {identity}"
                )));
            }
            if !site_url.contains(".atlassian.net") {
                warn!("Site URL doesn't contain .atlassian.net: {site_url}");
            }
        }
        if new.api_token.len() < MIN_SECRET_LEN {
            return Err(WorkspaceError::Validation(
                "API token appears to be invalid (too short)".to_string(),
            ));
        }

        let record = WorkspaceRecord {
            name: new.name.clone(),
            site_url,
            identity,
            api_token: new.api_token,
            auth_type: new.auth_type,
            created: Utc::now(),
            last_validated: None,
        };
        self.insert_record(record)
    }

    /// Write a record with empty credentials for the user to fill in by hand
    ///
    /// Returns the path of the file to edit.
    pub fn create_workspace_skeleton(
        &mut self,
        name: &str,
        site_url: &str,
        auth_type: AuthType,
    ) -> WorkspaceResult<PathBuf> {
        validate_workspace_name(name)?;
        if self.records.contains_key(name) {
            return Err(WorkspaceError::Validation(format!(
                "Workspace '{name}' already exists"
            )));
        }

        let record = WorkspaceRecord {
            name: name.to_string(),
            site_url: normalize_site_url(site_url)?,
            identity: String::new(),
            api_token: String::new(),
            auth_type,
            created: Utc::now(),
            last_validated: None,
        };
        self.insert_record(record)?;
        Ok(self.record_path(name))
    }

    fn insert_record(&mut self, record: WorkspaceRecord) -> WorkspaceResult<WorkspaceSummary> {
        let name = record.name.clone();
        self.write_record(&record)?;
        info!("Workspace '{name}' added");

        let first = self.records.is_empty();
        self.records.insert(name.clone(), record);

        if first {
            self.set_active(&name)?;
            info!("'{name}' set as active workspace (first workspace)");
        }

        let record = &self.records[&name];
        Ok(WorkspaceSummary::from_record(record, self.is_active(&name)))
    }

    /// All workspaces, active first, then by name
    pub fn list_workspaces(&self) -> Vec<WorkspaceSummary> {
        let mut list: Vec<_> = self
            .records
            .values()
            .map(|r| WorkspaceSummary::from_record(r, self.is_active(&r.name)))
            .collect();
        list.sort_by(|a, b| b.active.cmp(&a.active).then_with(|| a.name.cmp(&b.name)));
        list
    }

    /// The active workspace, if the pointer resolves
    pub fn get_active_workspace(&self) -> Option<&WorkspaceRecord> {
        self.active.as_ref().and_then(|name| self.records.get(name))
    }

    pub fn get_workspace(&self, name: &str) -> Option<&WorkspaceRecord> {
        self.records.get(name)
    }

    /// Credentials for `name`, or for the active workspace when `None`
    pub fn get_credentials(&self, name: Option<&str>) -> WorkspaceResult<Credentials> {
        let name = match name.or(self.active.as_deref()) {
            Some(name) => name,
            None => {
                return Err(WorkspaceError::NotFound(
                    "No active workspace and no workspace specified".to_string(),
                ))
            }
        };

        let record = self
            .records
            .get(name)
            .ok_or_else(|| WorkspaceError::NotFound(format!("Workspace '{name}' not found")))?;

        if record.api_token.is_empty() {
            return Err(WorkspaceError::Validation(format!(
                "Workspace '{name}' has no API token yet - edit {}",
                self.record_path(name).display()
            )));
        }

        Ok(Credentials {
            workspace: record.name.clone(),
            site_url: record.site_url.clone(),
            identity: record.identity.clone(),
            api_token: record.api_token.clone(),
            auth_type: record.auth_type,
        })
    }

    /// Make `name` the active workspace
    ///
    /// Switching to the workspace that is already active touches nothing on disk.
    pub fn switch_workspace(&mut self, name: &str) -> WorkspaceResult<SwitchOutcome> {
        let Some(record) = self.records.get(name) else {
            let available = self.records.keys().cloned().collect::<Vec<_>>().join(", ");
            return Err(WorkspaceError::NotFound(format!(
                "Workspace '{name}' not found. Available workspaces: {available}"
            )));
        };
        let site_url = record.site_url.clone();

        if self.is_active(name) {
            return Ok(SwitchOutcome::AlreadyActive {
                name: name.to_string(),
                site_url,
            });
        }

        self.set_active(name)?;
        info!("Switched to workspace '{name}'");
        Ok(SwitchOutcome::Switched {
            name: name.to_string(),
            site_url,
        })
    }

    /// Delete a workspace
    ///
    /// Removing the active workspace clears the pointer and then activates
    /// the lexicographically first remaining workspace, if any.
    pub fn remove_workspace(&mut self, name: &str) -> WorkspaceResult<RemoveOutcome> {
        if !self.records.contains_key(name) {
            return Err(WorkspaceError::NotFound(format!("Workspace '{name}' not found")));
        }

        let path = self.record_path(name);
        match fs::remove_file(&path) {
            Ok(()) => info!("Removed workspace file: {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(WorkspaceError::io(path, e)),
        }
        self.records.remove(name);

        let mut activated = None;
        if self.is_active(name) {
            self.clear_active()?;
            info!("Cleared active workspace");

            if let Some(next) = self.records.keys().next().cloned() {
                self.set_active(&next)?;
                info!("Switched to workspace '{next}'");
                activated = Some(next);
            }
        }

        info!("Workspace '{name}' removed");
        Ok(RemoveOutcome {
            removed: name.to_string(),
            activated,
        })
    }

    /// Stamp `last_validated` on a record and persist it
    pub fn mark_validated(&mut self, name: &str) -> WorkspaceResult<()> {
        let record = self
            .records
            .get_mut(name)
            .ok_or_else(|| WorkspaceError::NotFound(format!("Workspace '{name}' not found")))?;
        record.last_validated = Some(Utc::now());
        let record = record.clone();
        self.write_record(&record)
    }

    fn is_active(&self, name: &str) -> bool {
        self.active.as_deref() == Some(name)
    }

    fn set_active(&mut self, name: &str) -> WorkspaceResult<()> {
        let path = self.pointer_path();
        write_atomic(&path, name.as_bytes())?;
        debug!("Active workspace saved to {}", path.display());
        self.active = Some(name.to_string());
        Ok(())
    }

    fn clear_active(&mut self) -> WorkspaceResult<()> {
        self.active = None;
        let path = self.pointer_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WorkspaceError::io(path, e)),
        }
    }

    fn write_record(&self, record: &WorkspaceRecord) -> WorkspaceResult<()> {
        let json = serde_json::to_vec_pretty(record)?;
        write_atomic(&self.record_path(&record.name), &json)
    }
}

fn read_record(path: &Path) -> anyhow::Result<WorkspaceRecord> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn read_pointer(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content.trim().to_string()).filter(|name| !name.is_empty()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            error!("Failed to load active workspace: {e}");
            None
        }
    }
}

/// Write to a sibling temp file, restrict it to the owner, then rename over `path`
fn write_atomic(path: &Path, contents: &[u8]) -> WorkspaceResult<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).map_err(|e| WorkspaceError::io(&tmp, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))
            .map_err(|e| WorkspaceError::io(&tmp, e))?;
    }

    fs::rename(&tmp, path).map_err(|e| WorkspaceError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn new_ws(name: &str) -> NewWorkspace {
        NewWorkspace {
            name: name.to_string(),
            site_url: format!("{name}.atlassian.net"),
            identity: "a@b.com".to_string(),
            api_token: "tokentokentoken".to_string(),
            auth_type: AuthType::Cloud,
        }
    }

    #[test]
    fn test_first_workspace_becomes_active() {
        let dir = tempdir().unwrap();
        let mut store = WorkspaceStore::load(dir.path()).unwrap();

        let added = store.add_workspace(new_ws("w1")).unwrap();
        assert!(added.active);
        assert_eq!(store.active_name(), Some("w1"));

        let second = store.add_workspace(new_ws("w2")).unwrap();
        assert!(!second.active);
        assert_eq!(store.active_name(), Some("w1"));
    }

    #[test]
    fn test_round_trip_normalizes_url() {
        let dir = tempdir().unwrap();
        let mut store = WorkspaceStore::load(dir.path()).unwrap();
        store
            .add_workspace(NewWorkspace {
                name: "w1".into(),
                site_url: "company.atlassian.net".into(),
                identity: "a@b.com".into(),
                api_token: "tokentokentoken".into(),
                auth_type: AuthType::Cloud,
            })
            .unwrap();

        let list = store.list_workspaces();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].site_url, "https://company.atlassian.net");
        assert!(list[0].active);

        // Survives a reload from disk
        let reloaded = WorkspaceStore::load(dir.path()).unwrap();
        let list = reloaded.list_workspaces();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].site_url, "https://company.atlassian.net");
        assert!(list[0].active);
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let dir = tempdir().unwrap();
        let mut store = WorkspaceStore::load(dir.path()).unwrap();

        let mut bad_name = new_ws("ok");
        bad_name.name = "-bad".into();
        assert!(matches!(
            store.add_workspace(bad_name),
            Err(WorkspaceError::Validation(_))
        ));

        let mut short_token = new_ws("ok");
        short_token.api_token = "short".into();
        assert!(matches!(
            store.add_workspace(short_token),
            Err(WorkspaceError::Validation(_))
        ));

        let mut no_email = new_ws("ok");
        no_email.identity = String::new();
        assert!(matches!(
            store.add_workspace(no_email),
            Err(WorkspaceError::Validation(_))
        ));

        let mut empty_url = new_ws("ok");
        empty_url.site_url = String::new();
        assert!(matches!(
            store.add_workspace(empty_url),
            Err(WorkspaceError::Validation(_))
        ));

        store.add_workspace(new_ws("ok")).unwrap();
        assert!(matches!(
            store.add_workspace(new_ws("ok")),
            Err(WorkspaceError::Validation(_))
        ));
    }

    #[test]
    fn test_pat_workspace_needs_no_email() {
        let dir = tempdir().unwrap();
        let mut store = WorkspaceStore::load(dir.path()).unwrap();
        let added = store
            .add_workspace(NewWorkspace {
                name: "onprem".into(),
                site_url: "https://jira.example.com".into(),
                identity: String::new(),
                api_token: "patpatpatpatpat".into(),
                auth_type: AuthType::Pat,
            })
            .unwrap();
        assert_eq!(added.auth_type, AuthType::Pat);

        let creds = store.get_credentials(None).unwrap();
        assert_eq!(creds.auth_type, AuthType::Pat);
        assert_eq!(creds.site_url, "https://jira.example.com");
    }

    #[test]
    fn test_list_puts_active_first() {
        let dir = tempdir().unwrap();
        let mut store = WorkspaceStore::load(dir.path()).unwrap();
        store.add_workspace(new_ws("bravo")).unwrap();
        store.add_workspace(new_ws("alpha")).unwrap();
        store.add_workspace(new_ws("charlie")).unwrap();

        let names: Vec<_> = store
            .list_workspaces()
            .into_iter()
            .map(|w| w.name)
            .collect();
        assert_eq!(names, vec!["bravo", "alpha", "charlie"]);
    }

    #[test]
    fn test_credentials_without_workspaces() {
        let dir = tempdir().unwrap();
        let store = WorkspaceStore::load(dir.path()).unwrap();
        assert!(matches!(
            store.get_credentials(None),
            Err(WorkspaceError::NotFound(_))
        ));
        assert!(matches!(
            store.get_credentials(Some("ghost")),
            Err(WorkspaceError::NotFound(_))
        ));
        assert!(store.get_active_workspace().is_none());
    }

    #[test]
    fn test_credentials_by_name() {
        let dir = tempdir().unwrap();
        let mut store = WorkspaceStore::load(dir.path()).unwrap();
        store.add_workspace(new_ws("w1")).unwrap();
        store.add_workspace(new_ws("w2")).unwrap();

        let creds = store.get_credentials(Some("w2")).unwrap();
        assert_eq!(creds.workspace, "w2");
        assert_eq!(creds.site_url, "https://w2.atlassian.net");
        let active = store.get_credentials(None).unwrap();
        assert_eq!(active.workspace, "w1");
    }

    #[test]
    fn test_switch_workspace() {
        let dir = tempdir().unwrap();
        let mut store = WorkspaceStore::load(dir.path()).unwrap();
        store.add_workspace(new_ws("w1")).unwrap();
        store.add_workspace(new_ws("w2")).unwrap();

        let outcome = store.switch_workspace("w2").unwrap();
        assert!(matches!(outcome, SwitchOutcome::Switched { .. }));
        assert_eq!(store.active_name(), Some("w2"));

        assert!(matches!(
            store.switch_workspace("nope"),
            Err(WorkspaceError::NotFound(_))
        ));
    }

    #[test]
    fn test_switch_to_active_leaves_pointer_untouched() {
        let dir = tempdir().unwrap();
        let mut store = WorkspaceStore::load(dir.path()).unwrap();
        store.add_workspace(new_ws("w1")).unwrap();

        let pointer = dir.path().join(ACTIVE_FILE);
        let before = fs::metadata(&pointer).unwrap().modified().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));

        let outcome = store.switch_workspace("w1").unwrap();
        assert!(matches!(outcome, SwitchOutcome::AlreadyActive { .. }));

        let after = fs::metadata(&pointer).unwrap().modified().unwrap();
        assert_eq!(before, after);
        assert_eq!(fs::read_to_string(&pointer).unwrap(), "w1");
    }

    #[test]
    fn test_remove_active_activates_remaining() {
        let dir = tempdir().unwrap();
        let mut store = WorkspaceStore::load(dir.path()).unwrap();
        store.add_workspace(new_ws("w1")).unwrap();
        store.add_workspace(new_ws("w2")).unwrap();

        let outcome = store.remove_workspace("w1").unwrap();
        assert_eq!(outcome.activated.as_deref(), Some("w2"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_name(), Some("w2"));
        assert!(!store.record_path("w1").exists());

        let reloaded = WorkspaceStore::load(dir.path()).unwrap();
        assert_eq!(reloaded.active_name(), Some("w2"));
    }

    #[test]
    fn test_remove_picks_lexicographically_first() {
        let dir = tempdir().unwrap();
        let mut store = WorkspaceStore::load(dir.path()).unwrap();
        store.add_workspace(new_ws("mid")).unwrap();
        store.add_workspace(new_ws("zulu")).unwrap();
        store.add_workspace(new_ws("alpha")).unwrap();

        let outcome = store.remove_workspace("mid").unwrap();
        assert_eq!(outcome.activated.as_deref(), Some("alpha"));
    }

    #[test]
    fn test_remove_last_clears_pointer() {
        let dir = tempdir().unwrap();
        let mut store = WorkspaceStore::load(dir.path()).unwrap();
        store.add_workspace(new_ws("w1")).unwrap();

        let outcome = store.remove_workspace("w1").unwrap();
        assert!(outcome.activated.is_none());
        assert!(store.is_empty());
        assert!(store.active_name().is_none());
        assert!(!dir.path().join(ACTIVE_FILE).exists());

        assert!(matches!(
            store.remove_workspace("w1"),
            Err(WorkspaceError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_inactive_keeps_pointer() {
        let dir = tempdir().unwrap();
        let mut store = WorkspaceStore::load(dir.path()).unwrap();
        store.add_workspace(new_ws("w1")).unwrap();
        store.add_workspace(new_ws("w2")).unwrap();

        let outcome = store.remove_workspace("w2").unwrap();
        assert!(outcome.activated.is_none());
        assert_eq!(store.active_name(), Some("w1"));
    }

    #[test]
    fn test_dangling_pointer_degrades_to_no_active() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(WORKSPACES_DIR)).unwrap();
        fs::write(dir.path().join(ACTIVE_FILE), "ghost\n").unwrap();

        let store = WorkspaceStore::load(dir.path()).unwrap();
        assert!(store.active_name().is_none());
        assert!(store.get_active_workspace().is_none());
    }

    #[test]
    fn test_corrupt_record_is_skipped() {
        let dir = tempdir().unwrap();
        let ws_dir = dir.path().join(WORKSPACES_DIR);
        fs::create_dir_all(&ws_dir).unwrap();
        fs::write(ws_dir.join("broken.json"), "{ not json").unwrap();

        let mut store = WorkspaceStore::load(dir.path()).unwrap();
        assert!(store.is_empty());
        store.add_workspace(new_ws("good")).unwrap();
        assert_eq!(WorkspaceStore::load(dir.path()).unwrap().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_record_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let mut store = WorkspaceStore::load(dir.path()).unwrap();
        store.add_workspace(new_ws("w1")).unwrap();

        let mode = fs::metadata(store.record_path("w1"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_skeleton_needs_token_before_use() {
        let dir = tempdir().unwrap();
        let mut store = WorkspaceStore::load(dir.path()).unwrap();
        let path = store
            .create_workspace_skeleton("draft", "draft.atlassian.net", AuthType::Cloud)
            .unwrap();
        assert!(path.exists());
        assert_eq!(store.active_name(), Some("draft"));
        assert!(matches!(
            store.get_credentials(None),
            Err(WorkspaceError::Validation(_))
        ));
    }

    #[test]
    fn test_mark_validated_persists() {
        let dir = tempdir().unwrap();
        let mut store = WorkspaceStore::load(dir.path()).unwrap();
        store.add_workspace(new_ws("w1")).unwrap();
        store.mark_validated("w1").unwrap();

        let reloaded = WorkspaceStore::load(dir.path()).unwrap();
        assert!(reloaded.get_workspace("w1").unwrap().last_validated.is_some());
    }
}
