//! GitLab REST payloads
//!
//! Only the fields the feed needs are decoded; everything else is ignored.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub username: String,
}

/// Item of `GET /projects/:id/merge_requests`
#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequest {
    pub id: u64,
    pub iid: u64,
    pub title: String,
    pub web_url: String,
    pub author: Author,
    pub created_at: DateTime<Utc>,
}

/// One entry of `changes` in `GET /projects/:id/merge_requests/:iid/changes`
#[derive(Debug, Clone, Deserialize)]
pub struct FileChange {
    pub new_path: String,
    #[serde(default)]
    pub new_file: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequestChanges {
    #[serde(default)]
    pub changes: Vec<FileChange>,
}

impl MergeRequestChanges {
    /// Paths of files the merge request adds, in response order
    pub fn new_files(self) -> Vec<String> {
        self.changes
            .into_iter()
            .filter(|c| c.new_file)
            .map(|c| c.new_path)
            .collect()
    }
}
