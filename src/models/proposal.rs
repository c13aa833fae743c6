//! Proposal models
//!
//! Change proposals as read from GitLab and stored proposals as read from
//! the `projects` table.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `gitlab_state` value of records whose merge request has been merged
pub const MERGED: &str = "merged";

/// An open merge request together with the files it adds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeProposal {
    /// Instance-wide merge request id, used in operator messages
    pub id: u64,
    /// Project-scoped merge request number, used to query its changes
    pub iid: u64,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub web_url: String,
    /// Newly added file paths, in the order GitLab reports them
    pub new_files: Vec<String>,
}

/// Lifecycle stage of a stored proposal that appears in the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum StageTag {
    FundingRequired,
    WorkInProgress,
}

impl StageTag {
    /// Value of the `state` column for this stage
    pub fn as_str(&self) -> &'static str {
        match self {
            StageTag::FundingRequired => "FUNDING-REQUIRED",
            StageTag::WorkInProgress => "WORK-IN-PROGRESS",
        }
    }

    /// Heading of this stage's group in the feed
    pub fn label(&self) -> &'static str {
        match self {
            StageTag::FundingRequired => "Funding Required",
            StageTag::WorkInProgress => "Work in Progress",
        }
    }
}

impl fmt::Display for StageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposal row owned by the record store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredProposal {
    pub filename: String,
    pub title: String,
    pub gitlab_url: String,
    pub gitlab_state: String,
    /// Raw `state` column; other stages exist besides the two projected here
    pub state: String,
    pub percentage_funded: Decimal,
    pub target_amount: Decimal,
    pub amount_received: Decimal,
    pub gitlab_username: String,
    pub gitlab_created_at: NaiveDateTime,
    pub payment_id: String,
}
