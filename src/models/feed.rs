//! Feed document models
//!
//! Each stage group has its own entry type; the field sets differ and are
//! never merged into one record with optional fields.

use rust_decimal::Decimal;
use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};

pub const IDEAS_LABEL: &str = "Ideas";

/// Entry of the `Ideas` group, built from an open merge request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdeaEntry {
    pub name: String,
    #[serde(rename = "gitlab-url")]
    pub gitlab_url: String,
    pub author: String,
    pub date: String,
}

/// Entry of the `Funding Required` group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundingEntry {
    pub name: String,
    #[serde(rename = "gitlab-url")]
    pub gitlab_url: String,
    #[serde(rename = "local-url")]
    pub local_url: String,
    #[serde(rename = "donate-url")]
    pub donate_url: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "amount-funded", with = "rust_decimal::serde::float")]
    pub amount_funded: Decimal,
    pub author: String,
    pub date: String,
}

/// Entry of the `Work in Progress` group
///
/// Milestone counters are always zero; milestones are not tracked yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkInProgressEntry {
    pub name: String,
    #[serde(rename = "gitlab-url")]
    pub gitlab_url: String,
    #[serde(rename = "local-url")]
    pub local_url: String,
    pub milestones: u32,
    #[serde(rename = "milestones-completed")]
    pub milestones_completed: u32,
    #[serde(rename = "milestones-percentage")]
    pub milestones_percentage: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "amount-funded", with = "rust_decimal::serde::float")]
    pub amount_funded: Decimal,
    pub author: String,
    pub date: String,
}

/// One labelled group of entries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageGroup<T> {
    pub stage: String,
    pub proposals: Vec<T>,
}

impl<T> StageGroup<T> {
    pub fn new(stage: impl Into<String>, proposals: Vec<T>) -> Self {
        Self {
            stage: stage.into(),
            proposals,
        }
    }
}

/// The complete feed: exactly three groups in fixed order
#[derive(Debug, Clone, PartialEq)]
pub struct FeedDocument {
    pub ideas: StageGroup<IdeaEntry>,
    pub funding_required: StageGroup<FundingEntry>,
    pub work_in_progress: StageGroup<WorkInProgressEntry>,
}

impl FeedDocument {
    pub fn entry_count(&self) -> usize {
        self.ideas.proposals.len()
            + self.funding_required.proposals.len()
            + self.work_in_progress.proposals.len()
    }
}

// Serialized as a bare three-element JSON array.
impl Serialize for FeedDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut groups = serializer.serialize_tuple(3)?;
        groups.serialize_element(&self.ideas)?;
        groups.serialize_element(&self.funding_required)?;
        groups.serialize_element(&self.work_in_progress)?;
        groups.end()
    }
}
