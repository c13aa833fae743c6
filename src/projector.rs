//! Stage projector
//!
//! Maps stored proposals of a downstream stage onto feed entries. Stored
//! titles and handles are already sanitized, so nothing is escaped here.

use crate::intake::format::feed_date_naive;
use crate::models::{FundingEntry, StageGroup, StageTag, StoredProposal, WorkInProgressEntry};

/// `local-url` of every projected entry; project pages do not exist yet
const LOCAL_URL_PLACEHOLDER: &str = "#";

/// A feed entry built from one stored proposal
pub trait StageEntry: Sized {
    const STAGE: StageTag;

    fn from_record(record: &StoredProposal, projector: &StageProjector) -> Self;
}

pub struct StageProjector {
    app_url: String,
}

impl StageProjector {
    pub fn new(app_url: impl Into<String>) -> Self {
        Self {
            app_url: app_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Project every record, in the order given
    pub fn project<E: StageEntry>(&self, records: &[StoredProposal]) -> StageGroup<E> {
        let entries = records.iter().map(|r| E::from_record(r, self)).collect();
        StageGroup::new(E::STAGE.label(), entries)
    }

    pub fn donate_url(&self, payment_id: &str) -> String {
        format!("{}/projects/{}/donate", self.app_url, payment_id)
    }
}

impl StageEntry for FundingEntry {
    const STAGE: StageTag = StageTag::FundingRequired;

    fn from_record(record: &StoredProposal, projector: &StageProjector) -> Self {
        FundingEntry {
            name: record.title.clone(),
            gitlab_url: record.gitlab_url.clone(),
            local_url: LOCAL_URL_PLACEHOLDER.to_string(),
            donate_url: projector.donate_url(&record.payment_id),
            percentage: record.percentage_funded,
            amount: record.target_amount,
            amount_funded: record.amount_received,
            author: record.gitlab_username.clone(),
            date: feed_date_naive(&record.gitlab_created_at),
        }
    }
}

impl StageEntry for WorkInProgressEntry {
    const STAGE: StageTag = StageTag::WorkInProgress;

    fn from_record(record: &StoredProposal, _projector: &StageProjector) -> Self {
        WorkInProgressEntry {
            name: record.title.clone(),
            gitlab_url: record.gitlab_url.clone(),
            local_url: LOCAL_URL_PLACEHOLDER.to_string(),
            milestones: 0,
            milestones_completed: 0,
            milestones_percentage: 0,
            percentage: record.percentage_funded,
            amount: record.target_amount,
            amount_funded: record.amount_received,
            author: record.gitlab_username.clone(),
            date: feed_date_naive(&record.gitlab_created_at),
        }
    }
}
