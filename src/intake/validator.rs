//! Intake validator
//!
//! Turns open merge requests into `Ideas` entries. Each merge request must
//! add exactly one top-level markdown document whose name is not claimed by
//! an earlier merge request in the same run nor by a stored project.
//!
//! The checks run in a fixed order and the first failure is the reported
//! reason. Input order decides which of two merge requests adding the same
//! file wins, so the claim table is threaded through a sequential fold.

use crate::intake::format::{escape_html, feed_date};
use crate::models::{ChangeProposal, IdeaEntry};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Characters stripped from both ends of a title: space, tab, newline,
/// carriage return, NUL and vertical tab. Other Unicode spaces are kept.
const TITLE_PADDING: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

/// Accepted document names: at least one character, then `.md`
static DOCUMENT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r".+\.md$").expect("document name pattern is valid")
});

/// Why a merge request did not become an idea
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("doesn't add any new file")]
    NoFiles,

    #[error("contains multiple files ({count})")]
    MultipleFiles { count: usize },

    #[error("doesn't contain any .md file ({filename})")]
    NotDocument { filename: String },

    #[error("{filename} must be in the root folder")]
    NotTopLevel { filename: String },

    #[error("duplicated {filename}, another MR #{claimed_by}")]
    Duplicate {
        filename: String,
        claimed_by: u64,
        claimed_title: String,
    },

    #[error("already have a project {filename}")]
    AlreadyStored { filename: String },
}

/// A rejected merge request, as reported to operators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionNotice {
    pub proposal_id: u64,
    pub title: String,
    pub reason: Rejection,
}

/// The merge request that first claimed a filename in this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub proposal_id: u64,
    pub title: String,
}

/// Filename -> claiming merge request, built up during one run
pub type ClaimedFilenames = BTreeMap<String, Claim>;

/// Per-merge-request verdict, kept in input order for the operator log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accepted {
        proposal_id: u64,
        title: String,
        filename: String,
    },
    Rejected(RejectionNotice),
}

/// Result of one intake run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeOutcome {
    pub accepted: Vec<IdeaEntry>,
    pub rejections: Vec<RejectionNotice>,
    pub claimed: ClaimedFilenames,
    pub decisions: Vec<Decision>,
}

impl IntakeOutcome {
    pub fn processed(&self) -> usize {
        self.accepted.len() + self.rejections.len()
    }
}

/// Validate merge requests against each other and the stored filenames
///
/// Every input ends up in exactly one of `accepted` or `rejections`, both
/// in input order. `decisions` interleaves the two in input order.
pub fn validate<I>(proposals: I, existing_filenames: &HashSet<String>) -> IntakeOutcome
where
    I: IntoIterator<Item = ChangeProposal>,
{
    proposals
        .into_iter()
        .fold(IntakeOutcome::default(), |mut outcome, proposal| {
            match check(&proposal, &outcome.claimed, existing_filenames) {
                Ok(filename) => {
                    let filename = filename.to_string();
                    outcome.accepted.push(idea_entry(&proposal));
                    outcome.claimed.insert(
                        filename.clone(),
                        Claim {
                            proposal_id: proposal.id,
                            title: proposal.title.clone(),
                        },
                    );
                    outcome.decisions.push(Decision::Accepted {
                        proposal_id: proposal.id,
                        title: proposal.title,
                        filename,
                    });
                }
                Err(reason) => {
                    let notice = RejectionNotice {
                        proposal_id: proposal.id,
                        title: proposal.title,
                        reason,
                    };
                    outcome.rejections.push(notice.clone());
                    outcome.decisions.push(Decision::Rejected(notice));
                }
            }
            outcome
        })
}

/// Run the intake checks in order; returns the claimed filename on success
pub fn check<'p>(
    proposal: &'p ChangeProposal,
    claimed: &ClaimedFilenames,
    existing_filenames: &HashSet<String>,
) -> Result<&'p str, Rejection> {
    let filename = match proposal.new_files.as_slice() {
        [] => return Err(Rejection::NoFiles),
        [single] => single.as_str(),
        many => return Err(Rejection::MultipleFiles { count: many.len() }),
    };

    if !DOCUMENT_NAME.is_match(filename) {
        return Err(Rejection::NotDocument {
            filename: filename.to_string(),
        });
    }

    if base_name(filename) != filename {
        return Err(Rejection::NotTopLevel {
            filename: filename.to_string(),
        });
    }

    if let Some(claim) = claimed.get(filename) {
        return Err(Rejection::Duplicate {
            filename: filename.to_string(),
            claimed_by: claim.proposal_id,
            claimed_title: claim.title.clone(),
        });
    }

    if existing_filenames.contains(filename) {
        return Err(Rejection::AlreadyStored {
            filename: filename.to_string(),
        });
    }

    Ok(filename)
}

/// Build the feed entry; proposal text is untrusted and gets escaped
pub fn idea_entry(proposal: &ChangeProposal) -> IdeaEntry {
    IdeaEntry {
        name: escape_html(proposal.title.trim_matches(TITLE_PADDING)),
        gitlab_url: escape_html(&proposal.web_url),
        author: escape_html(&proposal.author),
        date: feed_date(&proposal.created_at),
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
