//! Change-proposal source
//!
//! Open merge requests on the proposals repository, and the files each one
//! adds. The GitLab REST client is the production implementation.

mod client;
pub mod models;

pub use client::GitLabClient;
pub use models::MergeRequest;

use crate::error::AppResult;
use crate::models::ChangeProposal;
use async_trait::async_trait;
use tracing::debug;

/// Read-only view of the merge requests feeding the `Ideas` group
#[async_trait]
pub trait ChangeProposalSource: Send + Sync {
    /// Open merge requests, in the order the source lists them
    async fn list_open_proposals(&self) -> AppResult<Vec<MergeRequest>>;

    /// Paths added by the merge request with the given project-scoped iid
    async fn list_new_files(&self, iid: u64) -> AppResult<Vec<String>>;
}

/// Fetch every open merge request along with its added files
///
/// Requests are issued one after another and source order is kept.
pub async fn collect_proposals<S>(source: &S) -> AppResult<Vec<ChangeProposal>>
where
    S: ChangeProposalSource + ?Sized,
{
    let merge_requests = source.list_open_proposals().await?;
    debug!("Fetched {} open merge requests", merge_requests.len());

    let mut proposals = Vec::with_capacity(merge_requests.len());
    for mr in merge_requests {
        let new_files = source.list_new_files(mr.iid).await?;
        proposals.push(ChangeProposal {
            id: mr.id,
            iid: mr.iid,
            title: mr.title,
            author: mr.author.username,
            created_at: mr.created_at,
            web_url: mr.web_url,
            new_files,
        });
    }
    Ok(proposals)
}


#[cfg(test)]
mod tests {
    use super::testing::StaticSource;
    use super::*;

    #[test]
    fn test_collect_keeps_source_order_and_joins_files() {
        let source = StaticSource::default()
            .with(300, 3, "third", &["c.md"])
            .with(100, 1, "first", &["a.md", "b.md"]);

        let proposals = tokio_test::block_on(collect_proposals(&source)).unwrap();

        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].id, 300);
        assert_eq!(proposals[0].new_files, vec!["c.md".to_string()]);
        assert_eq!(proposals[1].iid, 1);
        assert_eq!(proposals[1].new_files.len(), 2);
        assert_eq!(proposals[1].author, "alice");
    }
}
