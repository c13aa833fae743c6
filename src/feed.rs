//! Feed assembler
//!
//! Runs intake and both projections, and renders the result as the JSON
//! document consumed by the site generator.

use crate::db::RecordStore;
use crate::error::AppResult;
use crate::gitlab::{collect_proposals, ChangeProposalSource};
use crate::intake::{self, Decision, IntakeOutcome};
use crate::models::{
    FeedDocument, FundingEntry, IdeaEntry, StageGroup, WorkInProgressEntry, IDEAS_LABEL, MERGED,
};
use crate::projector::{StageEntry, StageProjector};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info, warn};

pub struct FeedAssembler<'a> {
    source: &'a dyn ChangeProposalSource,
    store: &'a dyn RecordStore,
    projector: StageProjector,
}

impl<'a> FeedAssembler<'a> {
    pub fn new(
        source: &'a dyn ChangeProposalSource,
        store: &'a dyn RecordStore,
        projector: StageProjector,
    ) -> Self {
        Self {
            source,
            store,
            projector,
        }
    }

    /// Build the three stage groups: ideas, funding required, work in progress
    pub async fn assemble(&self) -> AppResult<FeedDocument> {
        let ideas = self.ideas().await?;
        let funding_required: StageGroup<FundingEntry> = self.stage_group().await?;
        let work_in_progress: StageGroup<WorkInProgressEntry> = self.stage_group().await?;

        info!(
            "Feed assembled: {} ideas, {} funding required, {} in progress",
            ideas.proposals.len(),
            funding_required.proposals.len(),
            work_in_progress.proposals.len()
        );

        Ok(FeedDocument {
            ideas,
            funding_required,
            work_in_progress,
        })
    }

    async fn ideas(&self) -> AppResult<StageGroup<IdeaEntry>> {
        let proposals = collect_proposals(self.source).await?;
        let existing = self.store.list_filenames().await?;

        let outcome = intake::validate(proposals, &existing);
        report(&outcome);

        Ok(StageGroup::new(IDEAS_LABEL, outcome.accepted))
    }

    async fn stage_group<E: StageEntry>(&self) -> AppResult<StageGroup<E>> {
        let records = self.store.list_by_stage(MERGED, E::STAGE).await?;
        Ok(self.projector.project(&records))
    }
}

/// Write intake decisions to the operator log
fn report(outcome: &IntakeOutcome) {
    debug!(
        "Intake processed {} merge requests: {} accepted, {} rejected",
        outcome.processed(),
        outcome.accepted.len(),
        outcome.rejections.len()
    );
    for decision in &outcome.decisions {
        match decision {
            Decision::Rejected(notice) => warn!(
                mr_id = notice.proposal_id,
                title = %notice.title,
                "Skipping MR #{} '{}': {}",
                notice.proposal_id,
                notice.title,
                notice.reason
            ),
            Decision::Accepted {
                proposal_id,
                title,
                filename,
            } => info!(
                mr_id = *proposal_id,
                title = %title,
                "Idea MR #{} '{}': {}",
                proposal_id,
                title,
                filename
            ),
        }
    }
}

/// Render the feed as pretty-printed JSON with four-space indentation
///
/// serde_json leaves forward slashes unescaped.
pub fn render(doc: &FeedDocument) -> AppResult<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    doc.serialize(&mut serializer)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{record, MemoryRecordStore};
    use crate::gitlab::testing::StaticSource;
    use pretty_assertions::assert_eq;

    fn fixture() -> (StaticSource, MemoryRecordStore) {
        let source = StaticSource::default()
            .with(900, 1, "A", &["idea1.md"])
            .with(901, 2, "B", &["idea1.md"])
            .with(902, 3, "C", &["x.md", "y.md"])
            .with(903, 4, "Already funded", &["fund.md"]);
        let store = MemoryRecordStore::new(vec![
            record("fund.md", MERGED, "FUNDING-REQUIRED"),
            record("wip.md", MERGED, "WORK-IN-PROGRESS"),
            record("open.md", "opened", "WORK-IN-PROGRESS"),
            record("done.md", MERGED, "COMPLETED"),
        ]);
        (source, store)
    }

    #[tokio::test]
    async fn test_assemble_groups_in_fixed_order() {
        let (source, store) = fixture();
        let assembler = FeedAssembler::new(&source, &store, StageProjector::new("http://localhost"));

        let doc = assembler.assemble().await.unwrap();

        assert_eq!(doc.ideas.stage, "Ideas");
        assert_eq!(doc.ideas.proposals.len(), 1);
        assert_eq!(doc.ideas.proposals[0].name, "A");

        assert_eq!(doc.funding_required.stage, "Funding Required");
        assert_eq!(doc.funding_required.proposals.len(), 1);
        assert_eq!(doc.funding_required.proposals[0].name, "fund");

        assert_eq!(doc.work_in_progress.stage, "Work in Progress");
        assert_eq!(doc.work_in_progress.proposals.len(), 1);
        assert_eq!(doc.work_in_progress.proposals[0].milestones_completed, 0);
        assert_eq!(doc.entry_count(), 3);
    }

    #[tokio::test]
    async fn test_render_is_stable_across_runs() {
        let (source, store) = fixture();
        let assembler = FeedAssembler::new(&source, &store, StageProjector::new("http://localhost"));

        let first = render(&assembler.assemble().await.unwrap()).unwrap();
        let second = render(&assembler.assemble().await.unwrap()).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_render_format() {
        let source = StaticSource::default().with(1, 1, "Idea", &["idea.md"]);
        let store = MemoryRecordStore::default();
        let assembler = FeedAssembler::new(&source, &store, StageProjector::new("http://localhost"));

        let json = String::from_utf8(render(&assembler.assemble().await.unwrap()).unwrap()).unwrap();

        let expected = r#"[
    {
        "stage": "Ideas",
        "proposals": [
            {
                "name": "Idea",
                "gitlab-url": "https://gitlab.com/ffs/proposals/-/merge_requests/1",
                "author": "alice",
                "date": "March 5, 2024"
            }
        ]
    },
    {
        "stage": "Funding Required",
        "proposals": []
    },
    {
        "stage": "Work in Progress",
        "proposals": []
    }
]"#;
        assert_eq!(json, expected);
    }
}
