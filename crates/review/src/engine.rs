use tracing::{debug, info_span};

use crate::comments::{attach_comments, CommentIndex};
use crate::config::ReviewConfig;
use crate::error::ReviewError;
use crate::identity::{IdentityResolver, Roster};
use crate::model::{AssessmentRow, AssessmentTable, ReviewInput, ReviewResult, RunMeta};
use crate::overview::build_overview;
use crate::reconcile::{reconcile_pairings, JoinedRow};
use crate::summary::compute_summary;

/// Run the pipeline per config. Returns both tables plus summary.
pub fn run(config: &ReviewConfig, input: &ReviewInput) -> Result<ReviewResult, ReviewError> {
    let _span = info_span!("review_run", name = %config.name).entered();
    let options = &config.options;

    if input.roster.is_empty() {
        return Err(ReviewError::EmptyRoster);
    }
    let roster = Roster::new(&input.roster);

    let reconciled = reconcile_pairings(
        &input.pairings,
        &input.assessments,
        input.rubric.as_ref(),
        options.include_criterion_comments,
    )?;
    let matched = reconciled.rows.iter().filter(|r| r.matched).count();

    let resolver = IdentityResolver::new(&roster, &options.not_found_label);
    let mut unresolved_names = 0;
    let mut rows: Vec<AssessmentRow> = Vec::with_capacity(reconciled.rows.len());
    for joined in reconciled.rows {
        for id in [joined.pairing.reviewer_id, joined.pairing.reviewee_id] {
            if !resolver.is_known(id) {
                unresolved_names += 1;
            }
        }
        rows.push(build_row(joined, &resolver));
    }
    if unresolved_names > 0 {
        debug!(unresolved_names, "ids missing from roster were labelled");
    }

    if options.include_comments {
        let index = CommentIndex::group(&input.comments);
        debug!(groups = index.len(), "attaching comments");
        rows = attach_comments(rows, &index);
    }

    let assessments = AssessmentTable {
        shape: reconciled.shape,
        schema: reconciled.schema,
        points_possible: input.rubric.as_ref().map(|r| r.points_possible),
        include_criterion_comments: options.include_criterion_comments && input.rubric.is_some(),
        include_comments: options.include_comments,
        rows,
    };

    let overview = build_overview(&roster, &input.pairings, &assessments.rows);
    let summary = compute_summary(&assessments, &overview, matched, unresolved_names);
    debug!(?summary, "run complete");

    Ok(ReviewResult {
        meta: RunMeta {
            name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            shape: assessments.shape,
        },
        summary,
        assessments,
        overview,
    })
}

fn build_row(joined: JoinedRow<'_>, resolver: &IdentityResolver<'_>) -> AssessmentRow {
    let p = joined.pairing;
    let invalid_rubric_data = joined.expanded.has_invalid_data();
    AssessmentRow {
        reviewer_id: p.reviewer_id,
        reviewee_id: p.reviewee_id,
        artifact_id: p.artifact_id,
        reviewer_name: resolver.resolve(p.reviewer_id).to_string(),
        reviewee_name: resolver.resolve(p.reviewee_id).to_string(),
        state: p.state,
        total_score: joined.total_score,
        criteria: joined.expanded.points,
        criterion_comments: joined.expanded.comments,
        comments: None,
        invalid_rubric_data,
    }
}
