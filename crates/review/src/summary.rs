use crate::model::{AssessmentTable, OverviewTable, PairingState, ReviewSummary};

/// Compute run statistics from the finished tables.
pub fn compute_summary(
    assessments: &AssessmentTable,
    overview: &OverviewTable,
    matched: usize,
    unresolved_names: usize,
) -> ReviewSummary {
    let rows = &assessments.rows;
    ReviewSummary {
        participants: overview.rows.len(),
        pairings: rows.len(),
        completed: rows.iter().filter(|r| r.state == PairingState::Completed).count(),
        assessed: matched,
        unmatched: rows.len() - matched.min(rows.len()),
        invalid_rows: rows.iter().filter(|r| r.invalid_rubric_data).count(),
        unresolved_names,
        max_reviews_received: overview.review_columns,
    }
}
