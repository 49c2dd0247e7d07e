use std::collections::HashMap;

use crate::identity::Roster;
use crate::model::{
    AssessmentRow, OverviewRow, OverviewTable, PairingState, PeerReviewPairing, UserId,
};

/// One row per roster participant: pairings assigned/completed as reviewer,
/// plus every non-null total score received as reviewee.
///
/// Scores are matched to participants by reviewee id, never by display name,
/// and are kept in assessment-row order.
pub fn build_overview(
    roster: &Roster<'_>,
    pairings: &[PeerReviewPairing],
    rows: &[AssessmentRow],
) -> OverviewTable {
    let mut counts: HashMap<UserId, (usize, usize)> = HashMap::new();
    for p in pairings {
        let entry = counts.entry(p.reviewer_id).or_insert((0, 0));
        entry.0 += 1;
        if p.state == PairingState::Completed {
            entry.1 += 1;
        }
    }

    let mut received: HashMap<UserId, Vec<f64>> = HashMap::new();
    for row in rows {
        if let Some(score) = row.total_score {
            received.entry(row.reviewee_id).or_default().push(score);
        }
    }

    let rows: Vec<OverviewRow> = roster
        .participants()
        .iter()
        .map(|p| {
            let (assigned, completed) = counts.get(&p.id).copied().unwrap_or((0, 0));
            OverviewRow {
                user_id: p.id,
                name: p.display_name.clone(),
                assigned,
                completed,
                review_scores: received.remove(&p.id).unwrap_or_default(),
            }
        })
        .collect();

    let review_columns = rows.iter().map(|r| r.review_scores.len()).max().unwrap_or(0);

    OverviewTable {
        review_columns,
        rows,
    }
}

pub fn review_column_name(k: usize) -> String {
    format!("Review: {k}")
}
