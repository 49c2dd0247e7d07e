//! Property-based tests for the reconciliation invariants.
//!
//! - Every pairing yields exactly one assessment row, in pairing order.
//! - Criterion columns are the rubric's distinct ids in first-seen order.
//! - Collapsing an expansion gives back each criterion's final valid points.

use peergrid_review::expand::{collapse, expand_criteria};
use peergrid_review::model::{
    AssessmentRecord, CriterionScore, PairingState, Participant, PeerReviewPairing, Points,
    ReviewInput, Rubric, RubricCriterion,
};
use peergrid_review::reconcile::reconcile_pairings;
use peergrid_review::schema::CriterionSchema;
use peergrid_review::ReviewConfig;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

const CRITERION_POOL: [&str; 6] = ["_1220", "_1409", "_3869", "_4401", "_5120", "_7777"];

fn arb_points() -> impl Strategy<Value = Points> {
    prop_oneof![
        (0i64..=50).prop_map(Points::integer),
        (0u32..=100).prop_map(|v| Points::float(f64::from(v) / 2.0)),
    ]
}

fn arb_rubric() -> impl Strategy<Value = Rubric> {
    prop::collection::vec((0..CRITERION_POOL.len(), "[A-Z][a-z]{2,8}", arb_points()), 0..8).prop_map(
        |raw| {
            let criteria: Vec<RubricCriterion> = raw
                .into_iter()
                .map(|(i, description, max_points)| RubricCriterion {
                    criterion_id: CRITERION_POOL[i].to_string(),
                    description,
                    max_points,
                })
                .collect();
            Rubric {
                points_possible: Points::total(criteria.iter().map(|c| &c.max_points)),
                criteria,
            }
        },
    )
}

fn arb_score() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        (0.0f64..30.0).prop_map(Some),
        Just(None),
        Just(Some(f64::NAN)),
        Just(Some(f64::INFINITY)),
    ]
}

/// Entries drawn from the pool plus an id no rubric ever declares.
fn arb_entries() -> impl Strategy<Value = Vec<CriterionScore>> {
    prop::collection::vec((0..=CRITERION_POOL.len(), arb_score()), 0..10).prop_map(|raw| {
        raw.into_iter()
            .map(|(i, points)| CriterionScore {
                criterion_id: CRITERION_POOL.get(i).copied().unwrap_or("_unknown").to_string(),
                points,
                comment: None,
            })
            .collect()
    })
}

fn arb_pairings() -> impl Strategy<Value = Vec<PeerReviewPairing>> {
    prop::collection::vec((1u64..=6, 1u64..=7, 100u64..=105, any::<bool>()), 0..20).prop_map(|raw| {
        raw.into_iter()
            .map(|(reviewee_id, reviewer_id, artifact_id, done)| PeerReviewPairing {
                reviewee_id,
                reviewer_id,
                artifact_id,
                state: if done { PairingState::Completed } else { PairingState::Assigned },
            })
            .collect()
    })
}

fn arb_assessments() -> impl Strategy<Value = Vec<AssessmentRecord>> {
    prop::collection::vec((1u64..=7, 100u64..=105, arb_score(), arb_entries()), 0..12).prop_map(
        |raw| {
            raw.into_iter()
                .map(|(reviewer_id, artifact_id, total_score, per_criterion)| AssessmentRecord {
                    reviewer_id,
                    artifact_id,
                    total_score,
                    per_criterion,
                })
                .collect()
        },
    )
}

fn roster() -> Vec<Participant> {
    (1..=6)
        .map(|id| Participant {
            id,
            display_name: format!("Student {id}"),
            external_sid: String::new(),
        })
        .collect()
}

/// Distinct criterion ids in first-seen order.
fn distinct_ids(rubric: &Rubric) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for c in &rubric.criteria {
        if !ids.contains(&c.criterion_id) {
            ids.push(c.criterion_id.clone());
        }
    }
    ids
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn one_row_per_pairing_in_order(
        pairings in arb_pairings(),
        assessments in arb_assessments(),
        rubric in arb_rubric(),
    ) {
        let out = reconcile_pairings(&pairings, &assessments, Some(&rubric), true).unwrap();
        prop_assert_eq!(out.rows.len(), pairings.len());
        for (row, pairing) in out.rows.iter().zip(&pairings) {
            prop_assert_eq!(row.pairing, pairing);
            prop_assert_eq!(row.expanded.points.len(), distinct_ids(&rubric).len());
        }
    }

    #[test]
    fn engine_rows_match_pairings_and_roster(
        pairings in arb_pairings(),
        assessments in arb_assessments(),
        rubric in arb_rubric(),
    ) {
        let input = ReviewInput {
            roster: roster(),
            pairings: pairings.clone(),
            assessments,
            rubric: Some(rubric),
            comments: Vec::new(),
        };
        let result = peergrid_review::run(&ReviewConfig::named("Property"), &input).unwrap();
        prop_assert_eq!(result.assessments.rows.len(), pairings.len());
        prop_assert_eq!(result.overview.rows.len(), 6);

        let table = result.assessments.to_table();
        prop_assert_eq!(table.rows.len(), pairings.len());
        for row in &table.rows {
            prop_assert_eq!(row.len(), table.headers.len());
        }
    }

    #[test]
    fn columns_follow_rubric_order(rubric in arb_rubric()) {
        let schema = CriterionSchema::resolve(&rubric.criteria);
        let ids: Vec<String> = schema.columns().iter().map(|c| c.criterion_id.clone()).collect();
        prop_assert_eq!(ids, distinct_ids(&rubric));
    }

    #[test]
    fn collapse_returns_final_valid_points(rubric in arb_rubric(), entries in arb_entries()) {
        let schema = CriterionSchema::resolve(&rubric.criteria);
        let expanded = expand_criteria(&entries, &schema, false);
        let collapsed = collapse(&expanded.points, &schema);

        prop_assert_eq!(collapsed.len(), schema.len());
        for (criterion_id, points) in &collapsed {
            let expected = entries
                .iter()
                .rev()
                .find(|e| &e.criterion_id == criterion_id)
                .and_then(|e| e.points.filter(|p| p.is_finite()));
            prop_assert_eq!(*points, expected);

            let flagged = expanded.invalid_criteria.contains(criterion_id);
            let last_was_invalid = entries
                .iter()
                .rev()
                .find(|e| &e.criterion_id == criterion_id)
                .is_some_and(|e| !e.points.is_some_and(f64::is_finite));
            prop_assert_eq!(flagged, last_was_invalid);
        }
    }
}
