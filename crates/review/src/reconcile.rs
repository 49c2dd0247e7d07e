use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::ReviewError;
use crate::expand::{expand_record, ExpandedAssessment};
use crate::model::{AssessmentRecord, JoinKey, PeerReviewPairing, Rubric, TableShape};
use crate::schema::CriterionSchema;

/// A pairing with whatever its matching assessment contributed.
#[derive(Debug, Clone)]
pub struct JoinedRow<'a> {
    pub pairing: &'a PeerReviewPairing,
    pub total_score: Option<f64>,
    /// Empty for the bare shape.
    pub expanded: ExpandedAssessment,
    pub matched: bool,
}

#[derive(Debug)]
pub struct Reconciled<'a> {
    pub shape: TableShape,
    pub schema: Option<CriterionSchema>,
    pub rows: Vec<JoinedRow<'a>>,
}

/// Left-join pairings with assessments on `(reviewer_id, artifact_id)`.
///
/// Every pairing yields exactly one row, in pairing order. Without a rubric the
/// bare table is produced, which is only legal when there are no assessments.
pub fn reconcile_pairings<'a>(
    pairings: &'a [PeerReviewPairing],
    assessments: &[AssessmentRecord],
    rubric: Option<&Rubric>,
    include_criterion_comments: bool,
) -> Result<Reconciled<'a>, ReviewError> {
    let Some(rubric) = rubric else {
        if !assessments.is_empty() {
            return Err(ReviewError::MissingRubric {
                assessments: assessments.len(),
            });
        }
        debug!(pairings = pairings.len(), "no rubric; emitting bare pairing table");
        return Ok(Reconciled {
            shape: TableShape::Bare,
            schema: None,
            rows: pairings.iter().map(|p| unmatched(p, &CriterionSchema::default(), false)).collect(),
        });
    };

    let schema = CriterionSchema::resolve(&rubric.criteria);

    if assessments.is_empty() {
        debug!(
            pairings = pairings.len(),
            columns = schema.len(),
            "rubric has no assessments; emitting schema-only table"
        );
        let rows = pairings
            .iter()
            .map(|p| unmatched(p, &schema, include_criterion_comments))
            .collect();
        return Ok(Reconciled {
            shape: TableShape::SchemaOnly,
            schema: Some(schema),
            rows,
        });
    }

    let index = index_assessments(assessments, &schema, include_criterion_comments);

    let rows: Vec<JoinedRow<'a>> = pairings
        .iter()
        .map(|pairing| match index.get(&pairing.join_key()) {
            Some((total_score, expanded)) => JoinedRow {
                pairing,
                total_score: *total_score,
                expanded: expanded.clone(),
                matched: true,
            },
            None => unmatched(pairing, &schema, include_criterion_comments),
        })
        .collect();

    let matched = rows.iter().filter(|r| r.matched).count();
    debug!(
        pairings = rows.len(),
        matched,
        assessments = assessments.len(),
        "pairings reconciled"
    );
    let assigned: HashSet<JoinKey> = pairings.iter().map(PeerReviewPairing::join_key).collect();
    let orphaned = index.keys().filter(|k| !assigned.contains(k)).count();
    if orphaned > 0 {
        debug!(orphaned, "assessments without an assigned pairing were dropped");
    }

    Ok(Reconciled {
        shape: TableShape::Full,
        schema: Some(schema),
        rows,
    })
}

/// Expand each assessment once and key it for the join. A repeated key keeps
/// the last assessment so the join stays one row per pairing.
fn index_assessments(
    assessments: &[AssessmentRecord],
    schema: &CriterionSchema,
    include_comments: bool,
) -> HashMap<JoinKey, (Option<f64>, ExpandedAssessment)> {
    let mut index = HashMap::with_capacity(assessments.len());
    for record in assessments {
        let expanded = expand_record(record, schema, include_comments);
        let total = record.total_score.filter(|s| s.is_finite());
        if index.insert(record.join_key(), (total, expanded)).is_some() {
            warn!(
                reviewer_id = record.reviewer_id,
                artifact_id = record.artifact_id,
                "duplicate assessment for pairing; keeping the later one"
            );
        }
    }
    index
}

fn unmatched<'a>(
    pairing: &'a PeerReviewPairing,
    schema: &CriterionSchema,
    include_comments: bool,
) -> JoinedRow<'a> {
    JoinedRow {
        pairing,
        total_score: None,
        expanded: ExpandedAssessment::empty(schema, include_comments),
        matched: false,
    }
}
