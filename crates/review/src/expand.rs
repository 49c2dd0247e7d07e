use tracing::warn;

use crate::model::{AssessmentRecord, CriterionScore};
use crate::schema::CriterionSchema;

/// Per-criterion entries of one assessment laid out in schema column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedAssessment {
    pub points: Vec<Option<f64>>,
    /// `Some` only when comment columns are requested.
    pub comments: Option<Vec<Option<String>>>,
    /// Criterion ids whose points were missing or not a finite number.
    pub invalid_criteria: Vec<String>,
    /// Criterion ids that have no column in the schema.
    pub unknown_criteria: Vec<String>,
}

impl ExpandedAssessment {
    /// All-null expansion for a pairing without an assessment.
    pub fn empty(schema: &CriterionSchema, include_comments: bool) -> Self {
        Self {
            points: vec![None; schema.len()],
            comments: include_comments.then(|| vec![None; schema.len()]),
            invalid_criteria: Vec::new(),
            unknown_criteria: Vec::new(),
        }
    }

    pub fn has_invalid_data(&self) -> bool {
        !self.invalid_criteria.is_empty()
    }
}

/// Explode per-criterion entries into the schema's column space.
///
/// Later entries for the same criterion overwrite earlier ones, validity
/// included: a criterion is invalid only if its final entry is. An empty
/// entry list produces an all-null expansion.
pub fn expand_criteria(
    per_criterion: &[CriterionScore],
    schema: &CriterionSchema,
    include_comments: bool,
) -> ExpandedAssessment {
    let mut out = ExpandedAssessment::empty(schema, include_comments);
    let mut invalid = vec![false; schema.len()];

    for entry in per_criterion {
        let Some(pos) = schema.position(&entry.criterion_id) else {
            out.unknown_criteria.push(entry.criterion_id.clone());
            continue;
        };

        let value = entry.points.filter(|p| p.is_finite());
        invalid[pos] = value.is_none();
        out.points[pos] = value;

        if let Some(ref mut comments) = out.comments {
            comments[pos] = entry.comment.clone().filter(|c| !c.is_empty());
        }
    }

    out.invalid_criteria = schema
        .columns()
        .iter()
        .zip(&invalid)
        .filter(|(_, bad)| **bad)
        .map(|(col, _)| col.criterion_id.clone())
        .collect();
    out
}

/// Expand one assessment, warning once when it carries invalid or unknown criteria.
pub fn expand_record(
    record: &AssessmentRecord,
    schema: &CriterionSchema,
    include_comments: bool,
) -> ExpandedAssessment {
    let expanded = expand_criteria(&record.per_criterion, schema, include_comments);

    if expanded.has_invalid_data() {
        warn!(
            reviewer_id = record.reviewer_id,
            artifact_id = record.artifact_id,
            criteria = ?expanded.invalid_criteria,
            "assessment contains invalid rubric data; affected cells left empty"
        );
    }
    if !expanded.unknown_criteria.is_empty() {
        warn!(
            reviewer_id = record.reviewer_id,
            artifact_id = record.artifact_id,
            criteria = ?expanded.unknown_criteria,
            "assessment references criteria missing from the rubric; ignored"
        );
    }

    expanded
}

/// Map expanded cells back to `(criterion_id, points)` in schema order.
pub fn collapse(points: &[Option<f64>], schema: &CriterionSchema) -> Vec<(String, Option<f64>)> {
    schema
        .columns()
        .iter()
        .zip(points.iter().chain(std::iter::repeat(&None)))
        .map(|(col, p)| (col.criterion_id.clone(), *p))
        .collect()
}
