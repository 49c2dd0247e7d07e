//! Typed ingestion of already-fetched LMS JSON.
//!
//! Shapes are validated once here; the rest of the engine works on the typed
//! model and never re-checks fields.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::error::ReviewError;
use crate::model::{
    ArtifactId, AssessmentRecord, Comment, CriterionScore, PairingState, Participant,
    PeerReviewPairing, Points, ReviewInput, Rubric, RubricCriterion, UserId,
};

// ---------------------------------------------------------------------------
// Raw shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawUser {
    id: UserId,
    name: String,
    #[serde(default)]
    sis_user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPairing {
    user_id: UserId,
    assessor_id: UserId,
    asset_id: ArtifactId,
    workflow_state: String,
    #[serde(default)]
    submission_comments: Option<Vec<RawSubmissionComment>>,
}

#[derive(Debug, Deserialize)]
struct RawSubmissionComment {
    #[serde(default)]
    id: Option<u64>,
    author_id: UserId,
    comment: String,
}

#[derive(Debug, Deserialize)]
struct RawRubric {
    #[serde(default)]
    points_possible: Option<Number>,
    data: Vec<RawCriterion>,
    #[serde(default)]
    assessments: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawCriterion {
    id: String,
    description: String,
    points: Number,
}

#[derive(Debug, Deserialize)]
struct RawAssessment {
    assessor_id: UserId,
    artifact_id: ArtifactId,
    #[serde(default)]
    score: Option<Value>,
    #[serde(default)]
    data: Option<Vec<RawAssessmentItem>>,
}

#[derive(Debug, Deserialize)]
struct RawAssessmentItem {
    criterion_id: String,
    #[serde(default)]
    points: Option<Value>,
    #[serde(default)]
    comments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    artifact_id: ArtifactId,
    reviewee_id: UserId,
    #[serde(alias = "reviewer_id")]
    author_id: UserId,
    #[serde(alias = "text")]
    comment: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a JSON array record by record so errors name the offending index.
fn parse_records<T: DeserializeOwned>(source: &str, json: &str) -> Result<Vec<T>, ReviewError> {
    let values: Vec<Value> =
        serde_json::from_str(json).map_err(|e| ReviewError::ingest(source, e.to_string()))?;
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            serde_json::from_value(v)
                .map_err(|e| ReviewError::ingest(source, format!("record {i}: {e}")))
        })
        .collect()
}

/// Rubric points, keeping integer-ness of the source literal.
fn points(n: &Number) -> Points {
    match n.as_i64() {
        Some(i) => Points::integer(i),
        None => Points::float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

/// A finite JSON number, or `None` for null / strings / anything else.
fn numeric(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Public parsers
// ---------------------------------------------------------------------------

pub fn parse_roster(json: &str) -> Result<Vec<Participant>, ReviewError> {
    let users: Vec<RawUser> = parse_records("roster", json)?;
    Ok(users
        .into_iter()
        .map(|u| Participant {
            id: u.id,
            display_name: u.name,
            external_sid: u.sis_user_id.unwrap_or_default(),
        })
        .collect())
}

pub fn parse_pairings(json: &str) -> Result<Vec<PeerReviewPairing>, ReviewError> {
    let raw: Vec<RawPairing> = parse_records("pairings", json)?;
    Ok(raw
        .iter()
        .map(|p| PeerReviewPairing {
            reviewee_id: p.user_id,
            reviewer_id: p.assessor_id,
            artifact_id: p.asset_id,
            state: PairingState::from_workflow_state(&p.workflow_state),
        })
        .collect())
}

/// Identity of an embedded comment: its LMS id, or its full content when the
/// id is absent.
#[derive(Debug, PartialEq, Eq, Hash)]
enum EmbeddedCommentKey {
    Id(u64),
    Content(ArtifactId, UserId, UserId, String),
}

/// Comments embedded in pairing records (`submission_comments`).
///
/// The list hangs off the submission, so every pairing on the same artifact
/// repeats it. Each comment is kept once, in first-seen order.
pub fn comments_from_pairings(json: &str) -> Result<Vec<Comment>, ReviewError> {
    let raw: Vec<RawPairing> = parse_records("pairings", json)?;
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for p in raw {
        for c in p.submission_comments.unwrap_or_default() {
            let key = match c.id {
                Some(id) => EmbeddedCommentKey::Id(id),
                None => EmbeddedCommentKey::Content(p.asset_id, p.user_id, c.author_id, c.comment.clone()),
            };
            if !seen.insert(key) {
                continue;
            }
            out.push(Comment {
                artifact_id: p.asset_id,
                reviewee_id: p.user_id,
                reviewer_id: c.author_id,
                text: c.comment,
            });
        }
    }
    Ok(out)
}

pub fn parse_comments(json: &str) -> Result<Vec<Comment>, ReviewError> {
    let raw: Vec<RawComment> = parse_records("comments", json)?;
    Ok(raw
        .into_iter()
        .map(|c| Comment {
            artifact_id: c.artifact_id,
            reviewee_id: c.reviewee_id,
            reviewer_id: c.author_id,
            text: c.comment,
        })
        .collect())
}

/// Parsed rubric document: definition plus its embedded assessments.
#[derive(Debug, Clone)]
pub struct RubricDocument {
    pub rubric: Rubric,
    pub assessments: Vec<AssessmentRecord>,
}

pub fn parse_rubric(json: &str) -> Result<RubricDocument, ReviewError> {
    let raw: RawRubric =
        serde_json::from_str(json).map_err(|e| ReviewError::ingest("rubric", e.to_string()))?;

    let criteria: Vec<RubricCriterion> = raw
        .data
        .into_iter()
        .map(|c| RubricCriterion {
            criterion_id: c.id,
            description: c.description,
            max_points: points(&c.points),
        })
        .collect();
    let points_possible = match raw.points_possible {
        Some(n) => points(&n),
        None => Points::total(criteria.iter().map(|c| &c.max_points)),
    };

    let mut assessments = Vec::new();
    for (i, v) in raw.assessments.unwrap_or_default().into_iter().enumerate() {
        let a: RawAssessment = serde_json::from_value(v)
            .map_err(|e| ReviewError::ingest("rubric", format!("assessment {i}: {e}")))?;
        assessments.push(AssessmentRecord {
            reviewer_id: a.assessor_id,
            artifact_id: a.artifact_id,
            total_score: numeric(a.score.as_ref()),
            per_criterion: a
                .data
                .unwrap_or_default()
                .into_iter()
                .map(|item| CriterionScore {
                    criterion_id: item.criterion_id,
                    points: numeric(item.points.as_ref()),
                    comment: item.comments.filter(|c| !c.is_empty()),
                })
                .collect(),
        });
    }

    Ok(RubricDocument {
        rubric: Rubric {
            points_possible,
            criteria,
        },
        assessments,
    })
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Raw document contents for one run. File reading belongs to the caller.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub roster: &'a str,
    pub pairings: &'a str,
    pub rubric: Option<&'a str>,
    pub comments: Option<&'a str>,
}

/// Turn a snapshot into typed engine input.
pub fn ingest_snapshot(snapshot: Snapshot<'_>) -> Result<ReviewInput, ReviewError> {
    let roster = parse_roster(snapshot.roster)?;
    let pairings = parse_pairings(snapshot.pairings)?;

    let (rubric, assessments) = match snapshot.rubric {
        Some(json) => {
            let doc = parse_rubric(json)?;
            (Some(doc.rubric), doc.assessments)
        }
        None => (None, Vec::new()),
    };

    let comments = match snapshot.comments {
        Some(json) => parse_comments(json)?,
        None => comments_from_pairings(snapshot.pairings)?,
    };

    tracing::debug!(
        participants = roster.len(),
        pairings = pairings.len(),
        assessments = assessments.len(),
        comments = comments.len(),
        rubric = rubric.is_some(),
        "snapshot ingested"
    );

    Ok(ReviewInput {
        roster,
        pairings,
        assessments,
        rubric,
        comments,
    })
}
