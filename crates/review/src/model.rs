use serde::{Serialize, Serializer};

use crate::schema::CriterionSchema;
use crate::table::format_points;

/// Numeric participant / artifact identifier as issued by the source LMS.
pub type UserId = u64;
pub type ArtifactId = u64;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A rubric point value. Remembers whether the source wrote it as an integer
/// so headers print `(25)` for `25` and `(25.0)` for `25.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Points {
    value: f64,
    integer: bool,
}

impl Points {
    pub fn float(value: f64) -> Self {
        Self { value, integer: false }
    }

    pub fn integer(value: i64) -> Self {
        Self { value: value as f64, integer: true }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_integer(&self) -> bool {
        self.integer
    }

    /// Sum of criterion points; integral only when every term is.
    pub fn total<'a>(points: impl IntoIterator<Item = &'a Points>) -> Self {
        points.into_iter().fold(Self::integer(0), |acc, p| Self {
            value: acc.value + p.value,
            integer: acc.integer && p.integer,
        })
    }
}

impl std::fmt::Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.integer {
            write!(f, "{:.0}", self.value)
        } else {
            f.write_str(&format_points(self.value))
        }
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.integer {
            serializer.serialize_i64(self.value as i64)
        } else {
            serializer.serialize_f64(self.value)
        }
    }
}

/// One roster entry. Uniquely keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Participant {
    pub id: UserId,
    pub display_name: String,
    pub external_sid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RubricCriterion {
    pub criterion_id: String,
    pub description: String,
    pub max_points: Points,
}

/// Rubric definition. Criterion order is the declared order and drives column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rubric {
    pub points_possible: Points,
    pub criteria: Vec<RubricCriterion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingState {
    Assigned,
    Completed,
}

impl PairingState {
    /// Source workflow states other than `completed` count as still assigned.
    pub fn from_workflow_state(state: &str) -> Self {
        if state.eq_ignore_ascii_case("completed") {
            Self::Completed
        } else {
            Self::Assigned
        }
    }
}

impl std::fmt::Display for PairingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assigned => write!(f, "assigned"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// A reviewer assigned to assess a reviewee's artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerReviewPairing {
    pub reviewee_id: UserId,
    pub reviewer_id: UserId,
    pub artifact_id: ArtifactId,
    pub state: PairingState,
}

impl PeerReviewPairing {
    pub fn join_key(&self) -> JoinKey {
        JoinKey {
            reviewer_id: self.reviewer_id,
            artifact_id: self.artifact_id,
        }
    }
}

/// Points awarded for one criterion. `points` is `None` when the source value
/// was missing or not a finite number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionScore {
    pub criterion_id: String,
    pub points: Option<f64>,
    pub comment: Option<String>,
}

/// A submitted, scored review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentRecord {
    pub reviewer_id: UserId,
    pub artifact_id: ArtifactId,
    pub total_score: Option<f64>,
    pub per_criterion: Vec<CriterionScore>,
}

impl AssessmentRecord {
    pub fn join_key(&self) -> JoinKey {
        JoinKey {
            reviewer_id: self.reviewer_id,
            artifact_id: self.artifact_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub artifact_id: ArtifactId,
    pub reviewee_id: UserId,
    pub reviewer_id: UserId,
    pub text: String,
}

/// Join key between pairings and assessments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JoinKey {
    pub reviewer_id: UserId,
    pub artifact_id: ArtifactId,
}

/// Pre-loaded inputs for one run.
#[derive(Debug, Clone, Default)]
pub struct ReviewInput {
    pub roster: Vec<Participant>,
    pub pairings: Vec<PeerReviewPairing>,
    pub assessments: Vec<AssessmentRecord>,
    pub rubric: Option<Rubric>,
    pub comments: Vec<Comment>,
}

// ---------------------------------------------------------------------------
// Assessment table
// ---------------------------------------------------------------------------

/// Which reconciliation branch produced the assessment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableShape {
    /// Rubric present and at least one assessment joined.
    Full,
    /// Rubric present, no assessments: criterion columns exist but are empty.
    SchemaOnly,
    /// No rubric: identity and state columns only.
    Bare,
}

impl std::fmt::Display for TableShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::SchemaOnly => write!(f, "schema_only"),
            Self::Bare => write!(f, "bare"),
        }
    }
}

/// One row per pairing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentRow {
    pub reviewer_id: UserId,
    pub reviewee_id: UserId,
    pub artifact_id: ArtifactId,
    pub reviewer_name: String,
    pub reviewee_name: String,
    pub state: PairingState,
    pub total_score: Option<f64>,
    /// One cell per schema column, in schema order.
    pub criteria: Vec<Option<f64>>,
    /// Present only when per-criterion comments are included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criterion_comments: Option<Vec<Option<String>>>,
    /// Present only when comment attachment is enabled; empty when none matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,
    pub invalid_rubric_data: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentTable {
    pub shape: TableShape,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<CriterionSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_possible: Option<Points>,
    pub include_criterion_comments: bool,
    pub include_comments: bool,
    pub rows: Vec<AssessmentRow>,
}

// ---------------------------------------------------------------------------
// Overview table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewRow {
    pub user_id: UserId,
    pub name: String,
    pub assigned: usize,
    pub completed: usize,
    /// Scores received as reviewee, in assessment-row encounter order.
    pub review_scores: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewTable {
    /// Number of `Review: k` columns: the longest `review_scores` in the table.
    pub review_columns: usize,
    pub rows: Vec<OverviewRow>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub participants: usize,
    pub pairings: usize,
    pub completed: usize,
    pub assessed: usize,
    pub unmatched: usize,
    pub invalid_rows: usize,
    pub unresolved_names: usize,
    pub max_reviews_received: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub name: String,
    pub engine_version: String,
    pub run_at: String,
    pub shape: TableShape,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewResult {
    pub meta: RunMeta,
    pub summary: ReviewSummary,
    pub assessments: AssessmentTable,
    pub overview: OverviewTable,
}
