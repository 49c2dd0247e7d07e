use std::collections::HashMap;

use crate::model::{ArtifactId, AssessmentRow, Comment, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommentKey {
    pub artifact_id: ArtifactId,
    pub reviewee_id: UserId,
    pub reviewer_id: UserId,
}

/// Comments grouped by `(artifact, reviewee, reviewer)`, submission order kept.
#[derive(Debug, Default)]
pub struct CommentIndex {
    groups: HashMap<CommentKey, Vec<String>>,
}

impl CommentIndex {
    pub fn group(comments: &[Comment]) -> Self {
        let mut groups: HashMap<CommentKey, Vec<String>> = HashMap::new();
        for c in comments {
            let key = CommentKey {
                artifact_id: c.artifact_id,
                reviewee_id: c.reviewee_id,
                reviewer_id: c.reviewer_id,
            };
            groups.entry(key).or_default().push(c.text.clone());
        }
        Self { groups }
    }

    pub fn get(&self, key: &CommentKey) -> Option<&[String]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Left-join grouped comments onto rows. Rows without comments get an empty list.
pub fn attach_comments(rows: Vec<AssessmentRow>, index: &CommentIndex) -> Vec<AssessmentRow> {
    rows.into_iter()
        .map(|row| {
            let key = CommentKey {
                artifact_id: row.artifact_id,
                reviewee_id: row.reviewee_id,
                reviewer_id: row.reviewer_id,
            };
            let comments = index.get(&key).map(<[String]>::to_vec).unwrap_or_default();
            AssessmentRow {
                comments: Some(comments),
                ..row
            }
        })
        .collect()
}
