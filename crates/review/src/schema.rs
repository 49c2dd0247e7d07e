use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Points, RubricCriterion};

/// A criterion column: source id plus its display header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionColumn {
    pub criterion_id: String,
    pub name: String,
}

/// Stable `criterion_id → column name` mapping, fixed before any row is built.
///
/// Column order is rubric order. A repeated `criterion_id` keeps the position of
/// its first occurrence and takes the name of its last.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CriterionSchema {
    columns: Vec<CriterionColumn>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl CriterionSchema {
    pub fn resolve(criteria: &[RubricCriterion]) -> Self {
        let mut schema = Self::default();
        for criterion in criteria {
            let name = column_name(criterion);
            match schema.index.get(&criterion.criterion_id) {
                Some(&pos) => {
                    tracing::debug!(
                        criterion_id = %criterion.criterion_id,
                        "duplicate rubric criterion id; last definition wins"
                    );
                    schema.columns[pos].name = name;
                }
                None => {
                    schema
                        .index
                        .insert(criterion.criterion_id.clone(), schema.columns.len());
                    schema.columns.push(CriterionColumn {
                        criterion_id: criterion.criterion_id.clone(),
                        name,
                    });
                }
            }
        }
        schema
    }

    pub fn columns(&self) -> &[CriterionColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column position for a criterion id.
    pub fn position(&self, criterion_id: &str) -> Option<usize> {
        self.index.get(criterion_id).copied()
    }

    pub fn name_of(&self, criterion_id: &str) -> Option<&str> {
        self.position(criterion_id).map(|i| self.columns[i].name.as_str())
    }
}

/// `"{description} ({max_points})"`, points printed as the source wrote them.
pub fn column_name(criterion: &RubricCriterion) -> String {
    format!("{} ({})", criterion.description, criterion.max_points)
}

pub fn comment_column_name(column: &str) -> String {
    format!("{column} comment")
}

pub fn total_score_column_name(points_possible: Points) -> String {
    format!("Total Score ({points_possible})")
}
