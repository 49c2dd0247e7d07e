use std::io::Write;

use crate::error::ReviewError;
use crate::model::{AssessmentTable, OverviewTable, TableShape};
use crate::overview::review_column_name;
use crate::schema::{comment_column_name, total_score_column_name};

pub const ASSESSOR_COLUMN: &str = "Assessor";
pub const ASSESSEE_COLUMN: &str = "Assessee";
pub const STATE_COLUMN: &str = "Review State";
pub const COMMENTS_COLUMN: &str = "Comments";

pub const USER_ID_COLUMN: &str = "User ID";
pub const NAME_COLUMN: &str = "Name";
pub const ASSIGNED_COLUMN: &str = "Num Assigned Peer Reviews";
pub const COMPLETED_COLUMN: &str = "Num Completed Peer Reviews";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Integer(u64),
}

impl Cell {
    pub fn number(v: Option<f64>) -> Self {
        v.map_or(Cell::Empty, Cell::Number)
    }

    pub fn text(v: Option<&str>) -> Self {
        v.map_or(Cell::Empty, |s| Cell::Text(s.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => format_points(*v),
            Cell::Integer(v) => v.to_string(),
        }
    }
}

/// Uniform rows under a fixed header.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell lookup by row index and header name.
    pub fn get(&self, row: usize, header: &str) -> Option<&Cell> {
        let col = self.column(header)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ReviewError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(Cell::render))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, ReviewError> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| ReviewError::Csv(e.to_string()))
    }
}

/// Render points the way the source data prints floats: `25.0`, `2.5`.
pub fn format_points(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

impl AssessmentTable {
    /// `Total Score (..)` appears only when assessments were joined. The
    /// schema-only and bare shapes carry no score column.
    fn total_score_header(&self) -> Option<String> {
        match (self.shape, self.points_possible) {
            (TableShape::Full, Some(points)) => Some(total_score_column_name(points)),
            _ => None,
        }
    }

    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec![
            ASSESSOR_COLUMN.to_string(),
            ASSESSEE_COLUMN.to_string(),
            STATE_COLUMN.to_string(),
        ];
        headers.extend(self.total_score_header());
        if let Some(ref schema) = self.schema {
            for col in schema.columns() {
                headers.push(col.name.clone());
                if self.include_criterion_comments {
                    headers.push(comment_column_name(&col.name));
                }
            }
        }
        if self.include_comments {
            headers.push(COMMENTS_COLUMN.to_string());
        }
        headers
    }

    pub fn to_table(&self) -> Table {
        let width = self.schema.as_ref().map_or(0, |s| s.len());
        let with_total = self.total_score_header().is_some();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![
                    Cell::Text(row.reviewer_name.clone()),
                    Cell::Text(row.reviewee_name.clone()),
                    Cell::Text(row.state.to_string()),
                ];
                if with_total {
                    cells.push(Cell::number(row.total_score));
                }
                for i in 0..width {
                    cells.push(Cell::number(row.criteria.get(i).copied().flatten()));
                    if self.include_criterion_comments {
                        let comment = row
                            .criterion_comments
                            .as_ref()
                            .and_then(|c| c.get(i))
                            .and_then(|c| c.as_deref());
                        cells.push(Cell::text(comment));
                    }
                }
                if self.include_comments {
                    let list = row.comments.as_deref().unwrap_or_default();
                    cells.push(Cell::Text(
                        serde_json::to_string(list).unwrap_or_else(|_| "[]".into()),
                    ));
                }
                cells
            })
            .collect();

        Table {
            headers: self.headers(),
            rows,
        }
    }
}

impl OverviewTable {
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec![
            USER_ID_COLUMN.to_string(),
            NAME_COLUMN.to_string(),
            ASSIGNED_COLUMN.to_string(),
            COMPLETED_COLUMN.to_string(),
        ];
        headers.extend((1..=self.review_columns).map(review_column_name));
        headers
    }

    pub fn to_table(&self) -> Table {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![
                    Cell::Integer(row.user_id),
                    Cell::Text(row.name.clone()),
                    Cell::Integer(row.assigned as u64),
                    Cell::Integer(row.completed as u64),
                ];
                cells.extend(
                    (0..self.review_columns).map(|k| Cell::number(row.review_scores.get(k).copied())),
                );
                cells
            })
            .collect();

        Table {
            headers: self.headers(),
            rows,
        }
    }
}
