use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty name, blank input path, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// A source document could not be turned into typed records.
    #[error("{source_name}: {detail}")]
    Ingest { source_name: String, detail: String },
    /// No participants were supplied, so no overview can be built.
    #[error("roster is empty: at least one participant is required")]
    EmptyRoster,
    /// Completed assessments exist but there is no rubric to define their columns.
    #[error("{assessments} completed assessment(s) found but the assignment has no rubric")]
    MissingRubric { assessments: usize },
    /// IO error (file read, directory creation, etc.).
    #[error("IO error: {0}")]
    Io(String),
    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(String),
}

impl ReviewError {
    pub fn ingest(source_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Ingest {
            source_name: source_name.into(),
            detail: detail.into(),
        }
    }

    /// Structural precondition failures: no well-formed table can be produced.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::EmptyRoster | Self::MissingRubric { .. })
    }
}

impl From<csv::Error> for ReviewError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

impl From<std::io::Error> for ReviewError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
