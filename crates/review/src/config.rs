use serde::Deserialize;

use crate::error::ReviewError;
use crate::identity::NOT_FOUND_LABEL;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Run context. Passed explicitly into every engine call; nothing is held in
/// process-wide state.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewConfig {
    pub name: String,
    #[serde(default)]
    pub inputs: InputsConfig,
    #[serde(default)]
    pub options: ReviewOptions,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Snapshot file locations, relative to the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputsConfig {
    #[serde(default = "default_roster")]
    pub roster: String,
    #[serde(default = "default_pairings")]
    pub pairings: String,
    /// Rubric with embedded assessments. Absent when the assignment has no rubric.
    #[serde(default)]
    pub rubric: Option<String>,
    /// Flat comment list. When absent, comments embedded in the pairing file are used.
    #[serde(default)]
    pub comments: Option<String>,
}

fn default_roster() -> String {
    "users.json".into()
}

fn default_pairings() -> String {
    "peer_reviews.json".into()
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            roster: default_roster(),
            pairings: default_pairings(),
            rubric: None,
            comments: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewOptions {
    /// Attach grouped reviewer comments to each assessment row.
    #[serde(default)]
    pub include_comments: bool,
    /// Emit a `"{column} comment"` sibling for every criterion column.
    #[serde(default)]
    pub include_criterion_comments: bool,
    #[serde(default = "default_not_found_label")]
    pub not_found_label: String,
}

fn default_not_found_label() -> String {
    NOT_FOUND_LABEL.into()
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            include_comments: false,
            include_criterion_comments: false,
            not_found_label: default_not_found_label(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
    /// Write into a `{name}({timestamp})` subdirectory of `dir`.
    #[serde(default = "default_timestamped")]
    pub timestamped: bool,
}

fn default_output_dir() -> String {
    "peer_review_data".into()
}

fn default_timestamped() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            timestamped: default_timestamped(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReviewConfig {
    /// Config with defaults for everything but the run name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: InputsConfig::default(),
            options: ReviewOptions::default(),
            output: OutputConfig::default(),
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, ReviewError> {
        let config: ReviewConfig =
            toml::from_str(input).map_err(|e| ReviewError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReviewError> {
        if self.name.trim().is_empty() {
            return Err(ReviewError::ConfigValidation("name must not be empty".into()));
        }

        let paths = [
            ("inputs.roster", Some(&self.inputs.roster)),
            ("inputs.pairings", Some(&self.inputs.pairings)),
            ("inputs.rubric", self.inputs.rubric.as_ref()),
            ("inputs.comments", self.inputs.comments.as_ref()),
        ];
        for (key, path) in paths {
            if path.is_some_and(|p| p.trim().is_empty()) {
                return Err(ReviewError::ConfigValidation(format!("{key} must not be empty")));
            }
        }

        if self.options.not_found_label.is_empty() {
            return Err(ReviewError::ConfigValidation(
                "options.not_found_label must not be empty".into(),
            ));
        }

        if self.output.dir.trim().is_empty() {
            return Err(ReviewError::ConfigValidation("output.dir must not be empty".into()));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
