//! `peergrid-review`: peer-review reconciliation engine.
//!
//! Pure engine crate: receives a pre-loaded roster, pairing list, rubric and
//! assessments, returns the assessment and overview tables. No CLI and no
//! output files; the `ingest` module only parses already-fetched JSON.

pub mod comments;
pub mod config;
pub mod engine;
pub mod error;
pub mod expand;
pub mod identity;
pub mod ingest;
pub mod model;
pub mod overview;
pub mod reconcile;
pub mod schema;
pub mod summary;
pub mod table;

pub use config::ReviewConfig;
pub use engine::run;
pub use error::ReviewError;
pub use model::{ReviewInput, ReviewResult};
pub use table::{Cell, Table};
