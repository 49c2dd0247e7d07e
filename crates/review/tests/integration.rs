use std::path::PathBuf;

use peergrid_review::ingest::{ingest_snapshot, Snapshot};
use peergrid_review::model::{PairingState, ReviewInput, TableShape};
use peergrid_review::{run, Cell, ReviewConfig, ReviewError, ReviewResult};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn load_input(rubric: Option<&str>, comments: Option<&str>) -> ReviewInput {
    let roster = fixture("users.json");
    let pairings = fixture("peer_reviews.json");
    let rubric = rubric.map(fixture);
    let comments = comments.map(fixture);
    ingest_snapshot(Snapshot {
        roster: &roster,
        pairings: &pairings,
        rubric: rubric.as_deref(),
        comments: comments.as_deref(),
    })
    .unwrap()
}

fn load_and_run(config_toml: &str, rubric: Option<&str>, comments: Option<&str>) -> ReviewResult {
    let config = ReviewConfig::from_toml(config_toml).unwrap();
    run(&config, &load_input(rubric, comments)).unwrap()
}

// -------------------------------------------------------------------------
// Assessment table
// -------------------------------------------------------------------------

#[test]
fn one_row_per_pairing() {
    let result = load_and_run("name = \"Essay\"", Some("rubric.json"), None);
    assert_eq!(result.meta.shape, TableShape::Full);
    assert_eq!(result.assessments.rows.len(), 7);
    assert_eq!(result.summary.pairings, 7);
    // 9006 has no pairing and must not add a row.
    assert_eq!(result.summary.assessed, 5);
    assert_eq!(result.summary.unmatched, 2);
}

#[test]
fn criterion_columns_follow_rubric_order() {
    let result = load_and_run("name = \"Essay\"", Some("rubric.json"), None);
    let table = result.assessments.to_table();
    assert_eq!(
        table.headers,
        vec![
            "Assessor",
            "Assessee",
            "Review State",
            "Total Score (10.0)",
            "Argument (6.0)",
            "Style (4.0)",
        ]
    );
    for row in &table.rows {
        assert_eq!(row.len(), table.headers.len());
    }
}

#[test]
fn joined_values_land_in_their_columns() {
    let result = load_and_run("name = \"Essay\"", Some("rubric.json"), None);
    let table = result.assessments.to_table();

    assert_eq!(table.get(0, "Assessor"), Some(&Cell::Text("Grace Hopper".into())));
    assert_eq!(table.get(0, "Assessee"), Some(&Cell::Text("Ada Lovelace".into())));
    assert_eq!(table.get(0, "Total Score (10.0)"), Some(&Cell::Number(5.0)));
    assert_eq!(table.get(0, "Argument (6.0)"), Some(&Cell::Number(3.0)));
    assert_eq!(table.get(0, "Style (4.0)"), Some(&Cell::Number(2.0)));

    // Assigned pairing without an assessment.
    assert_eq!(table.get(4, "Review State"), Some(&Cell::Text("assigned".into())));
    assert_eq!(table.get(4, "Total Score (10.0)"), Some(&Cell::Empty));
    assert_eq!(table.get(4, "Argument (6.0)"), Some(&Cell::Empty));
}

#[test]
fn invalid_points_null_the_cell_only() {
    let result = load_and_run("name = \"Essay\"", Some("rubric.json"), None);
    let row = &result.assessments.rows[6];
    assert_eq!(row.reviewee_name, "Edsger Dijkstra");
    assert!(row.invalid_rubric_data);
    assert_eq!(row.criteria, vec![Some(4.0), None]);
    assert_eq!(row.total_score, Some(4.0));
    assert_eq!(result.summary.invalid_rows, 1);
}

#[test]
fn unknown_reviewer_gets_sentinel() {
    let result = load_and_run("name = \"Essay\"", Some("rubric.json"), None);
    let rows = &result.assessments.rows;
    assert_eq!(rows[5].reviewer_name, "User Not Found");
    assert_eq!(rows[5].reviewee_name, "Alan Turing");
    assert_eq!(rows[4].reviewer_name, "Ada Lovelace");
    assert_eq!(result.summary.unresolved_names, 1);
}

#[test]
fn custom_not_found_label() {
    let toml = "name = \"Essay\"\n[options]\nnot_found_label = \"Not Found\"\n";
    let result = load_and_run(toml, Some("rubric.json"), None);
    assert_eq!(result.assessments.rows[5].reviewer_name, "Not Found");
}

#[test]
fn rubric_without_assessments_is_schema_complete() {
    let result = load_and_run("name = \"Draft\"", Some("rubric_no_assessments.json"), None);
    assert_eq!(result.meta.shape, TableShape::SchemaOnly);
    let table = result.assessments.to_table();
    assert_eq!(table.rows.len(), 7);
    assert!(table.column("Argument (6.0)").is_some());
    assert!(table.column("Style (4.0)").is_some());
    assert!(table.column("Total Score (10.0)").is_none());
    assert_eq!(table.headers.len(), 5);
    for r in 0..table.rows.len() {
        assert_eq!(table.get(r, "Argument (6.0)"), Some(&Cell::Empty));
        assert_eq!(table.get(r, "Style (4.0)"), Some(&Cell::Empty));
    }
    assert_eq!(result.overview.review_columns, 0);
}

#[test]
fn no_rubric_gives_bare_table() {
    let result = load_and_run("name = \"No Rubric\"", None, None);
    assert_eq!(result.meta.shape, TableShape::Bare);
    let table = result.assessments.to_table();
    assert_eq!(table.headers, vec!["Assessor", "Assessee", "Review State"]);
    assert_eq!(table.rows.len(), 7);
}

#[test]
fn assessments_without_rubric_fail_with_explanation() {
    let mut input = load_input(Some("rubric.json"), None);
    input.rubric = None;
    let err = run(&ReviewConfig::named("Essay"), &input).unwrap_err();
    assert!(matches!(err, ReviewError::MissingRubric { assessments: 6 }));
    assert!(err.is_structural());
}

// -------------------------------------------------------------------------
// Comments
// -------------------------------------------------------------------------

#[test]
fn embedded_comments_attach_by_reviewer() {
    let toml = "name = \"Essay\"\n[options]\ninclude_comments = true\n";
    let result = load_and_run(toml, Some("rubric.json"), None);
    let rows = &result.assessments.rows;
    assert_eq!(
        rows[0].comments,
        Some(vec![
            "Strong opening.".to_string(),
            "Cite your sources in section 2.".to_string(),
        ])
    );
    // The reviewee's own reply is keyed to them, not to any reviewer row.
    assert_eq!(rows[2].comments, Some(Vec::new()));

    let table = result.assessments.to_table();
    assert_eq!(
        table.get(0, "Comments"),
        Some(&Cell::Text(r#"["Strong opening.","Cite your sources in section 2."]"#.into()))
    );
    assert_eq!(table.get(1, "Comments"), Some(&Cell::Text("[]".into())));
}

#[test]
fn flat_comment_file_overrides_embedded() {
    let toml = "name = \"Essay\"\n[options]\ninclude_comments = true\n";
    let result = load_and_run(toml, Some("rubric.json"), Some("comments.json"));
    let rows = &result.assessments.rows;
    assert_eq!(rows[0].comments, Some(Vec::new()));
    assert_eq!(
        rows[1].comments,
        Some(vec!["Nice diagrams.".to_string(), "See margin notes.".to_string()])
    );
    assert_eq!(rows[3].comments, Some(vec!["Conclusion feels rushed.".to_string()]));
}

#[test]
fn criterion_comment_columns() {
    let toml = "name = \"Essay\"\n[options]\ninclude_criterion_comments = true\n";
    let result = load_and_run(toml, Some("rubric.json"), None);
    let table = result.assessments.to_table();
    assert_eq!(
        table.get(0, "Argument (6.0) comment"),
        Some(&Cell::Text("Thesis is buried.".into()))
    );
    assert_eq!(table.get(0, "Style (4.0) comment"), Some(&Cell::Empty));
}

// -------------------------------------------------------------------------
// Overview
// -------------------------------------------------------------------------

#[test]
fn overview_counts_and_review_columns() {
    let result = load_and_run("name = \"Essay\"", Some("rubric.json"), None);
    let overview = &result.overview;

    assert_eq!(overview.rows.len(), 4);
    assert_eq!(overview.review_columns, 2);

    let ada = &overview.rows[0];
    assert_eq!((ada.assigned, ada.completed), (2, 1));
    assert_eq!(ada.review_scores, vec![5.0, 8.0]);

    let grace = &overview.rows[1];
    assert_eq!((grace.assigned, grace.completed), (2, 2));
    assert_eq!(grace.review_scores, vec![3.0, 9.0]);

    let alan = &overview.rows[2];
    assert_eq!((alan.assigned, alan.completed), (2, 2));
    assert!(alan.review_scores.is_empty());

    let table = overview.to_table();
    assert_eq!(
        table.headers,
        vec![
            "User ID",
            "Name",
            "Num Assigned Peer Reviews",
            "Num Completed Peer Reviews",
            "Review: 1",
            "Review: 2",
        ]
    );
    assert_eq!(table.get(3, "Review: 1"), Some(&Cell::Number(4.0)));
    assert_eq!(table.get(3, "Review: 2"), Some(&Cell::Empty));
    assert_eq!(table.get(2, "Review: 1"), Some(&Cell::Empty));
}

#[test]
fn overview_csv_output() {
    let result = load_and_run("name = \"Essay\"", Some("rubric.json"), None);
    let csv = result.overview.to_table().to_csv_string().unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "User ID,Name,Num Assigned Peer Reviews,Num Completed Peer Reviews,Review: 1,Review: 2"
    );
    assert_eq!(lines[1], "101,Ada Lovelace,2,1,5.0,8.0");
    assert_eq!(lines[3], "103,Alan Turing,2,2,,");
    assert_eq!(lines.len(), 5);
}

#[test]
fn pairing_state_is_reported_not_changed() {
    let result = load_and_run("name = \"Essay\"", Some("rubric.json"), None);
    let states: Vec<PairingState> = result.assessments.rows.iter().map(|r| r.state).collect();
    assert_eq!(
        states,
        vec![
            PairingState::Completed,
            PairingState::Completed,
            PairingState::Completed,
            PairingState::Completed,
            PairingState::Assigned,
            PairingState::Assigned,
            PairingState::Completed,
        ]
    );
    assert_eq!(result.summary.completed, 5);
}

#[test]
fn fixture_config_parses() {
    let config = ReviewConfig::from_toml(&fixture("review.toml")).unwrap();
    assert_eq!(config.name, "CPSC 110 Essay 2");
    assert_eq!(config.inputs.rubric.as_deref(), Some("rubric.json"));
    assert!(config.options.include_comments);
}

#[test]
fn csv_written_to_disk() {
    let result = load_and_run("name = \"Essay\"", Some("rubric.json"), None);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("peer_review_assessments.csv");
    let file = std::fs::File::create(&path).unwrap();
    result.assessments.to_table().write_csv(file).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), 8);
    assert!(written.contains("Grace Hopper,Ada Lovelace,completed,5.0,3.0,2.0"));
}
