//! CLI command tests

use std::io::Write;
use std::path::PathBuf;

use crate::commands::{self, parse_scope};
use resid_core::Processor;

fn temp_db(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("resid.db")
}

fn write_fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_parse_scope() {
    assert_eq!(parse_scope(None).unwrap(), None);
    assert_eq!(
        parse_scope(Some("clearent")).unwrap(),
        Some(Processor::Clearent)
    );
    assert!(parse_scope(Some("stripe")).is_err());
}

#[test]
fn test_cmd_init_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = temp_db(&dir);
    assert!(commands::cmd_init(&db_path).is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_cmd_import_then_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = temp_db(&dir);
    let file = write_fixture(
        &dir,
        "clearent_june2025.csv",
        "Merchant ID,Merchant Name,Net\n1001,Coffee Corner,125.50\n",
    );

    commands::cmd_import(&db_path, &file, None, None, false).unwrap();
    commands::cmd_metrics(&db_path, Some("clearent"), None, None, true).unwrap();
    commands::cmd_status(&db_path).unwrap();
}

#[test]
fn test_cmd_metrics_normalizes_window_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = temp_db(&dir);
    let file = write_fixture(
        &dir,
        "clearent_june2025.csv",
        "Merchant ID,Merchant Name,Net\n1001,Coffee Corner,125.50\n",
    );
    commands::cmd_import(&db_path, &file, None, None, false).unwrap();

    // Any accepted month format works as a bound, not just YYYY-MM
    commands::cmd_metrics(&db_path, None, Some("06/2025"), Some("June 2025"), true).unwrap();

    // Garbage bounds are an error, never a silently empty window
    assert!(commands::cmd_metrics(&db_path, None, Some("last month"), None, true).is_err());
}

#[test]
fn test_cmd_import_rejects_unknown_processor() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = temp_db(&dir);
    let file = write_fixture(
        &dir,
        "mystery.csv",
        "Merchant ID,Merchant Name,Net\n1001,Coffee Corner,125.50\n",
    );

    assert!(commands::cmd_import(&db_path, &file, None, None, false).is_err());
}

#[test]
fn test_cmd_import_fails_when_nothing_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = temp_db(&dir);
    // Clearent without a net column: every row is rejected
    let file = write_fixture(
        &dir,
        "clearent_june2025_broken.csv",
        "Merchant ID,Merchant Name,Sales Amount\n1001,Coffee Corner,900.00\n",
    );

    assert!(commands::cmd_import(&db_path, &file, None, None, false).is_err());
}

#[test]
fn test_analyzer_commands_run_against_imported_data() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = temp_db(&dir);
    let may = write_fixture(
        &dir,
        "clearent_may2025.csv",
        "Merchant ID,Merchant Name,Net\n1001,Coffee Corner,200.00\n1002,Bagel Barn,90.00\n",
    );
    let june = write_fixture(
        &dir,
        "clearent_june2025.csv",
        "Merchant ID,Merchant Name,Net\n1001,Coffee Corner,120.00\n1003,Taco Tent,80.00\n",
    );

    commands::cmd_import(&db_path, &may, None, None, false).unwrap();
    commands::cmd_import(&db_path, &june, None, None, false).unwrap();

    commands::cmd_top(&db_path, None, None, 10, true).unwrap();
    commands::cmd_concentration(&db_path, None, None, true).unwrap();
    commands::cmd_cohort(&db_path, None, true).unwrap();
    commands::cmd_at_risk(&db_path, None, true).unwrap();
    commands::cmd_forecast(&db_path, None, true).unwrap();
    commands::cmd_reset(&db_path, true).unwrap();
}
