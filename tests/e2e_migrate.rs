//! E2E tests for the migrate command in dry-run mode (no network).

mod common;

use common::{export_row, m2g};
use predicates::prelude::*;

const HEADER: &str = "id,project,reporter,handler,priority,severity,reproducibility,\
version,target_version,category,date_submitted,os,os_build,platform,view_state,\
last_updated,summary,description,steps_to_reproduce,status,resolution,\
fixed_in_version,additional_information,attachment_count,bugnotes_count,notes,\
tags,source_related_changesets,custom_information\n";

fn write_export(rows: &[String]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("export.csv");
    let mut contents = HEADER.to_string();
    for row in rows {
        contents.push_str(row);
    }
    std::fs::write(&path, contents).expect("write export");
    (dir, path)
}

#[test]
fn e2e_migrate_dry_run_renders_without_network() {
    let (_dir, csv) = write_export(&[
        export_row(101, "Crash on save", "[b]It crashes[/b]"),
        export_row(102, "Slow startup", "takes [i]minutes[/i]"),
    ]);

    m2g()
        .args(["migrate", "--dry-run"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run] mantis 101: Crash on save"))
        .stdout(predicate::str::contains("[dry-run] mantis 102: Slow startup"))
        .stdout(predicate::str::contains("Found 2 issues in the CSV file"));
}

#[test]
fn e2e_migrate_dry_run_json_prints_full_payloads() {
    let (_dir, csv) = write_export(&[export_row(101, "Crash on save", "[b]It crashes[/b]")]);

    m2g()
        .args(["migrate", "--dry-run", "--json"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"Crash on save\""))
        .stdout(predicate::str::contains("***It crashes***"));
}

#[test]
fn e2e_migrate_skips_the_header_row() {
    let (_dir, csv) = write_export(&[export_row(101, "Crash on save", "boom")]);

    // The header's first field is not a numeric id, so only one issue is
    // found even though the file has two rows.
    m2g()
        .args(["migrate", "--dry-run"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 issues in the CSV file"));
}

#[test]
fn e2e_migrate_short_rows_are_skipped_not_fatal() {
    let (_dir, csv) = write_export(&[
        export_row(101, "Crash on save", "boom"),
        "103,only,three\n".to_string(),
        export_row(104, "Another one", "ok"),
    ]);

    m2g()
        .args(["migrate", "--dry-run"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run] mantis 101"))
        .stdout(predicate::str::contains("[dry-run] mantis 104"))
        .stdout(predicate::str::contains("migrated 2"));
}

#[test]
fn e2e_migrate_start_at_resumes_mid_export() {
    let (_dir, csv) = write_export(&[
        export_row(101, "First", "a"),
        export_row(102, "Second", "b"),
        export_row(103, "Third", "c"),
    ]);

    m2g()
        .args(["migrate", "--dry-run", "--start-at", "102"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("mantis 102").and(predicate::str::contains("mantis 103")))
        .stdout(predicate::str::contains("mantis 101").not());
}

#[test]
fn e2e_migrate_live_run_requires_owner_and_repo() {
    let (_dir, csv) = write_export(&[export_row(101, "Crash on save", "boom")]);

    m2g()
        .arg("migrate")
        .arg(&csv)
        .env_remove("M2G_OWNER")
        .env_remove("M2G_REPO")
        .assert()
        .failure()
        .stderr(predicate::str::contains("owner"));
}

#[test]
fn e2e_migrate_missing_export_fails_cleanly() {
    m2g()
        .args(["migrate", "--dry-run", "no-such-export.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}
