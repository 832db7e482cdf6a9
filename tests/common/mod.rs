#![allow(dead_code)]

use std::sync::Once;

use assert_cmd::Command;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        mantis2github::logging::init_test_logging();
    });
}

/// Command builder for the `m2g` binary.
pub fn m2g() -> Command {
    init_test_logging();
    Command::cargo_bin("m2g").expect("m2g binary")
}

/// A full-width Mantis export row with the given id and summary. Fields
/// beyond the ones a test cares about stay empty.
pub fn export_row(id: u64, summary: &str, description: &str) -> String {
    let mut fields = vec![String::new(); 29];
    fields[0] = id.to_string();
    fields[1] = "Core".to_string();
    fields[2] = "alice".to_string();
    fields[9] = "Bug".to_string();
    fields[10] = "2021-01-01".to_string();
    fields[16] = summary.to_string();
    fields[17] = description.to_string();
    fields[19] = "new".to_string();
    fields.join(",") + "\n"
}
