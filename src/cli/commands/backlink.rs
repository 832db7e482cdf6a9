//! Backlink command implementation.
//!
//! Reads the `mantis_id,github_id` map written by migrate --id-map and
//! emits the SQL script that inserts a migration note into each source
//! ticket (`mantis_bugnote_text_table` plus `mantis_bugnote_table`). The
//! script is generated rather than applied: the operator reviews it and
//! runs it against the Mantis database. Note text stays in BBCode since it
//! is destined for Mantis itself.

use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use crate::cli::BacklinkArgs;
use crate::config::{self, Settings};
use crate::error::Result;

/// Execute the backlink command.
///
/// # Errors
///
/// Returns an error if the map file cannot be read, the target repository
/// is not configured, or the output file cannot be written.
pub fn execute(args: &BacklinkArgs) -> Result<()> {
    let settings = Settings::load(
        args.settings
            .as_deref()
            .unwrap_or_else(|| Path::new(config::DEFAULT_SETTINGS_FILE)),
    )?;
    let target = config::resolve_target(args.owner.as_deref(), args.repo.as_deref(), &settings)?;

    let map = fs::read_to_string(&args.id_map)?;
    let stamp = Utc::now().timestamp();

    let mut script = String::new();
    script.push_str(&format!(
        "-- Mantis backlink notes generated {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    script.push_str("-- Review, then apply against the Mantis database.\n\n");

    let mut emitted = 0u64;
    for (lineno, line) in map.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((mantis_id, github_id)) = parse_map_line(line) else {
            warn!("skipping malformed map line {}: {line:?}", lineno + 1);
            continue;
        };
        let note = sql_escape(&format!(
            "This ticket has been migrated to GitHub as issue \
             [url=https://github.com/{}/{}/issues/{github_id}]{github_id}[/url].",
            target.owner, target.repo
        ));
        script.push_str(&format!(
            "INSERT INTO mantis_bugnote_text_table (id, note) VALUES (NULL, '{note}');\n"
        ));
        script.push_str(&format!(
            "INSERT INTO mantis_bugnote_table \
             (id, bug_id, reporter_id, bugnote_text_id, view_state, note_type, note_attr, \
             time_tracking, last_modified, date_submitted) \
             VALUES (NULL, {mantis_id}, {}, LAST_INSERT_ID(), 10, 0, NULL, 0, {stamp}, {stamp});\n\n",
            args.reporter_id
        ));
        emitted += 1;
    }

    match &args.output {
        Some(path) => fs::write(path, &script)?,
        None => print!("{script}"),
    }
    info!(notes = emitted, "backlink script generated");
    Ok(())
}

/// Parse one `mantis_id,github_id` map line.
fn parse_map_line(line: &str) -> Option<(u64, u64)> {
    let (mantis_id, github_id) = line.split_once(',')?;
    Some((
        mantis_id.trim().parse().ok()?,
        github_id.trim().parse().ok()?,
    ))
}

/// Escape single quotes for a SQL string literal.
fn sql_escape(text: &str) -> String {
    text.replace('\'', "''")
}
