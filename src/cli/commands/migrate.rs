//! Migrate command implementation.
//!
//! Drives the pipeline: CSV rows in, converted GitHub issues out. Per-row
//! problems (undecodable rows, non-issue rows, short rows) are logged and
//! skipped; submission failures abort the run so a partial migration can be
//! resumed with --start-at.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::bbcode::BbcodeConverter;
use crate::cli::MigrateArgs;
use crate::config::{self, Credentials, Settings};
use crate::error::Result;
use crate::github::GithubClient;
use crate::record::{MantisIssue, RenderMaps};

/// Execute the migrate command.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the export cannot be
/// opened, or an issue submission fails.
pub fn execute(args: &MigrateArgs) -> Result<()> {
    let settings = Settings::load(
        args.settings
            .as_deref()
            .unwrap_or_else(|| Path::new(config::DEFAULT_SETTINGS_FILE)),
    )?;
    let usernames = config::load_map(args.user_map.as_deref().or(settings.user_map.as_deref()))?;
    let labels = config::load_map(args.label_map.as_deref().or(settings.label_map.as_deref()))?;
    let tracker_url = args
        .tracker_url
        .clone()
        .unwrap_or_else(|| settings.tracker_url.clone());

    let client = if args.dry_run {
        None
    } else {
        let target = config::resolve_target(args.owner.as_deref(), args.repo.as_deref(), &settings)?;
        let credentials = Credentials::load(
            args.credentials
                .as_deref()
                .unwrap_or_else(|| Path::new(config::DEFAULT_CREDENTIALS_FILE)),
        )?;
        info!(owner = %target.owner, repo = %target.repo, "migrating to GitHub");
        Some(GithubClient::new(
            &target.owner,
            &target.repo,
            &credentials.apikey,
            Duration::from_secs(settings.pace_seconds),
        )?)
    };

    let converter = BbcodeConverter::with_username_map(usernames.clone());
    let maps = RenderMaps { usernames, labels };

    // Field sizes are unbounded: some ticket bodies are very large. The
    // reader is flexible so short rows reach the per-row length check.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(&args.csv)?;
    let mut id_map = args.id_map.as_ref().map(File::create).transpose()?;

    let progress = ProgressBar::new_spinner();
    let mut waiting_for = args.start_at;
    let mut found = 0u64;
    let mut migrated = 0u64;

    for (row, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("CSV reader encountered an error and skipped row {}: {e}", row + 1);
                continue;
            }
        };
        let Some(id) = MantisIssue::row_id(&record) else {
            warn!("skipping row {} with no numeric issue id", row + 1);
            continue;
        };
        if let Some(start) = waiting_for {
            if id == start {
                waiting_for = None;
            } else {
                debug!(id, "skipping row before the resume point");
                continue;
            }
        }
        found += 1;

        let issue = match MantisIssue::from_record(&record) {
            Ok(issue) => issue,
            Err(e) => {
                warn!(id, "skipping malformed row: {e}");
                continue;
            }
        };

        debug!(id, "processing issue");
        progress.set_message(format!("issue {id}"));
        let request = issue.to_issue_request(&converter, &maps, &tracker_url);

        if let Some(client) = &client {
            let created = client.create_issue(&request)?;
            info!(
                "Mantis issue {id} migrated to GitHub issue {} ({})",
                created.number, created.html_url
            );
            if let Some(file) = id_map.as_mut() {
                writeln!(file, "{id},{}", created.number)?;
            }
        } else if args.json {
            let payload = serde_json::to_string_pretty(&request)?;
            progress.suspend(|| println!("{payload}"));
        } else {
            progress.suspend(|| println!("[dry-run] mantis {id}: {}", request.title));
        }
        migrated += 1;
        progress.inc(1);
    }

    progress.finish_and_clear();
    info!(found, migrated, "migration finished");
    println!("Found {found} issues in the CSV file; migrated {migrated}");
    Ok(())
}
