//! Mantis issue records and GitHub payload rendering.
//!
//! A [`MantisIssue`] is one row of the Mantis CSV export. Rendering turns it
//! into the [`IssueRequest`] payload for the GitHub issues endpoint:
//! provenance line, metadata bullets, the converted report text, and the
//! ticket discussion as a trailing section.

use std::collections::HashMap;

use serde::Serialize;

use crate::bbcode::BbcodeConverter;
use crate::error::{MigrateError, Result};

/// Number of fields in a full Mantis CSV export row.
const EXPORT_FIELDS: usize = 29;

/// Separator between notes in the exported `notes` field.
const NOTE_SEPARATOR: &str = "\n=-=\n";

/// One issue row from the Mantis CSV export, fields in export order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MantisIssue {
    pub id: u64,
    pub project: String,
    pub reporter: String,
    pub handler: String,
    pub priority: String,
    pub severity: String,
    pub reproducibility: String,
    pub product_version: String,
    pub target_version: String,
    pub category: String,
    pub date_submitted: String,
    pub os: String,
    pub os_build: String,
    pub platform: String,
    pub view_state: String,
    pub updated: String,
    pub summary: String,
    pub description: String,
    pub steps_to_reproduce: String,
    pub status: String,
    pub resolution: String,
    pub fixed_in_version: String,
    pub additional_information: String,
    pub attachment_count: String,
    pub note_count: String,
    pub notes: String,
    pub tags: String,
    pub related_changesets: String,
    pub custom_information: String,
}

/// Issue-creation payload for the destination repository.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IssueRequest {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
    pub labels: Vec<String>,
}

/// Read-only lookup tables consulted while rendering a payload.
#[derive(Debug, Clone, Default)]
pub struct RenderMaps {
    /// Mantis handle to GitHub handle. Empty destination means "no account".
    pub usernames: HashMap<String, String>,
    /// Mantis project or category name to GitHub label.
    pub labels: HashMap<String, String>,
}

impl MantisIssue {
    /// The numeric issue id of an export row, when the row has one.
    ///
    /// Header rows and stray non-issue lines have no parseable id.
    #[must_use]
    pub fn row_id(record: &csv::StringRecord) -> Option<u64> {
        record.get(0).and_then(|field| field.trim().parse().ok())
    }

    /// Build an issue from an export row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row has fewer fields than the export schema
    /// or its first field is not a numeric issue id.
    pub fn from_record(record: &csv::StringRecord) -> Result<Self> {
        if record.len() < EXPORT_FIELDS {
            return Err(MigrateError::record(format!(
                "expected {EXPORT_FIELDS} fields in CSV row, found only {}",
                record.len()
            )));
        }
        let id = Self::row_id(record)
            .ok_or_else(|| MigrateError::record("row has no numeric issue id"))?;

        let field = |index: usize| record.get(index).unwrap_or_default().to_string();
        Ok(Self {
            id,
            project: field(1),
            reporter: field(2),
            handler: field(3),
            priority: field(4),
            severity: field(5),
            reproducibility: field(6),
            product_version: field(7),
            target_version: field(8),
            category: field(9),
            date_submitted: field(10),
            os: field(11),
            os_build: field(12),
            platform: field(13),
            view_state: field(14),
            updated: field(15),
            summary: field(16),
            description: field(17),
            steps_to_reproduce: field(18),
            status: field(19),
            resolution: field(20),
            fixed_in_version: field(21),
            additional_information: field(22),
            attachment_count: field(23),
            note_count: field(24),
            notes: field(25),
            tags: field(26),
            related_changesets: field(27),
            custom_information: field(28),
        })
    }

    /// Render the issue-creation payload for this row.
    #[must_use]
    pub fn to_issue_request(
        &self,
        converter: &BbcodeConverter,
        maps: &RenderMaps,
        tracker_url: &str,
    ) -> IssueRequest {
        IssueRequest {
            title: self.summary.clone(),
            body: self.render_body(converter, tracker_url),
            assignees: self.map_handler(&maps.usernames),
            labels: self.labels(&maps.labels),
        }
    }

    fn render_body(&self, converter: &BbcodeConverter, tracker_url: &str) -> String {
        let mut md = String::new();
        md.push_str(&format!(
            "Issue imported from {tracker_url}/view.php?id={}\n\n",
            self.id
        ));
        md.push_str(&format!("* **Reporter:** {}\n", self.reporter));
        md.push_str(&format!("* **Date submitted:** {}\n", self.date_submitted));
        md.push_str(&format!("* **Product version:** {}\n", self.product_version));
        md.push_str(&format!("* **Category:** {}\n", self.category));
        md.push_str(&format!("* **Status:** {}\n", self.status));
        md.push_str(&format!("* **Tags:** {}\n", self.tags));

        md.push_str("\n\n# Original report text\n\n");
        md.push_str(&converter.convert(&self.description));

        if !self.additional_information.is_empty() {
            md.push_str("\n\n# Additional information\n\n");
            md.push_str(&converter.convert(&self.additional_information));
        }
        if !self.steps_to_reproduce.is_empty() {
            md.push_str("\n\n# Steps to reproduce\n\n");
            md.push_str(&converter.convert(&self.steps_to_reproduce));
        }

        let custom = strip_leading_html_comment(&self.custom_information);
        if !custom.trim().is_empty() {
            md.push_str("\n\n# Custom information\n\n");
            md.push_str(&format!("```\n{custom}\n```"));
        }

        md.push_str("\n\n# Other bug information\n\n");
        if !self.priority.is_empty() {
            md.push_str(&format!("* **Priority:** {}\n", self.priority));
        }
        if !self.severity.is_empty() {
            md.push_str(&format!("* **Severity:** {}\n", self.severity));
        }
        if !self.category.is_empty() {
            md.push_str(&format!("* **Category:** {}\n", self.category));
        }
        if !self.os.is_empty() || !self.os_build.is_empty() {
            md.push_str(&format!("* **OS:** {} {}\n", self.os, self.os_build));
        }
        if !self.platform.is_empty() {
            md.push_str(&format!("* **Platform:** {}\n", self.platform));
        }
        if !self.updated.is_empty() {
            md.push_str(&format!("* **Updated:** {}\n", self.updated));
        }
        if !self.fixed_in_version.is_empty() {
            md.push_str(&format!("* **Fixed in version:** {}\n", self.fixed_in_version));
        }

        let note_count: u64 = self.note_count.trim().parse().unwrap_or(0);
        if !self.notes.is_empty() && note_count > 0 {
            md.push_str("\n\n# Discussion from Mantis ticket\n\n");
            md.push_str(&self.render_notes(converter));
        }
        md
    }

    /// Render the discussion notes, oldest first. The export stores them
    /// newest-first, so iteration is reversed. The first line of each
    /// converted note is the author line Mantis prepends.
    fn render_notes(&self, converter: &BbcodeConverter) -> String {
        let notes: Vec<&str> = self.notes.split(NOTE_SEPARATOR).collect();
        let mut out = String::new();
        for (position, note) in notes.iter().rev().enumerate() {
            if position > 0 {
                out.push_str("\n\n---\n\n");
            }
            let converted = converter.convert(note);
            let mut lines = converted.split('\n');
            if let Some(first) = lines.next() {
                out.push_str(&format!("### Comment by {first}\n"));
            }
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push('\n');
        out
    }

    /// Assignees for the payload: the handler translated through the
    /// username map. Missing or empty mappings mean no assignee.
    fn map_handler(&self, usernames: &HashMap<String, String>) -> Option<Vec<String>> {
        if self.handler.is_empty() {
            return None;
        }
        match usernames.get(&self.handler) {
            Some(mapped) if !mapped.is_empty() => Some(vec![mapped.clone()]),
            _ => None,
        }
    }

    /// Labels for the payload: the project name translated through the
    /// label map (raw name when unmapped), plus a category-derived label
    /// for bug and feature tickets.
    fn labels(&self, label_map: &HashMap<String, String>) -> Vec<String> {
        let mut labels = vec![
            label_map
                .get(&self.project)
                .cloned()
                .unwrap_or_else(|| self.project.clone()),
        ];
        if self.category == "Bug" {
            labels.push(
                label_map
                    .get("Bug")
                    .cloned()
                    .unwrap_or_else(|| "bug".to_string()),
            );
        } else if self.category == "Feature" {
            labels.push(
                label_map
                    .get("Feature")
                    .cloned()
                    .unwrap_or_else(|| "Feature".to_string()),
            );
        }
        labels
    }
}

/// Strip one leading `<!-- ... -->` block. Mantis forms seed the custom
/// information field with boilerplate instructions inside such a comment.
fn strip_leading_html_comment(text: &str) -> &str {
    let trimmed = text.trim_start();
    if let Some(rest) = trimmed.strip_prefix("<!--") {
        if let Some(end) = rest.find("-->") {
            return &rest[end + 3..];
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> Vec<String> {
        let mut fields = vec![String::new(); EXPORT_FIELDS];
        fields[0] = "101".to_string();
        fields[1] = "Core".to_string();
        fields[2] = "alice".to_string();
        fields[3] = "bob".to_string();
        fields[4] = "high".to_string();
        fields[5] = "minor".to_string();
        fields[6] = "always".to_string();
        fields[7] = "1.0".to_string();
        fields[9] = "Bug".to_string();
        fields[10] = "2021-01-01".to_string();
        fields[11] = "Linux".to_string();
        fields[16] = "Crash on save".to_string();
        fields[17] = "[b]It crashes[/b]".to_string();
        fields[19] = "new".to_string();
        fields
    }

    fn sample_issue() -> MantisIssue {
        let record = csv::StringRecord::from(sample_fields());
        MantisIssue::from_record(&record).expect("valid record")
    }

    #[test]
    fn row_id_is_none_for_header_rows() {
        let record = csv::StringRecord::from(vec!["id", "project"]);
        assert_eq!(MantisIssue::row_id(&record), None);
    }

    #[test]
    fn from_record_rejects_short_rows() {
        let record = csv::StringRecord::from(vec!["101", "Core", "alice"]);
        let err = MantisIssue::from_record(&record).expect_err("short row");
        assert!(err.to_string().contains("found only 3"));
    }

    #[test]
    fn from_record_reads_fields_positionally() {
        let issue = sample_issue();
        assert_eq!(issue.id, 101);
        assert_eq!(issue.project, "Core");
        assert_eq!(issue.summary, "Crash on save");
        assert_eq!(issue.description, "[b]It crashes[/b]");
    }

    #[test]
    fn body_sections_appear_in_order() {
        let issue = sample_issue();
        let request = issue.to_issue_request(
            &BbcodeConverter::new(),
            &RenderMaps::default(),
            "https://tracker.example.org",
        );

        let body = &request.body;
        let provenance = body
            .find("Issue imported from https://tracker.example.org/view.php?id=101")
            .expect("provenance line");
        let reporter = body.find("* **Reporter:** alice").expect("reporter bullet");
        let report = body.find("# Original report text").expect("report section");
        let converted = body.find("***It crashes***").expect("converted body");
        let other = body.find("# Other bug information").expect("other section");

        assert_eq!(provenance, 0);
        assert!(reporter < report);
        assert!(report < converted);
        assert!(converted < other);
    }

    #[test]
    fn empty_optional_sections_are_omitted() {
        let issue = sample_issue();
        let request = issue.to_issue_request(
            &BbcodeConverter::new(),
            &RenderMaps::default(),
            "https://tracker.example.org",
        );
        assert!(!request.body.contains("# Additional information"));
        assert!(!request.body.contains("# Steps to reproduce"));
        assert!(!request.body.contains("# Custom information"));
        assert!(!request.body.contains("# Discussion from Mantis ticket"));
    }

    #[test]
    fn notes_render_oldest_first_with_attribution() {
        let mut fields = sample_fields();
        fields[24] = "2".to_string();
        fields[25] =
            "bob (2021-01-02)\nSecond note\n=-=\nalice (2021-01-01)\nFirst note".to_string();
        let record = csv::StringRecord::from(fields);
        let issue = MantisIssue::from_record(&record).expect("valid record");

        let request = issue.to_issue_request(
            &BbcodeConverter::new(),
            &RenderMaps::default(),
            "https://tracker.example.org",
        );

        let body = &request.body;
        let alice = body
            .find("### Comment by alice (2021-01-01)")
            .expect("oldest note first");
        let bob = body
            .find("### Comment by bob (2021-01-02)")
            .expect("newest note last");
        assert!(alice < bob);
        assert!(body.contains("\n\n---\n\n"));
    }

    #[test]
    fn notes_without_a_count_are_skipped() {
        let mut fields = sample_fields();
        fields[25] = "orphan note".to_string();
        let record = csv::StringRecord::from(fields);
        let issue = MantisIssue::from_record(&record).expect("valid record");
        let request = issue.to_issue_request(
            &BbcodeConverter::new(),
            &RenderMaps::default(),
            "https://tracker.example.org",
        );
        assert!(!request.body.contains("# Discussion from Mantis ticket"));
    }

    #[test]
    fn project_label_falls_back_to_the_raw_name() {
        let issue = sample_issue();
        let request = issue.to_issue_request(
            &BbcodeConverter::new(),
            &RenderMaps::default(),
            "https://tracker.example.org",
        );
        assert_eq!(request.labels, vec!["Core".to_string(), "bug".to_string()]);
    }

    #[test]
    fn project_and_category_labels_use_the_label_map() {
        let maps = RenderMaps {
            usernames: HashMap::new(),
            labels: HashMap::from([
                ("Core".to_string(), "core".to_string()),
                ("Bug".to_string(), "\u{1f41b} bug".to_string()),
            ]),
        };
        let issue = sample_issue();
        let request =
            issue.to_issue_request(&BbcodeConverter::new(), &maps, "https://tracker.example.org");
        assert_eq!(
            request.labels,
            vec!["core".to_string(), "\u{1f41b} bug".to_string()]
        );
    }

    #[test]
    fn handler_maps_to_an_assignee() {
        let maps = RenderMaps {
            usernames: HashMap::from([("bob".to_string(), "bob-gh".to_string())]),
            labels: HashMap::new(),
        };
        let issue = sample_issue();
        let request =
            issue.to_issue_request(&BbcodeConverter::new(), &maps, "https://tracker.example.org");
        assert_eq!(request.assignees, Some(vec!["bob-gh".to_string()]));
    }

    #[test]
    fn unmapped_or_empty_handler_means_no_assignee() {
        let issue = sample_issue();
        let request = issue.to_issue_request(
            &BbcodeConverter::new(),
            &RenderMaps::default(),
            "https://tracker.example.org",
        );
        assert_eq!(request.assignees, None);

        let maps = RenderMaps {
            usernames: HashMap::from([("bob".to_string(), String::new())]),
            labels: HashMap::new(),
        };
        let request =
            issue.to_issue_request(&BbcodeConverter::new(), &maps, "https://tracker.example.org");
        assert_eq!(request.assignees, None);
    }

    #[test]
    fn custom_information_drops_the_leading_boilerplate_comment() {
        let mut fields = sample_fields();
        fields[28] = "<!--ATTENTION:\npaste below\n-->\nOS: Linux\nBuild type: Release".to_string();
        let record = csv::StringRecord::from(fields);
        let issue = MantisIssue::from_record(&record).expect("valid record");
        let request = issue.to_issue_request(
            &BbcodeConverter::new(),
            &RenderMaps::default(),
            "https://tracker.example.org",
        );
        assert!(request.body.contains("# Custom information"));
        assert!(request.body.contains("Build type: Release"));
        assert!(!request.body.contains("ATTENTION"));
    }

    #[test]
    fn custom_information_that_is_only_boilerplate_is_omitted() {
        let mut fields = sample_fields();
        fields[28] = "<!--ATTENTION:\npaste below\n-->\n".to_string();
        let record = csv::StringRecord::from(fields);
        let issue = MantisIssue::from_record(&record).expect("valid record");
        let request = issue.to_issue_request(
            &BbcodeConverter::new(),
            &RenderMaps::default(),
            "https://tracker.example.org",
        );
        assert!(!request.body.contains("# Custom information"));
    }

    #[test]
    fn assignees_are_omitted_from_the_serialized_payload_when_absent() {
        let request = IssueRequest {
            title: "t".to_string(),
            body: "b".to_string(),
            assignees: None,
            labels: vec!["core".to_string()],
        };
        let json = serde_json::to_string(&request).expect("serialize");
        assert!(!json.contains("assignees"));
        assert!(json.contains("\"labels\":[\"core\"]"));
    }
}
