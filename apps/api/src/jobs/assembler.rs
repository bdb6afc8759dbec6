//! Turns raw upstream records into a filtered, scored, ordered job list.

use serde_json::Value;

use crate::jobs::models::{Job, RawListing};
use crate::jobs::scoring;
use crate::store::StateDocument;
use crate::upstream::SOURCE;

pub const UNKNOWN_TITLE: &str = "Unknown role";
pub const REMOTE_LOCATION: &str = "Remote";

/// How the `limit` cap interacts with score ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// Keep the first `limit` matches in upstream order, then sort those by score.
    #[default]
    ScanOrder,
    /// Sort every match by score, then keep the first `limit`.
    TopScored,
}

/// Filters `raw` by `query` (case-insensitive substring of the combined text), scores
/// each match and returns at most `limit` jobs sorted by score, highest first.
/// Equal scores keep their upstream order.
pub fn build_job_list(
    raw: &[Value],
    query: &str,
    limit: usize,
    state: &StateDocument,
    mode: SelectionMode,
) -> Vec<Job> {
    let query = query.to_lowercase();
    let matches = raw
        .iter()
        .filter_map(RawListing::from_value)
        .filter_map(|listing| assemble(listing, &query, state));

    let mut jobs: Vec<Job> = match mode {
        SelectionMode::ScanOrder => matches.take(limit).collect(),
        SelectionMode::TopScored => matches.collect(),
    };

    // sort_by is stable
    jobs.sort_by(|a, b| b.score.cmp(&a.score));
    jobs.truncate(limit);
    jobs
}

/// Lowercased `title description tags...` used for both filtering and scoring.
pub fn combined_text(title: &str, description: &str, tags: &[String]) -> String {
    format!("{title} {description} {}", tags.join(" ")).to_lowercase()
}

fn assemble(listing: RawListing, query: &str, state: &StateDocument) -> Option<Job> {
    let title = listing.display_title();
    let company = listing.company_name();
    let url = listing.link();
    let description = listing.description.unwrap_or_default();

    let combined = combined_text(&title, &description, &listing.tags);
    if !combined.contains(query) {
        return None;
    }

    let id = format!("{SOURCE}-{}", listing.id);
    Some(Job {
        saved: state.is_saved(&id),
        applied: state.is_applied(&id),
        score: scoring::score(&combined),
        title: if title.is_empty() {
            UNKNOWN_TITLE.to_string()
        } else {
            title
        },
        company: (!company.is_empty()).then_some(company),
        location: REMOTE_LOCATION,
        is_remote: true,
        url,
        source: SOURCE,
        description,
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing(id: u64, position: &str, description: &str) -> Value {
        json!({"id": id, "position": position, "description": description, "tags": []})
    }

    fn ids(jobs: &[Job]) -> Vec<&str> {
        jobs.iter().map(|j| j.id.as_str()).collect()
    }

    #[test]
    fn test_single_it_support_listing() {
        let raw = vec![json!({
            "id": 1,
            "position": "IT Support Tech",
            "description": "VPN and Active Directory",
            "company": "Acme",
            "tags": []
        })];

        let jobs = build_job_list(&raw, "it", 20, &StateDocument::default(), SelectionMode::ScanOrder);

        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.id, "remoteok-1");
        // "it support", "vpn", "active directory"
        assert_eq!(job.score, 44);
        assert_eq!(job.company.as_deref(), Some("Acme"));
        assert_eq!(job.location, "Remote");
        assert!(job.is_remote);
        assert_eq!(job.source, "remoteok");
        assert!(!job.saved);
        assert!(!job.applied);
    }

    #[test]
    fn test_records_without_id_are_skipped() {
        let raw = vec![
            json!({"legal": "API terms"}),
            json!({"position": "Helpdesk Analyst"}),
            json!("not a record"),
            listing(2, "Helpdesk Analyst", ""),
        ];

        let jobs = build_job_list(&raw, "", 20, &StateDocument::default(), SelectionMode::ScanOrder);
        assert_eq!(ids(&jobs), vec!["remoteok-2"]);
    }

    #[test]
    fn test_query_matches_title_description_or_tags_case_insensitively() {
        let raw = vec![
            listing(1, "Citrix Engineer", ""),
            listing(2, "Engineer", "Works with CITRIX daily"),
            json!({"id": 3, "position": "Engineer", "tags": ["citrix"]}),
            listing(4, "Engineer", "Kubernetes"),
        ];

        let jobs = build_job_list(&raw, "CiTrIx", 20, &StateDocument::default(), SelectionMode::ScanOrder);
        let mut found = ids(&jobs);
        found.sort();
        assert_eq!(found, vec!["remoteok-1", "remoteok-2", "remoteok-3"]);
    }

    #[test]
    fn test_company_field_is_not_searched() {
        let raw = vec![json!({"id": 1, "position": "Analyst", "company": "Azure Corp"})];
        let jobs = build_job_list(&raw, "azure", 20, &StateDocument::default(), SelectionMode::ScanOrder);
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_empty_title_and_company_defaults() {
        let raw = vec![json!({"id": 9, "position": "  ", "company": " "})];
        let jobs = build_job_list(&raw, "", 20, &StateDocument::default(), SelectionMode::ScanOrder);
        assert_eq!(jobs[0].title, "Unknown role");
        assert_eq!(jobs[0].company, None);
        assert_eq!(jobs[0].description, "");
        assert_eq!(jobs[0].score, scoring::BASE_SCORE);
    }

    #[test]
    fn test_saved_and_applied_flags_follow_state() {
        let raw = vec![listing(1, "Tech", ""), listing(2, "Tech", "")];
        let state = StateDocument {
            saved: vec!["remoteok-1".to_string()],
            applied: vec!["remoteok-2".to_string()],
        };

        let jobs = build_job_list(&raw, "tech", 20, &state, SelectionMode::ScanOrder);
        assert!(jobs[0].saved && !jobs[0].applied);
        assert!(!jobs[1].saved && jobs[1].applied);
    }

    #[test]
    fn test_sorted_by_score_with_stable_ties() {
        let raw = vec![
            listing(1, "Tech A", ""),                // 20
            listing(2, "Tech B", "vpn jira azure"),  // 44
            listing(3, "Tech C", ""),                // 20
            listing(4, "Tech D", "vpn"),             // 28
            listing(5, "Tech E", "jira"),            // 28
        ];

        let jobs = build_job_list(&raw, "tech", 20, &StateDocument::default(), SelectionMode::ScanOrder);
        assert_eq!(
            ids(&jobs),
            vec!["remoteok-2", "remoteok-4", "remoteok-5", "remoteok-1", "remoteok-3"]
        );
        assert!(jobs.windows(2).all(|w| w[0].score >= w[1].score));
    }

    fn low_then_high() -> Vec<Value> {
        vec![
            listing(1, "Tech", ""),                       // 20
            listing(2, "Tech", ""),                       // 20
            listing(3, "Tech", "vpn"),                    // 28
            listing(4, "Tech", "vpn jira azure citrix"),  // 52
        ]
    }

    #[test]
    fn test_scan_order_caps_before_sorting() {
        let jobs = build_job_list(&low_then_high(), "tech", 2, &StateDocument::default(), SelectionMode::ScanOrder);
        // the two best listings sit past the cap and never make it in
        assert_eq!(ids(&jobs), vec!["remoteok-1", "remoteok-2"]);
    }

    #[test]
    fn test_top_scored_sorts_before_capping() {
        let jobs = build_job_list(&low_then_high(), "tech", 2, &StateDocument::default(), SelectionMode::TopScored);
        assert_eq!(ids(&jobs), vec!["remoteok-4", "remoteok-3"]);
    }

    #[test]
    fn test_modes_agree_when_limit_covers_all_matches() {
        let state = StateDocument::default();
        let scan = build_job_list(&low_then_high(), "tech", 50, &state, SelectionMode::ScanOrder);
        let top = build_job_list(&low_then_high(), "tech", 50, &state, SelectionMode::TopScored);
        assert_eq!(scan, top);
    }

    #[test]
    fn test_non_matching_records_do_not_consume_limit() {
        let raw = vec![
            listing(1, "Designer", ""),
            listing(2, "Tech", ""),
            listing(3, "Designer", ""),
            listing(4, "Tech", ""),
        ];
        let jobs = build_job_list(&raw, "tech", 2, &StateDocument::default(), SelectionMode::ScanOrder);
        assert_eq!(ids(&jobs), vec!["remoteok-2", "remoteok-4"]);
    }
}
