//! Keyword relevance scoring for IT-support listings.
//!
//! Score = 20 + 8 per distinct keyword found in the combined text, capped at 100.

/// Domain terms checked against the lowercased combined text.
/// Each term counts once no matter how often it occurs.
pub const KEYWORDS: &[&str] = &[
    "it support",
    "service desk",
    "helpdesk",
    "windows",
    "office 365",
    "o365",
    "active directory",
    "vpn",
    "citrix",
    "vmware",
    "azure",
    "sccm",
    "servicenow",
    "jira",
    "remote support",
    "ticketing",
];

pub const KEYWORD_WEIGHT: u32 = 8;
pub const BASE_SCORE: u32 = 20;
pub const MAX_SCORE: u32 = 100;

/// Scores already-lowercased combined text. Pure and deterministic.
pub fn score(combined: &str) -> u32 {
    let hits = KEYWORDS.iter().filter(|kw| combined.contains(*kw)).count() as u32;
    (hits * KEYWORD_WEIGHT + BASE_SCORE).min(MAX_SCORE)
}
