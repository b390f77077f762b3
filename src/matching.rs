//! Fuzzy scoring primitives and the heuristics built on them.
//!
//! Every matching decision in the crate goes through a function in this
//! module, and every threshold lives here as a named constant:
//!
//! | Constant | Value | Used by |
//! |----------|-------|---------|
//! | [`BEST_MATCH_THRESHOLD`] | 70 | name disambiguation ([`best_match`]) |
//! | [`ROSTER_LINK_THRESHOLD`] | 85 | roster-page link scan |
//! | [`SITE_SEARCH_THRESHOLD`] | 90 | site search result links |
//! | [`TEAM_ROW_THRESHOLD`] | 85 | team statistics row lookup |
//! | [`EXTERNAL_ACCEPT_SCORE`] | 4 | external search results |
//!
//! Scores are integers in `0..=100`. The base similarity is normalized
//! Levenshtein similarity from `strsim`, scaled and rounded.

use std::collections::BTreeSet;

pub const BEST_MATCH_THRESHOLD: u8 = 70;
pub const ROSTER_LINK_THRESHOLD: u8 = 85;
pub const SITE_SEARCH_THRESHOLD: u8 = 90;
pub const TEAM_ROW_THRESHOLD: u8 = 85;
pub const EXTERNAL_ACCEPT_SCORE: u8 = 4;

/// Column keys that mark a table as statistical.
pub const COMMON_STAT_COLUMNS: [&str; 11] =
    ["gp", "g", "a", "pts", "min", "gs", "sog", "gw", "sh", "yc", "rc"];

fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Token-set similarity between two strings.
///
/// Case-, order- and duplicate-insensitive. When the two token sets share
/// at least one token and one set contains the other, the score is 100.
/// Otherwise the score is the best similarity among the shared tokens and
/// the shared tokens extended with each side's leftovers.
///
/// Returns 0 when either side has no tokens.
pub fn fuzzy_score(a: &str, b: &str) -> u8 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let left: BTreeSet<&str> = a.split_whitespace().collect();
    let right: BTreeSet<&str> = b.split_whitespace().collect();
    if left.is_empty() || right.is_empty() {
        return 0;
    }

    let shared: Vec<&str> = left.intersection(&right).copied().collect();
    let only_left: Vec<&str> = left.difference(&right).copied().collect();
    let only_right: Vec<&str> = right.difference(&left).copied().collect();

    if !shared.is_empty() && (only_left.is_empty() || only_right.is_empty()) {
        return 100;
    }

    let sect = shared.join(" ");
    let with_left = join_tokens(&sect, &only_left.join(" "));
    let with_right = join_tokens(&sect, &only_right.join(" "));

    let best = ratio(&with_left, &with_right)
        .max(ratio(&sect, &with_left))
        .max(ratio(&sect, &with_right));
    to_score(best)
}

fn join_tokens(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

/// Best-aligned substring similarity.
///
/// The shorter string is compared against every window of the same length
/// in the longer one, plus the partial windows hanging off either end, and
/// the best similarity wins. A short needle inside a long haystack scores
/// high here even when [`fuzzy_score`] would not.
pub fn partial_score(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let (needle, haystack) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if needle.is_empty() {
        return 0;
    }

    let m = needle.len();
    let n = haystack.len();
    let needle: String = needle.into_iter().collect();

    let edges = (1..m).flat_map(|k| [&haystack[..k], &haystack[n - k..]]);
    let full = (0..=n - m).map(|start| &haystack[start..start + m]);

    let mut best = 0.0_f64;
    for window in full.chain(edges) {
        let window: String = window.iter().collect();
        best = best.max(ratio(&needle, &window));
        if best >= 100.0 {
            break;
        }
    }
    to_score(best)
}

/// Pick the candidate closest to `target` by [`fuzzy_score`].
///
/// Empty candidates are skipped. The winner must score at least
/// [`BEST_MATCH_THRESHOLD`]; on ties the earliest candidate wins.
pub fn best_match<'a, S: AsRef<str>>(target: &str, candidates: &'a [S]) -> Option<&'a str> {
    let mut best: Option<(u8, &'a str)> = None;
    for candidate in candidates.iter().map(AsRef::as_ref) {
        if candidate.trim().is_empty() {
            continue;
        }
        let score = fuzzy_score(target, candidate);
        if best.is_none_or(|(top, _)| score > top) {
            best = Some((score, candidate));
        }
    }
    best.filter(|(score, _)| *score >= BEST_MATCH_THRESHOLD)
        .map(|(_, candidate)| candidate)
}

/// Whether a table header looks like a statistics table.
///
/// Accepts when at least two keys are common stat abbreviations, or when
/// there is a season column. A bare "year" column only counts as a season
/// marker next to at least one stat column, since roster tables use "Year"
/// for academic class. Keys are compared lower-cased with trailing dots
/// removed.
pub fn looks_like_stats_header<S: AsRef<str>>(headers: &[S]) -> bool {
    let keys: BTreeSet<String> = headers.iter().map(|h| header_key(h.as_ref())).collect();
    let stat_hits = COMMON_STAT_COLUMNS
        .iter()
        .filter(|column| keys.contains(**column))
        .count();
    stat_hits >= 2 || keys.contains("season") || (keys.contains("year") && stat_hits >= 1)
}

/// Canonical form of a table header cell: lower-cased, trimmed, no trailing dots.
pub fn header_key(header: &str) -> String {
    header.trim().to_lowercase().trim_end_matches('.').to_string()
}

/// Whether a team-stats row belongs to the athlete.
///
/// Either the whole row text is a close partial match for the name, or one
/// of the name's tokens appears verbatim in the row.
pub fn row_matches_name(name: &str, row_text: &str) -> bool {
    let name = name.to_lowercase();
    let row_text = row_text.to_lowercase();
    partial_score(&name, &row_text) >= TEAM_ROW_THRESHOLD
        || name.split_whitespace().any(|token| row_text.contains(token))
}

/// Score an external search result on a small integer scale.
///
/// +4 when the link is a roster detail path, +3 when it sits in the sport's
/// section, +3 when the title and snippet closely contain the name.
pub fn external_result_score(
    name: &str,
    sport_path: &str,
    link: &str,
    title: &str,
    snippet: &str,
) -> u8 {
    let mut score = 0;
    if link.contains("/sports/") && link.contains("/roster/") {
        score += 4;
    }
    if link.contains(sport_path) {
        score += 3;
    }
    if partial_score(name, &format!("{title} {snippet}")) > SITE_SEARCH_THRESHOLD {
        score += 3;
    }
    score
}
