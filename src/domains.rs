//! School → athletics hostname resolution.
//!
//! Known schools map to their athletics sites through a static table keyed by
//! [`normalize_key`]; anything else gets a synthesized
//! `athletics.<slug>.edu` hostname.

use crate::utils::normalize_key;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

static KNOWN_SCHOOLS: &[(&str, &str)] = &[
    ("st olaf college", "athletics.stolaf.edu"),
    ("saint olaf", "athletics.stolaf.edu"),
    ("st olaf", "athletics.stolaf.edu"),
    ("macalester college", "athletics.macalester.edu"),
    ("macalester", "athletics.macalester.edu"),
    ("gustavus adolphus college", "gogusties.com"),
    ("gustavus", "gogusties.com"),
    ("carleton college", "athletics.carleton.edu"),
    ("carleton", "athletics.carleton.edu"),
    ("augsburg university", "athletics.augsburg.edu"),
    ("augsburg", "athletics.augsburg.edu"),
    ("bethel university", "athletics.bethel.edu"),
    ("bethel", "athletics.bethel.edu"),
    ("hamline university", "hamlineathletics.com"),
    ("hamline", "hamlineathletics.com"),
    ("saint johns university", "gojohnnies.com"),
    ("saint johns", "gojohnnies.com"),
    ("st johns", "gojohnnies.com"),
    ("saint marys university of minnesota", "saintmaryssports.com"),
    ("saint marys", "saintmaryssports.com"),
    ("st marys", "saintmaryssports.com"),
    ("the college of st scholastica", "csssaints.com"),
    ("st scholastica", "csssaints.com"),
    ("scholastica", "csssaints.com"),
];

static INSTITUTION_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(college|university)\b").expect("static regex"));

/// How a hostname was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainOrigin {
    Static,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDomain {
    pub school_key: String,
    pub hostname: String,
    pub origin: DomainOrigin,
}

/// The lookup table: built-ins plus any configured extras.
#[derive(Debug, Clone)]
pub struct DomainTable {
    entries: HashMap<String, String>,
}

impl Default for DomainTable {
    fn default() -> Self {
        Self::with_extras(&HashMap::new())
    }
}

impl DomainTable {
    /// Built-in table with `extras` layered on top. Extra keys are normalized
    /// the same way queries are, so config files may use any punctuation.
    pub fn with_extras(extras: &HashMap<String, String>) -> Self {
        let mut entries: HashMap<String, String> = KNOWN_SCHOOLS
            .iter()
            .map(|(key, host)| (key.to_string(), host.to_string()))
            .collect();
        for (school, host) in extras {
            entries.insert(normalize_key(school), host.trim().to_string());
        }
        Self { entries }
    }

    pub fn resolve(&self, school: &str) -> ResolvedDomain {
        let school_key = normalize_key(school);
        if let Some(host) = self.entries.get(&school_key) {
            debug!(%school_key, %host, "Resolved school from table");
            return ResolvedDomain {
                school_key,
                hostname: host.clone(),
                origin: DomainOrigin::Static,
            };
        }
        let hostname = fallback_hostname(&school_key);
        debug!(%school_key, %hostname, "Synthesized fallback hostname");
        ResolvedDomain {
            school_key,
            hostname,
            origin: DomainOrigin::Fallback,
        }
    }
}

/// `athletics.<slug>.edu` with "college"/"university" removed and every
/// separator dropped from the slug.
pub fn fallback_hostname(school_key: &str) -> String {
    let stripped = INSTITUTION_WORDS.replace_all(school_key, "");
    let slug: String = stripped
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    format!("athletics.{slug}.edu")
}
