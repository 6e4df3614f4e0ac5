//! IOC extraction (§4.3 step 4): regex scan over concatenated text fields
//! for IPv4, hex hashes, URLs, domains and emails. Results are
//! deduplicated and lowercased.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IocSet {
    pub ips: Vec<String>,
    pub hashes: Vec<String>,
    pub urls: Vec<String>,
    pub domains: Vec<String>,
    pub emails: Vec<String>,
}

static IPV4_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})\b").unwrap()
});
static HASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-fA-F0-9]{32,64}\b").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\bhttps?://[^\s,;'"]+\b"#).unwrap());
static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,}\b").unwrap()
});
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\b").unwrap());

/// Scans `text` and returns every IOC type found, deduplicated and
/// lowercased. Hash length is constrained to the three lengths the data
/// model recognizes (32/40/64); anything else found by the loose regex is
/// discarded here rather than at validation time.
pub fn extract(text: &str) -> IocSet {
    let mut ips = BTreeSet::new();
    for caps in IPV4_RE.captures_iter(text) {
        let octets: Option<Vec<u8>> = (1..=4).map(|i| caps[i].parse::<u16>().ok()).collect::<Option<Vec<u16>>>()
            .and_then(|v| v.iter().all(|&o| o <= 255).then(|| v.into_iter().map(|o| o as u8).collect()));
        if octets.is_some() {
            ips.insert(caps[0].to_string());
        }
    }

    let mut hashes = BTreeSet::new();
    for m in HASH_RE.find_iter(text) {
        let len = m.as_str().len();
        if matches!(len, 32 | 40 | 64) {
            hashes.insert(m.as_str().to_ascii_lowercase());
        }
    }

    let mut urls = BTreeSet::new();
    for m in URL_RE.find_iter(text) {
        urls.insert(m.as_str().trim_end_matches(['.', ',']).to_ascii_lowercase());
    }

    let mut emails = BTreeSet::new();
    for m in EMAIL_RE.find_iter(text) {
        emails.insert(m.as_str().to_ascii_lowercase());
    }

    // Domains found inside an already-captured URL or email are not
    // reported separately to avoid noisy duplicate IOCs.
    let mut domains = BTreeSet::new();
    'outer: for m in DOMAIN_RE.find_iter(text) {
        let candidate = m.as_str().to_ascii_lowercase();
        if IPV4_RE.is_match(&candidate) {
            continue;
        }
        for url in &urls {
            if url.contains(&candidate) {
                continue 'outer;
            }
        }
        for email in &emails {
            if email.ends_with(&candidate) {
                continue 'outer;
            }
        }
        domains.insert(candidate);
    }

    IocSet {
        ips: ips.into_iter().collect(),
        hashes: hashes.into_iter().collect(),
        urls: urls.into_iter().collect(),
        domains: domains.into_iter().collect(),
        emails: emails.into_iter().collect(),
    }
}
