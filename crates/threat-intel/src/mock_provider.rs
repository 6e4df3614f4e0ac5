//! A reference provider with no external call, standing in for a real feed
//! (OSINT, commercial, internal) behind `ThreatIntelProvider`. RFC1918
//! addresses are reported `unknown` (a real feed has nothing meaningful to
//! say about a private IP), a configured set of known-bad IOCs is reported
//! `malicious`, everything else is `clean` with a low baseline score.

use std::collections::HashSet;
use std::net::IpAddr;

use async_trait::async_trait;

use crate::provider::{Finding, ProviderError, ThreatIntelProvider, Verdict};

pub struct MockThreatIntelProvider {
    name: String,
    known_malicious: HashSet<String>,
}

impl MockThreatIntelProvider {
    pub fn new(name: impl Into<String>, known_malicious: impl IntoIterator<Item = String>) -> Self {
        Self {
            name: name.into(),
            known_malicious: known_malicious.into_iter().collect(),
        }
    }
}

#[async_trait]
impl ThreatIntelProvider for MockThreatIntelProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, ioc: &str) -> Result<Finding, ProviderError> {
        let normalized = ioc.trim().to_ascii_lowercase();
        if self.known_malicious.contains(&normalized) {
            return Ok(Finding {
                provider: self.name.clone(),
                ioc: normalized,
                verdict: Verdict::Malicious,
                score: 95,
                evidence: vec![format!("{}: matched known-bad indicator list", self.name)],
                fetched_at: alertmesh_kernel::time::now_utc(),
            });
        }

        if let Ok(IpAddr::V4(v4)) = normalized.parse::<IpAddr>() {
            if v4.is_private() || v4.is_loopback() || v4.is_link_local() {
                return Ok(Finding {
                    provider: self.name.clone(),
                    ioc: normalized,
                    verdict: Verdict::Unknown,
                    score: 0,
                    evidence: vec![format!("{}: private address, no public reputation data", self.name)],
                    fetched_at: alertmesh_kernel::time::now_utc(),
                });
            }
        }

        Ok(Finding {
            provider: self.name.clone(),
            ioc: normalized,
            verdict: Verdict::Clean,
            score: 5,
            evidence: vec![format!("{}: no adverse reports", self.name)],
            fetched_at: alertmesh_kernel::time::now_utc(),
        })
    }
}
