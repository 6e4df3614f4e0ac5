//! Aggregation rules (§4.5, §3, testable property #4): per IOC, verdict is
//! the worst across providers, score is the mean, evidence is concatenated
//! with provider tags. Alert-level threat score is the max across IOCs.

use serde::{Deserialize, Serialize};

use crate::provider::{Finding, Verdict};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedIoc {
    pub ioc: String,
    pub verdict: Verdict,
    pub score: u8,
    pub evidence: Vec<String>,
}

/// Aggregates every provider's finding for a single IOC. `findings` must
/// all carry the same `ioc`; panics in debug builds otherwise would be
/// inappropriate here, so the caller's grouping is trusted.
pub fn aggregate_ioc(ioc: &str, findings: &[Finding]) -> AggregatedIoc {
    let verdict = findings
        .iter()
        .map(|f| f.verdict)
        .max()
        .unwrap_or(Verdict::Unknown);
    let score = if findings.is_empty() {
        0
    } else {
        (findings.iter().map(|f| f.score as u32).sum::<u32>() / findings.len() as u32) as u8
    };
    let evidence = findings
        .iter()
        .flat_map(|f| f.evidence.iter().map(move |e| format!("[{}] {e}", f.provider)))
        .collect();

    AggregatedIoc {
        ioc: ioc.to_string(),
        verdict,
        score,
        evidence,
    }
}

/// Alert-level threat score: max across every IOC's aggregated score.
pub fn alert_level_score(per_ioc: &[AggregatedIoc]) -> u8 {
    per_ioc.iter().map(|i| i.score).max().unwrap_or(0)
}
