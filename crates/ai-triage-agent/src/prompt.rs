//! Per-alert-type prompt composition (§4.7): "a registry maps alert type
//! to a prompt template. Each template is filled with the enriched alert,
//! IOC findings, aggregated threat score, and (optionally) top-k similar
//! historical alerts."

use alertmesh_kernel::AlertType;
use alertmesh_similarity_index::SearchHit;
use alertmesh_threat_intel::handler::ContextualizedAlert;

const OUTPUT_SHAPE: &str = r#"Respond with a single JSON object and nothing else, shaped exactly as:
{
  "score": <integer 0-100>,
  "level": "info" | "low" | "medium" | "high" | "critical",
  "confidence": <float 0.0-1.0>,
  "recommended_actions": [{"action": "...", "priority": "...", "rationale": "..."}],
  "narrative": "<human-readable summary>"
}"#;

fn instructions_for(alert_type: AlertType) -> &'static str {
    match alert_type {
        AlertType::Malware => {
            "You are triaging a malware detection alert. Weigh file hash reputation and host criticality heavily."
        }
        AlertType::Phishing => {
            "You are triaging a phishing alert. Weigh sender/URL reputation and whether credentials may have been entered."
        }
        AlertType::BruteForce => {
            "You are triaging a brute-force authentication alert. Weigh source reputation, whether the target is internal, and attempt volume."
        }
        AlertType::DataExfiltration => {
            "You are triaging a data exfiltration alert. Weigh destination reputation, asset criticality and data sensitivity."
        }
        AlertType::Intrusion => {
            "You are triaging a network intrusion alert. Weigh asset criticality and whether the source is external."
        }
        AlertType::Ddos => {
            "You are triaging a denial-of-service alert. Weigh the criticality of the targeted asset and traffic volume."
        }
        AlertType::Anomaly => {
            "You are triaging a behavioral anomaly alert. Weigh the user's risk profile and deviation from baseline."
        }
        AlertType::Other => "You are triaging a security alert of an unclassified type. Use general judgment.",
    }
}

/// Builds the full prompt text for `alert`, incorporating IOC findings, the
/// aggregated threat score and up to `similar.len()` historical neighbors.
pub fn compose(alert: &ContextualizedAlert, similar: &[SearchHit]) -> String {
    let core = &alert.enriched.normalized.alert;
    let mut prompt = String::new();
    prompt.push_str(instructions_for(core.alert_type));
    prompt.push_str("\n\nAlert:\n");
    prompt.push_str(&format!("  alert_id: {}\n", core.alert_id));
    prompt.push_str(&format!("  alert_type: {:?}\n", core.alert_type));
    prompt.push_str(&format!("  severity: {:?}\n", core.severity));
    prompt.push_str(&format!("  title: {}\n", core.title.as_deref().unwrap_or("")));
    prompt.push_str(&format!("  description: {}\n", core.description.as_deref().unwrap_or("")));
    prompt.push_str(&format!("  aggregated_threat_score: {}\n", alert.threat_score));

    prompt.push_str("\nThreat intel findings:\n");
    if alert.findings.is_empty() {
        prompt.push_str("  (none)\n");
    }
    for finding in &alert.findings {
        prompt.push_str(&format!(
            "  - ioc={} verdict={:?} score={}\n",
            finding.ioc, finding.verdict, finding.score
        ));
    }

    prompt.push_str("\nEnrichment context:\n");
    if let Some(network) = &alert.enriched.context.network {
        prompt.push_str(&format!("  network: internal={} reputation={:?}\n", network.is_internal, network.reputation));
    }
    if let Some(asset) = &alert.enriched.context.asset {
        prompt.push_str(&format!("  asset: criticality={}\n", asset.criticality));
    }
    if let Some(user) = &alert.enriched.context.user {
        prompt.push_str(&format!("  user: risk_profile={}\n", user.risk_profile.as_deref().unwrap_or("unknown")));
    }

    if !similar.is_empty() {
        prompt.push_str("\nSimilar historical alerts:\n");
        for hit in similar {
            prompt.push_str(&format!("  - alert_id={} similarity={:.2}\n", hit.alert_id, hit.similarity));
        }
    }

    prompt.push('\n');
    prompt.push_str(OUTPUT_SHAPE);
    prompt
}

/// A short follow-up appended when the first response fails to parse, per
/// §4.7's "single repair prompt" allowance.
pub fn repair_prompt(previous_response: &str, parse_error: &str) -> String {
    format!(
        "Your previous response could not be parsed as the required JSON object.\nError: {parse_error}\nPrevious response:\n{previous_response}\n\n{OUTPUT_SHAPE}"
    )
}
