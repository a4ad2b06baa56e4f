use synapse_core::response::AgentResponse;

/// Returned when fusion is asked to merge an empty response set.
pub const NO_DATA_STREAMS: &str = "Fusion error: no data streams available.";

/// Per-specialist excerpt length in the fused report, in characters.
const EXCERPT_CHARS: usize = 300;

/// Merge specialist responses into a single report.
///
/// Responses are ordered by confidence, highest first, and the aggregate
/// confidence is the rounded mean expressed as a percentage. A single
/// response passes through verbatim with no report framing.
pub fn fuse_responses(responses: &[AgentResponse]) -> String {
    if responses.is_empty() {
        return NO_DATA_STREAMS.to_string();
    }
    if responses.len() == 1 {
        return responses[0].content.clone();
    }

    let mut ordered: Vec<&AgentResponse> = responses.iter().collect();
    ordered.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mean = responses.iter().map(|r| r.confidence).sum::<f64>() / responses.len() as f64;
    let pct = (mean * 100.0).round() as i64;

    let mut report = String::new();
    report.push_str("**Multi-Model Fusion**\n");
    report.push_str(&format!("Aggregate confidence: {}%\n\n", pct));

    for response in &ordered {
        report.push_str(&format!("**{} insights:**\n", response.agent_name));
        report.push_str(&excerpt(&response.content));
        report.push_str("\n\n");
    }

    report.push_str("---\n");
    report.push_str(&format!(
        "Weighted consensus reached across {} oracles.",
        ordered.len()
    ));
    report
}

fn excerpt(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() > EXCERPT_CHARS {
        let head: String = trimmed.chars().take(EXCERPT_CHARS).collect();
        format!("{}...", head)
    } else {
        trimmed.to_string()
    }
}
